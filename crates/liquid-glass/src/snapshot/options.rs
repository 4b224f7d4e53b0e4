//! Options handed to the page rasterizer

use serde::{Deserialize, Serialize};

/// Classes the rasterizer skips so panels never capture themselves
pub const GLASS_CLASSES: [&str; 3] = ["glass-container", "glass-button", "glass-button-text"];

/// How the page rasterizer renders the document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureOptions {
    pub scale: f32,
    #[serde(rename = "useCORS")]
    pub use_cors: bool,
    pub allow_taint: bool,
    /// `None` keeps the page background transparent
    pub background_color: Option<String>,
    pub scroll_y: f32,
    pub logging: bool,
    /// Elements carrying any of these classes are left out of the snapshot
    pub ignore_classes: Vec<String>,
    /// Selectors hidden (opacity 0) in the cloned document before rendering
    pub hide_on_clone: Vec<String>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            use_cors: true,
            allow_taint: false,
            background_color: None,
            scroll_y: 0.0,
            logging: false,
            ignore_classes: GLASS_CLASSES.iter().map(|c| c.to_string()).collect(),
            hide_on_clone: vec![".navbar".to_string()],
        }
    }
}

impl CaptureOptions {
    /// True when an element with `classes` must be left out of the snapshot
    pub fn ignores<'a>(&self, classes: impl IntoIterator<Item = &'a str>) -> bool {
        classes
            .into_iter()
            .any(|class| self.ignore_classes.iter().any(|ignored| ignored == class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = CaptureOptions::default();
        assert_eq!(opts.scale, 1.0);
        assert!(opts.use_cors);
        assert!(!opts.allow_taint);
        assert!(opts.background_color.is_none());
        assert_eq!(opts.hide_on_clone, vec![".navbar".to_string()]);
    }

    #[test]
    fn test_ignores_glass_elements() {
        let opts = CaptureOptions::default();
        assert!(opts.ignores(["card", "glass-container"]));
        assert!(opts.ignores(["glass-button-text"]));
        assert!(!opts.ignores(["glass-container-pill"]));
        assert!(!opts.ignores(std::iter::empty()));
    }

    #[test]
    fn test_serializes_rasterizer_names() {
        let json = serde_json::to_value(CaptureOptions::default()).unwrap();
        assert_eq!(json["useCORS"], serde_json::Value::Bool(true));
        assert_eq!(json["allowTaint"], serde_json::Value::Bool(false));
        assert!(json["backgroundColor"].is_null());
    }
}
