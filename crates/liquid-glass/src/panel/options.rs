//! Panel construction options

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GlassError;
use crate::kernel::RefractionParams;
use crate::shape::ShapeKind;

/// Default corner radius of a panel in pixels
pub const DEFAULT_BORDER_RADIUS: f32 = 48.0;

/// Default corner radius of a button in pixels
pub const DEFAULT_BUTTON_SIZE: f32 = 24.0;

pub const DEFAULT_TINT_OPACITY: f32 = 0.2;

pub const DEFAULT_BLUR_RADIUS: f32 = 5.0;

/// Callback fired once, on the first successful shader setup
pub type OnLoad = Box<dyn FnOnce()>;

/// Options for [`GlassEngine::create_panel`](crate::GlassEngine::create_panel)
#[derive(Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelOptions {
    pub border_radius: f32,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub tint_opacity: f32,
    pub blur_radius: f32,
    /// Recapture the page every 500 ms once the shader is ready
    pub auto_refresh: bool,
    pub refraction: RefractionParams,
    #[serde(skip)]
    on_load: Option<OnLoad>,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            border_radius: DEFAULT_BORDER_RADIUS,
            kind: ShapeKind::Rounded,
            tint_opacity: DEFAULT_TINT_OPACITY,
            blur_radius: DEFAULT_BLUR_RADIUS,
            auto_refresh: false,
            refraction: RefractionParams::default(),
            on_load: None,
        }
    }
}

impl fmt::Debug for PanelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelOptions")
            .field("border_radius", &self.border_radius)
            .field("kind", &self.kind)
            .field("tint_opacity", &self.tint_opacity)
            .field("blur_radius", &self.blur_radius)
            .field("auto_refresh", &self.auto_refresh)
            .field("refraction", &self.refraction)
            .field("on_load", &self.on_load.is_some())
            .finish()
    }
}

impl PanelOptions {
    /// Parse options from a JSON object such as `{"type": "pill", "tintOpacity": 0.3}`
    pub fn from_json(json: &str) -> Result<Self, GlassError> {
        serde_json::from_str(json).map_err(|e| GlassError::InvalidOptions(e.to_string()))
    }

    pub fn with_kind(mut self, kind: ShapeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_border_radius(mut self, border_radius: f32) -> Self {
        self.border_radius = border_radius;
        self
    }

    pub fn with_auto_refresh(mut self, auto_refresh: bool) -> Self {
        self.auto_refresh = auto_refresh;
        self
    }

    /// Set the callback fired on the first successful shader setup
    pub fn on_load(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_load = Some(Box::new(callback));
        self
    }

    pub(crate) fn take_on_load(&mut self) -> Option<OnLoad> {
        self.on_load.take()
    }
}

/// Options for [`GlassEngine::create_button`](crate::GlassEngine::create_button)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonOptions {
    /// Corner radius in pixels
    pub size: f32,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub tint_opacity: f32,
}

impl Default for ButtonOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_BUTTON_SIZE,
            kind: ShapeKind::Rounded,
            tint_opacity: DEFAULT_TINT_OPACITY,
        }
    }
}

impl ButtonOptions {
    /// Parse options from a JSON object such as `{"size": 20, "type": "circle"}`
    pub fn from_json(json: &str) -> Result<Self, GlassError> {
        serde_json::from_str(json).map_err(|e| GlassError::InvalidOptions(e.to_string()))
    }

    pub(crate) fn into_panel_options(self) -> PanelOptions {
        PanelOptions {
            border_radius: self.size,
            kind: self.kind,
            tint_opacity: self.tint_opacity,
            ..PanelOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_defaults() {
        let opts = PanelOptions::default();
        assert_eq!(opts.border_radius, 48.0);
        assert_eq!(opts.kind, ShapeKind::Rounded);
        assert_eq!(opts.tint_opacity, 0.2);
        assert_eq!(opts.blur_radius, 5.0);
        assert!(!opts.auto_refresh);
    }

    #[test]
    fn test_panel_from_json() {
        let opts = PanelOptions::from_json(r#"{"type": "pill", "tintOpacity": 0.35, "autoRefresh": true}"#).unwrap();
        assert_eq!(opts.kind, ShapeKind::Pill);
        assert_eq!(opts.tint_opacity, 0.35);
        assert!(opts.auto_refresh);
        assert_eq!(opts.border_radius, 48.0);
    }

    #[test]
    fn test_bad_json_is_invalid_options() {
        let err = PanelOptions::from_json(r#"{"type": "hexagon"}"#).unwrap_err();
        assert!(matches!(err, GlassError::InvalidOptions(_)));
    }

    #[test]
    fn test_on_load_is_taken_once() {
        let mut opts = PanelOptions::default().on_load(|| {});
        assert!(opts.take_on_load().is_some());
        assert!(opts.take_on_load().is_none());
    }

    #[test]
    fn test_button_defaults_are_smaller() {
        let button = ButtonOptions::default();
        assert!(button.size < DEFAULT_BORDER_RADIUS);
        let panel = button.into_panel_options();
        assert_eq!(panel.border_radius, DEFAULT_BUTTON_SIZE);
        assert_eq!(panel.kind, ShapeKind::Rounded);
        assert!(!panel.auto_refresh);
    }
}
