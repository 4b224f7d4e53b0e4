//! Refraction tuning constants

use serde::{Deserialize, Serialize};

/// Falloff multiplier for the corner boost term
pub const CORNER_FALLOFF: f32 = 0.3;

/// Angular frequency of the rim ripple
pub const RIPPLE_FREQUENCY: f32 = 25.0;

/// Tuning of the refraction model
///
/// The defaults are the values the effect was tuned with; changing them
/// changes the look of every panel that does not override them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefractionParams {
    /// Enables the base (interior) refraction term
    pub warp: bool,
    pub edge_intensity: f32,
    pub rim_intensity: f32,
    pub base_intensity: f32,
    pub edge_distance: f32,
    pub rim_distance: f32,
    pub base_distance: f32,
    pub corner_boost: f32,
    pub ripple_effect: f32,
}

impl Default for RefractionParams {
    fn default() -> Self {
        Self {
            warp: false,
            edge_intensity: 0.01,
            rim_intensity: 0.05,
            base_intensity: 0.01,
            edge_distance: 0.15,
            rim_distance: 0.8,
            base_distance: 0.1,
            corner_boost: 0.02,
            ripple_effect: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let p = RefractionParams::default();
        assert!(!p.warp);
        assert_eq!(p.edge_intensity, 0.01);
        assert_eq!(p.rim_intensity, 0.05);
        assert_eq!(p.base_intensity, 0.01);
        assert_eq!(p.edge_distance, 0.15);
        assert_eq!(p.rim_distance, 0.8);
        assert_eq!(p.base_distance, 0.1);
        assert_eq!(p.corner_boost, 0.02);
        assert_eq!(p.ripple_effect, 0.1);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let p: RefractionParams = serde_json::from_str(r#"{"warp": true, "rimIntensity": 0.2}"#).unwrap();
        assert!(p.warp);
        assert_eq!(p.rim_intensity, 0.2);
        assert_eq!(p.edge_intensity, 0.01);
        assert_eq!(p.ripple_effect, 0.1);
    }
}
