//! Shape distance library
//!
//! Pure signed-distance functions for the three panel outlines and the
//! predicates that pick one from a panel's size and corner radius.
//!
//! Classification order is fixed: pill, then circle, then rounded rectangle.
//! The first matching predicate wins.

mod classify;
mod distance;

use serde::{Deserialize, Serialize};

use crate::math::{Size, Vec2};

pub use classify::{
    is_circle, is_pill, CIRCLE_MAX_SKEW, CIRCLE_RADIUS_TOLERANCE, PILL_MIN_ELONGATION,
    PILL_RADIUS_TOLERANCE,
};
pub use distance::{circle_distance, pill_distance, rounded_rect_distance};

/// Requested outline of a panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Rectangle with rounded corners
    #[default]
    Rounded,
    /// Circle; the panel is forced square
    Circle,
    /// Capsule; the radius follows half the height
    Pill,
}

impl ShapeKind {
    /// Get all shape kinds
    pub fn all() -> &'static [ShapeKind] {
        &[ShapeKind::Rounded, ShapeKind::Circle, ShapeKind::Pill]
    }

    /// Parse from string ID (e.g., "rounded", "pill")
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "rounded" => Some(ShapeKind::Rounded),
            "circle" => Some(ShapeKind::Circle),
            "pill" => Some(ShapeKind::Pill),
            _ => None,
        }
    }

    /// Get the string ID for this kind
    pub fn id(&self) -> &'static str {
        match self {
            ShapeKind::Rounded => "rounded",
            ShapeKind::Circle => "circle",
            ShapeKind::Pill => "pill",
        }
    }

    /// Extra host class for the fallback styling of this kind
    pub fn host_class(&self) -> Option<&'static str> {
        match self {
            ShapeKind::Rounded => None,
            ShapeKind::Circle => Some("glass-container-circle"),
            ShapeKind::Pill => Some("glass-container-pill"),
        }
    }
}

/// Outline actually rendered, derived from size and radius by [`classify`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedShape {
    RoundedRect,
    Circle,
    Pill,
}

impl ResolvedShape {
    /// Index shared with the GPU program's shape constants
    pub fn index(self) -> u32 {
        match self {
            ResolvedShape::RoundedRect => 0,
            ResolvedShape::Circle => 1,
            ResolvedShape::Pill => 2,
        }
    }

    /// Signed distance in pixels, negative inside
    pub fn distance(self, coord: Vec2, size: Size, radius: f32) -> f32 {
        match self {
            ResolvedShape::RoundedRect => rounded_rect_distance(coord, size, radius),
            ResolvedShape::Circle => circle_distance(coord, size, radius),
            ResolvedShape::Pill => pill_distance(coord, size, radius),
        }
    }

    /// Outward unit normal used to orient the refraction
    ///
    /// Pills use the direction away from the closest point of the capsule
    /// axis (straight down when the point lies on the axis). Circles and
    /// rounded rectangles use the radial direction from the center.
    pub fn normal(self, coord: Vec2, size: Size, radius: f32) -> Vec2 {
        if self == ResolvedShape::Pill {
            let pixel = coord.mul_elem(size.as_vec2());
            if let Some(closest) = distance::capsule_closest(pixel, size, radius) {
                let dir = pixel - closest;
                return if dir.length() > 0.0 {
                    dir.normalize()
                } else {
                    Vec2::new(0.0, 1.0)
                };
            }
        }
        (coord - Vec2::HALF).normalize()
    }
}

/// Pick the outline for a panel: pill, then circle, then rounded rectangle
pub fn classify(size: Size, radius: f32) -> ResolvedShape {
    if is_pill(size, radius) {
        ResolvedShape::Pill
    } else if is_circle(size, radius) {
        ResolvedShape::Circle
    } else {
        ResolvedShape::RoundedRect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_kind_default() {
        let kind: ShapeKind = Default::default();
        assert_eq!(kind, ShapeKind::Rounded);
    }

    #[test]
    fn test_shape_kind_ids_roundtrip() {
        for kind in ShapeKind::all() {
            assert_eq!(ShapeKind::from_id(kind.id()), Some(*kind));
        }
        assert_eq!(ShapeKind::from_id("PILL"), Some(ShapeKind::Pill));
        assert_eq!(ShapeKind::from_id("hexagon"), None);
    }

    #[test]
    fn test_shape_kind_serde_lowercase() {
        let json = serde_json::to_string(&ShapeKind::Circle).unwrap();
        assert_eq!(json, "\"circle\"");
        let kind: ShapeKind = serde_json::from_str("\"pill\"").unwrap();
        assert_eq!(kind, ShapeKind::Pill);
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify(Size::new(200.0, 40.0), 20.0), ResolvedShape::Pill);
        assert_eq!(classify(Size::new(80.0, 80.0), 40.0), ResolvedShape::Circle);
        assert_eq!(classify(Size::new(300.0, 200.0), 48.0), ResolvedShape::RoundedRect);
        // A circle radius on an elongated box is neither
        assert_eq!(classify(Size::new(200.0, 80.0), 10.0), ResolvedShape::RoundedRect);
    }

    #[test]
    fn test_pill_normal_points_away_from_axis() {
        let size = Size::new(200.0, 40.0);
        let up = ResolvedShape::Pill.normal(Vec2::new(0.5, 0.0), size, 20.0);
        assert!((up.x - 0.0).abs() < 0.001);
        assert!((up.y + 1.0).abs() < 0.001);

        let left = ResolvedShape::Pill.normal(Vec2::new(0.0, 0.5), size, 20.0);
        assert!((left.x + 1.0).abs() < 0.001);

        // On the axis itself
        let on_axis = ResolvedShape::Pill.normal(Vec2::new(0.5, 0.5), size, 20.0);
        assert_eq!(on_axis, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_radial_normal() {
        let n = ResolvedShape::RoundedRect.normal(Vec2::new(1.0, 0.5), Size::new(100.0, 60.0), 10.0);
        assert!((n.x - 1.0).abs() < 0.001);
        assert!(n.y.abs() < 0.001);
    }
}
