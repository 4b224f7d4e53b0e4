//! Shape classification from panel size and corner radius
//!
//! The thresholds are in pixels and are shared with the GPU program, so a
//! panel is classified identically on both sides.

use crate::math::Size;

/// Radius must be within this many pixels of half the height for a pill
pub const PILL_RADIUS_TOLERANCE: f32 = 2.0;

/// Width must exceed height by more than this many pixels for a pill
pub const PILL_MIN_ELONGATION: f32 = 4.0;

/// Radius must be within this many pixels of half the shorter side for a circle
pub const CIRCLE_RADIUS_TOLERANCE: f32 = 1.0;

/// Width and height must differ by less than this many pixels for a circle
pub const CIRCLE_MAX_SKEW: f32 = 4.0;

/// True when `radius` is about half the height and the box is clearly wider than tall
pub fn is_pill(size: Size, radius: f32) -> bool {
    let radius_matches_height = (radius - size.height * 0.5).abs() < PILL_RADIUS_TOLERANCE;
    let wider_than_tall = size.width > size.height + PILL_MIN_ELONGATION;
    radius_matches_height && wider_than_tall
}

/// True when `radius` is about half the shorter side and the box is roughly square
pub fn is_circle(size: Size, radius: f32) -> bool {
    let radius_matches_min_dim = (radius - size.min_dim() * 0.5).abs() < CIRCLE_RADIUS_TOLERANCE;
    let roughly_square = (size.width - size.height).abs() < CIRCLE_MAX_SKEW;
    radius_matches_min_dim && roughly_square
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pill_classification() {
        assert!(is_pill(Size::new(200.0, 40.0), 20.0));
        assert!(is_pill(Size::new(200.0, 40.0), 21.9));
        assert!(!is_pill(Size::new(200.0, 40.0), 22.0));
        // Not elongated enough
        assert!(!is_pill(Size::new(44.0, 40.0), 20.0));
        assert!(is_pill(Size::new(44.5, 40.0), 20.0));
        // Tall boxes are never pills
        assert!(!is_pill(Size::new(40.0, 200.0), 20.0));
    }

    #[test]
    fn test_circle_classification() {
        assert!(is_circle(Size::new(80.0, 80.0), 40.0));
        assert!(is_circle(Size::new(80.0, 77.0), 38.5));
        assert!(!is_circle(Size::new(80.0, 76.0), 38.0));
        assert!(!is_circle(Size::new(80.0, 80.0), 41.0));
        assert!(!is_circle(Size::new(80.0, 80.0), 48.0));
    }

    #[test]
    fn test_pill_and_circle_are_mutually_exclusive() {
        for w in (0..=120).map(|w| w as f32 * 0.5) {
            for h in (0..=120).map(|h| h as f32 * 0.5) {
                for r in (0..=70).map(|r| r as f32 * 0.5) {
                    let size = Size::new(w, h);
                    assert!(
                        !(is_pill(size, r) && is_circle(size, r)),
                        "both predicates hold for {:?} r={}",
                        size,
                        r
                    );
                }
            }
        }
    }
}
