//! Signed distance functions
//!
//! All functions take a normalized coordinate in `[0, 1]²`, scale it into
//! pixel space by `size`, and return the signed distance in pixels to the
//! shape outline. Negative inside, positive outside.

use crate::math::{Size, Vec2};

/// Signed distance to a rounded rectangle filling `size` with corner `radius`
pub fn rounded_rect_distance(coord: Vec2, size: Size, radius: f32) -> f32 {
    let size = size.as_vec2();
    let center = size * 0.5;
    let pixel = coord.mul_elem(size);
    let to_corner = (pixel - center).abs() - (center - radius);
    let outside_corner = to_corner.max(Vec2::ZERO).length();
    let inside_corner = to_corner.x.max(to_corner.y).min(0.0);
    outside_corner + inside_corner - radius
}

/// Signed distance to a circle of `radius` centered in `size`
pub fn circle_distance(coord: Vec2, size: Size, radius: f32) -> f32 {
    let size = size.as_vec2();
    let pixel = coord.mul_elem(size);
    let center = Vec2::HALF.mul_elem(size);
    (pixel - center).length() - radius
}

/// Horizontal capsule axis of a pill: from `(radius, h/2)` to `(w - radius, h/2)`
#[inline]
pub(crate) fn capsule_axis(size: Size, radius: f32) -> (Vec2, Vec2) {
    let start = Vec2::new(radius, size.height * 0.5);
    let end = Vec2::new(size.width - radius, size.height * 0.5);
    (start, end - start)
}

/// Closest point on the capsule axis, or `None` when the axis has zero length
#[inline]
pub(crate) fn capsule_closest(pixel: Vec2, size: Size, radius: f32) -> Option<Vec2> {
    let (start, axis) = capsule_axis(size, radius);
    if axis.length() > 0.0 {
        let t = ((pixel - start).dot(axis) / axis.dot(axis)).clamp(0.0, 1.0);
        Some(start + axis * t)
    } else {
        None
    }
}

/// Signed distance to a pill (capsule) of `radius` spanning `size`
///
/// A zero-length capsule axis degenerates to a circle about the center.
pub fn pill_distance(coord: Vec2, size: Size, radius: f32) -> f32 {
    let pixel = coord.mul_elem(size.as_vec2());
    match capsule_closest(pixel, size, radius) {
        Some(closest) => (pixel - closest).length() - radius,
        None => (pixel - size.as_vec2() * 0.5).length() - radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> impl Iterator<Item = Vec2> {
        (0..=28).flat_map(|i| {
            (0..=28).map(move |j| Vec2::new(-0.2 + i as f32 * 0.05, -0.2 + j as f32 * 0.05))
        })
    }

    /// Distance from `p` to the segment `a..b`
    fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
        let ab = b - a;
        let len2 = ab.dot(ab);
        if len2 == 0.0 {
            return (p - a).length();
        }
        let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
        (p - (a + ab * t)).length()
    }

    #[test]
    fn test_rounded_rect_sign_matches_inner_rect_test() {
        let size = Size::new(120.0, 60.0);
        let radius = 12.0;
        for coord in grid() {
            let p = coord.mul_elem(size.as_vec2());
            let clamped = Vec2::new(
                p.x.clamp(radius, size.width - radius),
                p.y.clamp(radius, size.height - radius),
            );
            let reference = (p - clamped).length() - radius;
            let d = rounded_rect_distance(coord, size, radius);
            if reference.abs() > 0.5 {
                assert_eq!(d < 0.0, reference < 0.0, "coord {:?}: d={} ref={}", coord, d, reference);
            }
        }
    }

    #[test]
    fn test_circle_sign() {
        let size = Size::new(80.0, 80.0);
        for coord in grid() {
            let p = coord.mul_elem(size.as_vec2());
            let reference = (p - Vec2::new(40.0, 40.0)).length() - 40.0;
            let d = circle_distance(coord, size, 40.0);
            assert!((d - reference).abs() < 0.001);
        }
    }

    #[test]
    fn test_pill_sign_matches_segment_distance() {
        let size = Size::new(200.0, 40.0);
        for coord in grid() {
            let p = coord.mul_elem(size.as_vec2());
            let reference = segment_distance(p, Vec2::new(20.0, 20.0), Vec2::new(180.0, 20.0)) - 20.0;
            let d = pill_distance(coord, size, 20.0);
            assert!((d - reference).abs() < 0.001, "coord {:?}", coord);
        }
    }

    #[test]
    fn test_boundaries_are_zero() {
        let rr = Size::new(100.0, 60.0);
        assert!(rounded_rect_distance(Vec2::new(0.5, 0.0), rr, 10.0).abs() < 0.001);
        assert!(rounded_rect_distance(Vec2::new(1.0, 0.5), rr, 10.0).abs() < 0.001);

        let circle = Size::new(80.0, 80.0);
        assert!(circle_distance(Vec2::new(1.0, 0.5), circle, 40.0).abs() < 0.001);
        assert!(circle_distance(Vec2::new(0.5, 0.0), circle, 40.0).abs() < 0.001);

        let pill = Size::new(200.0, 40.0);
        assert!(pill_distance(Vec2::new(0.5, 0.0), pill, 20.0).abs() < 0.001);
        assert!(pill_distance(Vec2::new(0.0, 0.5), pill, 20.0).abs() < 0.001);
        assert!(pill_distance(Vec2::new(1.0, 0.5), pill, 20.0).abs() < 0.001);
    }

    #[test]
    fn test_inside_negative_outside_positive() {
        let rr = Size::new(100.0, 60.0);
        assert!(rounded_rect_distance(Vec2::HALF, rr, 10.0) < 0.0);
        assert!(rounded_rect_distance(Vec2::new(0.5, -0.1), rr, 10.0) > 0.0);
        // Corner pixel lies outside the rounded corner
        assert!(rounded_rect_distance(Vec2::ZERO, rr, 10.0) > 0.0);

        assert!((circle_distance(Vec2::HALF, Size::new(80.0, 80.0), 40.0) + 40.0).abs() < 0.001);
        assert!((pill_distance(Vec2::HALF, Size::new(200.0, 40.0), 20.0) + 20.0).abs() < 0.001);
    }

    #[test]
    fn test_degenerate_pill_falls_back_to_circle() {
        let size = Size::new(40.0, 40.0);
        for coord in grid() {
            let pill = pill_distance(coord, size, 20.0);
            let circle = circle_distance(coord, size, 20.0);
            assert!((pill - circle).abs() < 0.001);
        }
        assert!(capsule_closest(Vec2::new(3.0, 3.0), size, 20.0).is_none());
    }
}
