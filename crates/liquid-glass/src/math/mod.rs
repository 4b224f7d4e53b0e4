//! Core geometry types

mod rect;
mod size;
mod vec2;

pub use rect::Rect;
pub use size::Size;
pub use vec2::Vec2;

/// Hermite interpolation between `edge0` and `edge1`, as in shading languages
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear interpolation
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert!((smoothstep(-1.0, 1.0, -2.0) - 0.0).abs() < 0.0001);
        assert!((smoothstep(-1.0, 1.0, 0.0) - 0.5).abs() < 0.0001);
        assert!((smoothstep(-1.0, 1.0, 3.0) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_mix() {
        assert!((mix(1.0, 0.7, 0.0) - 1.0).abs() < 0.0001);
        assert!((mix(1.0, 0.7, 1.0) - 0.7).abs() < 0.0001);
        assert!((mix(1.0, 0.7, 0.5) - 0.85).abs() < 0.0001);
    }
}
