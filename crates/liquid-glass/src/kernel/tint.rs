//! Gradient tint and shape mask

use crate::math::{mix, smoothstep, Size, Vec2};
use crate::shape::classify;

/// Tint color at the top edge of a panel
pub const TINT_TOP: [f32; 3] = [1.0, 1.0, 1.0];

/// Tint color at the bottom edge of a panel
pub const TINT_BOTTOM: [f32; 3] = [0.7, 0.7, 0.7];

/// Vertical white-to-gray gradient at normalized height `y`
pub fn gradient_tint(y: f32) -> [f32; 3] {
    [
        mix(TINT_TOP[0], TINT_BOTTOM[0], y),
        mix(TINT_TOP[1], TINT_BOTTOM[1], y),
        mix(TINT_TOP[2], TINT_BOTTOM[2], y),
    ]
}

/// Blend `color` toward the gradient by `tint_opacity`
pub fn apply_tint(color: [f32; 3], y: f32, tint_opacity: f32) -> [f32; 3] {
    let tint = gradient_tint(y);
    [
        mix(color[0], tint[0], tint_opacity),
        mix(color[1], tint[1], tint_opacity),
        mix(color[2], tint[2], tint_opacity),
    ]
}

/// Coverage of `coord` by the panel outline, antialiased over two pixels
///
/// Uses the plain shape distance so the outline never moves with the
/// refraction.
pub fn mask_alpha(coord: Vec2, size: Size, radius: f32) -> f32 {
    let distance = classify(size, radius).distance(coord, size, radius);
    1.0 - smoothstep(-1.0, 1.0, distance)
}
