//! Refraction vector field

use crate::math::{Size, Vec2};
use crate::shape::{classify, ResolvedShape};

use super::params::{RefractionParams, CORNER_FALLOFF, RIPPLE_FREQUENCY};
use super::FrameInputs;

/// Depth of `coord` inside the shape in pixels, zero outside
pub fn edge_depth(coord: Vec2, size: Size, radius: f32) -> f32 {
    depth_in(classify(size, radius), coord, size, radius)
}

fn depth_in(shape: ResolvedShape, coord: Vec2, size: Size, radius: f32) -> f32 {
    (-shape.distance(coord, size, radius)).max(0.0)
}

/// Displacement added to the texture coordinate at `coord`
///
/// Sum of three terms along the shape normal: the edge/rim/base falloff,
/// a boost near the four corners of the panel, and a ripple perpendicular
/// to the normal that fades with the rim term.
pub fn refraction_offset(coord: Vec2, size: Size, radius: f32, params: &RefractionParams) -> Vec2 {
    let min_dim = size.min_dim();
    if min_dim <= 0.0 {
        return Vec2::ZERO;
    }

    let shape = classify(size, radius);
    let normal = shape.normal(coord, size, radius);
    let d_norm = depth_in(shape, coord, size, radius) / min_dim;
    let pixel_depth = d_norm * min_dim;

    let base = 1.0 - (-pixel_depth * params.base_distance).exp();
    let edge = (-pixel_depth * params.edge_distance).exp();
    let rim = (-pixel_depth * params.rim_distance).exp();
    let base_component = if params.warp {
        base * params.base_intensity
    } else {
        0.0
    };
    let intensity = base_component + edge * params.edge_intensity + rim * params.rim_intensity;

    let corner = coord.x.min(1.0 - coord.x).max(coord.y.min(1.0 - coord.y));
    let corner_boost = (-corner * min_dim * CORNER_FALLOFF).exp() * params.corner_boost;

    let ripple = (d_norm * RIPPLE_FREQUENCY).sin() * params.ripple_effect * rim;

    normal * intensity + normal * corner_boost + normal.perp() * ripple
}

/// Unrefracted texture coordinate of `coord` in the snapshot
///
/// The panel center plus the scroll offset locates the panel on the page;
/// `coord` then spans the panel's size around it.
pub fn texture_coord(coord: Vec2, frame: &FrameInputs) -> Vec2 {
    if frame.texture_size.is_empty() {
        return Vec2::ZERO;
    }
    let center = frame.position + Vec2::new(0.0, frame.scroll_y);
    let page_pixel = center + (coord - Vec2::HALF).mul_elem(frame.size.as_vec2());
    page_pixel.div_elem(frame.texture_size.as_vec2())
}
