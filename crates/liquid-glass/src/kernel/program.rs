//! GPU program text and vertex data

use crate::error::SurfaceError;

/// Vertex entry point of [`SHADER_LIQUID_GLASS`]
pub const VERTEX_ENTRY: &str = "vs_main";

/// Fragment entry point of [`SHADER_LIQUID_GLASS`]
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Vertices drawn per frame: two triangles covering the surface
pub const QUAD_VERTEX_COUNT: u32 = 6;

/// Clip-space positions of the full-surface quad
pub const QUAD_POSITIONS: [f32; 12] = [
    -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, //
    -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
];

/// Texture coordinates of the quad, `y` growing downward
pub const QUAD_TEXCOORDS: [f32; 12] = [
    0.0, 1.0, 1.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 1.0, 1.0, 0.0,
];

/// Liquid glass program: refraction, blur, tint and shape mask
pub const SHADER_LIQUID_GLASS: &str = r#"
struct GlassUniforms {
    resolution: vec2<f32>,
    texture_size: vec2<f32>,
    container_position: vec2<f32>,
    scroll_y: f32,
    page_height: f32,
    viewport_height: f32,
    blur_radius: f32,
    border_radius: f32,
    warp: f32,
    edge_intensity: f32,
    rim_intensity: f32,
    base_intensity: f32,
    edge_distance: f32,
    rim_distance: f32,
    base_distance: f32,
    corner_boost: f32,
    ripple_effect: f32,
    tint_opacity: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) texcoord: vec2<f32>,
};

@group(0) @binding(0) var<uniform> u: GlassUniforms;
@group(0) @binding(1) var image: texture_2d<f32>;
@group(0) @binding(2) var image_sampler: sampler;

const SHAPE_ROUNDED: u32 = 0u;
const SHAPE_CIRCLE: u32 = 1u;
const SHAPE_PILL: u32 = 2u;

@vertex
fn vs_main(@location(0) a_position: vec2<f32>, @location(1) a_texcoord: vec2<f32>) -> VsOut {
    var out: VsOut;
    out.position = vec4<f32>(a_position, 0.0, 1.0);
    out.texcoord = a_texcoord;
    return out;
}

fn rounded_rect_distance(coord: vec2<f32>, size: vec2<f32>, radius: f32) -> f32 {
    let center = size * 0.5;
    let pixel = coord * size;
    let to_corner = abs(pixel - center) - (center - radius);
    let outside_corner = length(max(to_corner, vec2<f32>(0.0)));
    let inside_corner = min(max(to_corner.x, to_corner.y), 0.0);
    return outside_corner + inside_corner - radius;
}

fn circle_distance(coord: vec2<f32>, size: vec2<f32>, radius: f32) -> f32 {
    let pixel = coord * size;
    return length(pixel - size * 0.5) - radius;
}

fn has_capsule_axis(size: vec2<f32>, radius: f32) -> bool {
    return abs(size.x - 2.0 * radius) > 0.0;
}

fn capsule_closest(pixel: vec2<f32>, size: vec2<f32>, radius: f32) -> vec2<f32> {
    let start = vec2<f32>(radius, size.y * 0.5);
    let axis = vec2<f32>(size.x - radius, size.y * 0.5) - start;
    let t = clamp(dot(pixel - start, axis) / dot(axis, axis), 0.0, 1.0);
    return start + axis * t;
}

fn pill_distance(coord: vec2<f32>, size: vec2<f32>, radius: f32) -> f32 {
    let pixel = coord * size;
    if (has_capsule_axis(size, radius)) {
        return length(pixel - capsule_closest(pixel, size, radius)) - radius;
    }
    return length(pixel - size * 0.5) - radius;
}

fn is_pill(size: vec2<f32>, radius: f32) -> bool {
    let radius_matches_height = abs(radius - size.y * 0.5) < 2.0;
    let wider_than_tall = size.x > size.y + 4.0;
    return radius_matches_height && wider_than_tall;
}

fn is_circle(size: vec2<f32>, radius: f32) -> bool {
    let min_dim = min(size.x, size.y);
    let radius_matches_min_dim = abs(radius - min_dim * 0.5) < 1.0;
    let roughly_square = abs(size.x - size.y) < 4.0;
    return radius_matches_min_dim && roughly_square;
}

fn classify(size: vec2<f32>, radius: f32) -> u32 {
    if (is_pill(size, radius)) {
        return SHAPE_PILL;
    }
    if (is_circle(size, radius)) {
        return SHAPE_CIRCLE;
    }
    return SHAPE_ROUNDED;
}

fn shape_distance(shape: u32, coord: vec2<f32>, size: vec2<f32>, radius: f32) -> f32 {
    if (shape == SHAPE_PILL) {
        return pill_distance(coord, size, radius);
    }
    if (shape == SHAPE_CIRCLE) {
        return circle_distance(coord, size, radius);
    }
    return rounded_rect_distance(coord, size, radius);
}

fn safe_normalize(v: vec2<f32>) -> vec2<f32> {
    let len = length(v);
    if (len > 0.0) {
        return v / len;
    }
    return vec2<f32>(0.0);
}

fn shape_normal(shape: u32, coord: vec2<f32>, size: vec2<f32>, radius: f32) -> vec2<f32> {
    if (shape == SHAPE_PILL && has_capsule_axis(size, radius)) {
        let pixel = coord * size;
        let dir = pixel - capsule_closest(pixel, size, radius);
        if (length(dir) > 0.0) {
            return normalize(dir);
        }
        return vec2<f32>(0.0, 1.0);
    }
    return safe_normalize(coord - vec2<f32>(0.5));
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let coord = in.texcoord;
    let size = u.resolution;
    let radius = u.border_radius;
    let min_dim = min(size.x, size.y);
    let shape = classify(size, radius);

    // Panel center on the page, then this fragment's pixel within it
    let container_center = u.container_position + vec2<f32>(0.0, u.scroll_y);
    let page_pixel = container_center + (coord - 0.5) * size;
    var uv = page_pixel / u.texture_size;

    let shape_dist = shape_distance(shape, coord, size, radius);
    let normal = shape_normal(shape, coord, size, radius);
    let d_norm = max(-shape_dist, 0.0) / min_dim;
    let pixel_depth = d_norm * min_dim;

    let base = 1.0 - exp(-pixel_depth * u.base_distance);
    let edge = exp(-pixel_depth * u.edge_distance);
    let rim = exp(-pixel_depth * u.rim_distance);
    var base_component = 0.0;
    if (u.warp > 0.5) {
        base_component = base * u.base_intensity;
    }
    let intensity = base_component + edge * u.edge_intensity + rim * u.rim_intensity;

    let corner = max(min(coord.x, 1.0 - coord.x), min(coord.y, 1.0 - coord.y));
    let corner_boost = exp(-corner * min_dim * 0.3) * u.corner_boost;

    let perpendicular = vec2<f32>(-normal.y, normal.x);
    let ripple = sin(d_norm * 25.0) * u.ripple_effect * rim;

    uv += normal * intensity + normal * corner_boost + perpendicular * ripple;

    let texel = 1.0 / u.texture_size;
    let sigma = u.blur_radius * 0.5;
    let blur_step = texel * sigma;
    var color = vec4<f32>(0.0);
    var total_weight = 0.0;
    for (var i = -4; i <= 4; i++) {
        for (var j = -4; j <= 4; j++) {
            let tap = vec2<f32>(f32(i), f32(j));
            let d = length(tap);
            if (d > 4.0) {
                continue;
            }
            var weight = 0.0;
            if (sigma > 0.0) {
                weight = exp(-(d * d) / (2.0 * sigma * sigma));
            } else if (d == 0.0) {
                weight = 1.0;
            }
            color += textureSampleLevel(image, image_sampler, uv + tap * blur_step, 0.0) * weight;
            total_weight += weight;
        }
    }
    color /= total_weight;

    let gradient = mix(vec3<f32>(1.0), vec3<f32>(0.7), vec3<f32>(coord.y));
    let tinted = mix(color.rgb, gradient, vec3<f32>(u.tint_opacity));

    // Mask uses the unrefracted distance
    let mask = 1.0 - smoothstep(-1.0, 1.0, shape_dist);
    return vec4<f32>(tinted, mask);
}
"#;

/// Check that `source` parses, validates and exposes both glass entry points
///
/// Parse errors map to [`SurfaceError::Compile`]; validation errors and
/// missing entry points map to [`SurfaceError::Link`].
pub fn validate_program(source: &str) -> Result<naga::Module, SurfaceError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| SurfaceError::Compile(e.emit_to_string(source)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| SurfaceError::Link(e.to_string()))?;

    for (entry, stage) in [
        (VERTEX_ENTRY, naga::ShaderStage::Vertex),
        (FRAGMENT_ENTRY, naga::ShaderStage::Fragment),
    ] {
        let found = module
            .entry_points
            .iter()
            .any(|ep| ep.name == entry && ep.stage == stage);
        if !found {
            return Err(SurfaceError::Link(format!("missing {:?} entry point `{}`", stage, entry)));
        }
    }

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glass_program_validates() {
        let module = validate_program(SHADER_LIQUID_GLASS).unwrap();
        assert_eq!(module.entry_points.len(), 2);
    }

    #[test]
    fn test_syntax_error_is_compile_error() {
        let err = validate_program("fn broken( {").unwrap_err();
        assert!(matches!(err, SurfaceError::Compile(_)));
    }

    #[test]
    fn test_missing_entry_is_link_error() {
        let source = r#"
@vertex
fn vs_main() -> @builtin(position) vec4<f32> {
    return vec4<f32>(0.0);
}
"#;
        let err = validate_program(source).unwrap_err();
        assert!(matches!(err, SurfaceError::Link(_)));
    }

    #[test]
    fn test_quad_covers_surface() {
        assert_eq!(QUAD_POSITIONS.len() as u32, QUAD_VERTEX_COUNT * 2);
        assert_eq!(QUAD_TEXCOORDS.len() as u32, QUAD_VERTEX_COUNT * 2);
        // Bottom-left clip corner samples the bottom of the panel
        assert_eq!(&QUAD_POSITIONS[0..2], &[-1.0, -1.0]);
        assert_eq!(&QUAD_TEXCOORDS[0..2], &[0.0, 1.0]);
    }
}
