//! Refraction and shading kernel
//!
//! CPU reference of the glass fragment program. The functions here and the
//! WGSL in [`SHADER_LIQUID_GLASS`] compute the same thing; the software
//! surface renders with [`shade_pixel`] and the GPU surface with the WGSL.

mod blur;
mod params;
mod program;
mod refraction;
mod tint;
mod uniforms;

use serde::{Deserialize, Serialize};

use crate::math::{Size, Vec2};

pub use blur::{blur_sample, gaussian_taps, Tap, TextureSampler, BLUR_WINDOW};
pub use params::{RefractionParams, CORNER_FALLOFF, RIPPLE_FREQUENCY};
pub use program::{
    validate_program, FRAGMENT_ENTRY, QUAD_POSITIONS, QUAD_TEXCOORDS, QUAD_VERTEX_COUNT,
    SHADER_LIQUID_GLASS, VERTEX_ENTRY,
};
pub use refraction::{edge_depth, refraction_offset, texture_coord};
pub use tint::{apply_tint, gradient_tint, mask_alpha, TINT_BOTTOM, TINT_TOP};
pub use uniforms::{
    locate, GlassUniforms, UniformField, UniformLocation, UniformValue, IMAGE_UNIFORM,
    UNIFORM_FIELDS,
};

/// Linear RGBA color, components in `[0, 1]`
pub type Rgba = [f32; 4];

/// Everything the kernel reads for one frame of one panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInputs {
    /// Panel surface size in pixels
    pub size: Size,
    pub border_radius: f32,
    /// Snapshot size in pixels
    pub texture_size: Size,
    /// Panel center in viewport coordinates
    pub position: Vec2,
    pub scroll_y: f32,
    pub blur_radius: f32,
    pub tint_opacity: f32,
    pub params: RefractionParams,
}

/// Shade the panel pixel at normalized `coord`
///
/// The color comes from the blurred snapshot at the refracted coordinate,
/// tinted toward the vertical gradient. The alpha is the shape mask.
pub fn shade_pixel<S: TextureSampler + ?Sized>(coord: Vec2, frame: &FrameInputs, image: &S) -> Rgba {
    let uv = texture_coord(coord, frame)
        + refraction_offset(coord, frame.size, frame.border_radius, &frame.params);
    let color = blur_sample(image, uv, frame.texture_size, frame.blur_radius);
    let [r, g, b] = apply_tint([color[0], color[1], color[2]], coord.y, frame.tint_opacity);
    let alpha = mask_alpha(coord, frame.size, frame.border_radius);
    [r, g, b, alpha]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Horizontal ramp so refraction visibly changes the sampled color
    struct Ramp;

    impl TextureSampler for Ramp {
        fn sample(&self, uv: Vec2) -> Rgba {
            let x = uv.x.clamp(0.0, 1.0);
            [x, 1.0 - x, 0.5, 1.0]
        }
    }

    fn frame() -> FrameInputs {
        FrameInputs {
            size: Size::new(300.0, 200.0),
            border_radius: 48.0,
            texture_size: Size::new(1200.0, 3000.0),
            position: Vec2::new(600.0, 400.0),
            scroll_y: 120.0,
            blur_radius: 5.0,
            tint_opacity: 0.2,
            params: RefractionParams::default(),
        }
    }

    fn coords() -> impl Iterator<Item = Vec2> {
        (0..=20).flat_map(|i| (0..=20).map(move |j| Vec2::new(i as f32 / 20.0, j as f32 / 20.0)))
    }

    #[test]
    fn test_alpha_invariant_to_style_and_refraction() {
        let base = frame();
        let variants = [
            FrameInputs {
                tint_opacity: 0.9,
                ..base
            },
            FrameInputs {
                blur_radius: 0.0,
                ..base
            },
            FrameInputs {
                blur_radius: 12.0,
                ..base
            },
            FrameInputs {
                params: RefractionParams {
                    warp: true,
                    edge_intensity: 0.5,
                    rim_intensity: 0.5,
                    corner_boost: 1.0,
                    ripple_effect: 2.0,
                    ..RefractionParams::default()
                },
                ..base
            },
        ];
        for coord in coords() {
            let alpha = shade_pixel(coord, &base, &Ramp)[3];
            for variant in &variants {
                assert_eq!(shade_pixel(coord, variant, &Ramp)[3], alpha, "coord {:?}", coord);
            }
        }
    }

    #[test]
    fn test_refraction_moves_color_not_mask() {
        let base = frame();
        let strong = FrameInputs {
            params: RefractionParams {
                rim_intensity: 0.5,
                ..RefractionParams::default()
            },
            ..base
        };
        let coord = Vec2::new(0.99, 0.5);
        let a = shade_pixel(coord, &base, &Ramp);
        let b = shade_pixel(coord, &strong, &Ramp);
        assert!(b[0] > a[0]);
        assert_eq!(a[3], b[3]);
    }

    #[test]
    fn test_outside_pixels_are_transparent() {
        let alpha = shade_pixel(Vec2::ZERO, &frame(), &Ramp)[3];
        assert_eq!(alpha, 0.0);
        let alpha = shade_pixel(Vec2::HALF, &frame(), &Ramp)[3];
        assert_eq!(alpha, 1.0);
    }
}
