//! Windowed Gaussian blur over the snapshot texture

use crate::math::{Size, Vec2};

use super::Rgba;

/// Taps further than this many steps from the center are skipped
pub const BLUR_WINDOW: i32 = 4;

/// Bilinear texture lookup in normalized coordinates
pub trait TextureSampler {
    /// Sample at `uv`, clamping to the edge outside `[0, 1]²`
    fn sample(&self, uv: Vec2) -> Rgba;
}

/// One tap of the blur kernel, offset in blur steps
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tap {
    pub offset: Vec2,
    pub weight: f32,
}

/// Taps of the 9x9 window with `exp(-d² / 2σ²)` weights, `σ = blur_radius / 2`
///
/// A zero blur radius keeps only the center tap.
pub fn gaussian_taps(blur_radius: f32) -> Vec<Tap> {
    let sigma = blur_radius * 0.5;
    let mut taps = Vec::new();
    for i in -BLUR_WINDOW..=BLUR_WINDOW {
        for j in -BLUR_WINDOW..=BLUR_WINDOW {
            let offset = Vec2::new(i as f32, j as f32);
            let d = offset.length();
            if d > BLUR_WINDOW as f32 {
                continue;
            }
            let weight = if sigma > 0.0 {
                (-(d * d) / (2.0 * sigma * sigma)).exp()
            } else if d == 0.0 {
                1.0
            } else {
                0.0
            };
            taps.push(Tap { offset, weight });
        }
    }
    taps
}

/// Normalized Gaussian-weighted average around `uv`
///
/// Taps are spaced `σ` texels apart.
pub fn blur_sample<S: TextureSampler + ?Sized>(
    sampler: &S,
    uv: Vec2,
    texture_size: Size,
    blur_radius: f32,
) -> Rgba {
    if texture_size.is_empty() {
        return sampler.sample(uv);
    }
    let texel = Vec2::new(1.0 / texture_size.width, 1.0 / texture_size.height);
    let step = texel * (blur_radius * 0.5);

    let mut color = [0.0f32; 4];
    let mut total_weight = 0.0;
    for tap in gaussian_taps(blur_radius) {
        if tap.weight == 0.0 {
            continue;
        }
        let sample = sampler.sample(uv + tap.offset.mul_elem(step));
        for (c, s) in color.iter_mut().zip(sample) {
            *c += s * tap.weight;
        }
        total_weight += tap.weight;
    }
    color.map(|c| c / total_weight)
}
