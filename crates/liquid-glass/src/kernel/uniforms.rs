//! Uniform block of the glass program
//!
//! The render surface addresses uniforms by [`UniformLocation`], resolved
//! from the WGSL field name through [`locate`]. Every surface keeps one
//! [`GlassUniforms`] per program and writes individual fields into it.

use crate::math::{Size, Vec2};

use super::params::RefractionParams;
use super::FrameInputs;

/// Uniform data sent to the glass program
/// NOTE: This struct must match the WGSL `GlassUniforms` layout!
/// Total struct size must be 96 bytes (padded to 16-byte boundary).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlassUniforms {
    pub resolution: [f32; 2],         // offset 0
    pub texture_size: [f32; 2],       // offset 8
    pub container_position: [f32; 2], // offset 16
    pub scroll_y: f32,                // offset 24
    pub page_height: f32,             // offset 28
    pub viewport_height: f32,         // offset 32
    pub blur_radius: f32,             // offset 36
    pub border_radius: f32,           // offset 40
    pub warp: f32,                    // offset 44
    pub edge_intensity: f32,          // offset 48
    pub rim_intensity: f32,           // offset 52
    pub base_intensity: f32,          // offset 56
    pub edge_distance: f32,           // offset 60
    pub rim_distance: f32,            // offset 64
    pub base_distance: f32,           // offset 68
    pub corner_boost: f32,            // offset 72
    pub ripple_effect: f32,           // offset 76
    pub tint_opacity: f32,            // offset 80
    pub _pad: [f32; 3],               // offset 84 - padding to 96 bytes
}

/// Number of `f32` words in [`GlassUniforms`]
const WORDS: usize = 24;

/// A named field of the uniform block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformField {
    pub name: &'static str,
    /// Offset in `f32` words
    pub offset: usize,
    pub components: usize,
}

const fn field(name: &'static str, offset: usize, components: usize) -> UniformField {
    UniformField {
        name,
        offset,
        components,
    }
}

/// Every uniform the glass program reads, in block order
pub const UNIFORM_FIELDS: &[UniformField] = &[
    field("resolution", 0, 2),
    field("texture_size", 2, 2),
    field("container_position", 4, 2),
    field("scroll_y", 6, 1),
    field("page_height", 7, 1),
    field("viewport_height", 8, 1),
    field("blur_radius", 9, 1),
    field("border_radius", 10, 1),
    field("warp", 11, 1),
    field("edge_intensity", 12, 1),
    field("rim_intensity", 13, 1),
    field("base_intensity", 14, 1),
    field("edge_distance", 15, 1),
    field("rim_distance", 16, 1),
    field("base_distance", 17, 1),
    field("corner_boost", 18, 1),
    field("ripple_effect", 19, 1),
    field("tint_opacity", 20, 1),
];

/// Name of the snapshot texture binding
pub const IMAGE_UNIFORM: &str = "image";

/// Handle to one uniform of a compiled program
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(u32);

impl UniformLocation {
    /// Position in [`UNIFORM_FIELDS`], or one past the end for the image
    pub fn index(self) -> u32 {
        self.0
    }

    /// Field this location writes, `None` for the image binding
    pub fn field(self) -> Option<&'static UniformField> {
        UNIFORM_FIELDS.get(self.0 as usize)
    }

    /// Name the location was resolved from
    pub fn name(self) -> &'static str {
        self.field().map(|f| f.name).unwrap_or(IMAGE_UNIFORM)
    }
}

/// Resolve a uniform name to its location
pub fn locate(name: &str) -> Option<UniformLocation> {
    if name == IMAGE_UNIFORM {
        return Some(UniformLocation(UNIFORM_FIELDS.len() as u32));
    }
    UNIFORM_FIELDS
        .iter()
        .position(|f| f.name == name)
        .map(|i| UniformLocation(i as u32))
}

/// A value written to a uniform
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    /// Texture unit of a sampler binding
    Int(i32),
}

impl UniformValue {
    fn components(&self) -> usize {
        match self {
            UniformValue::Float(_) | UniformValue::Int(_) => 1,
            UniformValue::Vec2(_) => 2,
        }
    }
}

impl GlassUniforms {
    /// Write a value into the field at `location`
    ///
    /// Returns false when the value's shape does not match the field; the
    /// block is left unchanged. The image binding accepts only `Int`.
    pub fn write(&mut self, location: UniformLocation, value: UniformValue) -> bool {
        let Some(field) = location.field() else {
            return matches!(value, UniformValue::Int(_));
        };
        if field.components != value.components() {
            return false;
        }
        let words: &mut [f32; WORDS] = bytemuck::cast_mut(self);
        match value {
            UniformValue::Float(v) => words[field.offset] = v,
            UniformValue::Vec2([x, y]) => {
                words[field.offset] = x;
                words[field.offset + 1] = y;
            }
            UniformValue::Int(_) => return false,
        }
        true
    }

    /// Read back the field at `location`
    pub fn read(&self, location: UniformLocation) -> Option<UniformValue> {
        let field = location.field()?;
        let words: &[f32; WORDS] = bytemuck::cast_ref(self);
        Some(match field.components {
            2 => UniformValue::Vec2([words[field.offset], words[field.offset + 1]]),
            _ => UniformValue::Float(words[field.offset]),
        })
    }

    /// Kernel inputs described by this block
    pub fn frame_inputs(&self) -> FrameInputs {
        FrameInputs {
            size: Size::new(self.resolution[0], self.resolution[1]),
            border_radius: self.border_radius,
            texture_size: Size::new(self.texture_size[0], self.texture_size[1]),
            position: Vec2::new(self.container_position[0], self.container_position[1]),
            scroll_y: self.scroll_y,
            blur_radius: self.blur_radius,
            tint_opacity: self.tint_opacity,
            params: RefractionParams {
                warp: self.warp > 0.5,
                edge_intensity: self.edge_intensity,
                rim_intensity: self.rim_intensity,
                base_intensity: self.base_intensity,
                edge_distance: self.edge_distance,
                rim_distance: self.rim_distance,
                base_distance: self.base_distance,
                corner_boost: self.corner_boost,
                ripple_effect: self.ripple_effect,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_size() {
        assert_eq!(std::mem::size_of::<GlassUniforms>(), 96);
        assert_eq!(std::mem::size_of::<GlassUniforms>() % 16, 0);
    }

    #[test]
    fn test_field_offsets_match_struct() {
        let mut u = GlassUniforms::default();
        u.scroll_y = 1.0;
        u.tint_opacity = 2.0;
        u.container_position = [3.0, 4.0];
        let words: &[f32; WORDS] = bytemuck::cast_ref(&u);
        let scroll = locate("scroll_y").and_then(|l| l.field()).unwrap();
        let tint = locate("tint_opacity").and_then(|l| l.field()).unwrap();
        let pos = locate("container_position").and_then(|l| l.field()).unwrap();
        assert_eq!(words[scroll.offset], 1.0);
        assert_eq!(words[tint.offset], 2.0);
        assert_eq!(words[pos.offset], 3.0);
        assert_eq!(words[pos.offset + 1], 4.0);
    }

    #[test]
    fn test_locate_unknown() {
        assert!(locate("u_time").is_none());
        let image = locate(IMAGE_UNIFORM).unwrap();
        assert!(image.field().is_none());
        assert_eq!(image.name(), "image");
    }

    #[test]
    fn test_write_checks_shape() {
        let mut u = GlassUniforms::default();
        let res = locate("resolution").unwrap();
        assert!(!u.write(res, UniformValue::Float(3.0)));
        assert!(u.write(res, UniformValue::Vec2([300.0, 200.0])));
        assert_eq!(u.resolution, [300.0, 200.0]);
        assert_eq!(u.read(res), Some(UniformValue::Vec2([300.0, 200.0])));

        let image = locate(IMAGE_UNIFORM).unwrap();
        assert!(u.write(image, UniformValue::Int(0)));
        assert!(!u.write(image, UniformValue::Float(0.0)));
    }

    #[test]
    fn test_frame_inputs_warp_threshold() {
        let mut u = GlassUniforms::default();
        u.warp = 1.0;
        assert!(u.frame_inputs().params.warp);
        u.warp = 0.4;
        assert!(!u.frame_inputs().params.warp);
    }
}
