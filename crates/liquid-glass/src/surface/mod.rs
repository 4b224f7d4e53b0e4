//! Render surface abstraction
//!
//! A panel draws into exactly one surface. The trait mirrors the handful of
//! GPU calls the glass program needs: compile, upload two vertex buffers
//! and one texture, set uniforms, draw six vertices. The browser implements
//! it on wgpu; [`SoftwareSurface`] runs the shading kernel on the CPU.

mod software;

use crate::error::SurfaceError;
use crate::snapshot::ImageData;

pub use crate::kernel::{UniformLocation, UniformValue};
pub use software::SoftwareSurface;

/// Vertex attribute slot of the quad positions
pub const POSITION_SLOT: u32 = 0;

/// Vertex attribute slot of the quad texture coordinates
pub const TEXCOORD_SLOT: u32 = 1;

/// Compiled program on a surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Static vertex buffer on a surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Texture on a surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// A drawable surface with its own GPU context
pub trait RenderSurface {
    /// Drawing buffer size in pixels
    fn size(&self) -> (u32, u32);

    /// Resize the drawing buffer
    fn resize(&mut self, width: u32, height: u32);

    /// Compile and link `source`, making it the current program
    fn compile_program(&mut self, source: &str) -> Result<ProgramHandle, SurfaceError>;

    /// Location of a uniform in `program`, `None` if the program has no such uniform
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Upload static vertex data (pairs of `f32`)
    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferHandle, SurfaceError>;

    /// Feed `buffer` to the vertex attribute at `slot`
    fn bind_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle);

    /// Create a linear, clamp-to-edge RGBA texture and bind it for sampling
    fn create_texture(&mut self, image: &ImageData) -> Result<TextureHandle, SurfaceError>;

    /// Replace the contents of `texture`
    fn update_texture(&mut self, texture: TextureHandle, image: &ImageData) -> Result<(), SurfaceError>;

    /// Write a uniform of the current program
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear to transparent black
    fn clear(&mut self);

    /// Draw `vertex_count` vertices as a triangle list
    fn draw(&mut self, vertex_count: u32) -> Result<(), SurfaceError>;

    /// CSS opacity of the surface element
    fn set_opacity(&mut self, opacity: f32);

    fn opacity(&self) -> f32;

    /// False once the surface or its context has been lost
    fn is_alive(&self) -> bool;
}
