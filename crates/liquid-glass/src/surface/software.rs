//! Headless CPU render surface
//!
//! Executes [`shade_pixel`] for every pixel of the viewport. Slow, but
//! pixel-exact with the kernel, which makes it the reference renderer for
//! tests and for hosts without a GPU.

use crate::error::SurfaceError;
use crate::kernel::{
    locate, shade_pixel, validate_program, GlassUniforms, Rgba, QUAD_VERTEX_COUNT,
};
use crate::math::Vec2;
use crate::snapshot::ImageData;

use super::{
    BufferHandle, ProgramHandle, RenderSurface, TextureHandle, UniformLocation, UniformValue,
    POSITION_SLOT, TEXCOORD_SLOT,
};

/// CPU surface rendering with the reference kernel
pub struct SoftwareSurface {
    width: u32,
    height: u32,
    viewport: (u32, u32),
    opacity: f32,
    alive: bool,
    program: Option<ProgramHandle>,
    programs: u32,
    uniforms: GlassUniforms,
    buffers: Vec<Vec<f32>>,
    bound_buffers: [Option<BufferHandle>; 2],
    textures: Vec<ImageData>,
    bound_texture: Option<TextureHandle>,
    framebuffer: Vec<Rgba>,
    draws: u32,
}

impl SoftwareSurface {
    /// Create a new cleared surface with opacity 0
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            viewport: (width, height),
            opacity: 0.0,
            alive: true,
            program: None,
            programs: 0,
            uniforms: GlassUniforms::default(),
            buffers: Vec::new(),
            bound_buffers: [None, None],
            textures: Vec::new(),
            bound_texture: None,
            framebuffer: vec![[0.0; 4]; width as usize * height as usize],
            draws: 0,
        }
    }

    /// Current uniform block
    pub fn uniforms(&self) -> &GlassUniforms {
        &self.uniforms
    }

    /// Rendered color at `(x, y)`, row 0 at the top
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.framebuffer
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Number of completed draws
    pub fn draw_count(&self) -> u32 {
        self.draws
    }

    /// Simulate losing the GPU context
    pub fn lose(&mut self) {
        self.alive = false;
    }

    fn texture_mut(&mut self, texture: TextureHandle) -> Option<&mut ImageData> {
        self.textures.get_mut(texture.0 as usize)
    }
}

impl RenderSurface for SoftwareSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.framebuffer = vec![[0.0; 4]; width as usize * height as usize];
    }

    fn compile_program(&mut self, source: &str) -> Result<ProgramHandle, SurfaceError> {
        if !self.alive {
            return Err(SurfaceError::Lost);
        }
        validate_program(source)?;
        self.programs += 1;
        let program = ProgramHandle(self.programs);
        self.program = Some(program);
        Ok(program)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        if self.program != Some(program) {
            return None;
        }
        locate(name)
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferHandle, SurfaceError> {
        if !self.alive {
            return Err(SurfaceError::Lost);
        }
        if data.len() % 2 != 0 {
            return Err(SurfaceError::Buffer(format!(
                "{} floats is not a whole number of vec2 attributes",
                data.len()
            )));
        }
        self.buffers.push(data.to_vec());
        Ok(BufferHandle(self.buffers.len() as u32 - 1))
    }

    fn bind_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle) {
        if let Some(bound) = self.bound_buffers.get_mut(slot as usize) {
            *bound = Some(buffer);
        }
    }

    fn create_texture(&mut self, image: &ImageData) -> Result<TextureHandle, SurfaceError> {
        if !self.alive {
            return Err(SurfaceError::Lost);
        }
        self.textures.push(image.clone());
        let texture = TextureHandle(self.textures.len() as u32 - 1);
        self.bound_texture = Some(texture);
        Ok(texture)
    }

    fn update_texture(&mut self, texture: TextureHandle, image: &ImageData) -> Result<(), SurfaceError> {
        if !self.alive {
            return Err(SurfaceError::Lost);
        }
        let slot = self
            .texture_mut(texture)
            .ok_or_else(|| SurfaceError::Texture(format!("no texture {}", texture.0)))?;
        *slot = image.clone();
        Ok(())
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        if !self.uniforms.write(location, value) {
            log::debug!("uniform {} rejected {:?}", location.name(), value);
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn clear(&mut self) {
        self.framebuffer.fill([0.0; 4]);
    }

    fn draw(&mut self, vertex_count: u32) -> Result<(), SurfaceError> {
        if !self.alive {
            return Err(SurfaceError::Lost);
        }
        if self.program.is_none() {
            return Err(SurfaceError::Draw("no program".into()));
        }
        for slot in [POSITION_SLOT, TEXCOORD_SLOT] {
            let bound = self.bound_buffers[slot as usize]
                .and_then(|b| self.buffers.get(b.0 as usize))
                .map(|data| data.len() as u32 / 2);
            match bound {
                Some(vertices) if vertices >= vertex_count => {}
                _ => return Err(SurfaceError::Draw(format!("attribute {} not bound", slot))),
            }
        }
        let image = self
            .bound_texture
            .and_then(|t| self.textures.get(t.0 as usize))
            .ok_or_else(|| SurfaceError::Draw("no texture".into()))?;

        // The glass quad always covers the whole viewport
        if vertex_count == QUAD_VERTEX_COUNT {
            let frame = self.uniforms.frame_inputs();
            let (vw, vh) = (self.viewport.0.min(self.width), self.viewport.1.min(self.height));
            for y in 0..vh {
                for x in 0..vw {
                    let coord = Vec2::new(
                        (x as f32 + 0.5) / vw as f32,
                        (y as f32 + 0.5) / vh as f32,
                    );
                    let i = y as usize * self.width as usize + x as usize;
                    self.framebuffer[i] = shade_pixel(coord, &frame, image);
                }
            }
        }
        self.draws += 1;
        Ok(())
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{RefractionParams, QUAD_POSITIONS, QUAD_TEXCOORDS, SHADER_LIQUID_GLASS};

    fn bound_surface(width: u32, height: u32, image: &ImageData) -> SoftwareSurface {
        let mut s = SoftwareSurface::new(width, height);
        let program = s.compile_program(SHADER_LIQUID_GLASS).unwrap();
        let pos = s.create_vertex_buffer(&QUAD_POSITIONS).unwrap();
        let tex = s.create_vertex_buffer(&QUAD_TEXCOORDS).unwrap();
        s.bind_vertex_buffer(POSITION_SLOT, pos);
        s.bind_vertex_buffer(TEXCOORD_SLOT, tex);
        s.create_texture(image).unwrap();

        let set = |s: &mut SoftwareSurface, name: &str, value: UniformValue| {
            let loc = s.uniform_location(program, name).unwrap();
            s.set_uniform(loc, value);
        };
        let params = RefractionParams::default();
        set(&mut s, "resolution", UniformValue::Vec2([width as f32, height as f32]));
        set(&mut s, "texture_size", UniformValue::Vec2([image.width() as f32, image.height() as f32]));
        set(&mut s, "container_position", UniformValue::Vec2([width as f32 / 2.0, height as f32 / 2.0]));
        set(&mut s, "border_radius", UniformValue::Float(8.0));
        set(&mut s, "blur_radius", UniformValue::Float(5.0));
        set(&mut s, "tint_opacity", UniformValue::Float(0.0));
        set(&mut s, "edge_intensity", UniformValue::Float(params.edge_intensity));
        set(&mut s, "rim_intensity", UniformValue::Float(params.rim_intensity));
        set(&mut s, "edge_distance", UniformValue::Float(params.edge_distance));
        set(&mut s, "rim_distance", UniformValue::Float(params.rim_distance));
        s
    }

    #[test]
    fn test_draw_requires_binding() {
        let mut s = SoftwareSurface::new(4, 4);
        assert!(matches!(s.draw(6), Err(SurfaceError::Draw(_))));
        s.compile_program(SHADER_LIQUID_GLASS).unwrap();
        assert!(matches!(s.draw(6), Err(SurfaceError::Draw(_))));
    }

    #[test]
    fn test_renders_snapshot_inside_mask() {
        let image = ImageData::filled(32, 32, [255, 0, 0, 255]);
        let mut s = bound_surface(32, 16, &image);
        s.clear();
        s.draw(6).unwrap();
        assert_eq!(s.draw_count(), 1);

        let center = s.pixel(16, 8).unwrap();
        assert!((center[0] - 1.0).abs() < 0.001);
        assert!(center[1].abs() < 0.001);
        assert!((center[3] - 1.0).abs() < 0.001);

        // Outside the rounded corner
        let corner = s.pixel(0, 0).unwrap();
        assert!(corner[3] < 0.01);
    }

    #[test]
    fn test_lost_surface_refuses_work() {
        let image = ImageData::filled(4, 4, [0, 0, 0, 255]);
        let mut s = bound_surface(4, 4, &image);
        s.lose();
        assert!(!s.is_alive());
        assert_eq!(s.draw(6), Err(SurfaceError::Lost));
        assert_eq!(s.update_texture(TextureHandle(0), &image), Err(SurfaceError::Lost));
    }

    #[test]
    fn test_bad_program_does_not_replace_current() {
        let mut s = SoftwareSurface::new(4, 4);
        let good = s.compile_program(SHADER_LIQUID_GLASS).unwrap();
        assert!(s.compile_program("not wgsl").is_err());
        assert!(s.uniform_location(good, "scroll_y").is_some());
    }
}
