//! Per-panel GPU binding: program, uniforms, quad buffers and texture

use std::collections::HashMap;

use crate::error::SurfaceError;
use crate::kernel::{
    RefractionParams, IMAGE_UNIFORM, QUAD_POSITIONS, QUAD_TEXCOORDS, QUAD_VERTEX_COUNT,
    SHADER_LIQUID_GLASS, UNIFORM_FIELDS,
};
use crate::math::Vec2;
use crate::snapshot::ImageData;
use crate::surface::{
    BufferHandle, ProgramHandle, RenderSurface, TextureHandle, UniformLocation, UniformValue,
    POSITION_SLOT, TEXCOORD_SLOT,
};

use super::Geometry;

/// Uniform values written once when the binding is created
#[derive(Clone, Copy, Debug)]
pub struct SetupUniforms {
    pub geometry: Geometry,
    pub blur_radius: f32,
    pub tint_opacity: f32,
    pub refraction: RefractionParams,
    /// Panel center in viewport coordinates
    pub position: Vec2,
    pub scroll_y: f32,
    pub page_height: f32,
    pub viewport_height: f32,
}

/// Uniform locations of one compiled program, by name
#[derive(Clone, Debug, Default)]
pub struct UniformTable {
    locations: HashMap<&'static str, UniformLocation>,
}

impl UniformTable {
    /// Resolve every glass uniform in `program`
    pub fn resolve<S: RenderSurface + ?Sized>(surface: &S, program: ProgramHandle) -> Self {
        let locations = UNIFORM_FIELDS
            .iter()
            .map(|f| f.name)
            .chain(std::iter::once(IMAGE_UNIFORM))
            .filter_map(|name| surface.uniform_location(program, name).map(|loc| (name, loc)))
            .collect();
        Self { locations }
    }

    pub fn get(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Everything a panel needs to redraw itself on its surface
///
/// Only valid while the surface it was created on is alive.
#[derive(Clone, Debug)]
pub struct ShaderBinding {
    program: ProgramHandle,
    uniforms: UniformTable,
    positions: BufferHandle,
    texcoords: BufferHandle,
    texture: TextureHandle,
}

impl ShaderBinding {
    /// Compile the glass program, upload the quad and the snapshot, and
    /// write the initial uniforms
    pub fn create<S: RenderSurface + ?Sized>(
        surface: &mut S,
        image: &ImageData,
        setup: &SetupUniforms,
    ) -> Result<Self, SurfaceError> {
        let program = surface.compile_program(SHADER_LIQUID_GLASS)?;
        let positions = surface.create_vertex_buffer(&QUAD_POSITIONS)?;
        let texcoords = surface.create_vertex_buffer(&QUAD_TEXCOORDS)?;
        let uniforms = UniformTable::resolve(surface, program);
        let texture = surface.create_texture(image)?;

        let binding = Self {
            program,
            uniforms,
            positions,
            texcoords,
            texture,
        };

        let geometry = setup.geometry;
        surface.set_viewport(geometry.width, geometry.height);
        surface.bind_vertex_buffer(POSITION_SLOT, positions);
        surface.bind_vertex_buffer(TEXCOORD_SLOT, texcoords);

        let params = &setup.refraction;
        let warp = if params.warp { 1.0 } else { 0.0 };
        let values = [
            ("resolution", UniformValue::Vec2([geometry.width as f32, geometry.height as f32])),
            ("texture_size", UniformValue::Vec2([image.width() as f32, image.height() as f32])),
            ("blur_radius", UniformValue::Float(setup.blur_radius)),
            ("border_radius", UniformValue::Float(geometry.border_radius)),
            ("warp", UniformValue::Float(warp)),
            ("edge_intensity", UniformValue::Float(params.edge_intensity)),
            ("rim_intensity", UniformValue::Float(params.rim_intensity)),
            ("base_intensity", UniformValue::Float(params.base_intensity)),
            ("edge_distance", UniformValue::Float(params.edge_distance)),
            ("rim_distance", UniformValue::Float(params.rim_distance)),
            ("base_distance", UniformValue::Float(params.base_distance)),
            ("corner_boost", UniformValue::Float(params.corner_boost)),
            ("ripple_effect", UniformValue::Float(params.ripple_effect)),
            ("tint_opacity", UniformValue::Float(setup.tint_opacity)),
            ("container_position", UniformValue::Vec2([setup.position.x, setup.position.y])),
            ("scroll_y", UniformValue::Float(setup.scroll_y)),
            ("page_height", UniformValue::Float(setup.page_height)),
            ("viewport_height", UniformValue::Float(setup.viewport_height)),
            (IMAGE_UNIFORM, UniformValue::Int(0)),
        ];
        for (name, value) in values {
            binding.set(surface, name, value);
        }

        Ok(binding)
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    /// Write a uniform by name; names the program lacks are skipped
    pub fn set<S: RenderSurface + ?Sized>(&self, surface: &mut S, name: &str, value: UniformValue) {
        if let Some(location) = self.uniforms.get(name) {
            surface.set_uniform(location, value);
        }
    }

    /// Re-upload the snapshot into the existing texture
    pub fn update_texture<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        image: &ImageData,
    ) -> Result<(), SurfaceError> {
        surface.update_texture(self.texture, image)?;
        self.set(
            surface,
            "texture_size",
            UniformValue::Vec2([image.width() as f32, image.height() as f32]),
        );
        Ok(())
    }

    /// Apply a new surface size and corner radius
    pub fn resize<S: RenderSurface + ?Sized>(&self, surface: &mut S, geometry: &Geometry) {
        surface.set_viewport(geometry.width, geometry.height);
        self.set(
            surface,
            "resolution",
            UniformValue::Vec2([geometry.width as f32, geometry.height as f32]),
        );
        self.set(surface, "border_radius", UniformValue::Float(geometry.border_radius));
    }

    /// Full repaint: clear, push scroll offset and panel position, draw the quad
    pub fn draw<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        scroll_y: f32,
        position: Vec2,
    ) -> Result<(), SurfaceError> {
        surface.clear();
        self.set(surface, "scroll_y", UniformValue::Float(scroll_y));
        self.set(
            surface,
            "container_position",
            UniformValue::Vec2([position.x, position.y]),
        );
        surface.draw(QUAD_VERTEX_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SoftwareSurface;

    fn setup() -> SetupUniforms {
        SetupUniforms {
            geometry: Geometry {
                width: 40,
                height: 20,
                border_radius: 10.0,
            },
            blur_radius: 5.0,
            tint_opacity: 0.2,
            refraction: RefractionParams::default(),
            position: Vec2::new(100.0, 50.0),
            scroll_y: 0.0,
            page_height: 2000.0,
            viewport_height: 800.0,
        }
    }

    #[test]
    fn test_create_writes_every_uniform() {
        let mut surface = SoftwareSurface::new(40, 20);
        let image = ImageData::filled(64, 32, [0, 0, 255, 255]);
        let binding = ShaderBinding::create(&mut surface, &image, &setup()).unwrap();
        assert_eq!(binding.uniforms().len(), UNIFORM_FIELDS.len() + 1);

        let u = surface.uniforms();
        assert_eq!(u.resolution, [40.0, 20.0]);
        assert_eq!(u.texture_size, [64.0, 32.0]);
        assert_eq!(u.border_radius, 10.0);
        assert_eq!(u.rim_intensity, 0.05);
        assert_eq!(u.page_height, 2000.0);
        assert_eq!(u.viewport_height, 800.0);
        assert_eq!(u.warp, 0.0);
    }

    #[test]
    fn test_draw_pushes_scroll_and_position() {
        let mut surface = SoftwareSurface::new(40, 20);
        let image = ImageData::filled(64, 32, [0, 0, 255, 255]);
        let binding = ShaderBinding::create(&mut surface, &image, &setup()).unwrap();
        binding.draw(&mut surface, 120.0, Vec2::new(7.0, 9.0)).unwrap();
        assert_eq!(surface.uniforms().scroll_y, 120.0);
        assert_eq!(surface.uniforms().container_position, [7.0, 9.0]);
        assert_eq!(surface.draw_count(), 1);
    }

    #[test]
    fn test_update_texture_tracks_size() {
        let mut surface = SoftwareSurface::new(40, 20);
        let image = ImageData::filled(64, 32, [0, 0, 255, 255]);
        let binding = ShaderBinding::create(&mut surface, &image, &setup()).unwrap();
        binding
            .update_texture(&mut surface, &ImageData::filled(128, 16, [0; 4]))
            .unwrap();
        assert_eq!(surface.uniforms().texture_size, [128.0, 16.0]);
    }

    #[test]
    fn test_compile_failure_propagates() {
        let mut surface = SoftwareSurface::new(40, 20);
        surface.lose();
        let image = ImageData::filled(4, 4, [0; 4]);
        let err = ShaderBinding::create(&mut surface, &image, &setup()).unwrap_err();
        assert_eq!(err, SurfaceError::Lost);
    }
}
