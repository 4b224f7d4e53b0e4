//! wgpu render surface on a panel canvas
//!
//! Every panel owns one `<canvas>`. The adapter, device and queue are shared
//! through a [`GpuContext`] so a page with many panels opens a single device.
//!
//! On WebGPU each panel canvas gets its own `wgpu::Surface`. A WebGL2 device
//! can only present to the canvas it was opened on, so there every panel
//! draws on that shared canvas and copies the frame onto its own canvas.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wgpu::util::DeviceExt;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::error::SurfaceError;
use crate::kernel::{locate, validate_program, GlassUniforms, FRAGMENT_ENTRY, VERTEX_ENTRY};
use crate::snapshot::ImageData;
use crate::surface::{
    BufferHandle, ProgramHandle, RenderSurface, TextureHandle, UniformLocation, UniformValue,
    POSITION_SLOT, TEXCOORD_SLOT,
};

/// Adapter, device and queue shared by every panel surface
pub struct GpuContext {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    shared: Option<SharedCanvas>,
}

/// Canvas a WebGL2 device was opened on
struct SharedCanvas {
    canvas: HtmlCanvasElement,
    surface: wgpu::Surface<'static>,
    config: RefCell<Option<wgpu::SurfaceConfiguration>>,
}

impl GpuContext {
    /// Open a GPU device, WebGPU when the browser has it and WebGL2 otherwise
    ///
    /// The adapter is requested for an offscreen canvas so a WebGL2 adapter
    /// can present. Fails with [`SurfaceError::Unsupported`] when the browser
    /// exposes neither. Panels then keep their fallback styling.
    pub async fn new(document: &Document) -> Result<Self, SurfaceError> {
        let canvas = document
            .create_element("canvas")
            .map_err(|e| SurfaceError::Unsupported(super::js_error(&e)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| SurfaceError::Unsupported("canvas element expected".into()))?;
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = create_canvas_surface(&instance, &canvas)?;
        let (device, queue, adapter) = create_device(&instance, &surface).await?;

        let backend = adapter.get_info().backend;
        log::info!("GPU adapter: {:?}", backend);
        if backend == wgpu::Backend::Gl {
            log::info!("WebGL2 device, panels draw through one shared canvas");
        }
        let shared = (backend == wgpu::Backend::Gl).then(|| SharedCanvas {
            canvas,
            surface,
            config: RefCell::new(None),
        });
        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            shared,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }
}

impl SharedCanvas {
    /// Size the shared canvas for one panel's frame
    fn fit(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        alpha_mode: wgpu::CompositeAlphaMode,
        width: u32,
        height: u32,
    ) -> wgpu::SurfaceConfiguration {
        let mut config = self.config.borrow_mut();
        match config.as_ref() {
            Some(current) if current.width == width && current.height == height => current.clone(),
            _ => {
                self.canvas.set_width(width);
                self.canvas.set_height(height);
                let fitted =
                    configure_surface(&self.surface, device, format, alpha_mode, width, height);
                *config = Some(fitted.clone());
                fitted
            }
        }
    }
}

/// Create wgpu device and adapter
async fn create_device(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'static>,
) -> Result<(wgpu::Device, wgpu::Queue, wgpu::Adapter), SurfaceError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| SurfaceError::Unsupported("no suitable GPU adapter".into()))?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Liquid Glass Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        )
        .await
        .map_err(|e| SurfaceError::Unsupported(format!("failed to create device: {}", e)))?;

    Ok((device, queue, adapter))
}

#[cfg(target_arch = "wasm32")]
fn create_canvas_surface(
    instance: &wgpu::Instance,
    canvas: &HtmlCanvasElement,
) -> Result<wgpu::Surface<'static>, SurfaceError> {
    instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .map_err(|e| SurfaceError::Unsupported(e.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
fn create_canvas_surface(
    _instance: &wgpu::Instance,
    _canvas: &HtmlCanvasElement,
) -> Result<wgpu::Surface<'static>, SurfaceError> {
    Err(SurfaceError::Unsupported("canvas surfaces need a browser".into()))
}

/// Pick the output format and alpha mode of a panel surface
///
/// Snapshot texels are written unchanged, so a linear format is preferred.
/// Premultiplied alpha lets the rounded mask blend with the page.
fn surface_format(
    surface: &wgpu::Surface<'static>,
    adapter: &wgpu::Adapter,
) -> Option<(wgpu::TextureFormat, wgpu::CompositeAlphaMode)> {
    let caps = surface.get_capabilities(adapter);
    let format = caps
        .formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| caps.formats.first())
        .copied()?;
    let alpha_mode = if caps
        .alpha_modes
        .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
    {
        wgpu::CompositeAlphaMode::PreMultiplied
    } else {
        caps.alpha_modes.first().copied()?
    };
    Some((format, alpha_mode))
}

/// Configure the surface
fn configure_surface(
    surface: &wgpu::Surface<'static>,
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    alpha_mode: wgpu::CompositeAlphaMode,
    width: u32,
    height: u32,
) -> wgpu::SurfaceConfiguration {
    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width,
        height,
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(device, &config);
    config
}

fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Liquid Glass Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Create the glass render pipeline
fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Liquid Glass Pipeline Layout"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    let attributes = [
        [wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: POSITION_SLOT,
        }],
        [wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: TEXCOORD_SLOT,
        }],
    ];
    let buffers = [
        wgpu::VertexBufferLayout {
            array_stride: 8,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes[0],
        },
        wgpu::VertexBufferLayout {
            array_stride: 8,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes[1],
        },
    ];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Liquid Glass Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(VERTEX_ENTRY),
            buffers: &buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(FRAGMENT_ENTRY),
            // Blending over the cleared target yields premultiplied output
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_snapshot_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Snapshot Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn write_image(queue: &wgpu::Queue, texture: &wgpu::Texture, image: &ImageData) {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return;
    }
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        image.as_bytes(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// Next frame of a configured surface
fn next_frame(
    surface: &wgpu::Surface<'static>,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> Result<wgpu::SurfaceTexture, SurfaceError> {
    match surface.get_current_texture() {
        Ok(frame) => Ok(frame),
        Err(wgpu::SurfaceError::OutOfMemory) => Err(SurfaceError::Lost),
        Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
            surface.configure(device, config);
            Err(SurfaceError::Draw(format!("frame skipped: {}", e)))
        }
        Err(e) => Err(SurfaceError::Draw(e.to_string())),
    }
}

/// Where a panel's frames are presented
enum Target {
    /// The panel canvas has its own surface
    Direct {
        surface: wgpu::Surface<'static>,
        config: Option<wgpu::SurfaceConfiguration>,
    },
    /// Frames are drawn on the shared canvas and copied onto the panel canvas
    Shared(CanvasRenderingContext2d),
    Unavailable,
}

/// Pick the presentation target of a panel canvas and its output format
fn open_target(
    gpu: &GpuContext,
    canvas: &HtmlCanvasElement,
) -> Result<(Target, Option<(wgpu::TextureFormat, wgpu::CompositeAlphaMode)>), SurfaceError> {
    if let Some(shared) = &gpu.shared {
        let context = canvas
            .get_context("2d")
            .map_err(|e| SurfaceError::Unsupported(super::js_error(&e)))?
            .ok_or_else(|| SurfaceError::Unsupported("no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::Unsupported("2d context expected".into()))?;
        let format = surface_format(&shared.surface, &gpu.adapter);
        return Ok((Target::Shared(context), format));
    }
    let surface = create_canvas_surface(&gpu.instance, canvas)?;
    let format = surface_format(&surface, &gpu.adapter);
    Ok((Target::Direct { surface, config: None }, format))
}

struct Program {
    handle: ProgramHandle,
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
}

struct VertexBuffer {
    buffer: wgpu::Buffer,
    vertices: u32,
}

struct Texture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Render surface drawing into a panel's `<canvas>` with wgpu
pub struct WgpuSurface {
    canvas: HtmlCanvasElement,
    gpu: Option<Rc<GpuContext>>,
    target: Target,
    format: Option<(wgpu::TextureFormat, wgpu::CompositeAlphaMode)>,
    width: u32,
    height: u32,
    viewport: (u32, u32),
    opacity: f32,
    alive: bool,
    programs: u32,
    program: Option<Program>,
    uniforms: GlassUniforms,
    uniform_buffer: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,
    buffers: Vec<VertexBuffer>,
    bound_buffers: [Option<BufferHandle>; 2],
    textures: Vec<Texture>,
    bound_texture: Option<TextureHandle>,
    bind_group: Option<wgpu::BindGroup>,
}

impl WgpuSurface {
    /// Wrap `canvas`; without a GPU context the surface refuses to compile
    pub fn new(canvas: HtmlCanvasElement, gpu: Option<Rc<GpuContext>>) -> Self {
        let (target, format) = match &gpu {
            Some(gpu) => match open_target(gpu, &canvas) {
                Ok(opened) => opened,
                Err(e) => {
                    log::warn!("panel canvas has no GPU surface: {}", e);
                    (Target::Unavailable, None)
                }
            },
            None => (Target::Unavailable, None),
        };
        // Sized by the first geometry pass
        canvas.set_width(0);
        canvas.set_height(0);
        let (width, height) = (0, 0);
        Self {
            canvas,
            gpu,
            target,
            format,
            width,
            height,
            viewport: (width, height),
            opacity: 0.0,
            alive: true,
            programs: 0,
            program: None,
            uniforms: GlassUniforms::default(),
            uniform_buffer: None,
            sampler: None,
            buffers: Vec::new(),
            bound_buffers: [None; 2],
            textures: Vec::new(),
            bound_texture: None,
            bind_group: None,
        }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn gpu(&self) -> Result<Rc<GpuContext>, SurfaceError> {
        if !self.alive {
            return Err(SurfaceError::Lost);
        }
        self.gpu
            .clone()
            .ok_or_else(|| SurfaceError::Unsupported("no GPU device".into()))
    }

    /// Reconfigure a direct surface; the shared canvas is sized per frame
    fn configure(&mut self) {
        let (Some(gpu), Some((format, alpha_mode))) = (&self.gpu, self.format) else {
            return;
        };
        let Target::Direct { surface, config } = &mut self.target else {
            return;
        };
        if self.width == 0 || self.height == 0 {
            *config = None;
            return;
        }
        *config = Some(configure_surface(
            surface,
            &gpu.device,
            format,
            alpha_mode,
            self.width,
            self.height,
        ));
    }

    /// Rebuild the bind group after the program or bound texture changed
    fn rebuild_bind_group(&mut self) {
        self.bind_group = None;
        let (Some(gpu), Some(program), Some(uniforms), Some(sampler)) = (
            &self.gpu,
            &self.program,
            &self.uniform_buffer,
            &self.sampler,
        ) else {
            return;
        };
        let Some(texture) = self
            .bound_texture
            .and_then(|t| self.textures.get(t.0 as usize))
        else {
            return;
        };
        self.bind_group = Some(gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Liquid Glass Bind Group"),
            layout: &program.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
    }

    fn bound_vertices(&self, slot: u32) -> Option<(&wgpu::Buffer, u32)> {
        self.bound_buffers
            .get(slot as usize)
            .copied()
            .flatten()
            .and_then(|b| self.buffers.get(b.0 as usize))
            .map(|b| (&b.buffer, b.vertices))
    }

    /// Next frame of the canvas, `None` while the canvas has no area
    fn acquire_frame(&self, gpu: &GpuContext) -> Result<Option<wgpu::SurfaceTexture>, SurfaceError> {
        if self.width == 0 || self.height == 0 {
            return Ok(None);
        }
        match &self.target {
            Target::Direct { config: None, .. } => Ok(None),
            Target::Direct {
                surface,
                config: Some(config),
            } => next_frame(surface, &gpu.device, config).map(Some),
            Target::Shared(_) => {
                let (Some(shared), Some((format, alpha_mode))) = (&gpu.shared, self.format) else {
                    return Err(SurfaceError::Draw("no shared canvas".into()));
                };
                let config = shared.fit(&gpu.device, format, alpha_mode, self.width, self.height);
                next_frame(&shared.surface, &gpu.device, &config).map(Some)
            }
            Target::Unavailable => Err(SurfaceError::Draw("no GPU surface".into())),
        }
    }

    /// Copy the frame just presented on the shared canvas onto the panel canvas
    fn copy_shared_frame(&self, gpu: &GpuContext) -> Result<(), SurfaceError> {
        let (Target::Shared(context), Some(shared)) = (&self.target, &gpu.shared) else {
            return Ok(());
        };
        context.clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
        context
            .draw_image_with_html_canvas_element(&shared.canvas, 0.0, 0.0)
            .map_err(|e| SurfaceError::Draw(super::js_error(&e)))
    }
}

impl RenderSurface for WgpuSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.configure();
    }

    fn compile_program(&mut self, source: &str) -> Result<ProgramHandle, SurfaceError> {
        let gpu = self.gpu()?;
        let (format, _) = self
            .format
            .ok_or_else(|| SurfaceError::Unsupported("canvas has no GPU surface".into()))?;
        // naga reports errors synchronously; wgpu would only log them
        validate_program(source)?;

        let shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Liquid Glass Shader"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        let layout = create_bind_group_layout(&gpu.device);
        let pipeline = create_pipeline(&gpu.device, &layout, &shader, format);

        if self.uniform_buffer.is_none() {
            self.uniform_buffer = Some(gpu.device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some("Liquid Glass Uniform Buffer"),
                    contents: bytemuck::bytes_of(&self.uniforms),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                },
            ));
        }
        if self.sampler.is_none() {
            self.sampler = Some(gpu.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("Snapshot Sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Nearest,
                ..Default::default()
            }));
        }

        self.programs += 1;
        let handle = ProgramHandle(self.programs);
        self.program = Some(Program {
            handle,
            pipeline,
            layout,
        });
        self.rebuild_bind_group();
        Ok(handle)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        if self.program.as_ref().map(|p| p.handle) != Some(program) {
            return None;
        }
        locate(name)
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferHandle, SurfaceError> {
        let gpu = self.gpu()?;
        if data.len() % 2 != 0 {
            return Err(SurfaceError::Buffer(format!(
                "{} floats is not a whole number of vec2 attributes",
                data.len()
            )));
        }
        let buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Quad Vertex Buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.buffers.push(VertexBuffer {
            buffer,
            vertices: data.len() as u32 / 2,
        });
        Ok(BufferHandle(self.buffers.len() as u32 - 1))
    }

    fn bind_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle) {
        if let Some(bound) = self.bound_buffers.get_mut(slot as usize) {
            *bound = Some(buffer);
        }
    }

    fn create_texture(&mut self, image: &ImageData) -> Result<TextureHandle, SurfaceError> {
        let gpu = self.gpu()?;
        let texture = create_snapshot_texture(&gpu.device, image.width(), image.height());
        write_image(&gpu.queue, &texture, image);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.textures.push(Texture { texture, view });

        let handle = TextureHandle(self.textures.len() as u32 - 1);
        self.bound_texture = Some(handle);
        self.rebuild_bind_group();
        Ok(handle)
    }

    fn update_texture(&mut self, texture: TextureHandle, image: &ImageData) -> Result<(), SurfaceError> {
        let gpu = self.gpu()?;
        let slot = self
            .textures
            .get_mut(texture.0 as usize)
            .ok_or_else(|| SurfaceError::Texture(format!("no texture {}", texture.0)))?;

        let size = slot.texture.size();
        if size.width == image.width().max(1) && size.height == image.height().max(1) {
            write_image(&gpu.queue, &slot.texture, image);
            return Ok(());
        }

        // A snapshot of a different size replaces the texture storage
        let replacement = create_snapshot_texture(&gpu.device, image.width(), image.height());
        write_image(&gpu.queue, &replacement, image);
        slot.view = replacement.create_view(&wgpu::TextureViewDescriptor::default());
        slot.texture = replacement;
        if self.bound_texture == Some(texture) {
            self.rebuild_bind_group();
        }
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
        // Every render pass starts by clearing to transparent black
    }

    fn draw(&mut self, vertex_count: u32) -> Result<(), SurfaceError> {
        let gpu = self.gpu()?;
        // Detached panels keep their shader and draw again once reattached
        if !self.canvas.is_connected() {
            return Ok(());
        }
        let frame = match self.acquire_frame(&gpu) {
            Ok(Some(frame)) => frame,
            // Zero-sized canvas: nothing to present
            Ok(None) => return Ok(()),
            Err(SurfaceError::Lost) => {
                self.alive = false;
                return Err(SurfaceError::Lost);
            }
            Err(e) => return Err(e),
        };

        let program = self
            .program
            .as_ref()
            .ok_or_else(|| SurfaceError::Draw("no program".into()))?;
        let bind_group = self
            .bind_group
            .as_ref()
            .ok_or_else(|| SurfaceError::Draw("no texture".into()))?;
        let uniforms = self
            .uniform_buffer
            .as_ref()
            .ok_or_else(|| SurfaceError::Draw("no uniform buffer".into()))?;
        let mut attributes = Vec::with_capacity(2);
        for slot in [POSITION_SLOT, TEXCOORD_SLOT] {
            match self.bound_vertices(slot) {
                Some((buffer, vertices)) if vertices >= vertex_count => attributes.push(buffer),
                _ => return Err(SurfaceError::Draw(format!("attribute {} not bound", slot))),
            }
        }

        gpu.queue
            .write_buffer(uniforms, 0, bytemuck::bytes_of(&self.uniforms));
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Liquid Glass Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Liquid Glass Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let width = self.viewport.0.min(self.width).max(1);
            let height = self.viewport.1.min(self.height).max(1);
            render_pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
            render_pass.set_pipeline(&program.pipeline);
            render_pass.set_bind_group(0, bind_group, &[]);
            render_pass.set_vertex_buffer(0, attributes[0].slice(..));
            render_pass.set_vertex_buffer(1, attributes[1].slice(..));
            render_pass.draw(0..vertex_count, 0..1);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        self.copy_shared_frame(&gpu)
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
        if let Err(e) = self
            .canvas
            .style()
            .set_property("opacity", &opacity.to_string())
        {
            log::warn!("cannot set canvas opacity: {}", super::js_error(&e));
        }
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}
