//! Mock collaborators for testing liquid-glass
//!
//! This provides in-memory implementations of the layout host, the page
//! rasterizer and the render surface so the engine can be driven without a
//! browser or GPU. Every call is recorded for assertions, and asynchronous
//! work (captures, decodes) waits until the test resolves it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use liquid_glass::host::{DecodeTicket, LayoutHost, ShapeStyle, SurfaceSpec};
use liquid_glass::surface::{
    BufferHandle, ProgramHandle, TextureHandle, UniformLocation, UniformValue,
};
use liquid_glass::{
    CaptureOptions, CaptureTicket, EncodedSnapshot, GlassEngine, GlassUniforms, ImageData,
    MemorySnapshot, PageRasterizer, PageSnapshot, PanelId, Rect, RenderSurface, SnapshotError,
    SoftwareSurface, SurfaceError,
};

// =============================================================================
// Host
// =============================================================================

/// Structural change recorded by [`MockHost`]
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    Created(PanelId),
    Attached { parent: PanelId, child: PanelId },
    Detached { parent: PanelId, child: PanelId },
    Shaped(PanelId, ShapeStyle),
    Released(PanelId),
}

/// Faults injected into every surface the host creates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceFaults {
    /// Reject the glass program
    pub fail_compile: bool,
    /// Reject texture re-uploads
    pub fail_texture_update: bool,
}

/// Mock layout host with scripted bounding boxes
pub struct MockHost {
    /// Bounding box given to every new panel
    default_rect: Rect,
    rects: HashMap<PanelId, Rect>,
    specs: HashMap<PanelId, SurfaceSpec>,
    scroll_y: f32,
    page_height: f32,
    viewport_height: f32,
    faults: SurfaceFaults,
    events: Vec<HostEvent>,
    /// Decodes waiting for [`settle_decodes`]
    pending_decodes: Vec<(DecodeTicket, EncodedSnapshot)>,
    measures: RefCell<Vec<PanelId>>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    /// Create a new mock host; panels measure 80x60 until told otherwise
    pub fn new() -> Self {
        Self {
            default_rect: Rect::new(0.0, 0.0, 80.0, 60.0),
            rects: HashMap::new(),
            specs: HashMap::new(),
            scroll_y: 0.0,
            page_height: 2000.0,
            viewport_height: 800.0,
            faults: SurfaceFaults::default(),
            events: Vec::new(),
            pending_decodes: Vec::new(),
            measures: RefCell::new(Vec::new()),
        }
    }

    /// Use `rect` for every panel created from now on
    pub fn with_default_rect(mut self, rect: Rect) -> Self {
        self.default_rect = rect;
        self
    }

    /// Inject faults into every surface created from now on
    pub fn with_faults(mut self, faults: SurfaceFaults) -> Self {
        self.faults = faults;
        self
    }

    pub fn set_faults(&mut self, faults: SurfaceFaults) {
        self.faults = faults;
    }

    /// Lay out `panel` at `rect`
    pub fn set_rect(&mut self, panel: PanelId, rect: Rect) {
        self.rects.insert(panel, rect);
    }

    pub fn rect(&self, panel: PanelId) -> Option<Rect> {
        self.rects.get(&panel).copied()
    }

    pub fn set_scroll(&mut self, scroll_y: f32) {
        self.scroll_y = scroll_y;
    }

    pub fn set_page_height(&mut self, page_height: f32) {
        self.page_height = page_height;
    }

    /// How the engine asked for the panel's element to be created
    pub fn spec(&self, panel: PanelId) -> Option<&SurfaceSpec> {
        self.specs.get(&panel)
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Shape styles written back to `panel`, oldest first
    pub fn shapes(&self, panel: PanelId) -> Vec<ShapeStyle> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Shaped(id, style) if *id == panel => Some(*style),
                _ => None,
            })
            .collect()
    }

    pub fn is_released(&self, panel: PanelId) -> bool {
        self.events.contains(&HostEvent::Released(panel))
    }

    /// Panels measured so far, in call order
    pub fn measures(&self) -> Vec<PanelId> {
        self.measures.borrow().clone()
    }

    /// Number of times `panel` was measured
    pub fn measure_count(&self, panel: PanelId) -> usize {
        self.measures.borrow().iter().filter(|p| **p == panel).count()
    }

    pub fn pending_decodes(&self) -> usize {
        self.pending_decodes.len()
    }

    /// Remove and return every decode the engine started
    pub fn take_decodes(&mut self) -> Vec<(DecodeTicket, EncodedSnapshot)> {
        std::mem::take(&mut self.pending_decodes)
    }
}

impl LayoutHost for MockHost {
    type Surface = MockSurface;

    fn create_surface(&mut self, panel: PanelId, spec: &SurfaceSpec) -> MockSurface {
        self.rects.entry(panel).or_insert(self.default_rect);
        self.specs.insert(panel, spec.clone());
        self.events.push(HostEvent::Created(panel));
        let mut surface = MockSurface::new(self.faults);
        surface.inner.set_opacity(spec.opacity);
        surface
    }

    fn measure(&self, panel: PanelId) -> Option<Rect> {
        self.measures.borrow_mut().push(panel);
        self.rects.get(&panel).copied()
    }

    fn apply_shape(&mut self, panel: PanelId, style: &ShapeStyle) {
        if let Some(rect) = self.rects.get_mut(&panel) {
            if let Some(width) = style.width {
                rect.width = width as f32;
            }
            if let Some(height) = style.height {
                rect.height = height as f32;
            }
        }
        self.events.push(HostEvent::Shaped(panel, *style));
    }

    fn attach_child(&mut self, parent: PanelId, child: PanelId) {
        self.events.push(HostEvent::Attached { parent, child });
    }

    fn detach_child(&mut self, parent: PanelId, child: PanelId) {
        self.events.push(HostEvent::Detached { parent, child });
    }

    fn scroll_offset(&self) -> f32 {
        self.scroll_y
    }

    fn page_height(&self) -> f32 {
        self.page_height
    }

    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn decode_image(&mut self, ticket: DecodeTicket, image: EncodedSnapshot) {
        self.pending_decodes.push((ticket, image));
    }

    fn release_panel(&mut self, panel: PanelId) {
        self.rects.remove(&panel);
        self.events.push(HostEvent::Released(panel));
    }
}

/// Complete every pending decode
///
/// Raw snapshots decode to their pixels. Data URLs need a browser image
/// element and fail with [`SnapshotError::Decode`].
pub fn settle_decodes<R: PageRasterizer>(engine: &mut GlassEngine<MockHost, R>, now_ms: f64) -> usize {
    let decodes = engine.host_mut().take_decodes();
    let count = decodes.len();
    for (ticket, encoded) in decodes {
        let result = match encoded {
            EncodedSnapshot::Raw(image) => Ok(image),
            EncodedSnapshot::DataUrl(_) => Err(SnapshotError::Decode(
                "data URLs cannot be decoded without a browser".into(),
            )),
        };
        engine.resolve_decode(ticket, result, now_ms);
    }
    count
}

// =============================================================================
// Rasterizer
// =============================================================================

/// Mock page rasterizer
///
/// Records every capture request; the test resolves it through
/// `GlassEngine::resolve_capture`.
#[derive(Debug)]
pub struct MockRasterizer {
    available: bool,
    requests: Vec<(CaptureTicket, CaptureOptions)>,
}

impl Default for MockRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRasterizer {
    /// Create a new available rasterizer
    pub fn new() -> Self {
        Self {
            available: true,
            requests: Vec::new(),
        }
    }

    /// Create a rasterizer that is not loaded on the page
    pub fn unavailable() -> Self {
        Self {
            available: false,
            requests: Vec::new(),
        }
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Number of captures started
    pub fn capture_count(&self) -> usize {
        self.requests.len()
    }

    /// Ticket of the most recent capture
    pub fn last_ticket(&self) -> Option<CaptureTicket> {
        self.requests.last().map(|(t, _)| *t)
    }

    /// Options of the most recent capture
    pub fn last_options(&self) -> Option<&CaptureOptions> {
        self.requests.last().map(|(_, o)| o)
    }
}

impl PageRasterizer for MockRasterizer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn capture(&mut self, ticket: CaptureTicket, options: &CaptureOptions) {
        self.requests.push((ticket, options.clone()));
    }
}

/// Page image with a horizontal red ramp and a vertical green ramp
pub fn page_image(width: u32, height: u32) -> ImageData {
    ImageData::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        [r, g, 128, 255]
    })
}

/// Readable snapshot of [`page_image`]
pub fn page_snapshot(width: u32, height: u32) -> Rc<dyn PageSnapshot> {
    Rc::new(MemorySnapshot::new(page_image(width, height)))
}

/// Snapshot whose pixels cannot be read back
pub fn tainted_snapshot(width: u32, height: u32) -> Rc<dyn PageSnapshot> {
    Rc::new(MemorySnapshot::tainted(page_image(width, height)))
}

// =============================================================================
// Surface
// =============================================================================

/// GPU call recorded by [`MockSurface`]
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceCall {
    Resize(u32, u32),
    Compile,
    CreateTexture(u32, u32),
    UpdateTexture(u32, u32),
    Viewport(u32, u32),
    Clear,
    Draw(u32),
    Opacity(f32),
}

/// Render surface that records calls and renders with [`SoftwareSurface`]
pub struct MockSurface {
    inner: SoftwareSurface,
    faults: SurfaceFaults,
    calls: Vec<SurfaceCall>,
    compiles: u32,
}

impl MockSurface {
    /// Create a new 0x0 surface
    pub fn new(faults: SurfaceFaults) -> Self {
        Self {
            inner: SoftwareSurface::new(0, 0),
            faults,
            calls: Vec::new(),
            compiles: 0,
        }
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Number of draws that reached the renderer
    pub fn draw_count(&self) -> u32 {
        self.inner.draw_count()
    }

    /// Number of compile attempts, including failed ones
    pub fn compile_count(&self) -> u32 {
        self.compiles
    }

    pub fn uniforms(&self) -> &GlassUniforms {
        self.inner.uniforms()
    }

    pub fn renderer(&self) -> &SoftwareSurface {
        &self.inner
    }

    pub fn set_faults(&mut self, faults: SurfaceFaults) {
        self.faults = faults;
    }

    /// Simulate losing the GPU context
    pub fn lose(&mut self) {
        self.inner.lose();
    }
}

impl RenderSurface for MockSurface {
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.calls.push(SurfaceCall::Resize(width, height));
        self.inner.resize(width, height);
    }

    fn compile_program(&mut self, source: &str) -> Result<ProgramHandle, SurfaceError> {
        self.calls.push(SurfaceCall::Compile);
        self.compiles += 1;
        if self.faults.fail_compile {
            return Err(SurfaceError::Compile("injected compile failure".into()));
        }
        self.inner.compile_program(source)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.inner.uniform_location(program, name)
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferHandle, SurfaceError> {
        self.inner.create_vertex_buffer(data)
    }

    fn bind_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle) {
        self.inner.bind_vertex_buffer(slot, buffer);
    }

    fn create_texture(&mut self, image: &ImageData) -> Result<TextureHandle, SurfaceError> {
        self.calls
            .push(SurfaceCall::CreateTexture(image.width(), image.height()));
        self.inner.create_texture(image)
    }

    fn update_texture(&mut self, texture: TextureHandle, image: &ImageData) -> Result<(), SurfaceError> {
        self.calls
            .push(SurfaceCall::UpdateTexture(image.width(), image.height()));
        if self.faults.fail_texture_update {
            return Err(SurfaceError::Texture("injected upload failure".into()));
        }
        self.inner.update_texture(texture, image)
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.inner.set_uniform(location, value);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(SurfaceCall::Viewport(width, height));
        self.inner.set_viewport(width, height);
    }

    fn clear(&mut self) {
        self.calls.push(SurfaceCall::Clear);
        self.inner.clear();
    }

    fn draw(&mut self, vertex_count: u32) -> Result<(), SurfaceError> {
        self.calls.push(SurfaceCall::Draw(vertex_count));
        self.inner.draw(vertex_count)
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.calls.push(SurfaceCall::Opacity(opacity));
        self.inner.set_opacity(opacity);
    }

    fn opacity(&self) -> f32 {
        self.inner.opacity()
    }

    fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_shape_updates_rect() {
        let mut host = MockHost::new();
        let id = PanelId(1);
        host.set_rect(id, Rect::new(0.0, 0.0, 80.0, 60.0));
        host.apply_shape(
            id,
            &ShapeStyle {
                width: Some(80),
                height: Some(80),
                border_radius: 40.0,
            },
        );
        assert_eq!(host.measure(id), Some(Rect::new(0.0, 0.0, 80.0, 80.0)));
        assert_eq!(host.measure_count(id), 1);
        assert_eq!(host.shapes(id).len(), 1);
    }

    #[test]
    fn test_surface_faults() {
        let mut surface = MockSurface::new(SurfaceFaults {
            fail_compile: true,
            ..SurfaceFaults::default()
        });
        let err = surface.compile_program("").unwrap_err();
        assert!(matches!(err, SurfaceError::Compile(_)));
        assert_eq!(surface.compile_count(), 1);
    }

    #[test]
    fn test_rasterizer_records_requests() {
        let mut rasterizer = MockRasterizer::new();
        assert!(rasterizer.is_available());
        assert!(rasterizer.last_ticket().is_none());
        assert!(!MockRasterizer::unavailable().is_available());
        rasterizer.set_available(false);
        assert!(!rasterizer.is_available());
    }

    #[test]
    fn test_page_image_ramps() {
        let image = page_image(4, 2);
        assert_eq!(image.pixel(0, 0), Some([0, 0, 128, 255]));
        assert_eq!(image.pixel(2, 1), Some([127, 127, 128, 255]));
    }
}
