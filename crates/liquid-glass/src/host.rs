//! Host layout system
//!
//! The engine never touches the page directly. Element creation, layout,
//! class toggling and image decoding all go through [`LayoutHost`].

use std::fmt;

use crate::math::Rect;
use crate::panel::PanelId;
use crate::snapshot::EncodedSnapshot;
use crate::surface::RenderSurface;

/// Base class of every panel element
pub const CONTAINER_CLASS: &str = "glass-container";

/// Extra class of button elements
pub const BUTTON_CLASS: &str = "glass-button";

/// Opacity transition of the surface element when the shader becomes ready
pub const SURFACE_TRANSITION: &str = "opacity 0.5s ease";

/// Identifies one asynchronous image decode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecodeTicket(pub(crate) u64);

impl DecodeTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DecodeTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decode#{}", self.0)
    }
}

/// How to create a panel's element and surface
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceSpec {
    /// Classes of the panel element, base class first
    pub classes: Vec<&'static str>,
    pub border_radius: f32,
    /// Initial surface opacity; the fallback styling shows through until 1
    pub opacity: f32,
    pub transition: &'static str,
}

/// Shape style written back to a panel element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeStyle {
    /// Forced width in pixels
    pub width: Option<u32>,
    /// Forced height in pixels
    pub height: Option<u32>,
    pub border_radius: f32,
}

/// Page-side services the engine relies on
pub trait LayoutHost {
    type Surface: RenderSurface;

    /// Create the element and render surface of a new panel
    fn create_surface(&mut self, panel: PanelId, spec: &SurfaceSpec) -> Self::Surface;

    /// Bounding box of the panel's surface in viewport coordinates
    ///
    /// `None` when the element is no longer in the page.
    fn measure(&self, panel: PanelId) -> Option<Rect>;

    /// Write a derived size and corner radius back to the element
    fn apply_shape(&mut self, panel: PanelId, style: &ShapeStyle);

    /// Move the child's element under the parent's element
    fn attach_child(&mut self, parent: PanelId, child: PanelId);

    /// Remove the child's element from the parent's element
    fn detach_child(&mut self, parent: PanelId, child: PanelId);

    /// Vertical page scroll offset in pixels
    fn scroll_offset(&self) -> f32;

    /// Full document height in pixels
    fn page_height(&self) -> f32;

    /// Visible viewport height in pixels
    fn viewport_height(&self) -> f32;

    /// Decode `image` asynchronously
    ///
    /// The result comes back through `GlassEngine::resolve_decode` with the
    /// same ticket.
    fn decode_image(&mut self, ticket: DecodeTicket, image: EncodedSnapshot);

    /// Remove the panel's element and free its resources
    fn release_panel(&mut self, panel: PanelId);
}
