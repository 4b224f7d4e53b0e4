//! Glass panels
//!
//! A panel owns one render surface, its measured geometry, the shader
//! binding drawn on that surface, and its child panels. Buttons are panels
//! with the [`PanelRole::Button`] role: they stay deferred until a parent
//! adopts them.

mod binding;
mod geometry;
mod options;

use std::fmt;

use crate::host::DecodeTicket;
use crate::kernel::RefractionParams;
use crate::shape::ShapeKind;

pub use binding::{SetupUniforms, ShaderBinding, UniformTable};
pub use geometry::{fit_shape, Geometry};
pub use options::{
    ButtonOptions, OnLoad, PanelOptions, DEFAULT_BLUR_RADIUS, DEFAULT_BORDER_RADIUS,
    DEFAULT_BUTTON_SIZE, DEFAULT_TINT_OPACITY,
};

/// Unique panel identifier, increasing in creation order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(pub u64);

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of panel this is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelRole {
    /// A standalone glass container
    Container,
    /// An interactive control; `nested` once a parent has adopted it
    Button { nested: bool },
}

/// Shader lifecycle of a panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderState {
    /// Button not yet promoted, or waiting for its parent's shader
    Deferred,
    /// Queued until the first page snapshot arrives
    AwaitingSnapshot,
    /// The snapshot is being decoded by the host
    Decoding(DecodeTicket),
    /// Shader bound; the panel redraws on scroll and resize
    Ready,
    /// No usable snapshot; retried on the next successful capture
    Fallback,
    /// The surface rejected the shader or was lost; never retried
    Failed,
}

impl ShaderState {
    /// Lowercase name reported to the page
    pub fn name(&self) -> &'static str {
        match self {
            ShaderState::Deferred => "deferred",
            ShaderState::AwaitingSnapshot => "awaiting-snapshot",
            ShaderState::Decoding(_) => "decoding",
            ShaderState::Ready => "ready",
            ShaderState::Fallback => "fallback",
            ShaderState::Failed => "failed",
        }
    }
}

/// A glass panel and the surface it draws on
pub struct Panel<S> {
    pub(crate) id: PanelId,
    pub(crate) role: PanelRole,
    pub(crate) kind: ShapeKind,
    pub(crate) geometry: Geometry,
    pub(crate) tint_opacity: f32,
    pub(crate) blur_radius: f32,
    pub(crate) auto_refresh: bool,
    pub(crate) refraction: RefractionParams,
    pub(crate) on_load: Option<OnLoad>,
    pub(crate) state: ShaderState,
    pub(crate) surface: S,
    pub(crate) binding: Option<ShaderBinding>,
    pub(crate) parent: Option<PanelId>,
    pub(crate) children: Vec<PanelId>,
}

impl<S> Panel<S> {
    pub(crate) fn new(id: PanelId, role: PanelRole, mut options: PanelOptions, surface: S) -> Self {
        let state = match role {
            PanelRole::Button { .. } => ShaderState::Deferred,
            PanelRole::Container => ShaderState::AwaitingSnapshot,
        };
        Self {
            id,
            role,
            kind: options.kind,
            geometry: Geometry {
                width: 0,
                height: 0,
                border_radius: options.border_radius,
            },
            tint_opacity: options.tint_opacity,
            blur_radius: options.blur_radius,
            auto_refresh: options.auto_refresh,
            refraction: options.refraction,
            on_load: options.take_on_load(),
            state,
            surface,
            binding: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn role(&self) -> PanelRole {
        self.role
    }

    pub fn is_button(&self) -> bool {
        matches!(self.role, PanelRole::Button { .. })
    }

    /// True for a button its parent has adopted
    pub fn is_nested(&self) -> bool {
        matches!(self.role, PanelRole::Button { nested: true })
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn border_radius(&self) -> f32 {
        self.geometry.border_radius
    }

    pub fn tint_opacity(&self) -> f32 {
        self.tint_opacity
    }

    pub fn blur_radius(&self) -> f32 {
        self.blur_radius
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn refraction(&self) -> &RefractionParams {
        &self.refraction
    }

    pub fn state(&self) -> ShaderState {
        self.state
    }

    /// True once the shader is bound and drawing
    pub fn is_ready(&self) -> bool {
        self.state == ShaderState::Ready
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn binding(&self) -> Option<&ShaderBinding> {
        self.binding.as_ref()
    }

    pub fn parent(&self) -> Option<PanelId> {
        self.parent
    }

    pub fn children(&self) -> &[PanelId] {
        &self.children
    }
}

impl<S> fmt::Debug for Panel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("kind", &self.kind)
            .field("geometry", &self.geometry)
            .field("state", &self.state)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}
