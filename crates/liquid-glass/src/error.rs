//! Error types
//!
//! None of these are fatal to the host page: the engine logs them and leaves
//! the affected panel showing its fallback styling.

use crate::panel::PanelId;

/// Failures reading or producing the shared page snapshot
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot contains cross-origin pixels and cannot be read back
    #[error("snapshot is tainted by cross-origin content")]
    Tainted,

    /// The page rasterizer rejected the capture
    #[error("rasterizer failed: {0}")]
    Rasterizer(String),

    /// The page rasterizer is not loaded on this page
    #[error("rasterizer unavailable")]
    Unavailable,

    /// The encoded snapshot could not be decoded into pixels
    #[error("image decode failed: {0}")]
    Decode(String),

    /// Pixel buffer length does not match the stated dimensions
    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    BadPixelBuffer { expected: usize, actual: usize },
}

/// Failures of the render surface
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    /// Program text failed to compile
    #[error("shader compile failed: {0}")]
    Compile(String),

    /// Program stages failed to link or validate together
    #[error("shader link failed: {0}")]
    Link(String),

    /// Texture creation or upload failed
    #[error("texture upload failed: {0}")]
    Texture(String),

    /// Vertex buffer creation failed
    #[error("buffer creation failed: {0}")]
    Buffer(String),

    /// Draw issued without a complete binding
    #[error("draw failed: {0}")]
    Draw(String),

    /// The underlying surface or device is gone
    #[error("render surface lost")]
    Lost,

    /// No GPU backend is available for this surface
    #[error("rendering unsupported: {0}")]
    Unsupported(String),
}

/// Errors from panel operations
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GlassError {
    /// No panel with this ID
    #[error("unknown panel {0}")]
    UnknownPanel(PanelId),

    /// A panel cannot be its own child
    #[error("panel {0} cannot contain itself")]
    SelfChild(PanelId),

    /// The child already has a parent
    #[error("panel {child} already belongs to panel {parent}")]
    AlreadyParented { child: PanelId, parent: PanelId },

    /// Attaching would make the panel tree cyclic
    #[error("attaching panel {child} under panel {parent} would create a cycle")]
    Cycle { parent: PanelId, child: PanelId },

    /// The panel is not a child of the given parent
    #[error("panel {child} is not a child of panel {parent}")]
    NotAChild { parent: PanelId, child: PanelId },

    /// Options could not be parsed
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
