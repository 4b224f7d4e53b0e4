//! Liquid glass panels
//!
//! Translucent panels that refract, blur and tint a snapshot of the page
//! behind them, following scroll position and panel geometry:
//! - Shape signed-distance functions (rounded rectangle, circle, pill)
//! - A per-pixel refraction, blur and tint kernel (WGSL, with a CPU reference)
//! - One shared page snapshot, captured once and refreshed on demand
//! - Panel lifecycle with nested buttons
//! - Debounced resize and coalesced per-frame measurement
//!
//! ## Architecture
//!
//! - [`math`]: Geometry types (`Vec2`, `Size`, `Rect`)
//! - [`shape`]: Distance functions and shape classification
//! - [`kernel`]: Shading math, uniform layout and the glass program
//! - [`snapshot`]: Snapshot coordinator, rasterizer and image types
//! - [`surface`]: Render surface trait and the software surface
//! - [`panel`]: Panel state, options, geometry and shader binding
//! - [`scheduler`]: Timers and the frame queue
//! - [`host`]: Page-side services the engine relies on
//! - `web` (feature `wasm`): DOM host, html2canvas capture, wgpu surfaces
//!   and the `GlassController` export
//!
//! ## Example
//!
//! ```rust
//! use liquid_glass::{classify, PanelOptions, ResolvedShape, ShapeKind, Size};
//!
//! let options = PanelOptions::from_json(r#"{"type": "pill", "tintOpacity": 0.3}"#).unwrap();
//! assert_eq!(options.kind, ShapeKind::Pill);
//!
//! let shape = classify(Size::new(200.0, 40.0), 20.0);
//! assert_eq!(shape, ResolvedShape::Pill);
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Rust Core**: All state is pure Rust, testable without a browser
//! 2. **Time Abstraction**: Timers run on an injected millisecond clock
//! 3. **Explicit Tickets**: Captures and decodes resolve through tickets, so
//!    stale results are ignored
//! 4. **Degrade, Don't Fail**: Snapshot and GPU failures leave the fallback
//!    styling visible and never reach the host page

pub mod error;
pub mod host;
pub mod kernel;
pub mod math;
pub mod panel;
pub mod scheduler;
pub mod shape;
pub mod snapshot;
pub mod surface;

mod engine;

// Browser integration (only available with "wasm" feature)
#[cfg(feature = "wasm")]
pub mod web;

// Re-export core types for convenience
pub use error::{GlassError, SnapshotError, SurfaceError};
pub use host::{DecodeTicket, LayoutHost, ShapeStyle, SurfaceSpec};
pub use kernel::{shade_pixel, FrameInputs, GlassUniforms, RefractionParams, Rgba};
pub use math::{Rect, Size, Vec2};
pub use panel::{
    ButtonOptions, Geometry, Panel, PanelId, PanelOptions, PanelRole, ShaderBinding, ShaderState,
};
pub use scheduler::{AUTO_REFRESH_INTERVAL_MS, RESIZE_DEBOUNCE_MS};
pub use shape::{classify, is_circle, is_pill, ResolvedShape, ShapeKind};
pub use snapshot::{
    CaptureOptions, CaptureTicket, EncodedSnapshot, ImageData, MemorySnapshot, PageRasterizer,
    PageSnapshot, SnapshotCoordinator,
};
pub use surface::{RenderSurface, SoftwareSurface};

pub use engine::GlassEngine;
