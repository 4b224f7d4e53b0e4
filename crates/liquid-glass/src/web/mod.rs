//! Browser integration
//!
//! - `console`: `log` sink on the browser console
//! - `dom_host`: [`LayoutHost`](crate::LayoutHost) on DOM elements
//! - `rasterizer`: html2canvas page capture
//! - `surface`: wgpu render surface on a panel canvas
//! - `controller`: wasm-bindgen entry point wiring events to the engine
//!
//! Browser callbacks never touch the engine directly. They post to a
//! [`Mailbox`] that the controller drains once per animation frame, so the
//! engine is only ever borrowed from one place.

mod console;
mod controller;
mod dom_host;
mod rasterizer;
mod surface;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::SnapshotError;
use crate::host::DecodeTicket;
use crate::snapshot::{CaptureTicket, ImageData, PageSnapshot};

pub use console::{init_logging, ConsoleLogger};
pub use controller::{create_controller, GlassController};
pub use dom_host::DomHost;
pub use rasterizer::{CanvasSnapshot, Html2CanvasRasterizer};
pub use surface::{GpuContext, WgpuSurface};

/// Completion posted by an asynchronous browser callback
pub enum Completion {
    Captured(CaptureTicket, Result<Rc<dyn PageSnapshot>, SnapshotError>),
    Decoded(DecodeTicket, Result<ImageData, SnapshotError>),
    /// A panel's `onLoad` callback, run after the engine is released
    Loaded(js_sys::Function),
}

/// Readable message of a thrown JS value
pub(crate) fn js_error(value: &wasm_bindgen::JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Shared queue of completions
#[derive(Clone, Default)]
pub struct Mailbox {
    queue: Rc<RefCell<Vec<Completion>>>,
}

impl Mailbox {
    /// Create an empty mailbox
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, completion: Completion) {
        self.queue.borrow_mut().push(completion);
    }

    /// Remove every queued completion, oldest first
    pub fn drain(&self) -> Vec<Completion> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}
