//! Glass engine coordinating all components
//!
//! This module is split into focused submodules:
//! - `lifecycle`: Panel creation, parenting and teardown
//! - `pipeline`: Snapshot capture, decode and shader setup
//! - `rendering`: Geometry recompute and redraws
//!
//! The engine is single-threaded. Every asynchronous step is an explicit
//! ticket the host resolves later, and every deferred step waits for the
//! host's next `tick` or animation frame.

mod lifecycle;
mod pipeline;
mod rendering;

use std::collections::BTreeMap;

use crate::host::LayoutHost;
use crate::panel::{Panel, PanelId};
use crate::scheduler::{FrameQueue, TimerKind, Timers, RESIZE_DEBOUNCE_MS};
use crate::snapshot::{CaptureOptions, PageRasterizer, SnapshotCoordinator};

/// Glass engine owning every panel, the shared snapshot and the scheduler
pub struct GlassEngine<H: LayoutHost, R: PageRasterizer> {
    host: H,
    rasterizer: R,
    capture_options: CaptureOptions,
    coordinator: SnapshotCoordinator,
    /// All panels by ID; IDs increase, so iteration is creation order
    panels: BTreeMap<PanelId, Panel<H::Surface>>,
    timers: Timers,
    frames: FrameQueue,
    next_panel: u64,
    next_decode: u64,
}

impl<H: LayoutHost, R: PageRasterizer> GlassEngine<H, R> {
    /// Create a new engine with default capture options
    pub fn new(host: H, rasterizer: R) -> Self {
        Self {
            host,
            rasterizer,
            capture_options: CaptureOptions::default(),
            coordinator: SnapshotCoordinator::new(),
            panels: BTreeMap::new(),
            timers: Timers::new(),
            frames: FrameQueue::new(),
            next_panel: 1,
            next_decode: 1,
        }
    }

    /// Replace the options sent with every capture
    pub fn with_capture_options(mut self, options: CaptureOptions) -> Self {
        self.capture_options = options;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn rasterizer_mut(&mut self) -> &mut R {
        &mut self.rasterizer
    }

    pub fn capture_options(&self) -> &CaptureOptions {
        &self.capture_options
    }

    pub fn coordinator(&self) -> &SnapshotCoordinator {
        &self.coordinator
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Get a panel by ID
    pub fn panel(&self, id: PanelId) -> Option<&Panel<H::Surface>> {
        self.panels.get(&id)
    }

    /// Get a mutable panel by ID
    pub fn panel_mut(&mut self, id: PanelId) -> Option<&mut Panel<H::Surface>> {
        self.panels.get_mut(&id)
    }

    /// All panels in creation order
    pub fn panels(&self) -> impl Iterator<Item = &Panel<H::Surface>> {
        self.panels.values()
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// True when a measurement is waiting for the next animation frame
    pub fn needs_frame(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Viewport resized: restart every panel's debounce
    pub fn on_resize(&mut self, now_ms: f64) {
        let ids: Vec<PanelId> = self.panels.keys().copied().collect();
        for id in ids {
            self.timers
                .restart(id, TimerKind::ResizeDebounce, now_ms, RESIZE_DEBOUNCE_MS);
        }
    }

    /// Page scrolled: redraw every ready panel
    pub fn on_scroll(&mut self) {
        let ready: Vec<PanelId> = self
            .panels
            .values()
            .filter(|p| p.is_ready())
            .map(|p| p.id)
            .collect();
        for id in ready {
            if let Err(e) = self.redraw(id) {
                log::warn!("redraw of panel {} failed: {}", id, e);
            }
        }
    }

    /// Advance the clock and run due timers
    pub fn tick(&mut self, now_ms: f64) {
        for expired in self.timers.expire(now_ms) {
            match expired.kind {
                TimerKind::ResizeDebounce => self.request_measure(expired.owner),
                TimerKind::AutoRefresh => {
                    if let Some(ticket) = self.coordinator.try_begin_refresh() {
                        log::debug!("auto-refresh {} for panel {}", ticket, expired.owner);
                        self.start_capture(ticket);
                    }
                }
            }
        }
    }

    /// Paint frame: measure every panel that asked for it
    pub fn on_animation_frame(&mut self) {
        for id in self.frames.take() {
            self.recompute_geometry(id);
        }
    }

    pub(crate) fn request_measure(&mut self, id: PanelId) {
        if self.panels.contains_key(&id) {
            self.frames.request(id);
        }
    }

    fn alloc_panel_id(&mut self) -> PanelId {
        let id = PanelId(self.next_panel);
        self.next_panel += 1;
        id
    }
}
