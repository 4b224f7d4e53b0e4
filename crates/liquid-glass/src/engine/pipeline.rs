//! Snapshot capture, decode and shader setup
//!
//! A panel goes `AwaitingSnapshot -> Decoding -> Ready`. Snapshot problems
//! leave it in `Fallback`, where the next successful capture retries it.
//! Surface problems leave it in `Failed` for good.

use std::rc::Rc;

use crate::error::SnapshotError;
use crate::host::{DecodeTicket, LayoutHost};
use crate::panel::{PanelId, SetupUniforms, ShaderBinding, ShaderState};
use crate::scheduler::{TimerKind, AUTO_REFRESH_INTERVAL_MS};
use crate::snapshot::{CaptureTicket, ImageData, InitDecision, PageRasterizer, PageSnapshot};
use crate::surface::RenderSurface;

use super::GlassEngine;

impl<H: LayoutHost, R: PageRasterizer> GlassEngine<H, R> {
    /// Deliver the result of a page capture
    ///
    /// Results for any ticket but the in-flight one are ignored.
    pub fn resolve_capture(
        &mut self,
        ticket: CaptureTicket,
        result: Result<Rc<dyn PageSnapshot>, SnapshotError>,
    ) {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.capture_failed(ticket, e);
                return;
            }
        };

        // Panels that fell back before this capture get another try
        let retry: Vec<PanelId> = self
            .panels
            .values()
            .filter(|p| p.state == ShaderState::Fallback)
            .map(|p| p.id)
            .collect();

        let Some(drained) = self.coordinator.complete(ticket, snapshot.clone()) else {
            log::debug!("ignoring stale {}", ticket);
            return;
        };
        log::info!(
            "{} ready ({}x{}), {} panel(s) waiting",
            ticket,
            snapshot.width(),
            snapshot.height(),
            drained.len()
        );

        for id in drained {
            let waiting = self
                .panels
                .get(&id)
                .map_or(false, |p| p.state == ShaderState::AwaitingSnapshot);
            if waiting {
                self.begin_setup(id, snapshot.as_ref());
            }
        }

        for id in retry {
            log::debug!("retrying shader setup of panel {}", id);
            self.begin_setup(id, snapshot.as_ref());
        }

        let ready: Vec<PanelId> = self
            .panels
            .values()
            .filter(|p| p.is_ready())
            .map(|p| p.id)
            .collect();
        if ready.is_empty() {
            return;
        }
        match snapshot.pixels() {
            Ok(image) => {
                for id in ready {
                    self.refresh_texture(id, &image);
                }
            }
            Err(e) => log::warn!("texture update skipped ({}), keeping old frame", e),
        }
    }

    /// Deliver the result of an image decode
    ///
    /// `now_ms` starts the auto-refresh interval of a panel that becomes
    /// ready. Results for destroyed panels are ignored.
    pub fn resolve_decode(
        &mut self,
        ticket: DecodeTicket,
        result: Result<ImageData, SnapshotError>,
        now_ms: f64,
    ) {
        let owner = self
            .panels
            .values()
            .find(|p| p.state == ShaderState::Decoding(ticket))
            .map(|p| p.id);
        let Some(id) = owner else {
            log::debug!("ignoring stale {}", ticket);
            return;
        };

        match result {
            Ok(image) => self.setup_shader(id, &image, now_ms),
            Err(e) => {
                log::error!("snapshot decode failed for panel {}: {}", id, e);
                if let Some(panel) = self.panels.get_mut(&id) {
                    panel.state = ShaderState::Fallback;
                }
            }
        }
    }

    /// Ask the coordinator for the shared snapshot on behalf of `id`
    pub(crate) fn request_snapshot(&mut self, id: PanelId) {
        match self.coordinator.request_for(id) {
            InitDecision::Ready(snapshot) => self.begin_setup(id, snapshot.as_ref()),
            InitDecision::Queued => {
                self.set_state(id, ShaderState::AwaitingSnapshot);
                log::debug!("panel {} queued for the in-flight capture", id);
            }
            InitDecision::StartCapture(ticket) => {
                self.set_state(id, ShaderState::AwaitingSnapshot);
                self.start_capture(ticket);
            }
        }
    }

    pub(crate) fn start_capture(&mut self, ticket: CaptureTicket) {
        if !self.rasterizer.is_available() {
            self.capture_failed(ticket, SnapshotError::Unavailable);
            return;
        }
        log::debug!("starting {}", ticket);
        self.rasterizer.capture(ticket, &self.capture_options);
    }

    fn capture_failed(&mut self, ticket: CaptureTicket, error: SnapshotError) {
        let Some(dropped) = self.coordinator.fail(ticket) else {
            log::debug!("ignoring failure of stale {}", ticket);
            return;
        };
        log::error!("{} failed: {}; fallback styling stays", ticket, error);
        for id in dropped {
            if let Some(panel) = self.panels.get_mut(&id) {
                if panel.state == ShaderState::AwaitingSnapshot {
                    panel.state = ShaderState::Fallback;
                }
            }
        }
    }

    /// Encode the snapshot and hand it to the host for decoding
    fn begin_setup(&mut self, id: PanelId, snapshot: &dyn PageSnapshot) {
        match snapshot.encode() {
            Ok(encoded) => {
                let ticket = DecodeTicket(self.next_decode);
                self.next_decode += 1;
                self.set_state(id, ShaderState::Decoding(ticket));
                self.host.decode_image(ticket, encoded);
            }
            Err(e) => {
                log::error!("cannot read snapshot for panel {}: {}; fallback active", id, e);
                self.set_state(id, ShaderState::Fallback);
            }
        }
    }

    fn setup_shader(&mut self, id: PanelId, image: &ImageData, now_ms: f64) {
        let position = self.panel_center(id);
        let scroll_y = self.host.scroll_offset();
        let page_height = self.host.page_height();
        let viewport_height = self.host.viewport_height();

        let Some(panel) = self.panels.get_mut(&id) else {
            return;
        };
        let setup = SetupUniforms {
            geometry: panel.geometry,
            blur_radius: panel.blur_radius,
            tint_opacity: panel.tint_opacity,
            refraction: panel.refraction,
            position,
            scroll_y,
            page_height,
            viewport_height,
        };
        let binding = match ShaderBinding::create(&mut panel.surface, image, &setup) {
            Ok(binding) => binding,
            Err(e) => {
                log::error!("shader setup failed for panel {}: {}", id, e);
                self.mark_failed(id);
                return;
            }
        };

        panel.binding = Some(binding);
        panel.state = ShaderState::Ready;
        panel.surface.set_opacity(1.0);
        let on_load = panel.on_load.take();
        let auto_refresh = panel.auto_refresh;
        let adopted: Vec<PanelId> = panel.children.clone();
        log::info!(
            "panel {} ready ({}x{})",
            id,
            panel.geometry.width,
            panel.geometry.height
        );

        if let Err(e) = self.redraw(id) {
            log::warn!("first draw of panel {} failed: {}", id, e);
        }

        if auto_refresh && !self.timers.has(id, TimerKind::AutoRefresh) {
            self.timers
                .schedule_interval(id, TimerKind::AutoRefresh, now_ms, AUTO_REFRESH_INTERVAL_MS);
        }

        for child in adopted {
            let deferred = self
                .panels
                .get(&child)
                .map_or(false, |c| c.is_nested() && c.state == ShaderState::Deferred);
            if deferred {
                self.request_snapshot(child);
            }
        }

        if let Some(callback) = on_load {
            callback();
        }
    }

    fn refresh_texture(&mut self, id: PanelId, image: &ImageData) {
        let Some(panel) = self.panels.get_mut(&id) else {
            return;
        };
        let Some(binding) = &panel.binding else {
            return;
        };
        if let Err(e) = binding.update_texture(&mut panel.surface, image) {
            log::warn!("texture update failed for panel {} ({}), keeping old frame", id, e);
            return;
        }
        if let Err(e) = self.redraw(id) {
            log::warn!("redraw of panel {} failed: {}", id, e);
        }
    }

    fn set_state(&mut self, id: PanelId, state: ShaderState) {
        if let Some(panel) = self.panels.get_mut(&id) {
            panel.state = state;
        }
    }
}
