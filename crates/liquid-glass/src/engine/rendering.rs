//! Geometry recompute and redraws

use crate::error::{GlassError, SurfaceError};
use crate::host::LayoutHost;
use crate::math::Vec2;
use crate::panel::{fit_shape, PanelId, ShaderState};
use crate::scheduler::TimerKind;
use crate::snapshot::PageRasterizer;
use crate::surface::RenderSurface;

use super::GlassEngine;

impl<H: LayoutHost, R: PageRasterizer> GlassEngine<H, R> {
    /// Repaint one panel with the current scroll offset and position
    ///
    /// A panel without a shader has nothing to draw and returns `Ok`. A lost
    /// surface drops the binding and marks the panel failed.
    pub fn redraw(&mut self, id: PanelId) -> Result<(), GlassError> {
        let position = self.panel_center(id);
        let scroll_y = self.host.scroll_offset();

        let panel = self.panels.get_mut(&id).ok_or(GlassError::UnknownPanel(id))?;
        if panel.binding.is_none() {
            return Ok(());
        }
        if !panel.surface.is_alive() {
            log::warn!("surface of panel {} lost, dropping its shader", id);
            self.mark_failed(id);
            return Err(SurfaceError::Lost.into());
        }
        if let Some(binding) = &panel.binding {
            binding.draw(&mut panel.surface, scroll_y, position)?;
        }
        Ok(())
    }

    /// Move a panel to the terminal `Failed` state
    ///
    /// The binding is dropped and auto-refresh stops. Resize handling stays
    /// so the fallback styling keeps following the panel's shape.
    pub(crate) fn mark_failed(&mut self, id: PanelId) {
        if let Some(panel) = self.panels.get_mut(&id) {
            panel.binding = None;
            panel.state = ShaderState::Failed;
        }
        if self.timers.cancel_kind(id, TimerKind::AutoRefresh) {
            log::debug!("auto-refresh of failed panel {} cancelled", id);
        }
    }

    /// Center of the panel's surface in viewport coordinates
    pub(crate) fn panel_center(&self, id: PanelId) -> Vec2 {
        self.host.measure(id).map_or(Vec2::ZERO, |rect| rect.center())
    }

    /// Measure a panel, write back its shape and resize its surface
    pub(crate) fn recompute_geometry(&mut self, id: PanelId) {
        let Some(measured) = self.host.measure(id) else {
            log::debug!("panel {} is not in the page, skipping measure", id);
            return;
        };
        let Some(panel) = self.panels.get_mut(&id) else {
            return;
        };

        let (geometry, style) = fit_shape(panel.kind, measured, panel.geometry.border_radius);
        if let Some(style) = style {
            self.host.apply_shape(id, &style);
        }

        let changed = geometry.size_changed(&panel.geometry);
        panel.geometry.border_radius = geometry.border_radius;
        if !changed {
            return;
        }

        log::debug!(
            "panel {} resized to {}x{}",
            id,
            geometry.width,
            geometry.height
        );
        panel.geometry = geometry;
        panel.surface.resize(geometry.width, geometry.height);
        if let Some(binding) = &panel.binding {
            binding.resize(&mut panel.surface, &geometry);
        }

        if panel.is_ready() {
            if let Err(e) = self.redraw(id) {
                log::warn!("redraw of panel {} failed: {}", id, e);
            }
        }
    }
}
