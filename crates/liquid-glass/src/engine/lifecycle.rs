//! Panel creation, parenting and teardown

use crate::error::GlassError;
use crate::host::{LayoutHost, SurfaceSpec, BUTTON_CLASS, CONTAINER_CLASS, SURFACE_TRANSITION};
use crate::panel::{ButtonOptions, Panel, PanelId, PanelOptions, PanelRole, ShaderState};
use crate::snapshot::PageRasterizer;

use super::GlassEngine;

impl<H: LayoutHost, R: PageRasterizer> GlassEngine<H, R> {
    /// Create a glass container and start its shader setup
    ///
    /// The first container triggers the page capture; later ones share it.
    pub fn create_panel(&mut self, options: PanelOptions) -> PanelId {
        let id = self.insert_panel(PanelRole::Container, options);
        self.request_measure(id);
        self.request_snapshot(id);
        id
    }

    /// Create a glass button
    ///
    /// Buttons stay deferred until [`add_child`](Self::add_child) adopts
    /// them into a parent panel.
    pub fn create_button(&mut self, options: ButtonOptions) -> PanelId {
        let id = self.insert_panel(PanelRole::Button { nested: false }, options.into_panel_options());
        self.request_measure(id);
        id
    }

    fn insert_panel(&mut self, role: PanelRole, options: PanelOptions) -> PanelId {
        let id = self.alloc_panel_id();

        let mut classes = vec![CONTAINER_CLASS];
        if let Some(class) = options.kind.host_class() {
            classes.push(class);
        }
        if matches!(role, PanelRole::Button { .. }) {
            classes.push(BUTTON_CLASS);
        }
        let spec = SurfaceSpec {
            classes,
            border_radius: options.border_radius,
            opacity: 0.0,
            transition: SURFACE_TRANSITION,
        };

        let surface = self.host.create_surface(id, &spec);
        log::debug!("created panel {} ({:?}, {:?})", id, role, options.kind);
        self.panels.insert(id, Panel::new(id, role, options, surface));
        id
    }

    /// Adopt `child` into `parent`
    ///
    /// A button adopted for the first time becomes nested and sets up its
    /// shader once the parent's shader is ready.
    pub fn add_child(&mut self, parent: PanelId, child: PanelId) -> Result<(), GlassError> {
        if parent == child {
            return Err(GlassError::SelfChild(parent));
        }
        self.require(parent)?;
        let existing = self.require(child)?.parent;
        if let Some(existing) = existing {
            return Err(GlassError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if self.is_ancestor(child, parent) {
            return Err(GlassError::Cycle { parent, child });
        }

        if let Some(p) = self.panels.get_mut(&parent) {
            p.children.push(child);
        }
        let mut promote = false;
        if let Some(c) = self.panels.get_mut(&child) {
            c.parent = Some(parent);
            if c.role == (PanelRole::Button { nested: false }) {
                c.role = PanelRole::Button { nested: true };
                promote = true;
            }
        }
        self.host.attach_child(parent, child);
        log::debug!("panel {} adopted {}", parent, child);

        let parent_ready = self.panels.get(&parent).map_or(false, |p| p.is_ready());
        if promote && parent_ready {
            self.request_snapshot(child);
        }

        self.request_measure(parent);
        self.request_measure(child);
        Ok(())
    }

    /// Detach `child` from `parent`
    ///
    /// The child keeps its shader; a button stays nested.
    pub fn remove_child(&mut self, parent: PanelId, child: PanelId) -> Result<(), GlassError> {
        self.require(parent)?;
        if self.require(child)?.parent != Some(parent) {
            return Err(GlassError::NotAChild { parent, child });
        }

        if let Some(p) = self.panels.get_mut(&parent) {
            p.children.retain(|c| *c != child);
        }
        if let Some(c) = self.panels.get_mut(&child) {
            c.parent = None;
        }
        self.host.detach_child(parent, child);

        self.request_measure(parent);
        Ok(())
    }

    /// Destroy a panel and its whole subtree
    ///
    /// Cancels every timer, pending frame, queued snapshot wait and pending
    /// decode the destroyed panels own.
    pub fn destroy_panel(&mut self, id: PanelId) -> Result<(), GlassError> {
        let parent = self.require(id)?.parent;
        if let Some(parent) = parent {
            if let Some(p) = self.panels.get_mut(&parent) {
                p.children.retain(|c| *c != id);
            }
            self.host.detach_child(parent, id);
            self.request_measure(parent);
        }

        for doomed in self.subtree_post_order(id) {
            self.timers.cancel_owner(doomed);
            self.frames.cancel(doomed);
            self.coordinator.forget(doomed);
            if let Some(panel) = self.panels.remove(&doomed) {
                if let ShaderState::Decoding(ticket) = panel.state {
                    log::debug!("dropping {} of destroyed panel {}", ticket, doomed);
                }
            }
            self.host.release_panel(doomed);
            log::debug!("destroyed panel {}", doomed);
        }
        Ok(())
    }

    fn require(&self, id: PanelId) -> Result<&Panel<H::Surface>, GlassError> {
        self.panels.get(&id).ok_or(GlassError::UnknownPanel(id))
    }

    /// True when `ancestor` is `id` or one of its parents
    fn is_ancestor(&self, ancestor: PanelId, id: PanelId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.panels.get(&current).and_then(|p| p.parent);
        }
        false
    }

    /// `id` and its descendants, children before parents
    fn subtree_post_order(&self, id: PanelId) -> Vec<PanelId> {
        let mut order = Vec::new();
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                order.push(current);
                continue;
            }
            stack.push((current, true));
            if let Some(panel) = self.panels.get(&current) {
                for child in panel.children.iter().rev() {
                    stack.push((*child, false));
                }
            }
        }
        order
    }
}
