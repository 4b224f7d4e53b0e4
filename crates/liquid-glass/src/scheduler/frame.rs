//! Next-frame measurement requests
//!
//! Geometry is measured on the next paint frame, after layout has settled.
//! Requests for the same panel within one frame coalesce into one
//! measurement.

use crate::panel::PanelId;

/// Panels waiting to be measured on the next frame
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: Vec<PanelId>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `panel`; returns false if it was already queued
    pub fn request(&mut self, panel: PanelId) -> bool {
        if self.pending.contains(&panel) {
            return false;
        }
        self.pending.push(panel);
        true
    }

    /// Drop a pending request
    pub fn cancel(&mut self, panel: PanelId) {
        self.pending.retain(|p| *p != panel);
    }

    pub fn is_pending(&self, panel: PanelId) -> bool {
        self.pending.contains(&panel)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending request in request order
    pub fn take(&mut self) -> Vec<PanelId> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_coalesce() {
        let mut q = FrameQueue::new();
        assert!(q.request(PanelId(1)));
        assert!(!q.request(PanelId(1)));
        assert!(q.request(PanelId(2)));
        assert_eq!(q.take(), vec![PanelId(1), PanelId(2)]);
        assert!(q.is_empty());
        assert!(q.request(PanelId(1)));
    }

    #[test]
    fn test_cancel() {
        let mut q = FrameQueue::new();
        q.request(PanelId(1));
        q.request(PanelId(2));
        q.cancel(PanelId(1));
        assert!(!q.is_pending(PanelId(1)));
        assert_eq!(q.take(), vec![PanelId(2)]);
    }
}
