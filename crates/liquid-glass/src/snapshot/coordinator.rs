//! Shared snapshot state machine
//!
//! Holds the one page snapshot every panel samples from, the capture that
//! may currently be in flight, and the panels waiting for the first capture.
//! At most one capture is in flight at any time. Results carry the
//! [`CaptureTicket`] they were issued for, and results for any ticket other
//! than the in-flight one are ignored.

use std::fmt;
use std::rc::Rc;

use crate::panel::PanelId;

use super::PageSnapshot;

/// Identifies one capture request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptureTicket(u64);

impl CaptureTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CaptureTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "capture#{}", self.0)
    }
}

/// What a panel asking for the snapshot must do next
pub enum InitDecision {
    /// A snapshot exists; set up the shader right away
    Ready(Rc<dyn PageSnapshot>),
    /// A capture is in flight; the panel was queued
    Queued,
    /// The panel was queued and this capture must be started
    StartCapture(CaptureTicket),
}

impl fmt::Debug for InitDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitDecision::Ready(s) => write!(f, "Ready({}x{})", s.width(), s.height()),
            InitDecision::Queued => write!(f, "Queued"),
            InitDecision::StartCapture(t) => write!(f, "StartCapture({})", t),
        }
    }
}

/// The shared snapshot, the capture flag and the wait queue
#[derive(Default)]
pub struct SnapshotCoordinator {
    current: Option<Rc<dyn PageSnapshot>>,
    in_flight: Option<CaptureTicket>,
    waiting: Vec<PanelId>,
    next_ticket: u64,
}

impl SnapshotCoordinator {
    /// Create a coordinator with no snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent snapshot
    pub fn current(&self) -> Option<Rc<dyn PageSnapshot>> {
        self.current.clone()
    }

    pub fn is_capturing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The in-flight ticket, if any
    pub fn in_flight(&self) -> Option<CaptureTicket> {
        self.in_flight
    }

    /// Panels waiting for the first snapshot, in request order
    pub fn waiting(&self) -> &[PanelId] {
        &self.waiting
    }

    fn issue(&mut self) -> CaptureTicket {
        self.next_ticket += 1;
        let ticket = CaptureTicket(self.next_ticket);
        self.in_flight = Some(ticket);
        ticket
    }

    /// Decide how `panel` gets its snapshot
    pub fn request_for(&mut self, panel: PanelId) -> InitDecision {
        if let Some(snapshot) = &self.current {
            return InitDecision::Ready(snapshot.clone());
        }
        if !self.waiting.contains(&panel) {
            self.waiting.push(panel);
        }
        if self.in_flight.is_some() {
            InitDecision::Queued
        } else {
            InitDecision::StartCapture(self.issue())
        }
    }

    /// Start a refresh capture unless one is already in flight
    pub fn try_begin_refresh(&mut self) -> Option<CaptureTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        Some(self.issue())
    }

    /// Store a finished capture and drain the wait queue
    ///
    /// Returns the drained panels in request order, or `None` when
    /// `ticket` is not the in-flight capture.
    pub fn complete(
        &mut self,
        ticket: CaptureTicket,
        snapshot: Rc<dyn PageSnapshot>,
    ) -> Option<Vec<PanelId>> {
        if self.in_flight != Some(ticket) {
            return None;
        }
        self.in_flight = None;
        self.current = Some(snapshot);
        Some(std::mem::take(&mut self.waiting))
    }

    /// Abandon a failed capture and clear the wait queue
    ///
    /// Returns the panels that were waiting, or `None` for a stale ticket.
    pub fn fail(&mut self, ticket: CaptureTicket) -> Option<Vec<PanelId>> {
        if self.in_flight != Some(ticket) {
            return None;
        }
        self.in_flight = None;
        Some(std::mem::take(&mut self.waiting))
    }

    /// Drop a destroyed panel from the wait queue
    pub fn forget(&mut self, panel: PanelId) {
        self.waiting.retain(|p| *p != panel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MemorySnapshot;
    use crate::snapshot::ImageData;

    fn snapshot() -> Rc<dyn PageSnapshot> {
        Rc::new(MemorySnapshot::new(ImageData::filled(4, 4, [10, 20, 30, 255])))
    }

    #[test]
    fn test_first_request_starts_capture() {
        let mut c = SnapshotCoordinator::new();
        let decision = c.request_for(PanelId(1));
        assert!(matches!(decision, InitDecision::StartCapture(_)));
        assert!(c.is_capturing());
        assert_eq!(c.waiting(), &[PanelId(1)]);
    }

    #[test]
    fn test_requests_during_capture_queue_in_order() {
        let mut c = SnapshotCoordinator::new();
        let InitDecision::StartCapture(ticket) = c.request_for(PanelId(1)) else {
            panic!("expected a capture");
        };
        assert!(matches!(c.request_for(PanelId(2)), InitDecision::Queued));
        assert!(matches!(c.request_for(PanelId(3)), InitDecision::Queued));
        assert!(c.try_begin_refresh().is_none());

        let drained = c.complete(ticket, snapshot()).unwrap();
        assert_eq!(drained, vec![PanelId(1), PanelId(2), PanelId(3)]);
        assert!(!c.is_capturing());
        assert!(c.waiting().is_empty());
        assert!(matches!(c.request_for(PanelId(4)), InitDecision::Ready(_)));
    }

    #[test]
    fn test_failure_clears_queue_and_keeps_no_snapshot() {
        let mut c = SnapshotCoordinator::new();
        let InitDecision::StartCapture(ticket) = c.request_for(PanelId(1)) else {
            panic!("expected a capture");
        };
        c.request_for(PanelId(2));
        assert_eq!(c.fail(ticket), Some(vec![PanelId(1), PanelId(2)]));
        assert!(!c.is_capturing());
        assert!(c.current().is_none());
        // A later request starts a new capture
        assert!(matches!(c.request_for(PanelId(3)), InitDecision::StartCapture(t) if t != ticket));
    }

    #[test]
    fn test_stale_tickets_are_ignored() {
        let mut c = SnapshotCoordinator::new();
        let InitDecision::StartCapture(first) = c.request_for(PanelId(1)) else {
            panic!("expected a capture");
        };
        c.fail(first);
        let second = c.try_begin_refresh().unwrap();
        assert!(c.complete(first, snapshot()).is_none());
        assert!(c.fail(first).is_none());
        assert!(c.is_capturing());
        assert!(c.complete(second, snapshot()).is_some());
    }

    #[test]
    fn test_refresh_replaces_snapshot() {
        let mut c = SnapshotCoordinator::new();
        let first = c.try_begin_refresh().unwrap();
        c.complete(first, snapshot());
        let replacement: Rc<dyn PageSnapshot> =
            Rc::new(MemorySnapshot::new(ImageData::filled(8, 2, [0; 4])));
        let second = c.try_begin_refresh().unwrap();
        c.complete(second, replacement);
        assert_eq!(c.current().map(|s| s.width()), Some(8));
    }

    #[test]
    fn test_forget_removes_waiter() {
        let mut c = SnapshotCoordinator::new();
        c.request_for(PanelId(1));
        c.request_for(PanelId(2));
        c.request_for(PanelId(2));
        c.forget(PanelId(1));
        assert_eq!(c.waiting(), &[PanelId(2)]);
    }
}
