//! Owner-scoped timers on an injected millisecond clock

use crate::panel::PanelId;

/// What a timer does when it fires
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Re-measure a panel after the viewport stopped resizing
    ResizeDebounce,
    /// Request a fresh page snapshot
    AutoRefresh,
}

/// Handle to a scheduled timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A timer that came due
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expired {
    pub id: TimerId,
    pub owner: PanelId,
    pub kind: TimerKind,
}

#[derive(Clone, Debug)]
struct Timer {
    id: TimerId,
    owner: PanelId,
    kind: TimerKind,
    due_ms: f64,
    period_ms: Option<f64>,
}

/// Pending timers, each owned by a panel
#[derive(Debug, Default)]
pub struct Timers {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Timers {
    /// Create an empty timer set
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, owner: PanelId, kind: TimerKind, due_ms: f64, period_ms: Option<f64>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Timer {
            id,
            owner,
            kind,
            due_ms,
            period_ms,
        });
        id
    }

    /// Fire once, `delay_ms` from `now_ms`
    pub fn schedule_once(&mut self, owner: PanelId, kind: TimerKind, now_ms: f64, delay_ms: f64) -> TimerId {
        self.push(owner, kind, now_ms + delay_ms, None)
    }

    /// Fire every `period_ms`, first at `now_ms + period_ms`
    pub fn schedule_interval(
        &mut self,
        owner: PanelId,
        kind: TimerKind,
        now_ms: f64,
        period_ms: f64,
    ) -> TimerId {
        self.push(owner, kind, now_ms + period_ms, Some(period_ms.max(1.0)))
    }

    /// Replace any pending `kind` timer of `owner` with a fresh one-shot
    pub fn restart(&mut self, owner: PanelId, kind: TimerKind, now_ms: f64, delay_ms: f64) -> TimerId {
        self.timers.retain(|t| !(t.owner == owner && t.kind == kind));
        self.schedule_once(owner, kind, now_ms, delay_ms)
    }

    /// Cancel one timer, returning whether it was pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Cancel every timer of `owner`, returning how many were pending
    pub fn cancel_owner(&mut self, owner: PanelId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.owner != owner);
        before - self.timers.len()
    }

    /// Cancel the timers of one kind for `owner`, returning whether any was pending
    pub fn cancel_kind(&mut self, owner: PanelId, kind: TimerKind) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.owner != owner || t.kind != kind);
        self.timers.len() != before
    }

    /// True when `owner` has a pending timer of `kind`
    pub fn has(&self, owner: PanelId, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.owner == owner && t.kind == kind)
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest due time
    pub fn next_due(&self) -> Option<f64> {
        self.timers.iter().map(|t| t.due_ms).reduce(f64::min)
    }

    /// Collect the timers due at `now_ms`, earliest first
    ///
    /// One-shot timers are removed. Interval timers fire at most once per
    /// call and are moved to their next period after `now_ms`, skipping any
    /// periods that were missed.
    pub fn expire(&mut self, now_ms: f64) -> Vec<Expired> {
        let mut due: Vec<(f64, Expired)> = self
            .timers
            .iter()
            .filter(|t| t.due_ms <= now_ms)
            .map(|t| {
                (
                    t.due_ms,
                    Expired {
                        id: t.id,
                        owner: t.owner,
                        kind: t.kind,
                    },
                )
            })
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.id.cmp(&b.1.id)));

        self.timers.retain(|t| t.due_ms > now_ms || t.period_ms.is_some());
        for timer in self.timers.iter_mut() {
            if let Some(period) = timer.period_ms {
                while timer.due_ms <= now_ms {
                    timer.due_ms += period;
                }
            }
        }

        due.into_iter().map(|(_, e)| e).collect()
    }
}
