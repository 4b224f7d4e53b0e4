//! Render loop scheduling
//!
//! The engine is single-threaded and owns no clock. The host passes the
//! current time into every event, and deferred work waits here until the
//! host's next `tick` or animation frame.

mod frame;
mod timers;

pub use frame::FrameQueue;
pub use timers::{Expired, TimerId, TimerKind, Timers};

/// Quiet period after the last viewport resize before re-measuring
pub const RESIZE_DEBOUNCE_MS: f64 = 500.0;

/// Period of the auto-refresh capture timer
pub const AUTO_REFRESH_INTERVAL_MS: f64 = 500.0;
