//! Input coalescing for the interactive search path.
//!
//! Each new input event schedules a delayed recomputation; a newer event
//! supersedes the pending one. The debouncer itself is just pending state
//! plus a deadline — the caller owns the clock and the recomputation, which
//! keeps the model single-threaded and the tests deterministic.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Schedules `value` for release one window after `now`, replacing any
    /// pending value.
    pub fn submit(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.window, value));
    }

    /// Releases the pending value once its quiet window has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => {
                self.pending.take().map(|(_, value)| value)
            }
            _ => None,
        }
    }

    /// Deadline of the pending value, if any; callers use it to bound their
    /// wait instead of polling.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }
}
