//! Coalesce bursts of local updates into one deferred write

use std::time::Duration;

use crate::timers::{TimerKind, TimerRegistry};

/// Keeps the latest value of a burst; each push restarts the window
pub struct Debouncer<T> {
    kind: TimerKind,
    window: Duration,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(kind: TimerKind, window: Duration) -> Self {
        Self {
            kind,
            window,
            pending: None,
        }
    }

    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    pub fn push(&mut self, value: T, timers: &mut TimerRegistry) {
        self.pending = Some(value);
        timers.schedule(self.kind, self.window);
    }

    /// Called when the window elapsed; yields the last pushed value
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    pub fn cancel(&mut self, timers: &mut TimerRegistry) {
        self.pending = None;
        timers.cancel(self.kind);
    }
}
