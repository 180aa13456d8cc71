//! Registry of every scheduled callback
//!
//! Each timer is a sleeping task that reports back on a channel when it
//! elapses. The registry keeps one handle per [`TimerKind`] so teardown can
//! abort all of them, and stamps each schedule with a generation so a firing
//! that raced with a cancel or reschedule is recognised as stale.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    BrightnessDebounce,
    NotificationDisplay,
    NotificationFade,
    StatusPoll,
}

/// Sent on the fired channel when a timer elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub kind: TimerKind,
    pub generation: u64,
}

struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

pub struct TimerRegistry {
    pending: HashMap<TimerKind, PendingTimer>,
    next_generation: u64,
    fired_tx: UnboundedSender<TimerFired>,
}

impl TimerRegistry {
    pub fn new(fired_tx: UnboundedSender<TimerFired>) -> Self {
        Self {
            pending: HashMap::new(),
            next_generation: 0,
            fired_tx,
        }
    }

    /// Schedule `kind` to fire after `delay`, replacing any pending instance
    pub fn schedule(&mut self, kind: TimerKind, delay: Duration) {
        self.cancel(kind);
        self.next_generation += 1;
        let generation = self.next_generation;
        let fired_tx = self.fired_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired_tx.send(TimerFired { kind, generation });
        });
        trace!(kind = ?kind, generation, delay_ms = delay.as_millis() as u64, "timer scheduled");
        self.pending.insert(kind, PendingTimer { generation, handle });
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some(timer) = self.pending.remove(&kind) {
            timer.handle.abort();
            trace!(kind = ?kind, generation = timer.generation, "timer cancelled");
        }
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.contains_key(&kind)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Claim a firing. Returns `false` for stale generations, which must be ignored.
    pub fn acknowledge(&mut self, fired: TimerFired) -> bool {
        match self.pending.get(&fired.kind) {
            Some(timer) if timer.generation == fired.generation => {
                self.pending.remove(&fired.kind);
                true
            }
            _ => {
                debug!(kind = ?fired.kind, generation = fired.generation, "ignoring stale timer");
                false
            }
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, timer) in self.pending.drain() {
            timer.handle.abort();
        }
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending_timer() {
        let (tx, mut rx) = unbounded_channel();
        let mut timers = TimerRegistry::new(tx);

        timers.schedule(TimerKind::NotificationDisplay, Duration::from_millis(100));
        timers.schedule(TimerKind::NotificationDisplay, Duration::from_millis(100));
        assert_eq!(timers.pending_count(), 1);

        let fired = rx.recv().await.unwrap();
        assert!(timers.acknowledge(fired));
        assert_eq!(timers.pending_count(), 0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_is_rejected() {
        let (tx, mut rx) = unbounded_channel();
        let mut timers = TimerRegistry::new(tx);

        timers.schedule(TimerKind::StatusPoll, Duration::from_millis(10));
        let fired = rx.recv().await.unwrap();
        timers.schedule(TimerKind::StatusPoll, Duration::from_millis(10));

        assert!(!timers.acknowledge(fired));
        assert!(timers.is_pending(TimerKind::StatusPoll));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_leaves_nothing_pending() {
        let (tx, mut rx) = unbounded_channel();
        let mut timers = TimerRegistry::new(tx);

        timers.schedule(TimerKind::BrightnessDebounce, Duration::from_millis(15));
        timers.schedule(TimerKind::NotificationFade, Duration::from_millis(500));
        timers.schedule(TimerKind::StatusPoll, Duration::from_millis(3000));
        timers.cancel_all();
        assert_eq!(timers.pending_count(), 0);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}
