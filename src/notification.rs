//! Transient notification overlay
//!
//! At most one overlay exists. A new message while one is visible (or fading)
//! replaces the text in place and restarts the display window. The lifecycle is
//! driven by two timers: display, then fade, then destroy.

use tracing::{debug, trace};

use crate::config::Settings;
use crate::timers::{TimerFired, TimerKind, TimerRegistry};

/// Category of a message, each gated by its own preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    ProfileSwitch,
    Hotplug,
    Settings,
}

/// The toolkit surface that draws the overlay
pub trait Overlay {
    fn show(&mut self, text: &str);
    fn set_text(&mut self, text: &str);
    fn fade_out(&mut self, duration: std::time::Duration);
    fn destroy(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Visible,
    Fading,
}

struct Visible {
    text: String,
    phase: Phase,
}

pub struct NotificationPresenter<O: Overlay> {
    overlay: O,
    current: Option<Visible>,
}

impl<O: Overlay> NotificationPresenter<O> {
    pub fn new(overlay: O) -> Self {
        Self {
            overlay,
            current: None,
        }
    }

    /// Show `text` unless `kind` is disabled, in which case nothing happens
    pub fn show(
        &mut self,
        kind: NotificationKind,
        text: &str,
        settings: &Settings,
        timers: &mut TimerRegistry,
    ) {
        if !settings.notification_enabled(kind) {
            trace!(kind = ?kind, text, "notification suppressed by preference");
            return;
        }
        debug!(kind = ?kind, text, "showing notification");

        timers.cancel(TimerKind::NotificationFade);
        match &mut self.current {
            Some(current) => {
                self.overlay.set_text(text);
                current.text = text.to_string();
                current.phase = Phase::Visible;
            }
            None => {
                self.overlay.show(text);
                self.current = Some(Visible {
                    text: text.to_string(),
                    phase: Phase::Visible,
                });
            }
        }
        timers.schedule(TimerKind::NotificationDisplay, settings.notification_display());
    }

    /// Advance the lifecycle; returns `true` if the timer belonged to us
    pub fn on_timer(&mut self, fired: TimerFired, settings: &Settings, timers: &mut TimerRegistry) -> bool {
        match fired.kind {
            TimerKind::NotificationDisplay => {
                if let Some(current) = &mut self.current {
                    current.phase = Phase::Fading;
                    self.overlay.fade_out(settings.notification_fade());
                    timers.schedule(TimerKind::NotificationFade, settings.notification_fade());
                }
                true
            }
            TimerKind::NotificationFade => {
                if self.current.take().is_some() {
                    self.overlay.destroy();
                }
                true
            }
            _ => false,
        }
    }

    pub fn teardown(&mut self, timers: &mut TimerRegistry) {
        timers.cancel(TimerKind::NotificationDisplay);
        timers.cancel(TimerKind::NotificationFade);
        if self.current.take().is_some() {
            self.overlay.destroy();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_fading(&self) -> bool {
        self.current.as_ref().is_some_and(|c| c.phase == Phase::Fading)
    }

    #[cfg(test)]
    pub fn text(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.text.as_str())
    }

    #[cfg(test)]
    pub fn overlay(&self) -> &O {
        &self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{OverlayCall, RecordingOverlay};
    use std::time::Duration;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    async fn next_fired(
        rx: &mut UnboundedReceiver<TimerFired>,
        timers: &mut TimerRegistry,
    ) -> TimerFired {
        loop {
            let fired = rx.recv().await.unwrap();
            if timers.acknowledge(fired) {
                return fired;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_show_replaces_text_in_place() {
        let settings = Settings::default();
        let (tx, mut rx) = unbounded_channel();
        let mut timers = TimerRegistry::new(tx);
        let mut presenter = NotificationPresenter::new(RecordingOverlay::default());

        presenter.show(NotificationKind::Settings, "Brightness: 40%", &settings, &mut timers);
        tokio::time::sleep(Duration::from_millis(600)).await;
        presenter.show(NotificationKind::Settings, "Brightness: 60%", &settings, &mut timers);

        assert_eq!(presenter.overlay().live_overlays(), 1);
        assert_eq!(presenter.text(), Some("Brightness: 60%"));
        assert_eq!(timers.pending_count(), 1);

        let fired = next_fired(&mut rx, &mut timers).await;
        assert_eq!(fired.kind, TimerKind::NotificationDisplay);
        presenter.on_timer(fired, &settings, &mut timers);
        assert!(presenter.is_fading());
        assert!(timers.is_pending(TimerKind::NotificationFade));
        assert_eq!(timers.pending_count(), 1);

        let fired = next_fired(&mut rx, &mut timers).await;
        presenter.on_timer(fired, &settings, &mut timers);
        assert!(!presenter.is_visible());
        assert_eq!(presenter.overlay().live_overlays(), 0);
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(
            presenter.overlay().calls,
            vec![
                OverlayCall::Show("Brightness: 40%".into()),
                OverlayCall::SetText("Brightness: 60%".into()),
                OverlayCall::FadeOut(Duration::from_millis(500)),
                OverlayCall::Destroy,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_during_fade_restores_visibility() {
        let settings = Settings::default();
        let (tx, mut rx) = unbounded_channel();
        let mut timers = TimerRegistry::new(tx);
        let mut presenter = NotificationPresenter::new(RecordingOverlay::default());

        presenter.show(NotificationKind::Error, "first", &settings, &mut timers);
        let fired = next_fired(&mut rx, &mut timers).await;
        presenter.on_timer(fired, &settings, &mut timers);
        assert!(presenter.is_fading());

        presenter.show(NotificationKind::Error, "second", &settings, &mut timers);
        assert!(!presenter.is_fading());
        assert!(!timers.is_pending(TimerKind::NotificationFade));
        assert!(timers.is_pending(TimerKind::NotificationDisplay));
        assert_eq!(presenter.overlay().live_overlays(), 1);
    }

    #[tokio::test]
    async fn test_disabled_kind_is_a_no_op() {
        let settings = Settings {
            notifications_on_hotplug: false,
            ..Settings::default()
        };
        let (tx, _rx) = unbounded_channel();
        let mut timers = TimerRegistry::new(tx);
        let mut presenter = NotificationPresenter::new(RecordingOverlay::default());

        presenter.show(NotificationKind::Hotplug, "Plugged mouse", &settings, &mut timers);
        assert!(!presenter.is_visible());
        assert!(presenter.overlay().calls.is_empty());
        assert_eq!(timers.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_teardown_destroys_overlay_and_timers() {
        let settings = Settings::default();
        let (tx, _rx) = unbounded_channel();
        let mut timers = TimerRegistry::new(tx);
        let mut presenter = NotificationPresenter::new(RecordingOverlay::default());

        presenter.show(NotificationKind::Error, "bye", &settings, &mut timers);
        presenter.teardown(&mut timers);
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(presenter.overlay().live_overlays(), 0);
    }
}
