//! Overlay backed by the desktop notification server
//!
//! [`DesktopOverlay`] is the synchronous handle the presenter drives; the
//! actual D-Bus calls happen on a task fed through a channel, so rendering
//! never blocks the event loop. A shown bubble keeps its server id and later
//! text updates replace it in place.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use zbus::proxy;
use zbus::zvariant::Value;

use crate::constants::{icons, tray};
use crate::notification::Overlay;

#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications",
    gen_blocking = false
)]
trait Notifications {
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: &HashMap<&str, &Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;

    fn close_notification(&self, id: u32) -> zbus::Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
enum OverlayOp {
    Show(String),
    SetText(String),
    FadeOut(Duration),
    Destroy,
}

pub struct DesktopOverlay {
    ops: UnboundedSender<OverlayOp>,
}

impl DesktopOverlay {
    /// Create the handle and the receiver for [`run`]
    pub fn channel() -> (Self, OverlayReceiver) {
        let (ops, rx) = unbounded_channel();
        (Self { ops }, OverlayReceiver(rx))
    }

    fn send(&self, op: OverlayOp) {
        if self.ops.send(op).is_err() {
            trace!("overlay task gone, dropping update");
        }
    }
}

pub struct OverlayReceiver(UnboundedReceiver<OverlayOp>);

impl Overlay for DesktopOverlay {
    fn show(&mut self, text: &str) {
        self.send(OverlayOp::Show(text.to_string()));
    }

    fn set_text(&mut self, text: &str) {
        self.send(OverlayOp::SetText(text.to_string()));
    }

    fn fade_out(&mut self, duration: Duration) {
        self.send(OverlayOp::FadeOut(duration));
    }

    fn destroy(&mut self) {
        self.send(OverlayOp::Destroy);
    }
}

struct Bubble<'a> {
    proxy: NotificationsProxy<'a>,
    id: Option<u32>,
}

impl Bubble<'_> {
    async fn post(&mut self, text: &str) -> Result<()> {
        let transient = Value::from(true);
        let hints = HashMap::from([("transient", &transient)]);
        let id = self
            .proxy
            .notify(
                tray::ID,
                self.id.unwrap_or(0),
                icons::CONNECTED,
                tray::TITLE,
                text,
                &[],
                &hints,
                -1,
            )
            .await
            .context("Failed to post notification")?;
        self.id = Some(id);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(id) = self.id.take() {
            self.proxy
                .close_notification(id)
                .await
                .with_context(|| format!("Failed to close notification {id}"))?;
        }
        Ok(())
    }

    async fn apply(&mut self, op: OverlayOp) -> Result<()> {
        match op {
            OverlayOp::Show(text) | OverlayOp::SetText(text) => self.post(&text).await,
            // The server animates its own bubbles
            OverlayOp::FadeOut(duration) => {
                trace!(fade_ms = duration.as_millis() as u64, "overlay fading");
                Ok(())
            }
            OverlayOp::Destroy => self.close().await,
        }
    }
}

/// Forward overlay operations to the notification server until cancelled
pub async fn run(ops: OverlayReceiver, cancel: CancellationToken) {
    let OverlayReceiver(mut ops) = ops;
    let proxy = match connect().await {
        Ok(proxy) => proxy,
        Err(err) => {
            warn!(error = ?err, "notification server unavailable, overlays disabled");
            return;
        }
    };
    let mut bubble = Bubble { proxy, id: None };

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            op = ops.recv() => match op {
                Some(op) => {
                    if let Err(err) = bubble.apply(op).await {
                        warn!(error = ?err, "overlay update failed");
                    }
                }
                None => break,
            },
        }
    }

    if let Err(err) = bubble.close().await {
        debug!(error = ?err, "failed to close overlay on shutdown");
    }
}

async fn connect() -> Result<NotificationsProxy<'static>> {
    let conn = zbus::Connection::session()
        .await
        .context("Failed to connect to the session bus")?;
    NotificationsProxy::new(&conn)
        .await
        .context("Failed to create notifications proxy")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_forwards_in_order() {
        let (mut overlay, OverlayReceiver(mut rx)) = DesktopOverlay::channel();
        overlay.show("Brightness: 40%");
        overlay.set_text("Brightness: 60%");
        overlay.fade_out(Duration::from_millis(500));
        overlay.destroy();

        let ops: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            ops,
            vec![
                OverlayOp::Show("Brightness: 40%".into()),
                OverlayOp::SetText("Brightness: 60%".into()),
                OverlayOp::FadeOut(Duration::from_millis(500)),
                OverlayOp::Destroy,
            ]
        );
    }

    #[test]
    fn test_closed_task_does_not_panic() {
        let (mut overlay, rx) = DesktopOverlay::channel();
        drop(rx);
        overlay.show("ignored");
        overlay.destroy();
    }
}
