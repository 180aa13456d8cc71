#![forbid(unsafe_code)]

mod app;
mod config;
mod constants;
mod daemon;
mod debounce;
mod error;
mod indicators;
mod launcher;
mod menu;
mod model;
mod notification;
mod overlay;
mod reconcile;
mod timers;
mod tray;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use app::{App, Channels, Control};
use config::Settings;
use overlay::DesktopOverlay;

#[derive(Parser, Debug)]
#[command(version, about = "Panel indicator for the Eruption lighting daemon")]
struct Args {
    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Poll the daemon status periodically, regardless of the settings file
    #[arg(long)]
    poll_status: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // One thread: the event loop is the only writer of panel state
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    runtime.block_on(run(args))?;
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let settings = Settings::load(args.config.as_deref());
    info!("settings={:#?}", settings);

    let cancel = CancellationToken::new();
    let (command_tx, command_rx) = unbounded_channel();
    let (event_tx, event_rx) = unbounded_channel();
    let (intent_tx, intent_rx) = unbounded_channel();
    let (timer_tx, timer_rx) = unbounded_channel();
    let (control_tx, control_rx) = unbounded_channel();

    let worker = tokio::spawn(daemon::worker::run(command_rx, event_tx, cancel.clone()));

    let (overlay, overlay_rx) = DesktopOverlay::channel();
    let overlay_task = tokio::spawn(overlay::run(overlay_rx, cancel.clone()));

    let (panel, tray_task) = tray::spawn(intent_tx).await?;
    spawn_signal_listener(control_tx)?;

    let mut app = App::new(panel, overlay, settings, command_tx, timer_tx)
        .with_settings_path(args.config)
        .with_forced_polling(args.poll_status);
    let channels = Channels {
        bus_events: event_rx,
        intents: intent_rx,
        timers: timer_rx,
        control: control_rx,
    };
    app::run(&mut app, channels).await;

    // Dropping the app closes the tray and overlay channels
    drop(app);
    cancel.cancel();
    for (name, task) in [("worker", worker), ("overlay", overlay_task), ("tray", tray_task)] {
        if let Err(err) = task.await {
            error!(task = name, error = ?err, "task failed during shutdown");
        }
    }
    info!("eruption-panel stopped");
    Ok(())
}

#[cfg(unix)]
fn spawn_signal_listener(control: UnboundedSender<Control>) -> Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("Failed to register signal handlers")?;
    std::thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                info!(signal, "received signal");
                let request = if signal == SIGHUP {
                    Control::ReloadSettings
                } else {
                    Control::Shutdown
                };
                if control.send(request).is_err() {
                    break;
                }
            }
        })
        .context("Failed to spawn signal listener thread")?;
    Ok(())
}

#[cfg(not(unix))]
fn spawn_signal_listener(_control: UnboundedSender<Control>) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let args = Args::parse_from(["eruption-panel", "--config", "/tmp/panel.json", "--poll-status"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/panel.json")));
        assert!(args.poll_status);

        let args = Args::parse_from(["eruption-panel"]);
        assert_eq!(args.config, None);
        assert!(!args.poll_status);
    }
}
