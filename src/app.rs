//! Event loop state: routes bus events, user intents and timer firings
//!
//! Everything runs on one task, so the view model, the indicator set and the
//! notification presenter have a single writer. Handlers collect [`Effect`]s
//! and [`App::flush`] renders at most once per event.

use std::path::PathBuf;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::constants::brightness;
use crate::daemon::{Action, BusEvent, BusKind, CallResult, Command, EndpointTable};
use crate::debounce::Debouncer;
use crate::indicators::{DeviceIndicatorSet, IndicatorWidget};
use crate::launcher::{self, CompanionApp};
use crate::menu::{self, MenuModel};
use crate::model::{Profile, ViewModel};
use crate::notification::{NotificationKind, NotificationPresenter, Overlay};
use crate::reconcile::{Effect, Reconcilers};
use crate::timers::{TimerFired, TimerKind, TimerRegistry};

/// The surface the menu and indicators are drawn on
pub trait Panel {
    fn render_menu(&mut self, menu: &MenuModel);
    fn render_indicators(&mut self, widgets: &[IndicatorWidget]);
    fn set_connected(&mut self, connected: bool);
}

/// What the user asked for through the panel
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SelectSlot(usize),
    SelectProfile(String),
    SetBrightness(u8),
    /// Relative change, e.g. from scrolling on the panel icon
    AdjustBrightness(i32),
    ToggleSfx,
    ToggleAmbientEffect,
    Launch(CompanionApp),
    Quit,
}

/// Process-level requests (signals)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Shutdown,
    ReloadSettings,
}

#[derive(Debug, Default)]
struct Enumeration {
    in_flight: bool,
    /// A rebuild was requested while a call was in flight
    stale: bool,
}

#[derive(Debug, Default)]
struct Pending {
    menu: bool,
    indicators: bool,
}

pub struct App<P: Panel, O: Overlay> {
    model: ViewModel,
    settings: Settings,
    settings_path: Option<PathBuf>,
    force_poll: bool,
    endpoints: EndpointTable,
    reconcilers: Reconcilers,
    presenter: NotificationPresenter<O>,
    indicators: DeviceIndicatorSet,
    brightness: Debouncer<u8>,
    timers: TimerRegistry,
    panel: P,
    commands: UnboundedSender<Command>,
    profiles: Vec<Profile>,
    companions: Vec<CompanionApp>,
    enumeration: Enumeration,
    pending: Pending,
    shown_connected: Option<bool>,
    quit: bool,
}

impl<P: Panel, O: Overlay> App<P, O> {
    pub fn new(
        panel: P,
        overlay: O,
        settings: Settings,
        commands: UnboundedSender<Command>,
        timer_tx: UnboundedSender<TimerFired>,
    ) -> Self {
        let brightness = Debouncer::new(TimerKind::BrightnessDebounce, settings.brightness_debounce());
        Self {
            model: ViewModel::default(),
            settings,
            settings_path: None,
            force_poll: false,
            endpoints: EndpointTable::default(),
            reconcilers: Reconcilers::default(),
            presenter: NotificationPresenter::new(overlay),
            indicators: DeviceIndicatorSet::default(),
            brightness,
            timers: TimerRegistry::new(timer_tx),
            panel,
            commands,
            profiles: Vec::new(),
            companions: Vec::new(),
            enumeration: Enumeration::default(),
            pending: Pending::default(),
            shown_connected: None,
            quit: false,
        }
    }

    /// Where settings are reloaded from on SIGHUP
    pub fn with_settings_path(mut self, path: Option<PathBuf>) -> Self {
        self.settings_path = path;
        self
    }

    /// Keep the status poll running regardless of the settings file
    pub fn with_forced_polling(mut self, force: bool) -> Self {
        self.force_poll = force;
        self
    }

    /// Draw the initial (placeholder) state and arm the poll fallback
    pub fn start(&mut self) {
        info!("panel starting");
        self.pending.menu = true;
        self.pending.indicators = true;
        self.schedule_poll();
        self.flush();
    }

    pub fn handle_bus_event(&mut self, event: BusEvent) {
        let effects = match event {
            BusEvent::Bound { endpoint, result } => {
                let failure = result.as_ref().err().cloned();
                if self.endpoints.record_bind(endpoint, result)
                    && let Some(error) = failure
                {
                    error!(endpoint = %endpoint, error = %error, "endpoint unavailable");
                    vec![Effect::Notify(
                        NotificationKind::Error,
                        format!("Could not connect to the Eruption {endpoint} interface"),
                    )]
                } else {
                    Vec::new()
                }
            }
            BusEvent::Properties(batch) => {
                debug!(endpoint = %batch.endpoint, changes = batch.changes.len(), initial = batch.initial, "property batch");
                self.reconcilers
                    .apply_batch(&mut self.model, &batch, &self.profiles)
            }
            BusEvent::Signal(signal) => {
                debug!(endpoint = %signal.endpoint(), signal = ?signal, "signal");
                self.reconcilers
                    .apply_signal(&mut self.model, &signal, &self.profiles)
            }
            BusEvent::CallCompleted(CallResult::Profiles(profiles)) => {
                self.on_profiles(profiles);
                Vec::new()
            }
            BusEvent::CallCompleted(result) => {
                self.reconcilers.apply_call_result(&mut self.model, &result)
            }
            BusEvent::CallFailed {
                endpoint,
                action,
                error,
            } => {
                warn!(endpoint = %endpoint, action = ?action, error = %error, "remote call failed");
                let mut effects = Vec::new();
                if action == Action::EnumProfiles {
                    self.enumeration = Enumeration::default();
                }
                // Only the system bus endpoints are the daemon; the fx-proxy is optional
                if error.is_daemon_absent() && endpoint.bus() == BusKind::System {
                    self.reconcilers
                        .status
                        .daemon_lost(&mut self.model, &mut effects);
                } else if let Action::SetAmbientEffect(requested) = action {
                    self.model.ambient_effect_enabled = !requested;
                    effects.push(Effect::RefreshMenu);
                } else if action.user_message().is_some() {
                    // Undo the optimistic update
                    effects.push(Effect::Dispatch(Command::Resync));
                }
                if let Some(message) = action.user_message() {
                    effects.push(Effect::Notify(NotificationKind::Error, message.to_string()));
                }
                effects
            }
            BusEvent::DaemonPresence(present) => {
                let mut effects = Vec::new();
                self.reconcilers
                    .status
                    .on_presence(&mut self.model, present, &mut effects);
                effects
            }
        };
        self.apply(effects);
        self.flush();
    }

    pub fn handle_intent(&mut self, intent: Intent) {
        debug!(intent = ?intent, "user intent");
        match intent {
            Intent::Quit => {
                info!("quit requested from panel");
                self.quit = true;
            }
            Intent::Launch(app) => {
                if let Err(err) = app.launch() {
                    error!(error = ?err, "failed to launch companion app");
                    self.show(
                        NotificationKind::Error,
                        &format!("Could not start {}", app.path()),
                    );
                }
            }
            _ if !self.model.is_connected() => {
                debug!("ignoring intent while not connected");
            }
            Intent::SelectSlot(slot) => {
                if slot != self.model.active_slot {
                    self.dispatch(Command::SwitchSlot(slot as u64));
                }
            }
            Intent::SelectProfile(filename) => {
                if self.model.active_profile() != Some(filename.as_str()) {
                    self.dispatch(Command::SwitchProfile(filename));
                }
            }
            Intent::SetBrightness(value) => self.set_brightness(value),
            Intent::AdjustBrightness(delta) => {
                let value = (i32::from(self.model.brightness) + delta)
                    .clamp(0, i32::from(brightness::MAX));
                self.set_brightness(value as u8);
            }
            Intent::ToggleSfx => {
                self.model.sfx_enabled = !self.model.sfx_enabled;
                self.dispatch(Command::SetSfx(self.model.sfx_enabled));
                self.pending.menu = true;
            }
            Intent::ToggleAmbientEffect => {
                self.model.ambient_effect_enabled = !self.model.ambient_effect_enabled;
                self.dispatch(Command::SetAmbientEffect(self.model.ambient_effect_enabled));
                self.pending.menu = true;
            }
        }
        self.flush();
    }

    pub fn handle_timer(&mut self, fired: TimerFired) {
        if !self.timers.acknowledge(fired) {
            return;
        }
        match fired.kind {
            TimerKind::BrightnessDebounce => {
                if let Some(value) = self.brightness.take() {
                    self.dispatch(Command::SetBrightness(i64::from(value)));
                }
            }
            TimerKind::NotificationDisplay | TimerKind::NotificationFade => {
                self.presenter
                    .on_timer(fired, &self.settings, &mut self.timers);
            }
            TimerKind::StatusPoll => {
                self.dispatch(Command::PollStatus);
                self.schedule_poll();
            }
        }
        self.flush();
    }

    pub fn reload_settings(&mut self) {
        info!("reloading settings");
        self.settings = Settings::load(self.settings_path.as_deref());
        self.brightness.set_window(self.settings.brightness_debounce());
        self.schedule_poll();
        debug!(
            polling = self.timers.is_pending(TimerKind::StatusPoll),
            "settings applied"
        );
        self.apply(vec![Effect::RebuildMenu, Effect::RebuildIndicators]);
        self.flush();
    }

    /// Cancel every timer, destroy the overlay and clear the indicators
    pub fn teardown(&mut self) {
        info!("tearing down panel");
        if self.presenter.is_visible() {
            debug!(fading = self.presenter.is_fading(), "dismissing notification");
        }
        if let Some(value) = self.brightness.pending() {
            debug!(brightness = value, "dropping pending brightness write");
        }
        self.presenter.teardown(&mut self.timers);
        self.brightness.cancel(&mut self.timers);
        self.timers.cancel_all();
        self.indicators.clear();
        self.panel.render_indicators(self.indicators.widgets());
        debug_assert_eq!(self.timers.pending_count(), 0);
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    fn set_brightness(&mut self, value: u8) {
        let value = value.min(brightness::MAX);
        self.model.brightness = value;
        self.brightness.push(value, &mut self.timers);
        self.pending.menu = true;
    }

    fn schedule_poll(&mut self) {
        if self.force_poll || self.settings.status_poll_fallback {
            self.timers
                .schedule(TimerKind::StatusPoll, self.settings.status_poll_interval());
        } else {
            self.timers.cancel(TimerKind::StatusPoll);
        }
    }

    fn dispatch(&self, command: Command) {
        debug!(command = ?command, "dispatching command");
        if self.commands.send(command).is_err() {
            warn!("bus worker gone, dropping command");
        }
    }

    fn show(&mut self, kind: NotificationKind, text: &str) {
        self.presenter
            .show(kind, text, &self.settings, &mut self.timers);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Notify(kind, text) => self.show(kind, &text),
                Effect::RebuildMenu => {
                    self.companions = launcher::available();
                    self.request_profiles();
                    self.pending.menu = true;
                }
                Effect::RefreshMenu => self.pending.menu = true,
                Effect::SyncIndicators => {
                    if self.model.is_connected() {
                        let rebuilt = self
                            .indicators
                            .sync(&self.model.device_status, &self.settings);
                        debug!(
                            rebuilt,
                            rebuilds = self.indicators.rebuild_count(),
                            updates = self.indicators.update_count(),
                            "indicators synced"
                        );
                        self.pending.indicators = true;
                    }
                }
                Effect::RebuildIndicators => {
                    if self.model.is_connected() {
                        self.indicators
                            .rebuild(&self.model.device_status, &self.settings);
                    } else {
                        self.indicators.clear();
                    }
                    self.pending.indicators = true;
                }
                Effect::ClearIndicators => {
                    self.indicators.clear();
                    self.pending.indicators = true;
                }
                Effect::Dispatch(command) => self.dispatch(command),
            }
        }
    }

    /// Enumerate profiles, at most one call in flight
    fn request_profiles(&mut self) {
        if !self.model.is_connected() {
            return;
        }
        if self.enumeration.in_flight {
            self.enumeration.stale = true;
            return;
        }
        self.enumeration.in_flight = true;
        self.dispatch(Command::EnumProfiles);
    }

    fn on_profiles(&mut self, profiles: Vec<Profile>) {
        debug!(count = profiles.len(), "profiles enumerated");
        self.profiles = profiles;
        self.pending.menu = true;
        let stale = self.enumeration.stale;
        self.enumeration = Enumeration::default();
        if stale {
            self.request_profiles();
        }
    }

    /// Render whatever became dirty
    pub fn flush(&mut self) {
        let connected = self.model.is_connected();
        if self.shown_connected != Some(connected) {
            self.shown_connected = Some(connected);
            self.panel.set_connected(connected);
        }
        if std::mem::take(&mut self.pending.menu) {
            let menu = menu::build(&self.model, &self.profiles, &self.companions, &self.settings);
            debug!(
                entries = menu.entries.len(),
                placeholder = menu.is_placeholder(),
                "rendering menu"
            );
            self.panel.render_menu(&menu);
        }
        if std::mem::take(&mut self.pending.indicators) {
            self.panel.render_indicators(self.indicators.widgets());
        }
    }
}

#[cfg(test)]
impl<P: Panel, O: Overlay> App<P, O> {
    pub fn model(&self) -> &ViewModel {
        &self.model
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn presenter(&self) -> &NotificationPresenter<O> {
        &self.presenter
    }

    pub fn indicators(&self) -> &DeviceIndicatorSet {
        &self.indicators
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }
}

pub struct Channels {
    pub bus_events: UnboundedReceiver<BusEvent>,
    pub intents: UnboundedReceiver<Intent>,
    pub timers: UnboundedReceiver<TimerFired>,
    pub control: UnboundedReceiver<Control>,
}

/// Drive `app` until shutdown, then tear it down
pub async fn run<P: Panel, O: Overlay>(app: &mut App<P, O>, mut channels: Channels) {
    app.start();
    loop {
        tokio::select! {
            Some(event) = channels.bus_events.recv() => app.handle_bus_event(event),
            Some(intent) = channels.intents.recv() => app.handle_intent(intent),
            Some(fired) = channels.timers.recv() => app.handle_timer(fired),
            Some(control) = channels.control.recv() => match control {
                Control::ReloadSettings => app.reload_settings(),
                Control::Shutdown => break,
            },
            else => break,
        }
        if app.quit_requested() {
            break;
        }
    }
    app.teardown();
}
