//! StatusNotifierItem panel
//!
//! The event loop renders through [`TrayPanel`], which only queues updates.
//! A task owned by [`spawn`] applies them to the ksni handle. Menu activations
//! come back as [`Intent`]s on the intents channel.

use anyhow::{Context, Result};
use ksni::menu::{CheckmarkItem, MenuItem, RadioGroup, RadioItem, StandardItem, SubMenu};
use ksni::{Orientation, Status, ToolTip, Tray, TrayMethods};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::app::{Intent, Panel};
use crate::constants::{brightness, icons, tray};
use crate::indicators::{IndicatorKind, IndicatorWidget};
use crate::menu::{MenuEntry, MenuModel, Toggle};

/// Brightness presets offered in the submenu
const BRIGHTNESS_STEPS: u8 = 10;

#[derive(Debug)]
enum TrayUpdate {
    Menu(MenuModel),
    Indicators(Vec<IndicatorWidget>),
    Connected(bool),
}

/// [`Panel`] handle for the tray; cheap to call from the event loop
pub struct TrayPanel {
    updates: UnboundedSender<TrayUpdate>,
}

impl TrayPanel {
    fn send(&self, update: TrayUpdate) {
        if self.updates.send(update).is_err() {
            trace!("tray task gone, dropping update");
        }
    }
}

impl Panel for TrayPanel {
    fn render_menu(&mut self, menu: &MenuModel) {
        self.send(TrayUpdate::Menu(menu.clone()));
    }

    fn render_indicators(&mut self, widgets: &[IndicatorWidget]) {
        self.send(TrayUpdate::Indicators(widgets.to_vec()));
    }

    fn set_connected(&mut self, connected: bool) {
        self.send(TrayUpdate::Connected(connected));
    }
}

pub struct EruptionTray {
    intents: UnboundedSender<Intent>,
    menu: MenuModel,
    indicators: Vec<IndicatorWidget>,
    connected: bool,
}

impl EruptionTray {
    fn new(intents: UnboundedSender<Intent>) -> Self {
        Self {
            intents,
            menu: MenuModel::default(),
            indicators: Vec::new(),
            connected: false,
        }
    }

    fn apply(&mut self, update: TrayUpdate) {
        match update {
            TrayUpdate::Menu(menu) => self.menu = menu,
            TrayUpdate::Indicators(widgets) => self.indicators = widgets,
            TrayUpdate::Connected(connected) => self.connected = connected,
        }
    }

    fn send(&self, intent: Intent) {
        debug!(intent = ?intent, "tray intent");
        if self.intents.send(intent).is_err() {
            trace!("event loop gone, dropping intent");
        }
    }

    fn indicator_lines(&self) -> String {
        self.indicators
            .iter()
            .map(|widget| {
                let kind = match widget.kind {
                    IndicatorKind::Battery => "battery",
                    IndicatorKind::SignalStrength => "signal",
                };
                match &widget.label {
                    Some(label) => format!("{}: {kind} {}", widget.device_name, label.trim()),
                    None => format!("{}: {kind}", widget.device_name),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Tray for EruptionTray {
    fn id(&self) -> String {
        tray::ID.to_string()
    }

    fn title(&self) -> String {
        tray::TITLE.to_string()
    }

    fn icon_name(&self) -> String {
        if self.connected {
            icons::CONNECTED
        } else {
            icons::DISCONNECTED
        }
        .to_string()
    }

    fn status(&self) -> Status {
        Status::Active
    }

    fn tool_tip(&self) -> ToolTip {
        let icon_name = match self.indicators.first() {
            Some(widget) => widget.icon_name.clone(),
            None => self.icon_name(),
        };
        ToolTip {
            icon_name,
            icon_pixmap: Vec::new(),
            title: tray::TITLE.to_string(),
            description: self.indicator_lines(),
        }
    }

    fn scroll(&mut self, delta: i32, orientation: Orientation) {
        if !matches!(orientation, Orientation::Vertical) || delta == 0 {
            return;
        }
        let step = if delta > 0 {
            brightness::SCROLL_STEP
        } else {
            -brightness::SCROLL_STEP
        };
        self.send(Intent::AdjustBrightness(step));
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        let mut items = menu_items(&self.menu);
        items.push(MenuItem::Separator);
        items.push(
            StandardItem {
                label: "Quit".to_string(),
                activate: Box::new(|tray: &mut Self| tray.send(Intent::Quit)),
                ..Default::default()
            }
            .into(),
        );
        items
    }
}

fn label_item(label: &str) -> MenuItem<EruptionTray> {
    StandardItem {
        label: label.to_string(),
        enabled: false,
        ..Default::default()
    }
    .into()
}

fn menu_items(model: &MenuModel) -> Vec<MenuItem<EruptionTray>> {
    let mut items = Vec::new();
    let mut entries = model.entries.iter().peekable();

    while let Some(entry) = entries.next() {
        match entry {
            MenuEntry::Placeholder(text) | MenuEntry::Header(text) => items.push(label_item(text)),
            MenuEntry::Slot { .. } => {
                // Consecutive slots form one radio group
                let mut slots = vec![entry];
                while let Some(next) = entries.next_if(|e| matches!(e, MenuEntry::Slot { .. })) {
                    slots.push(next);
                }
                items.push(slot_group(&slots));
            }
            MenuEntry::CurrentProfile(name) => items.push(label_item(name)),
            MenuEntry::ProfileChooser { profiles, active } => {
                let submenu = profiles
                    .iter()
                    .map(|profile| {
                        let filename = profile.filename.clone();
                        CheckmarkItem {
                            label: profile.name.clone(),
                            checked: active.as_deref() == Some(profile.filename.as_str()),
                            activate: Box::new(move |tray: &mut EruptionTray| {
                                tray.send(Intent::SelectProfile(filename.clone()))
                            }),
                            ..Default::default()
                        }
                        .into()
                    })
                    .collect();
                items.push(
                    SubMenu {
                        label: "Switch Profile".to_string(),
                        enabled: !profiles.is_empty(),
                        submenu,
                        ..Default::default()
                    }
                    .into(),
                );
            }
            MenuEntry::Launch(app) => {
                let app = *app;
                items.push(
                    StandardItem {
                        label: app.label().to_string(),
                        activate: Box::new(move |tray: &mut EruptionTray| tray.send(Intent::Launch(app))),
                        ..Default::default()
                    }
                    .into(),
                );
            }
            MenuEntry::Toggle { toggle, enabled } => {
                let intent = match toggle {
                    Toggle::AmbientEffect => Intent::ToggleAmbientEffect,
                    Toggle::Sfx => Intent::ToggleSfx,
                };
                items.push(
                    CheckmarkItem {
                        label: toggle.label().to_string(),
                        checked: *enabled,
                        activate: Box::new(move |tray: &mut EruptionTray| tray.send(intent.clone())),
                        ..Default::default()
                    }
                    .into(),
                );
            }
            MenuEntry::Brightness(value) => items.push(brightness_menu(*value)),
            MenuEntry::DeviceStatus {
                name,
                signal,
                battery,
            } => {
                let mut label = name.clone();
                if let Some(battery) = battery {
                    label.push_str(&format!("  battery {battery}"));
                }
                if let Some(signal) = signal {
                    label.push_str(&format!("  signal {signal}"));
                }
                items.push(label_item(&label));
            }
            MenuEntry::Separator => items.push(MenuItem::Separator),
        }
    }
    items
}

fn slot_group(slots: &[&MenuEntry]) -> MenuItem<EruptionTray> {
    let mut selected = 0;
    let mut options = Vec::with_capacity(slots.len());
    let mut indices = Vec::with_capacity(slots.len());
    for (position, entry) in slots.iter().enumerate() {
        if let MenuEntry::Slot {
            index,
            name,
            active,
        } = entry
        {
            if *active {
                selected = position;
            }
            indices.push(*index);
            options.push(RadioItem {
                label: name.clone(),
                ..Default::default()
            });
        }
    }
    RadioGroup {
        selected,
        select: Box::new(move |tray: &mut EruptionTray, position: usize| {
            if let Some(index) = indices.get(position) {
                tray.send(Intent::SelectSlot(*index));
            }
        }),
        options,
    }
    .into()
}

fn brightness_menu(value: u8) -> MenuItem<EruptionTray> {
    let options = (0..=brightness::MAX)
        .step_by(usize::from(BRIGHTNESS_STEPS))
        .map(|level| RadioItem {
            label: format!("{level}%"),
            ..Default::default()
        })
        .collect();
    let group = RadioGroup {
        selected: usize::from((value.min(brightness::MAX) + BRIGHTNESS_STEPS / 2) / BRIGHTNESS_STEPS),
        select: Box::new(|tray: &mut EruptionTray, position: usize| {
            let level = (position * usize::from(BRIGHTNESS_STEPS)).min(usize::from(brightness::MAX));
            tray.send(Intent::SetBrightness(level as u8));
        }),
        options,
    };
    SubMenu {
        label: format!("Brightness: {value}%"),
        submenu: vec![group.into()],
        ..Default::default()
    }
    .into()
}

/// Register the tray and start applying updates
///
/// The returned task ends, shutting the tray down, once the [`TrayPanel`] is
/// dropped.
pub async fn spawn(intents: UnboundedSender<Intent>) -> Result<(TrayPanel, JoinHandle<()>)> {
    let handle = EruptionTray::new(intents)
        .spawn()
        .await
        .context("Failed to register the tray icon")?;
    info!("tray icon registered");

    let (updates, mut rx) = unbounded_channel();
    let task = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            handle.update(move |tray: &mut EruptionTray| tray.apply(update)).await;
        }
        debug!("shutting down tray icon");
        handle.shutdown().await;
    });
    Ok((TrayPanel { updates }, task))
}
