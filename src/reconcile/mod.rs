//! Reconcilers: the only writers of the [`ViewModel`]
//!
//! One reconciler per endpoint turns decoded property batches and signals into
//! view model mutations plus a list of [`Effect`]s for the event loop to carry
//! out (notifications, menu and indicator refreshes, follow-up commands).
//! Reconcilers never touch the UI or the bus directly.

mod config;
mod device;
mod effects;
mod profile;
mod slot;
mod status;

pub use config::ConfigReconciler;
pub use device::DeviceReconciler;
pub use effects::EffectsReconciler;
pub use profile::ProfileReconciler;
pub use slot::SlotReconciler;
pub use status::StatusReconciler;

use crate::daemon::{CallResult, Command, PropertyBatch, SignalPayload};
use crate::model::{Profile, ViewModel};
use crate::notification::NotificationKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(NotificationKind, String),
    /// Full rebuild, re-enumerating profiles
    RebuildMenu,
    /// Re-render with the current profile list
    RefreshMenu,
    /// Reconcile indicators against the device list (in place if membership is unchanged)
    SyncIndicators,
    RebuildIndicators,
    ClearIndicators,
    Dispatch(Command),
}

/// All per-endpoint reconcilers
#[derive(Debug, Default)]
pub struct Reconcilers {
    pub slot: SlotReconciler,
    pub profile: ProfileReconciler,
    pub config: ConfigReconciler,
    pub status: StatusReconciler,
    pub device: DeviceReconciler,
    pub effects: EffectsReconciler,
}

impl Reconcilers {
    pub fn apply_batch(
        &mut self,
        model: &mut ViewModel,
        batch: &PropertyBatch,
        profiles: &[Profile],
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        for change in &batch.changes {
            self.slot.on_property(model, change, &mut effects);
            self.profile
                .on_property(model, change, batch.initial, profiles, &mut effects);
            self.config.on_property(model, change, batch.initial, &mut effects);
            self.status.on_property(model, change, &mut effects);
            self.device.on_property(model, change, &mut effects);
            self.effects.on_property(model, change, batch.initial, &mut effects);
        }
        effects
    }

    pub fn apply_signal(
        &mut self,
        model: &mut ViewModel,
        signal: &SignalPayload,
        profiles: &[Profile],
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        match signal {
            SignalPayload::ActiveSlotChanged { slot } => {
                self.slot.on_active_slot_changed(model, *slot, &mut effects)
            }
            SignalPayload::ActiveProfileChanged { filename } => {
                self.profile
                    .on_active_profile_changed(model, filename, profiles, &mut effects)
            }
            SignalPayload::ProfilesChanged => effects.push(Effect::RebuildMenu),
            SignalPayload::BrightnessChanged { brightness } => {
                self.config.on_brightness(model, *brightness, false, &mut effects)
            }
            SignalPayload::DeviceStatusChanged(devices) => {
                self.device.on_device_status(model, devices.clone(), &mut effects)
            }
            SignalPayload::DeviceHotplug {
                usb_vid,
                usb_pid,
                failed,
            } => self
                .device
                .on_hotplug(model, *usb_vid, *usb_pid, *failed, &mut effects),
            SignalPayload::EffectsStatusChanged(event) => {
                self.effects.on_status_changed(event, &mut effects)
            }
        }
        effects
    }

    pub fn apply_call_result(&mut self, model: &mut ViewModel, result: &CallResult) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let CallResult::SlotProfiles(profiles) = result {
            self.slot.on_slot_profiles(model, profiles, &mut effects);
        }
        effects
    }
}
