//! Typed messages crossing the daemon boundary
//!
//! The worker decodes raw D-Bus traffic into [`BusEvent`]s and executes
//! [`Command`]s. Nothing past this module sees a `zvariant::Value` or a
//! positional tuple.

use crate::error::RemoteCallError;
use crate::model::{DeviceStatusEntry, Profile};

use super::EndpointName;

/// One decoded property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyChange {
    ActiveSlot(u64),
    SlotNames(Vec<String>),
    ActiveProfile(String),
    Brightness(i64),
    EnableSfx(bool),
    Running(bool),
    DeviceStatus(Vec<DeviceStatusEntry>),
    AmbientEffect(bool),
}

/// A set of property values from one endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyBatch {
    pub endpoint: EndpointName,
    pub changes: Vec<PropertyChange>,
    /// Set for the first read right after bind and for resync reads
    pub initial: bool,
}

/// Interface-defined signals, one variant per signal
#[derive(Debug, Clone, PartialEq)]
pub enum SignalPayload {
    ActiveSlotChanged { slot: u64 },
    ActiveProfileChanged { filename: String },
    ProfilesChanged,
    BrightnessChanged { brightness: i64 },
    DeviceStatusChanged(Vec<DeviceStatusEntry>),
    DeviceHotplug { usb_vid: u16, usb_pid: u16, failed: bool },
    EffectsStatusChanged(String),
}

impl SignalPayload {
    pub fn endpoint(&self) -> EndpointName {
        match self {
            SignalPayload::ActiveSlotChanged { .. } => EndpointName::Slot,
            SignalPayload::ActiveProfileChanged { .. } | SignalPayload::ProfilesChanged => {
                EndpointName::Profile
            }
            SignalPayload::BrightnessChanged { .. } => EndpointName::Config,
            SignalPayload::DeviceStatusChanged(_) | SignalPayload::DeviceHotplug { .. } => {
                EndpointName::Device
            }
            SignalPayload::EffectsStatusChanged(_) => EndpointName::Effects,
        }
    }
}

/// Results of read-only method calls the event loop asked for
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    Profiles(Vec<Profile>),
    SlotProfiles(Vec<String>),
}

#[derive(Debug)]
pub enum BusEvent {
    Bound {
        endpoint: EndpointName,
        result: Result<(), String>,
    },
    Properties(PropertyBatch),
    Signal(SignalPayload),
    CallCompleted(CallResult),
    CallFailed {
        /// The endpoint the failing call or read was addressed to
        endpoint: EndpointName,
        action: Action,
        error: RemoteCallError,
    },
    /// The `org.eruption` bus name gained or lost its owner
    DaemonPresence(bool),
}

/// Requests from the event loop to the worker
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SwitchSlot(u64),
    SwitchProfile(String),
    SetBrightness(i64),
    SetSfx(bool),
    SetAmbientEffect(bool),
    EnumProfiles,
    GetSlotProfiles,
    /// Re-read every cached property on every bound endpoint
    Resync,
    /// Re-read `Running` and `DeviceStatus`
    PollStatus,
    RefreshDeviceStatus,
}

impl Command {
    pub fn action(&self) -> Action {
        match self {
            Command::SwitchSlot(_) => Action::SwitchSlot,
            Command::SwitchProfile(_) => Action::SwitchProfile,
            Command::SetBrightness(_) => Action::SetBrightness,
            Command::SetSfx(_) => Action::SetSfx,
            Command::SetAmbientEffect(enabled) => Action::SetAmbientEffect(*enabled),
            Command::EnumProfiles => Action::EnumProfiles,
            Command::GetSlotProfiles => Action::GetSlotProfiles,
            Command::Resync => Action::Resync,
            Command::PollStatus => Action::PollStatus,
            Command::RefreshDeviceStatus => Action::RefreshDeviceStatus,
        }
    }

    /// Where the command goes; a resync is attributed to the slot read it ends with
    pub fn endpoint(&self) -> EndpointName {
        match self {
            Command::SwitchSlot(_) | Command::GetSlotProfiles | Command::Resync => {
                EndpointName::Slot
            }
            Command::SwitchProfile(_) | Command::EnumProfiles => EndpointName::Profile,
            Command::SetBrightness(_) | Command::SetSfx(_) => EndpointName::Config,
            Command::SetAmbientEffect(_) => EndpointName::Effects,
            Command::PollStatus => EndpointName::Status,
            Command::RefreshDeviceStatus => EndpointName::Device,
        }
    }
}

/// What a failed call was trying to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SwitchSlot,
    SwitchProfile,
    SetBrightness,
    SetSfx,
    /// Carries the value that was requested
    SetAmbientEffect(bool),
    EnumProfiles,
    GetSlotProfiles,
    Resync,
    PollStatus,
    RefreshDeviceStatus,
}

impl Action {
    /// Notification text for user-initiated actions; background reads are log-only
    pub fn user_message(self) -> Option<&'static str> {
        match self {
            Action::SwitchSlot => Some("Could not switch slots! Is Eruption running?"),
            Action::SwitchProfile => Some("Could not switch profiles! Is Eruption running?"),
            Action::SetBrightness => Some("Could not set brightness! Is Eruption running?"),
            Action::SetSfx => Some("Could not toggle audio effects! Is Eruption running?"),
            Action::SetAmbientEffect(_) => {
                Some("Could not toggle the ambient effect! Is the Eruption fx-proxy running?")
            }
            Action::EnumProfiles
            | Action::GetSlotProfiles
            | Action::Resync
            | Action::PollStatus
            | Action::RefreshDeviceStatus => None,
        }
    }
}
