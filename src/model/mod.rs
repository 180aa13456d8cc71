//! Local view of the daemon's state
//!
//! The [`ViewModel`] is the single cache of everything the panel renders. It is
//! written by the reconcilers in response to confirmed remote events (and
//! optimistically by direct user actions) and read by the menu builder.

pub mod catalog;
pub mod device;

pub use device::{DeviceKey, DeviceStatusEntry};

use std::collections::BTreeMap;

use crate::constants::{brightness, slots};

/// Reachability of the daemon, derived from `org.eruption.Status.Running`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// No Status sync has happened yet
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

/// One selectable lighting profile, as returned by `EnumProfiles`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub filename: String,
}

impl Profile {
    pub fn new(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
        }
    }
}

/// Look up the display name of a profile file, `<unknown>` if not enumerated
pub fn profile_display_name(profiles: &[Profile], filename: &str) -> String {
    profiles
        .iter()
        .find(|p| p.filename == filename)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "<unknown>".to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub connectivity: Connectivity,
    /// Always in `0..SLOT_COUNT`
    pub active_slot: usize,
    pub slot_names: [String; slots::SLOT_COUNT],
    /// Sparse: only slots we have heard about
    pub active_profiles: BTreeMap<usize, String>,
    /// Always in `0..=100`
    pub brightness: u8,
    pub sfx_enabled: bool,
    pub ambient_effect_enabled: bool,
    pub device_status: Vec<DeviceStatusEntry>,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Unknown,
            active_slot: 0,
            slot_names: default_slot_names(),
            active_profiles: BTreeMap::new(),
            brightness: brightness::UNKNOWN_SENTINEL,
            sfx_enabled: false,
            ambient_effect_enabled: false,
            device_status: Vec::new(),
        }
    }
}

impl ViewModel {
    pub fn is_connected(&self) -> bool {
        self.connectivity == Connectivity::Connected
    }

    /// Profile file bound to the active slot, if known
    pub fn active_profile(&self) -> Option<&str> {
        self.active_profiles.get(&self.active_slot).map(String::as_str)
    }
}

pub fn default_slot_names() -> [String; slots::SLOT_COUNT] {
    std::array::from_fn(default_slot_name)
}

fn default_slot_name(index: usize) -> String {
    format!("{} {}", slots::DEFAULT_NAME_PREFIX, index + 1)
}

/// Fill a possibly short or partially empty name list from the daemon
pub fn normalize_slot_names(names: &[String]) -> [String; slots::SLOT_COUNT] {
    std::array::from_fn(|index| match names.get(index) {
        Some(name) if !name.trim().is_empty() => name.clone(),
        _ => default_slot_name(index),
    })
}

/// Map a raw brightness to 0..=100; anything outside is treated as unknown
pub fn clamp_brightness(raw: i64) -> u8 {
    if (0..=i64::from(brightness::MAX)).contains(&raw) {
        raw as u8
    } else {
        brightness::UNKNOWN_SENTINEL
    }
}

/// Validate a slot index reported by the daemon
pub fn slot_index(raw: u64) -> Option<usize> {
    usize::try_from(raw).ok().filter(|slot| *slot < slots::SLOT_COUNT)
}
