//! Per-device status reported by the daemon

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::constants::device_status;
use crate::error::PayloadError;

/// Identity of a managed device
///
/// Two attached units of the same make and model share a key; the daemon gives
/// us nothing better to tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceKey {
    pub usb_vid: u16,
    pub usb_pid: u16,
}

impl DeviceKey {
    pub fn new(usb_vid: u16, usb_pid: u16) -> Self {
        Self { usb_vid, usb_pid }
    }
}

impl std::fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.usb_vid, self.usb_pid)
    }
}

/// One entry of the `DeviceStatus` JSON array
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceStatusEntry {
    pub usb_vid: u16,
    pub usb_pid: u16,
    /// Loosely typed key/value bag; only a few keys are interpreted
    #[serde(default)]
    pub status: HashMap<String, Value>,
}

impl DeviceStatusEntry {
    pub fn key(&self) -> DeviceKey {
        DeviceKey::new(self.usb_vid, self.usb_pid)
    }

    pub fn battery_level(&self) -> Option<u8> {
        self.percent(device_status::BATTERY_LEVEL)
    }

    pub fn signal_strength(&self) -> Option<u8> {
        self.percent(device_status::SIGNAL_STRENGTH)
    }

    /// Read a percentage, accepting JSON numbers and numeric strings
    fn percent(&self, key: &str) -> Option<u8> {
        let raw = match self.status.get(key)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if !raw.is_finite() {
            return None;
        }
        Some(raw.round().clamp(0.0, 100.0) as u8)
    }
}

/// Decode the JSON-encoded device status list sent by the Device endpoint
pub fn parse_device_status(json: &str) -> Result<Vec<DeviceStatusEntry>, PayloadError> {
    Ok(serde_json::from_str(json)?)
}

/// Right-align a reading to two characters, `--%` when unknown
pub fn format_percent(value: Option<u8>) -> String {
    match value {
        Some(value) => format!("{value:>2}%"),
        None => device_status::UNKNOWN_PERCENT.to_string(),
    }
}
