//! Static table of devices supported by Eruption 0.3.0
//!
//! Used for display names and to decide which devices can report
//! battery and signal readings.

use super::device::DeviceKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCatalogEntry {
    pub make: &'static str,
    pub model: &'static str,
    pub usb_vid: u16,
    pub usb_pid: u16,
    pub has_status_reporting: bool,
}

const fn entry(
    make: &'static str,
    model: &'static str,
    usb_vid: u16,
    usb_pid: u16,
    has_status_reporting: bool,
) -> DeviceCatalogEntry {
    DeviceCatalogEntry {
        make,
        model,
        usb_vid,
        usb_pid,
        has_status_reporting,
    }
}

pub const SUPPORTED_DEVICES: &[DeviceCatalogEntry] = &[
    entry("ROCCAT", "Vulcan 100/12x", 0x1e7d, 0x3098, false),
    entry("ROCCAT", "Vulcan 100/12x", 0x1e7d, 0x307a, false),
    entry("ROCCAT", "Vulcan Pro", 0x1e7d, 0x30f7, false),
    entry("ROCCAT", "Vulcan TKL", 0x1e7d, 0x2fee, false),
    entry("ROCCAT", "Vulcan Pro TKL", 0x1e7d, 0x311a, false),
    entry("ROCCAT", "Magma", 0x1e7d, 0x3124, false),
    entry("Corsair", "Corsair STRAFE Gaming Keyboard", 0x1b1c, 0x1b15, false),
    entry("ROCCAT", "Kone Aimo", 0x1e7d, 0x2e27, false),
    entry("ROCCAT", "Kone Aimo Remastered", 0x1e7d, 0x2e2c, false),
    entry("ROCCAT", "Kone XTD Mouse", 0x1e7d, 0x2e22, false),
    entry("ROCCAT", "Kone XP", 0x1e7d, 0x2c8b, false),
    entry("ROCCAT", "Kone Pure Ultra", 0x1e7d, 0x2dd2, false),
    entry("ROCCAT", "Burst Pro", 0x1e7d, 0x2de1, false),
    entry("ROCCAT", "Kone Pro Air Dongle", 0x1e7d, 0x2c8e, true),
    entry("ROCCAT", "Kone Pro Air", 0x1e7d, 0x2c92, true),
    entry("ROCCAT", "Kain 100 AIMO", 0x1e7d, 0x2d00, false),
    entry("ROCCAT", "Kain 200/202 AIMO", 0x1e7d, 0x2d5f, true),
    entry("ROCCAT", "Kain 200/202 AIMO", 0x1e7d, 0x2d60, true),
    entry("ROCCAT", "Kova AIMO", 0x1e7d, 0x2cf1, false),
    entry("ROCCAT", "Kova AIMO", 0x1e7d, 0x2cf3, false),
    entry("ROCCAT", "Kova 2016", 0x1e7d, 0x2cee, false),
    entry("ROCCAT", "Kova 2016", 0x1e7d, 0x2cef, false),
    entry("ROCCAT", "Kova 2016", 0x1e7d, 0x2cf0, false),
    entry("ROCCAT", "Nyth", 0x1e7d, 0x2e7c, false),
    entry("ROCCAT", "Nyth", 0x1e7d, 0x2e7d, false),
    entry("ROCCAT/Turtle Beach", "Elo 7.1 Air", 0x1e7d, 0x3a37, true),
    entry("ROCCAT", "Sense AIMO XXL", 0x1e7d, 0x343b, false),
];

pub fn lookup(key: DeviceKey) -> Option<&'static DeviceCatalogEntry> {
    SUPPORTED_DEVICES
        .iter()
        .find(|e| e.usb_vid == key.usb_vid && e.usb_pid == key.usb_pid)
}

pub fn display_name(key: DeviceKey) -> String {
    match lookup(key) {
        Some(device) => format!("{} {}", device.make, device.model),
        None => "<Unknown Device>".to_string(),
    }
}

pub fn supports_status(key: DeviceKey) -> bool {
    lookup(key).is_some_and(|device| device.has_status_reporting)
}
