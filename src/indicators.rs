//! Persistent per-device battery and signal indicators
//!
//! Membership changes (a device appeared or vanished) rebuild the whole set;
//! value-only changes update the existing widgets in place. The set counts its
//! rebuilds so callers can tell the two paths apart.

use tracing::debug;

use crate::config::Settings;
use crate::model::device::format_percent;
use crate::model::{catalog, DeviceKey, DeviceStatusEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    Battery,
    SignalStrength,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorWidget {
    pub device: DeviceKey,
    pub kind: IndicatorKind,
    pub device_name: String,
    pub icon_name: String,
    /// Only present when percentages are enabled
    pub label: Option<String>,
}

impl IndicatorWidget {
    fn new(entry: &DeviceStatusEntry, kind: IndicatorKind, settings: &Settings) -> Self {
        let mut widget = Self {
            device: entry.key(),
            kind,
            device_name: catalog::display_name(entry.key()),
            icon_name: String::new(),
            label: None,
        };
        widget.update(entry, settings);
        widget
    }

    fn update(&mut self, entry: &DeviceStatusEntry, settings: &Settings) {
        let reading = match self.kind {
            IndicatorKind::Battery => entry.battery_level(),
            IndicatorKind::SignalStrength => entry.signal_strength(),
        };
        self.icon_name = match self.kind {
            IndicatorKind::Battery => battery_icon(reading),
            IndicatorKind::SignalStrength => signal_icon(reading),
        }
        .to_string();
        self.label = settings
            .show_device_indicators_percentages
            .then(|| format_percent(reading));
    }
}

pub fn battery_icon(level: Option<u8>) -> &'static str {
    match level {
        None => "battery-missing-symbolic",
        Some(100..) => "battery-level-100-symbolic",
        Some(90..) => "battery-level-90-symbolic",
        Some(80..) => "battery-level-80-symbolic",
        Some(70..) => "battery-level-70-symbolic",
        Some(60..) => "battery-level-60-symbolic",
        Some(50..) => "battery-level-50-symbolic",
        Some(40..) => "battery-level-40-symbolic",
        Some(30..) => "battery-level-30-symbolic",
        Some(20..) => "battery-level-20-symbolic",
        Some(10..) => "battery-level-10-symbolic",
        Some(_) => "battery-empty-symbolic",
    }
}

pub fn signal_icon(strength: Option<u8>) -> &'static str {
    match strength {
        Some(90..) => "network-cellular-signal-excellent-symbolic",
        Some(60..) => "network-cellular-signal-good-symbolic",
        Some(40..) => "network-cellular-signal-ok-symbolic",
        Some(10..) => "network-cellular-signal-weak-symbolic",
        _ => "network-cellular-signal-none-symbolic",
    }
}

#[derive(Debug, Default)]
pub struct DeviceIndicatorSet {
    widgets: Vec<IndicatorWidget>,
    /// Device keys the current widgets were built from, in order
    bound_keys: Vec<DeviceKey>,
    rebuilds: u64,
    updates: u64,
}

impl DeviceIndicatorSet {
    /// Rebuild on membership change, otherwise update in place.
    /// Returns `true` if widgets were recreated.
    pub fn sync(&mut self, devices: &[DeviceStatusEntry], settings: &Settings) -> bool {
        let keys: Vec<DeviceKey> = devices.iter().map(DeviceStatusEntry::key).collect();
        if keys != self.bound_keys {
            self.rebuild(devices, settings);
            return true;
        }

        for widget in &mut self.widgets {
            if let Some(entry) = devices.iter().find(|d| d.key() == widget.device) {
                widget.update(entry, settings);
            }
        }
        self.updates += 1;
        false
    }

    /// Destroy every widget and recreate from `devices`
    pub fn rebuild(&mut self, devices: &[DeviceStatusEntry], settings: &Settings) {
        self.widgets.clear();
        self.bound_keys = devices.iter().map(DeviceStatusEntry::key).collect();
        self.rebuilds += 1;

        if !settings.show_device_indicators {
            debug!("device indicators disabled");
            return;
        }

        for entry in devices {
            if !catalog::supports_status(entry.key()) {
                continue;
            }
            if settings.show_battery_level {
                self.widgets
                    .push(IndicatorWidget::new(entry, IndicatorKind::Battery, settings));
            }
            if settings.show_signal_strength {
                self.widgets
                    .push(IndicatorWidget::new(entry, IndicatorKind::SignalStrength, settings));
            }
        }
        debug!(devices = devices.len(), widgets = self.widgets.len(), "rebuilt device indicators");
    }

    pub fn clear(&mut self) {
        if !self.widgets.is_empty() || !self.bound_keys.is_empty() {
            self.rebuilds += 1;
        }
        self.widgets.clear();
        self.bound_keys.clear();
    }

    pub fn widgets(&self) -> &[IndicatorWidget] {
        &self.widgets
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::device::parse_device_status;

    const KONE_PRO_AIR: &str = r#"{"usb_vid": 7805, "usb_pid": 11410, "status": {"battery-level-percent": 76, "signal-strength-percent": 95}}"#;
    const ELO_AIR: &str = r#"{"usb_vid": 7805, "usb_pid": 14903, "status": {"signal-strength-percent": 41}}"#;
    const VULCAN: &str = r#"{"usb_vid": 7805, "usb_pid": 12440}"#;

    fn devices(entries: &[&str]) -> Vec<DeviceStatusEntry> {
        parse_device_status(&format!("[{}]", entries.join(","))).unwrap()
    }

    #[test]
    fn test_order_is_device_then_battery_before_signal() {
        let mut set = DeviceIndicatorSet::default();
        set.sync(&devices(&[KONE_PRO_AIR, VULCAN, ELO_AIR]), &Settings::default());

        let kinds: Vec<_> = set.widgets().iter().map(|w| (w.device.usb_pid, w.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (0x2c92, IndicatorKind::Battery),
                (0x2c92, IndicatorKind::SignalStrength),
                (0x3a37, IndicatorKind::Battery),
                (0x3a37, IndicatorKind::SignalStrength),
            ]
        );
        assert_eq!(set.widgets()[0].device_name, "ROCCAT Kone Pro Air");
        assert_eq!(set.widgets()[0].icon_name, "battery-level-70-symbolic");
        assert_eq!(set.widgets()[1].icon_name, "network-cellular-signal-excellent-symbolic");
    }

    #[test]
    fn test_same_membership_updates_in_place() {
        let settings = Settings::default();
        let mut set = DeviceIndicatorSet::default();
        let list = devices(&[KONE_PRO_AIR, ELO_AIR]);

        assert!(set.sync(&list, &settings));
        assert!(!set.sync(&list, &settings));
        assert_eq!(set.rebuild_count(), 1);

        let changed = devices(&[
            r#"{"usb_vid": 7805, "usb_pid": 11410, "status": {"battery-level-percent": 5, "signal-strength-percent": 20}}"#,
            ELO_AIR,
        ]);
        assert!(!set.sync(&changed, &settings));
        assert_eq!(set.rebuild_count(), 1);
        assert_eq!(set.update_count(), 2);
        assert_eq!(set.widgets()[0].icon_name, "battery-empty-symbolic");
        assert_eq!(set.widgets()[0].label.as_deref(), Some(" 5%"));
    }

    #[test]
    fn test_membership_change_rebuilds() {
        let settings = Settings::default();
        let mut set = DeviceIndicatorSet::default();
        set.sync(&devices(&[KONE_PRO_AIR]), &settings);
        assert!(set.sync(&devices(&[KONE_PRO_AIR, ELO_AIR]), &settings));
        assert_eq!(set.rebuild_count(), 2);
        assert_eq!(set.widgets().len(), 4);
    }

    #[test]
    fn test_missing_battery_renders_placeholder() {
        let mut set = DeviceIndicatorSet::default();
        set.sync(&devices(&[ELO_AIR]), &Settings::default());

        let battery = &set.widgets()[0];
        assert_eq!(battery.kind, IndicatorKind::Battery);
        assert_eq!(battery.label.as_deref(), Some("--%"));
        assert_eq!(battery.icon_name, "battery-missing-symbolic");
    }

    #[test]
    fn test_preferences_gate_widgets() {
        let settings = Settings {
            show_signal_strength: false,
            show_device_indicators_percentages: false,
            ..Settings::default()
        };
        let mut set = DeviceIndicatorSet::default();
        set.sync(&devices(&[KONE_PRO_AIR]), &settings);
        assert_eq!(set.widgets().len(), 1);
        assert_eq!(set.widgets()[0].label, None);

        let hidden = Settings {
            show_device_indicators: false,
            ..Settings::default()
        };
        set.rebuild(&devices(&[KONE_PRO_AIR]), &hidden);
        assert!(set.is_empty());
    }

    #[test]
    fn test_signal_icon_thresholds() {
        assert_eq!(signal_icon(Some(60)), "network-cellular-signal-good-symbolic");
        assert_eq!(signal_icon(Some(9)), "network-cellular-signal-none-symbolic");
        assert_eq!(signal_icon(None), "network-cellular-signal-none-symbolic");
    }
}
