//! User preferences persisted as JSON
//!
//! Every key has a default, so a partial or older file still loads. The file is
//! never required: a missing file is created with defaults, and an unreadable or
//! invalid one is logged and replaced by defaults in memory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::constants::timing::*;
use crate::notification::NotificationKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master switch; also gates error notifications
    pub notifications_general: bool,
    pub notifications_on_profile_switch: bool,
    pub notifications_on_hotplug: bool,
    pub notifications_on_settings_change: bool,

    /// Hide section headers in the menu
    pub compact_mode: bool,

    pub show_battery_level: bool,
    pub show_signal_strength: bool,
    pub show_device_indicators: bool,
    pub show_device_indicators_percentages: bool,

    /// Periodically re-read device status in case signals are lost
    pub status_poll_fallback: bool,
    pub status_poll_interval_ms: u64,

    pub brightness_debounce_ms: u64,
    pub notification_display_ms: u64,
    pub notification_fade_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications_general: true,
            notifications_on_profile_switch: true,
            notifications_on_hotplug: true,
            notifications_on_settings_change: true,
            compact_mode: false,
            show_battery_level: true,
            show_signal_strength: true,
            show_device_indicators: true,
            show_device_indicators_percentages: true,
            status_poll_fallback: false,
            status_poll_interval_ms: STATUS_POLL_INTERVAL_MS,
            brightness_debounce_ms: BRIGHTNESS_DEBOUNCE_MS,
            notification_display_ms: NOTIFICATION_DISPLAY_MS,
            notification_fade_ms: NOTIFICATION_FADE_MS,
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Load from `path` (or the default location). Never fails.
    pub fn load(path: Option<&Path>) -> Self {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        if !config_path.exists() {
            info!(path = %config_path.display(), "Settings file not found, writing defaults");
            let settings = Self::default();
            if let Err(err) = settings.save(&config_path) {
                warn!(error = ?err, "Could not write default settings");
            }
            return settings;
        }

        match Self::read(&config_path) {
            Ok(mut settings) => {
                settings.validate_and_clamp();
                info!(path = %config_path.display(), "Loaded settings");
                settings
            }
            Err(err) => {
                error!(path = %config_path.display(), error = ?err, "Invalid settings file, using defaults");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json).with_context(|| format!("Failed to write settings to {:?}", path))?;

        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Clamp timing values to their accepted ranges
    fn validate_and_clamp(&mut self) {
        self.brightness_debounce_ms = clamp_ms(
            "brightness_debounce_ms",
            self.brightness_debounce_ms,
            MIN_BRIGHTNESS_DEBOUNCE_MS,
            MAX_BRIGHTNESS_DEBOUNCE_MS,
        );
        self.notification_display_ms = clamp_ms(
            "notification_display_ms",
            self.notification_display_ms,
            MIN_NOTIFICATION_DISPLAY_MS,
            MAX_NOTIFICATION_DISPLAY_MS,
        );
        self.notification_fade_ms = clamp_ms(
            "notification_fade_ms",
            self.notification_fade_ms,
            MIN_NOTIFICATION_FADE_MS,
            MAX_NOTIFICATION_FADE_MS,
        );
        if self.status_poll_interval_ms < MIN_STATUS_POLL_INTERVAL_MS {
            warn!(
                status_poll_interval_ms = self.status_poll_interval_ms,
                min = MIN_STATUS_POLL_INTERVAL_MS,
                "status_poll_interval_ms below minimum, clamping"
            );
            self.status_poll_interval_ms = MIN_STATUS_POLL_INTERVAL_MS;
        }
    }

    pub fn notification_enabled(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Error => self.notifications_general,
            NotificationKind::ProfileSwitch => self.notifications_on_profile_switch,
            NotificationKind::Hotplug => self.notifications_on_hotplug,
            NotificationKind::Settings => self.notifications_on_settings_change,
        }
    }

    pub fn brightness_debounce(&self) -> Duration {
        Duration::from_millis(self.brightness_debounce_ms)
    }

    pub fn notification_display(&self) -> Duration {
        Duration::from_millis(self.notification_display_ms)
    }

    pub fn notification_fade(&self) -> Duration {
        Duration::from_millis(self.notification_fade_ms)
    }

    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_millis(self.status_poll_interval_ms)
    }
}

fn clamp_ms(key: &str, value: u64, min: u64, max: u64) -> u64 {
    if value < min {
        warn!(key, value, min, "timing below minimum, clamping");
        min
    } else if value > max {
        warn!(key, value, max, "timing exceeds maximum, clamping");
        max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("eruption-panel-test-{}-{}", std::process::id(), name))
            .join("settings.json")
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"compact_mode": true, "show_battery_level": false}"#).unwrap();
        assert!(settings.compact_mode);
        assert!(!settings.show_battery_level);
        assert!(settings.show_signal_strength);
        assert_eq!(settings.notification_display_ms, 1200);
    }

    #[test]
    fn test_validate_and_clamp_timings() {
        let mut settings = Settings {
            brightness_debounce_ms: 1,
            notification_display_ms: 10_000,
            notification_fade_ms: 400,
            status_poll_interval_ms: 10,
            ..Settings::default()
        };
        settings.validate_and_clamp();
        assert_eq!(settings.brightness_debounce_ms, 10);
        assert_eq!(settings.notification_display_ms, 2000);
        assert_eq!(settings.notification_fade_ms, 400);
        assert_eq!(settings.status_poll_interval_ms, 500);
    }

    #[test]
    fn test_error_notifications_follow_general_switch() {
        let settings = Settings {
            notifications_general: false,
            ..Settings::default()
        };
        assert!(!settings.notification_enabled(NotificationKind::Error));
        assert!(settings.notification_enabled(NotificationKind::Hotplug));
    }

    #[test]
    fn test_load_missing_writes_defaults_and_invalid_falls_back() {
        let path = temp_path("load");
        let _ = fs::remove_file(&path);

        let settings = Settings::load(Some(&path));
        assert_eq!(settings, Settings::default());
        assert!(path.exists());

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(Some(&path)), Settings::default());

        fs::write(&path, r#"{"notifications_on_hotplug": false}"#).unwrap();
        assert!(!Settings::load(Some(&path)).notifications_on_hotplug);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
