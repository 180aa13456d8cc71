//! Application-wide constants
//!
//! Bus names, object paths, timings and fixed labels used throughout the panel,
//! kept in one place so the daemon contract is easy to audit.

/// Eruption D-Bus names and object paths
pub mod dbus {
    /// Well-known name of the Eruption daemon on the system bus
    pub const ERUPTION_SERVICE: &str = "org.eruption";

    /// Well-known name of the fx-proxy (ambient effect) on the session bus
    pub const FX_PROXY_SERVICE: &str = "org.eruption.fx_proxy";

    pub const SLOT_PATH: &str = "/org/eruption/slot";
    pub const PROFILE_PATH: &str = "/org/eruption/profile";
    pub const CONFIG_PATH: &str = "/org/eruption/config";
    pub const STATUS_PATH: &str = "/org/eruption/status";
    pub const DEVICE_PATH: &str = "/org/eruption/devices";
    pub const EFFECTS_PATH: &str = "/org/eruption/fx_proxy/effects";

    pub const SLOT_INTERFACE: &str = "org.eruption.Slot";
    pub const PROFILE_INTERFACE: &str = "org.eruption.Profile";
    pub const CONFIG_INTERFACE: &str = "org.eruption.Config";
    pub const STATUS_INTERFACE: &str = "org.eruption.Status";
    pub const DEVICE_INTERFACE: &str = "org.eruption.Device";
    pub const EFFECTS_INTERFACE: &str = "org.eruption.fx_proxy.Effects";

    /// Error names that mean the daemon is not on the bus
    pub const DAEMON_ABSENT_ERRORS: &[&str] = &[
        "org.freedesktop.DBus.Error.ServiceUnknown",
        "org.freedesktop.DBus.Error.NameHasNoOwner",
        "org.freedesktop.DBus.Error.NoReply",
        "org.freedesktop.DBus.Error.Disconnected",
    ];
}

/// Hardware profile slots
pub mod slots {
    /// Number of fixed slots maintained by the daemon
    pub const SLOT_COUNT: usize = 4;

    /// Label prefix used when the daemon has no name for a slot
    pub const DEFAULT_NAME_PREFIX: &str = "Profile Slot";
}

/// Timer durations (milliseconds) and their accepted ranges
pub mod timing {
    pub const BRIGHTNESS_DEBOUNCE_MS: u64 = 15;
    pub const MIN_BRIGHTNESS_DEBOUNCE_MS: u64 = 10;
    pub const MAX_BRIGHTNESS_DEBOUNCE_MS: u64 = 50;

    pub const NOTIFICATION_DISPLAY_MS: u64 = 1200;
    pub const MIN_NOTIFICATION_DISPLAY_MS: u64 = 1000;
    pub const MAX_NOTIFICATION_DISPLAY_MS: u64 = 2000;

    pub const NOTIFICATION_FADE_MS: u64 = 500;
    pub const MIN_NOTIFICATION_FADE_MS: u64 = 300;
    pub const MAX_NOTIFICATION_FADE_MS: u64 = 800;

    /// Device status polling fallback interval
    pub const STATUS_POLL_INTERVAL_MS: u64 = 3000;
    pub const MIN_STATUS_POLL_INTERVAL_MS: u64 = 500;
}

/// Brightness range understood by the daemon
pub mod brightness {
    pub const MAX: u8 = 100;

    /// Value assumed when the daemon reports something outside 0..=100
    pub const UNKNOWN_SENTINEL: u8 = 100;

    /// Step applied per tray scroll notch
    pub const SCROLL_STEP: i32 = 5;
}

/// Keys of interest in a device status bag
pub mod device_status {
    pub const BATTERY_LEVEL: &str = "battery-level-percent";
    pub const SIGNAL_STRENGTH: &str = "signal-strength-percent";

    /// Rendered when a reading is missing from the status bag
    pub const UNKNOWN_PERCENT: &str = "--%";
}

/// Panel icons
pub mod icons {
    pub const CONNECTED: &str = "keyboard-brightness";
    pub const DISCONNECTED: &str = "gtk-no";
}

/// Configuration file location
pub mod config {
    pub const APP_DIR: &str = "eruption-panel";
    pub const FILENAME: &str = "settings.json";
}

/// Companion GUI executables
pub mod companions {
    pub const ERUPTION_GUI: &str = "/usr/bin/eruption-gui-gtk3";
    pub const PYROCLASM_UI: &str = "/usr/bin/pyroclasm";
}

/// Tray identity
pub mod tray {
    pub const ID: &str = "eruption-panel";
    pub const TITLE: &str = "Eruption";
}
