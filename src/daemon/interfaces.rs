//! zbus proxies for the Eruption daemon interfaces
//!
//! Signals whose name collides with a property-changed stream (e.g. the
//! `ActiveSlot` property vs. the `ActiveSlotChanged` signal) are renamed on the
//! Rust side; the wire names are given explicitly.

use zbus::proxy;

#[proxy(
    interface = "org.eruption.Slot",
    default_service = "org.eruption",
    default_path = "/org/eruption/slot",
    gen_blocking = false
)]
pub trait Slot {
    fn get_slot_profiles(&self) -> zbus::Result<Vec<String>>;

    fn switch_slot(&self, slot: u64) -> zbus::Result<bool>;

    #[zbus(property)]
    fn active_slot(&self) -> zbus::Result<u64>;

    #[zbus(property)]
    fn slot_names(&self) -> zbus::Result<Vec<String>>;

    #[zbus(signal, name = "ActiveSlotChanged")]
    fn slot_switched(&self, slot: u64) -> zbus::Result<()>;
}

#[proxy(
    interface = "org.eruption.Profile",
    default_service = "org.eruption",
    default_path = "/org/eruption/profile",
    gen_blocking = false
)]
pub trait Profile {
    /// `(name, filename)` pairs
    fn enum_profiles(&self) -> zbus::Result<Vec<(String, String)>>;

    fn switch_profile(&self, filename: &str) -> zbus::Result<bool>;

    #[zbus(property)]
    fn active_profile(&self) -> zbus::Result<String>;

    #[zbus(signal, name = "ActiveProfileChanged")]
    fn profile_switched(&self, profile_name: String) -> zbus::Result<()>;

    #[zbus(signal)]
    fn profiles_changed(&self) -> zbus::Result<()>;
}

#[proxy(
    interface = "org.eruption.Config",
    default_service = "org.eruption",
    default_path = "/org/eruption/config",
    gen_blocking = false
)]
pub trait Config {
    #[zbus(property)]
    fn brightness(&self) -> zbus::Result<i64>;

    #[zbus(property)]
    fn set_brightness(&self, value: i64) -> zbus::Result<()>;

    #[zbus(property)]
    fn enable_sfx(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn set_enable_sfx(&self, value: bool) -> zbus::Result<()>;

    #[zbus(signal, name = "BrightnessChanged")]
    fn brightness_updated(&self, brightness: i64) -> zbus::Result<()>;
}

#[proxy(
    interface = "org.eruption.Status",
    default_service = "org.eruption",
    default_path = "/org/eruption/status",
    gen_blocking = false
)]
pub trait Status {
    #[zbus(property)]
    fn running(&self) -> zbus::Result<bool>;
}

#[proxy(
    interface = "org.eruption.Device",
    default_service = "org.eruption",
    default_path = "/org/eruption/devices",
    gen_blocking = false
)]
pub trait Device {
    /// JSON-encoded array of per-device status bags
    #[zbus(property)]
    fn device_status(&self) -> zbus::Result<String>;

    #[zbus(signal, name = "DeviceStatusChanged")]
    fn device_status_updated(&self, status: String) -> zbus::Result<()>;

    #[zbus(signal)]
    fn device_hotplug(&self, device_info: (u16, u16, bool)) -> zbus::Result<()>;
}

#[proxy(
    interface = "org.eruption.fx_proxy.Effects",
    default_service = "org.eruption.fx_proxy",
    default_path = "/org/eruption/fx_proxy/effects",
    gen_blocking = false
)]
pub trait Effects {
    #[zbus(property)]
    fn ambient_effect(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn set_ambient_effect(&self, value: bool) -> zbus::Result<()>;

    #[zbus(signal)]
    fn status_changed(&self, event: String) -> zbus::Result<()>;
}
