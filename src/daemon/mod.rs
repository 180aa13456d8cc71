//! Connection to the Eruption daemon over D-Bus
//!
//! Six logical endpoints are bound asynchronously by the [`worker`]. Everything
//! the daemon tells us is decoded once at this boundary into typed
//! [`BusEvent`]s; everything we ask of it is a [`Command`].

mod decode;
pub mod events;
pub mod interfaces;
pub mod worker;

pub use events::{Action, BusEvent, CallResult, Command, PropertyBatch, PropertyChange, SignalPayload};

use std::fmt;
use tracing::{info, warn};

use crate::constants::dbus;

/// The remote interfaces the panel talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EndpointName {
    Slot,
    Profile,
    Config,
    Status,
    Device,
    /// Ambient effect, served by the fx-proxy on the session bus
    Effects,
}

/// Which bus an endpoint lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusKind {
    System,
    Session,
}

impl EndpointName {
    pub const ALL: [EndpointName; 6] = [
        EndpointName::Slot,
        EndpointName::Profile,
        EndpointName::Config,
        EndpointName::Status,
        EndpointName::Device,
        EndpointName::Effects,
    ];

    pub fn bus(self) -> BusKind {
        match self {
            EndpointName::Effects => BusKind::Session,
            _ => BusKind::System,
        }
    }

    pub fn service(self) -> &'static str {
        match self {
            EndpointName::Effects => dbus::FX_PROXY_SERVICE,
            _ => dbus::ERUPTION_SERVICE,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            EndpointName::Slot => dbus::SLOT_PATH,
            EndpointName::Profile => dbus::PROFILE_PATH,
            EndpointName::Config => dbus::CONFIG_PATH,
            EndpointName::Status => dbus::STATUS_PATH,
            EndpointName::Device => dbus::DEVICE_PATH,
            EndpointName::Effects => dbus::EFFECTS_PATH,
        }
    }

    pub fn interface(self) -> &'static str {
        match self {
            EndpointName::Slot => dbus::SLOT_INTERFACE,
            EndpointName::Profile => dbus::PROFILE_INTERFACE,
            EndpointName::Config => dbus::CONFIG_INTERFACE,
            EndpointName::Status => dbus::STATUS_INTERFACE,
            EndpointName::Device => dbus::DEVICE_INTERFACE,
            EndpointName::Effects => dbus::EFFECTS_INTERFACE,
        }
    }

    /// Properties mirrored into the view model
    pub fn properties(self) -> &'static [&'static str] {
        match self {
            EndpointName::Slot => &["ActiveSlot", "SlotNames"],
            EndpointName::Profile => &["ActiveProfile"],
            EndpointName::Config => &["Brightness", "EnableSfx"],
            EndpointName::Status => &["Running"],
            EndpointName::Device => &["DeviceStatus"],
            EndpointName::Effects => &["AmbientEffect"],
        }
    }
}

impl fmt::Display for EndpointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointName::Slot => "Slot",
            EndpointName::Profile => "Profile",
            EndpointName::Config => "Config",
            EndpointName::Status => "Status",
            EndpointName::Device => "Device",
            EndpointName::Effects => "Effects",
        };
        f.write_str(name)
    }
}

/// Binding state of one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EndpointState {
    #[default]
    Unbound,
    Bound,
    Error(String),
}

/// Binding state of all endpoints, as seen by the event loop
#[derive(Debug, Default)]
pub struct EndpointTable {
    states: [EndpointState; 6],
}

impl EndpointTable {
    fn index(endpoint: EndpointName) -> usize {
        EndpointName::ALL
            .iter()
            .position(|e| *e == endpoint)
            .unwrap_or_default()
    }

    /// Record a bind completion. Returns `true` the first time an endpoint
    /// enters the error state, so the failure is surfaced only once.
    pub fn record_bind(&mut self, endpoint: EndpointName, result: Result<(), String>) -> bool {
        let slot = &mut self.states[Self::index(endpoint)];
        match result {
            Ok(()) => {
                info!(endpoint = %endpoint, "endpoint bound");
                *slot = EndpointState::Bound;
                false
            }
            Err(error) => {
                warn!(endpoint = %endpoint, error = %error, "endpoint bind failed");
                let first = !matches!(slot, EndpointState::Error(_));
                *slot = EndpointState::Error(error);
                first
            }
        }
    }
}
