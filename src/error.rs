//! Error types at the daemon boundary

use thiserror::Error;

use crate::constants::dbus::DAEMON_ABSENT_ERRORS;
use crate::daemon::EndpointName;

/// A remote method call or property write that did not go through
#[derive(Debug, Error)]
pub enum RemoteCallError {
    /// The endpoint never finished binding (or failed to), calls fail fast
    #[error("{0} endpoint is not bound")]
    Unbound(EndpointName),

    #[error("D-Bus call failed: {0}")]
    Bus(#[from] zbus::Error),

    /// The daemon answered but reported failure (`status == false`)
    #[error("daemon rejected the request")]
    Rejected,
}

impl RemoteCallError {
    /// Whether the failure means the daemon is gone rather than a bad request
    pub fn is_daemon_absent(&self) -> bool {
        match self {
            RemoteCallError::Bus(zbus::Error::MethodError(name, _, _)) => {
                DAEMON_ABSENT_ERRORS.contains(&name.as_str())
            }
            RemoteCallError::Bus(zbus::Error::FDO(err)) => matches!(
                err.as_ref(),
                zbus::fdo::Error::ServiceUnknown(_)
                    | zbus::fdo::Error::NameHasNoOwner(_)
                    | zbus::fdo::Error::NoReply(_)
            ),
            RemoteCallError::Bus(zbus::Error::InputOutput(_)) => true,
            _ => false,
        }
    }
}

/// A payload from the daemon that could not be decoded
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed device status JSON: {0}")]
    DeviceStatus(#[from] serde_json::Error),

    #[error("unexpected value type for property {0}")]
    PropertyType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbound_and_rejected_are_not_absence() {
        assert!(!RemoteCallError::Unbound(EndpointName::Slot).is_daemon_absent());
        assert!(!RemoteCallError::Rejected.is_daemon_absent());
    }

    #[test]
    fn test_payload_error_message_names_property() {
        let err = PayloadError::PropertyType("Brightness".to_string());
        assert_eq!(err.to_string(), "unexpected value type for property Brightness");
    }
}
