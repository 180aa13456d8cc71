//! Decode raw property values into [`PropertyChange`]s

use tracing::{debug, warn};
use zbus::zvariant::Value;

use crate::error::PayloadError;
use crate::model::device::parse_device_status;

use super::{EndpointName, PropertyChange};

/// Decode one property of `endpoint`. Unknown names yield `None` silently;
/// malformed values are logged and skipped so the cached value stays as is.
pub(crate) fn decode_property(
    endpoint: EndpointName,
    name: &str,
    value: &Value<'_>,
) -> Option<PropertyChange> {
    match try_decode(endpoint, name, value) {
        Ok(change) => change,
        Err(err) => {
            warn!(endpoint = %endpoint, property = name, error = %err, "skipping malformed property value");
            None
        }
    }
}

fn try_decode(
    endpoint: EndpointName,
    name: &str,
    value: &Value<'_>,
) -> Result<Option<PropertyChange>, PayloadError> {
    let mismatch = || PayloadError::PropertyType(name.to_string());

    let change = match (endpoint, name) {
        (EndpointName::Slot, "ActiveSlot") => {
            let slot = as_i64(value).and_then(|v| u64::try_from(v).ok()).ok_or_else(mismatch)?;
            PropertyChange::ActiveSlot(slot)
        }
        (EndpointName::Slot, "SlotNames") => {
            PropertyChange::SlotNames(as_string_list(value).ok_or_else(mismatch)?)
        }
        (EndpointName::Profile, "ActiveProfile") => {
            PropertyChange::ActiveProfile(as_str(value).ok_or_else(mismatch)?.to_string())
        }
        (EndpointName::Config, "Brightness") => {
            PropertyChange::Brightness(as_i64(value).ok_or_else(mismatch)?)
        }
        (EndpointName::Config, "EnableSfx") => {
            PropertyChange::EnableSfx(as_bool(value).ok_or_else(mismatch)?)
        }
        (EndpointName::Status, "Running") => {
            PropertyChange::Running(as_bool(value).ok_or_else(mismatch)?)
        }
        (EndpointName::Device, "DeviceStatus") => {
            let json = as_str(value).ok_or_else(mismatch)?;
            PropertyChange::DeviceStatus(parse_device_status(json)?)
        }
        (EndpointName::Effects, "AmbientEffect") => {
            PropertyChange::AmbientEffect(as_bool(value).ok_or_else(mismatch)?)
        }
        _ => {
            debug!(endpoint = %endpoint, property = name, "ignoring unknown property");
            return Ok(None);
        }
    };
    Ok(Some(change))
}

fn as_i64(value: &Value<'_>) -> Option<i64> {
    match value {
        Value::I64(v) => Some(*v),
        Value::U64(v) => i64::try_from(*v).ok(),
        Value::I32(v) => Some(i64::from(*v)),
        Value::U32(v) => Some(i64::from(*v)),
        Value::I16(v) => Some(i64::from(*v)),
        Value::U16(v) => Some(i64::from(*v)),
        Value::U8(v) => Some(i64::from(*v)),
        Value::Value(inner) => as_i64(inner),
        _ => None,
    }
}

fn as_bool(value: &Value<'_>) -> Option<bool> {
    match value {
        Value::Bool(v) => Some(*v),
        Value::Value(inner) => as_bool(inner),
        _ => None,
    }
}

fn as_str<'v>(value: &'v Value<'_>) -> Option<&'v str> {
    match value {
        Value::Str(s) => Some(s.as_str()),
        Value::Value(inner) => as_str(inner),
        _ => None,
    }
}

fn as_string_list(value: &Value<'_>) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| as_str(item).map(str::to_string))
            .collect(),
        Value::Value(inner) => as_string_list(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_scalars() {
        assert_eq!(
            decode_property(EndpointName::Slot, "ActiveSlot", &Value::from(2u64)),
            Some(PropertyChange::ActiveSlot(2))
        );
        assert_eq!(
            decode_property(EndpointName::Config, "Brightness", &Value::from(42i64)),
            Some(PropertyChange::Brightness(42))
        );
        assert_eq!(
            decode_property(EndpointName::Status, "Running", &Value::from(true)),
            Some(PropertyChange::Running(true))
        );
        assert_eq!(
            decode_property(EndpointName::Profile, "ActiveProfile", &Value::from("spectrum.profile")),
            Some(PropertyChange::ActiveProfile("spectrum.profile".to_string()))
        );
    }

    #[test]
    fn test_decode_slot_names() {
        let names = vec!["Gaming".to_string(), "Work".to_string()];
        assert_eq!(
            decode_property(EndpointName::Slot, "SlotNames", &Value::from(names.clone())),
            Some(PropertyChange::SlotNames(names))
        );
    }

    #[test]
    fn test_decode_device_status_json() {
        let json = r#"[{"usb_vid": 7805, "usb_pid": 11410, "status": {"battery-level-percent": 55}}]"#;
        let Some(PropertyChange::DeviceStatus(devices)) =
            decode_property(EndpointName::Device, "DeviceStatus", &Value::from(json))
        else {
            panic!("expected device status");
        };
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].battery_level(), Some(55));
    }

    #[test]
    fn test_malformed_values_are_skipped() {
        assert_eq!(
            decode_property(EndpointName::Device, "DeviceStatus", &Value::from("[{oops")),
            None
        );
        assert_eq!(
            decode_property(EndpointName::Config, "Brightness", &Value::from("bright")),
            None
        );
        assert_eq!(
            decode_property(EndpointName::Slot, "ActiveSlot", &Value::from(-1i64)),
            None
        );
    }

    #[test]
    fn test_unknown_property_ignored() {
        assert_eq!(
            decode_property(EndpointName::Config, "ProfileName", &Value::from("x")),
            None
        );
        // Right name, wrong endpoint
        assert_eq!(
            decode_property(EndpointName::Status, "Brightness", &Value::from(5i64)),
            None
        );
    }
}
