use tracing::info;

use crate::daemon::{Command, PropertyChange};
use crate::model::{catalog, DeviceKey, DeviceStatusEntry, ViewModel};
use crate::notification::NotificationKind;

use super::Effect;

#[derive(Debug, Default)]
pub struct DeviceReconciler;

impl DeviceReconciler {
    pub fn on_property(&mut self, model: &mut ViewModel, change: &PropertyChange, effects: &mut Vec<Effect>) {
        if let PropertyChange::DeviceStatus(devices) = change {
            self.on_device_status(model, devices.clone(), effects);
        }
    }

    /// Store the list; indicators follow only while connected
    pub fn on_device_status(
        &mut self,
        model: &mut ViewModel,
        devices: Vec<DeviceStatusEntry>,
        effects: &mut Vec<Effect>,
    ) {
        model.device_status = devices;
        if model.is_connected() {
            effects.push(Effect::SyncIndicators);
            effects.push(Effect::RefreshMenu);
        }
    }

    pub fn on_hotplug(
        &mut self,
        model: &mut ViewModel,
        usb_vid: u16,
        usb_pid: u16,
        failed: bool,
        effects: &mut Vec<Effect>,
    ) {
        info!(usb_vid, usb_pid, failed, "device hotplug");
        effects.push(Effect::Notify(
            NotificationKind::Hotplug,
            hotplug_message(usb_vid, usb_pid, failed),
        ));
        if model.is_connected() {
            effects.push(Effect::RebuildIndicators);
        }
        effects.push(Effect::Dispatch(Command::RefreshDeviceStatus));
    }
}

fn hotplug_message(usb_vid: u16, usb_pid: u16, failed: bool) -> String {
    let known = usb_vid != 0 && usb_pid != 0;
    let name = || catalog::display_name(DeviceKey::new(usb_vid, usb_pid));
    match (failed, known) {
        (false, true) => format!("Plugged {}", name()),
        (false, false) => "New device plugged and activated".to_string(),
        (true, true) => format!("Removed {}", name()),
        (true, false) => "Device removed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Connectivity;

    #[test]
    fn test_status_while_disconnected_only_stores() {
        let mut model = ViewModel {
            connectivity: Connectivity::Disconnected,
            ..ViewModel::default()
        };
        let devices = vec![DeviceStatusEntry {
            usb_vid: 0x1e7d,
            usb_pid: 0x2c92,
            status: Default::default(),
        }];
        let mut effects = Vec::new();
        DeviceReconciler.on_device_status(&mut model, devices, &mut effects);
        assert_eq!(model.device_status.len(), 1);
        assert!(effects.is_empty());

        model.connectivity = Connectivity::Connected;
        DeviceReconciler.on_device_status(&mut model, Vec::new(), &mut effects);
        assert_eq!(effects, vec![Effect::SyncIndicators, Effect::RefreshMenu]);
    }

    #[test]
    fn test_hotplug_messages() {
        assert_eq!(hotplug_message(0x1e7d, 0x2c92, false), "Plugged ROCCAT Kone Pro Air");
        assert_eq!(hotplug_message(0x1e7d, 0x3a37, true), "Removed ROCCAT/Turtle Beach Elo 7.1 Air");
        assert_eq!(hotplug_message(0, 0, false), "New device plugged and activated");
        assert_eq!(hotplug_message(0, 0, true), "Device removed");
    }

    #[test]
    fn test_hotplug_rebuilds_and_refreshes() {
        let mut model = ViewModel {
            connectivity: Connectivity::Connected,
            ..ViewModel::default()
        };
        let mut effects = Vec::new();
        DeviceReconciler.on_hotplug(&mut model, 0x1e7d, 0x2c92, false, &mut effects);
        assert_eq!(
            effects,
            vec![
                Effect::Notify(NotificationKind::Hotplug, "Plugged ROCCAT Kone Pro Air".into()),
                Effect::RebuildIndicators,
                Effect::Dispatch(Command::RefreshDeviceStatus),
            ]
        );
    }
}
