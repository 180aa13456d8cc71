//! Pure mapping from the view model to menu content

use crate::config::Settings;
use crate::launcher::CompanionApp;
use crate::model::{catalog, profile_display_name, Profile, ViewModel};

pub const NOT_CONNECTED: &str = "Not connected to Eruption";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    AmbientEffect,
    Sfx,
}

impl Toggle {
    pub fn label(self) -> &'static str {
        match self {
            Toggle::AmbientEffect => "Ambient Effect",
            Toggle::Sfx => "Audio Effects",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Placeholder(String),
    Header(String),
    Slot {
        index: usize,
        name: String,
        active: bool,
    },
    CurrentProfile(String),
    ProfileChooser {
        profiles: Vec<Profile>,
        active: Option<String>,
    },
    Launch(CompanionApp),
    Toggle {
        toggle: Toggle,
        enabled: bool,
    },
    Brightness(u8),
    DeviceStatus {
        name: String,
        signal: Option<String>,
        battery: Option<String>,
    },
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuModel {
    pub entries: Vec<MenuEntry>,
}

impl MenuModel {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.entries.as_slice(), [MenuEntry::Placeholder(_)])
    }
}

pub fn build(
    model: &ViewModel,
    profiles: &[Profile],
    companions: &[CompanionApp],
    settings: &Settings,
) -> MenuModel {
    if !model.is_connected() {
        return MenuModel {
            entries: vec![MenuEntry::Placeholder(NOT_CONNECTED.to_string())],
        };
    }

    let mut entries = Vec::new();
    let header = |entries: &mut Vec<MenuEntry>, title: &str| {
        if !settings.compact_mode {
            entries.push(MenuEntry::Header(title.to_string()));
        }
    };

    header(&mut entries, "Slots");
    entries.extend(model.slot_names.iter().enumerate().map(|(index, name)| MenuEntry::Slot {
        index,
        name: name.clone(),
        active: index == model.active_slot,
    }));
    entries.push(MenuEntry::Separator);

    header(&mut entries, "Active Profile");
    let current = model
        .active_profile()
        .map(|filename| profile_display_name(profiles, filename))
        .unwrap_or_else(|| "<unknown>".to_string());
    entries.push(MenuEntry::CurrentProfile(current));
    entries.push(MenuEntry::ProfileChooser {
        profiles: profiles.to_vec(),
        active: model.active_profile().map(str::to_string),
    });
    entries.push(MenuEntry::Separator);

    if !companions.is_empty() {
        entries.extend(companions.iter().copied().map(MenuEntry::Launch));
        entries.push(MenuEntry::Separator);
    }

    entries.push(MenuEntry::Toggle {
        toggle: Toggle::AmbientEffect,
        enabled: model.ambient_effect_enabled,
    });
    entries.push(MenuEntry::Toggle {
        toggle: Toggle::Sfx,
        enabled: model.sfx_enabled,
    });
    entries.push(MenuEntry::Brightness(model.brightness));

    let devices: Vec<MenuEntry> = model
        .device_status
        .iter()
        .filter_map(|device| {
            let signal = settings
                .show_signal_strength
                .then(|| device.signal_strength())
                .flatten()
                .map(|v| format!("{v}%"));
            let battery = settings
                .show_battery_level
                .then(|| device.battery_level())
                .flatten()
                .map(|v| format!("{v}%"));
            if signal.is_none() && battery.is_none() {
                return None;
            }
            Some(MenuEntry::DeviceStatus {
                name: catalog::display_name(device.key()),
                signal,
                battery,
            })
        })
        .collect();
    if !devices.is_empty() {
        entries.push(MenuEntry::Separator);
        header(&mut entries, "Connected Devices");
        entries.extend(devices);
    }

    MenuModel { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::device::parse_device_status;
    use crate::model::Connectivity;

    fn connected_model() -> ViewModel {
        let mut model = ViewModel {
            connectivity: Connectivity::Connected,
            active_slot: 1,
            brightness: 80,
            ..ViewModel::default()
        };
        model.active_profiles.insert(1, "spectrum.profile".to_string());
        model
    }

    #[test]
    fn test_unknown_and_disconnected_yield_placeholder() {
        let settings = Settings::default();
        for connectivity in [Connectivity::Unknown, Connectivity::Disconnected] {
            let mut model = connected_model();
            model.connectivity = connectivity;
            let menu = build(&model, &[], &[], &settings);
            assert!(menu.is_placeholder());
            assert_eq!(menu.entries, vec![MenuEntry::Placeholder(NOT_CONNECTED.to_string())]);
        }
    }

    #[test]
    fn test_connected_menu_content() {
        let profiles = vec![
            Profile::new("Spectrum", "spectrum.profile"),
            Profile::new("Rainbow", "rainbow.profile"),
        ];
        let menu = build(&connected_model(), &profiles, &[CompanionApp::Pyroclasm], &Settings::default());

        assert_eq!(menu.entries[0], MenuEntry::Header("Slots".into()));
        assert_eq!(
            menu.entries[2],
            MenuEntry::Slot {
                index: 1,
                name: "Profile Slot 2".into(),
                active: true
            }
        );
        assert!(menu.entries.contains(&MenuEntry::CurrentProfile("Spectrum".into())));
        assert!(menu.entries.contains(&MenuEntry::Launch(CompanionApp::Pyroclasm)));
        assert!(menu.entries.contains(&MenuEntry::Brightness(80)));
        assert!(!menu.is_placeholder());
    }

    #[test]
    fn test_compact_mode_hides_headers() {
        let settings = Settings {
            compact_mode: true,
            ..Settings::default()
        };
        let menu = build(&connected_model(), &[], &[], &settings);
        assert!(!menu.entries.iter().any(|e| matches!(e, MenuEntry::Header(_))));
        assert!(menu.entries.contains(&MenuEntry::CurrentProfile("<unknown>".into())));
    }

    #[test]
    fn test_device_section_respects_preferences() {
        let mut model = connected_model();
        model.device_status = parse_device_status(
            r#"[{"usb_vid": 7805, "usb_pid": 11410, "status": {"battery-level-percent": 50}},
                {"usb_vid": 7805, "usb_pid": 12440}]"#,
        )
        .unwrap();

        let menu = build(&model, &[], &[], &Settings::default());
        let devices: Vec<_> = menu
            .entries
            .iter()
            .filter(|e| matches!(e, MenuEntry::DeviceStatus { .. }))
            .collect();
        assert_eq!(
            devices,
            vec![&MenuEntry::DeviceStatus {
                name: "ROCCAT Kone Pro Air".into(),
                signal: None,
                battery: Some("50%".into()),
            }]
        );

        let settings = Settings {
            show_battery_level: false,
            ..Settings::default()
        };
        let menu = build(&model, &[], &[], &settings);
        assert!(!menu.entries.iter().any(|e| matches!(e, MenuEntry::DeviceStatus { .. })));
    }
}
