use tracing::debug;

use crate::daemon::PropertyChange;
use crate::model::{clamp_brightness, ViewModel};
use crate::notification::NotificationKind;

use super::Effect;

/// Tracks the last values the daemon confirmed, so a notification is only
/// shown for an actual change
#[derive(Debug, Default)]
pub struct ConfigReconciler {
    confirmed_brightness: Option<u8>,
    confirmed_sfx: Option<bool>,
}

impl ConfigReconciler {
    pub fn on_property(
        &mut self,
        model: &mut ViewModel,
        change: &PropertyChange,
        initial: bool,
        effects: &mut Vec<Effect>,
    ) {
        match change {
            PropertyChange::Brightness(raw) => self.on_brightness(model, *raw, initial, effects),
            PropertyChange::EnableSfx(enabled) => self.on_sfx(model, *enabled, initial, effects),
            _ => {}
        }
    }

    pub fn on_brightness(&mut self, model: &mut ViewModel, raw: i64, initial: bool, effects: &mut Vec<Effect>) {
        let brightness = clamp_brightness(raw);
        model.brightness = brightness;

        let changed = self.confirmed_brightness.replace(brightness) != Some(brightness);
        if changed && !initial {
            debug!(brightness, "brightness confirmed");
            effects.push(Effect::Notify(
                NotificationKind::Settings,
                format!("Brightness: {brightness}%"),
            ));
        }
        effects.push(Effect::RefreshMenu);
    }

    fn on_sfx(&mut self, model: &mut ViewModel, enabled: bool, initial: bool, effects: &mut Vec<Effect>) {
        model.sfx_enabled = enabled;

        let changed = self.confirmed_sfx.replace(enabled) != Some(enabled);
        if changed && !initial {
            let text = if enabled {
                "Audio Effects enabled"
            } else {
                "Audio Effects disabled"
            };
            effects.push(Effect::Notify(NotificationKind::Settings, text.to_string()));
        }
        effects.push(Effect::RefreshMenu);
    }
}
