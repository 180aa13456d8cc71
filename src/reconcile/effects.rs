use tracing::debug;

use crate::daemon::PropertyChange;
use crate::model::ViewModel;
use crate::notification::NotificationKind;

use super::Effect;

/// Ambient effect state from the fx-proxy
#[derive(Debug, Default)]
pub struct EffectsReconciler {
    confirmed: Option<bool>,
}

impl EffectsReconciler {
    pub fn on_property(
        &mut self,
        model: &mut ViewModel,
        change: &PropertyChange,
        initial: bool,
        effects: &mut Vec<Effect>,
    ) {
        let PropertyChange::AmbientEffect(enabled) = change else {
            return;
        };
        model.ambient_effect_enabled = *enabled;

        let changed = self.confirmed.replace(*enabled) != Some(*enabled);
        if changed && !initial {
            let text = if *enabled {
                "Ambient Effect enabled"
            } else {
                "Ambient Effect disabled"
            };
            effects.push(Effect::Notify(NotificationKind::Settings, text.to_string()));
        }
        effects.push(Effect::RefreshMenu);
    }

    pub fn on_status_changed(&mut self, event: &str, effects: &mut Vec<Effect>) {
        debug!(event, "fx-proxy status changed");
        effects.push(Effect::RefreshMenu);
    }
}
