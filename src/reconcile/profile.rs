use tracing::debug;

use crate::daemon::{Command, PropertyChange};
use crate::model::{profile_display_name, Profile, ViewModel};
use crate::notification::NotificationKind;

use super::Effect;

#[derive(Debug, Default)]
pub struct ProfileReconciler;

impl ProfileReconciler {
    pub fn on_property(
        &mut self,
        model: &mut ViewModel,
        change: &PropertyChange,
        initial: bool,
        profiles: &[Profile],
        effects: &mut Vec<Effect>,
    ) {
        if let PropertyChange::ActiveProfile(filename) = change {
            self.set_active_profile(model, filename, !initial, profiles, effects);
        }
    }

    /// `ActiveProfileChanged`: bind the profile to the active slot and re-read
    /// the slot map, since the slot signal may not have been seen yet
    pub fn on_active_profile_changed(
        &mut self,
        model: &mut ViewModel,
        filename: &str,
        profiles: &[Profile],
        effects: &mut Vec<Effect>,
    ) {
        self.set_active_profile(model, filename, true, profiles, effects);
        effects.push(Effect::Dispatch(Command::GetSlotProfiles));
    }

    fn set_active_profile(
        &mut self,
        model: &mut ViewModel,
        filename: &str,
        notify: bool,
        profiles: &[Profile],
        effects: &mut Vec<Effect>,
    ) {
        if model.active_profile() == Some(filename) {
            return;
        }
        debug!(slot = model.active_slot, profile = filename, "active profile changed");
        model
            .active_profiles
            .insert(model.active_slot, filename.to_string());

        if notify {
            effects.push(Effect::Notify(
                NotificationKind::ProfileSwitch,
                profile_display_name(profiles, filename),
            ));
        }
        effects.push(Effect::RefreshMenu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles() -> Vec<Profile> {
        vec![Profile::new("Spectrum Analyzer", "spectrum.profile")]
    }

    #[test]
    fn test_signal_binds_active_slot_and_notifies() {
        let mut model = ViewModel {
            active_slot: 2,
            ..ViewModel::default()
        };
        let mut effects = Vec::new();
        ProfileReconciler.on_active_profile_changed(&mut model, "spectrum.profile", &profiles(), &mut effects);

        assert_eq!(model.active_profiles.get(&2).map(String::as_str), Some("spectrum.profile"));
        assert_eq!(model.active_profiles.len(), 1);
        assert_eq!(
            effects,
            vec![
                Effect::Notify(NotificationKind::ProfileSwitch, "Spectrum Analyzer".into()),
                Effect::RefreshMenu,
                Effect::Dispatch(Command::GetSlotProfiles),
            ]
        );
    }

    #[test]
    fn test_property_echo_after_signal_is_silent() {
        let mut model = ViewModel::default();
        let mut effects = Vec::new();
        let mut reconciler = ProfileReconciler;
        reconciler.on_active_profile_changed(&mut model, "spectrum.profile", &profiles(), &mut effects);

        effects.clear();
        reconciler.on_property(
            &mut model,
            &PropertyChange::ActiveProfile("spectrum.profile".into()),
            false,
            &profiles(),
            &mut effects,
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn test_initial_sync_does_not_notify() {
        let mut model = ViewModel::default();
        let mut effects = Vec::new();
        ProfileReconciler.on_property(
            &mut model,
            &PropertyChange::ActiveProfile("other.profile".into()),
            true,
            &profiles(),
            &mut effects,
        );
        assert_eq!(model.active_profile(), Some("other.profile"));
        assert_eq!(effects, vec![Effect::RefreshMenu]);
    }
}
