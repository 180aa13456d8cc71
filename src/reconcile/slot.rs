use tracing::{debug, warn};

use crate::constants::slots;
use crate::daemon::{Command, PropertyChange};
use crate::model::{normalize_slot_names, slot_index, ViewModel};

use super::Effect;

#[derive(Debug, Default)]
pub struct SlotReconciler;

impl SlotReconciler {
    pub fn on_property(&mut self, model: &mut ViewModel, change: &PropertyChange, effects: &mut Vec<Effect>) {
        match change {
            PropertyChange::ActiveSlot(raw) => self.set_active_slot(model, *raw, effects),
            PropertyChange::SlotNames(names) => {
                let names = normalize_slot_names(names);
                if model.slot_names != names {
                    model.slot_names = names;
                    effects.push(Effect::RebuildMenu);
                }
            }
            _ => {}
        }
    }

    /// `ActiveSlotChanged`: the cached per-slot profiles are left alone and
    /// re-read from the daemon instead
    pub fn on_active_slot_changed(&mut self, model: &mut ViewModel, raw: u64, effects: &mut Vec<Effect>) {
        self.set_active_slot(model, raw, effects);
    }

    pub fn on_slot_profiles(&mut self, model: &mut ViewModel, profiles: &[String], effects: &mut Vec<Effect>) {
        let before = model.active_profile().map(str::to_string);
        let known = profiles
            .iter()
            .take(slots::SLOT_COUNT)
            .enumerate()
            .filter(|(_, filename)| !filename.is_empty());
        for (slot, filename) in known {
            model.active_profiles.insert(slot, filename.clone());
        }
        debug!(profiles = ?model.active_profiles, "slot profiles refreshed");
        if model.active_profile().map(str::to_string) != before {
            effects.push(Effect::RefreshMenu);
        }
    }

    fn set_active_slot(&mut self, model: &mut ViewModel, raw: u64, effects: &mut Vec<Effect>) {
        let Some(slot) = slot_index(raw) else {
            warn!(slot = raw, "ignoring out of range active slot");
            return;
        };
        if model.active_slot != slot {
            debug!(from = model.active_slot, to = slot, "active slot changed");
            model.active_slot = slot;
        }
        effects.push(Effect::Dispatch(Command::GetSlotProfiles));
        effects.push(Effect::RebuildMenu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_slot_echo_leaves_profile_map_alone() {
        let mut model = ViewModel::default();
        model.active_profiles.insert(0, "a.profile".into());
        model.active_profiles.insert(3, "d.profile".into());
        let before = model.active_profiles.clone();

        let mut effects = Vec::new();
        SlotReconciler.on_active_slot_changed(&mut model, 2, &mut effects);

        assert_eq!(model.active_slot, 2);
        assert_eq!(model.active_profiles, before);
        assert!(effects.contains(&Effect::Dispatch(Command::GetSlotProfiles)));
        assert!(effects.contains(&Effect::RebuildMenu));
    }

    #[test]
    fn test_out_of_range_slot_is_ignored() {
        let mut model = ViewModel {
            active_slot: 1,
            ..ViewModel::default()
        };
        let mut effects = Vec::new();
        SlotReconciler.on_property(&mut model, &PropertyChange::ActiveSlot(4), &mut effects);
        assert_eq!(model.active_slot, 1);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_slot_names_fallback() {
        let mut model = ViewModel::default();
        let mut effects = Vec::new();
        SlotReconciler.on_property(
            &mut model,
            &PropertyChange::SlotNames(vec!["Gaming".into(), String::new()]),
            &mut effects,
        );
        assert_eq!(model.slot_names[0], "Gaming");
        assert_eq!(model.slot_names[1], "Profile Slot 2");
        assert_eq!(effects, vec![Effect::RebuildMenu]);
    }

    #[test]
    fn test_slot_profiles_fill_map() {
        let mut model = ViewModel {
            active_slot: 1,
            ..ViewModel::default()
        };
        let mut effects = Vec::new();
        let profiles = vec!["a.profile".to_string(), "b.profile".to_string(), String::new()];
        SlotReconciler.on_slot_profiles(&mut model, &profiles, &mut effects);

        assert_eq!(model.active_profile(), Some("b.profile"));
        assert!(!model.active_profiles.contains_key(&2));
        assert_eq!(effects, vec![Effect::RefreshMenu]);
    }
}
