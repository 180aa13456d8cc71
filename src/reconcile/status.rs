use tracing::{info, warn};

use crate::daemon::{Command, PropertyChange};
use crate::model::{Connectivity, ViewModel};

use super::Effect;

/// Connectivity state machine
///
/// `Unknown` until the first `Running` read. Entering `Disconnected` clears the
/// indicators and collapses the menu to its placeholder; leaving it resyncs
/// every endpoint, since signals may have been missed meanwhile.
#[derive(Debug, Default)]
pub struct StatusReconciler;

impl StatusReconciler {
    pub fn on_property(&mut self, model: &mut ViewModel, change: &PropertyChange, effects: &mut Vec<Effect>) {
        if let PropertyChange::Running(running) = change {
            self.on_running(model, *running, effects);
        }
    }

    pub fn on_running(&mut self, model: &mut ViewModel, running: bool, effects: &mut Vec<Effect>) {
        let next = if running {
            Connectivity::Connected
        } else {
            Connectivity::Disconnected
        };
        self.transition(model, next, effects);
    }

    /// A call failed in a way that means the daemon is gone
    pub fn daemon_lost(&mut self, model: &mut ViewModel, effects: &mut Vec<Effect>) {
        if model.connectivity != Connectivity::Disconnected {
            warn!("daemon appears to be gone");
        }
        self.transition(model, Connectivity::Disconnected, effects);
    }

    /// The daemon's bus name gained or lost its owner
    pub fn on_presence(&mut self, model: &mut ViewModel, present: bool, effects: &mut Vec<Effect>) {
        if present {
            info!("daemon appeared on the bus, resyncing");
            effects.push(Effect::Dispatch(Command::Resync));
        } else {
            self.daemon_lost(model, effects);
        }
    }

    fn transition(&mut self, model: &mut ViewModel, next: Connectivity, effects: &mut Vec<Effect>) {
        let previous = model.connectivity;
        if previous == next {
            return;
        }
        info!(from = ?previous, to = ?next, "connectivity changed");
        model.connectivity = next;

        match (previous, next) {
            (_, Connectivity::Disconnected) => {
                effects.push(Effect::ClearIndicators);
                effects.push(Effect::RebuildMenu);
            }
            (Connectivity::Disconnected, Connectivity::Connected) => {
                effects.push(Effect::Dispatch(Command::Resync));
                effects.push(Effect::RebuildIndicators);
                effects.push(Effect::RebuildMenu);
            }
            _ => {
                effects.push(Effect::RebuildIndicators);
                effects.push(Effect::RebuildMenu);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sync_leaves_unknown() {
        let mut model = ViewModel::default();
        let mut effects = Vec::new();
        StatusReconciler.on_running(&mut model, true, &mut effects);
        assert_eq!(model.connectivity, Connectivity::Connected);
        assert_eq!(effects, vec![Effect::RebuildIndicators, Effect::RebuildMenu]);
    }

    #[test]
    fn test_disconnect_clears_and_reconnect_resyncs() {
        let mut model = ViewModel {
            connectivity: Connectivity::Connected,
            ..ViewModel::default()
        };
        let mut effects = Vec::new();
        StatusReconciler.on_running(&mut model, false, &mut effects);
        assert_eq!(effects, vec![Effect::ClearIndicators, Effect::RebuildMenu]);

        effects.clear();
        StatusReconciler.on_running(&mut model, false, &mut effects);
        assert!(effects.is_empty());

        StatusReconciler.on_running(&mut model, true, &mut effects);
        assert_eq!(
            effects,
            vec![
                Effect::Dispatch(Command::Resync),
                Effect::RebuildIndicators,
                Effect::RebuildMenu
            ]
        );
    }

    #[test]
    fn test_presence_loss_disconnects() {
        let mut model = ViewModel {
            connectivity: Connectivity::Connected,
            ..ViewModel::default()
        };
        let mut effects = Vec::new();
        StatusReconciler.on_presence(&mut model, false, &mut effects);
        assert_eq!(model.connectivity, Connectivity::Disconnected);

        effects.clear();
        StatusReconciler.on_presence(&mut model, true, &mut effects);
        assert_eq!(effects, vec![Effect::Dispatch(Command::Resync)]);
        assert_eq!(model.connectivity, Connectivity::Disconnected);
    }
}
