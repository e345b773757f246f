use crate::prelude::*;

/// Accumulates trigger results by kind and derives the combined [`TriggerState`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct TriggerStateTracker {
    evaluated: bool,
    found_explicit: bool,
    any_explicit_triggered: bool,
    all_implicits_triggered: bool,
    found_active: bool,
    blocking: bool,
}

impl Default for TriggerStateTracker {
    fn default() -> Self {
        Self {
            evaluated: false,
            found_explicit: false,
            any_explicit_triggered: false,
            all_implicits_triggered: true,
            found_active: false,
            blocking: false,
        }
    }
}

impl TriggerStateTracker {
    /// Updates all triggers with the value and records their results.
    ///
    /// Blockers don't stop the iteration, stateful triggers still need their update.
    pub(crate) fn evaluate<'a>(
        &mut self,
        triggers: impl IntoIterator<Item = &'a mut TrackedTrigger>,
        actions: &ActionStates,
        time: &InputTime,
        value: ActionValue,
        update_last_value: bool,
    ) {
        for tracked in triggers {
            let state = tracked.update(actions, time, value);
            if update_last_value {
                tracked.set_last_value(value);
            }
            self.record(tracked.trigger().kind(), state);
        }
    }

    pub(crate) fn record(&mut self, kind: TriggerKind, state: TriggerState) {
        self.evaluated = true;
        match kind {
            TriggerKind::Explicit => {
                self.found_explicit = true;
                self.any_explicit_triggered |= state == TriggerState::Triggered;
                self.found_active |= state != TriggerState::None;
            }
            TriggerKind::Implicit => {
                self.all_implicits_triggered &= state == TriggerState::Triggered;
                self.found_active |= state != TriggerState::None;
            }
            TriggerKind::Blocker => {
                self.blocking |= state == TriggerState::Triggered;
            }
        }
    }

    /// Combines results of another tracker into this one.
    pub(crate) fn merge(&mut self, other: &Self) {
        self.evaluated |= other.evaluated;
        self.found_explicit |= other.found_explicit;
        self.any_explicit_triggered |= other.any_explicit_triggered;
        self.all_implicits_triggered &= other.all_implicits_triggered;
        self.found_active |= other.found_active;
        self.blocking |= other.blocking;
    }

    /// Returns the combined state.
    ///
    /// Without any evaluated trigger, `value` decides like a zero-threshold [`Down`].
    pub(crate) fn state(&self, value: ActionValue) -> TriggerState {
        if self.blocking {
            return TriggerState::None;
        }

        if !self.evaluated {
            return if value.is_nonzero() {
                TriggerState::Triggered
            } else {
                TriggerState::None
            };
        }

        if (!self.found_explicit || self.any_explicit_triggered) && self.all_implicits_triggered {
            TriggerState::Triggered
        } else if self.found_active {
            TriggerState::Ongoing
        } else {
            TriggerState::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_triggers() {
        let tracker = TriggerStateTracker::default();
        assert_eq!(tracker.state(0.0.into()), TriggerState::None);
        assert_eq!(tracker.state(0.1.into()), TriggerState::Triggered);
    }

    #[test]
    fn any_explicit() {
        let mut tracker = TriggerStateTracker::default();
        tracker.record(TriggerKind::Explicit, TriggerState::Ongoing);
        assert_eq!(tracker.state(1.0.into()), TriggerState::Ongoing);

        tracker.record(TriggerKind::Explicit, TriggerState::Triggered);
        assert_eq!(tracker.state(1.0.into()), TriggerState::Triggered);
    }

    #[test]
    fn all_implicits() {
        let mut tracker = TriggerStateTracker::default();
        tracker.record(TriggerKind::Implicit, TriggerState::Triggered);
        tracker.record(TriggerKind::Implicit, TriggerState::None);
        assert_eq!(tracker.state(1.0.into()), TriggerState::Ongoing);

        let mut tracker = TriggerStateTracker::default();
        tracker.record(TriggerKind::Implicit, TriggerState::None);
        assert_eq!(tracker.state(1.0.into()), TriggerState::None);
    }

    #[test]
    fn explicit_requires_implicits() {
        let mut tracker = TriggerStateTracker::default();
        tracker.record(TriggerKind::Explicit, TriggerState::Triggered);
        tracker.record(TriggerKind::Implicit, TriggerState::None);
        assert_eq!(tracker.state(1.0.into()), TriggerState::Ongoing);
    }

    #[test]
    fn blocker() {
        let mut tracker = TriggerStateTracker::default();
        tracker.record(TriggerKind::Explicit, TriggerState::Triggered);
        tracker.record(TriggerKind::Blocker, TriggerState::None);
        assert_eq!(tracker.state(1.0.into()), TriggerState::Triggered);

        tracker.record(TriggerKind::Blocker, TriggerState::Triggered);
        assert_eq!(tracker.state(1.0.into()), TriggerState::None);
    }

    #[test]
    fn merge() {
        let mut mapping = TriggerStateTracker::default();
        mapping.record(TriggerKind::Explicit, TriggerState::Triggered);

        let mut action = TriggerStateTracker::default();
        action.record(TriggerKind::Implicit, TriggerState::Ongoing);

        mapping.merge(&action);
        assert_eq!(mapping.state(1.0.into()), TriggerState::Ongoing);
    }
}
