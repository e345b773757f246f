use super::timed::TimedBase;
use crate::prelude::*;

/// Returns [`TriggerState::Ongoing`] when input becomes actuated and [`TriggerState::Triggered`]
/// when the input is released after having been actuated for the defined hold time.
///
/// Returns [`TriggerState::None`] when the input stops being actuated earlier than the defined hold time.
#[derive(Debug, Clone)]
pub struct HoldAndRelease {
    /// Hold time in seconds.
    pub hold_time: f32,

    base: TimedBase,
}

impl HoldAndRelease {
    /// Creates a new instance with the given hold time in seconds.
    #[must_use]
    pub fn new(hold_time: f32) -> Self {
        Self {
            hold_time,
            base: TimedBase::new(),
        }
    }

    #[must_use]
    pub fn with_actuation(mut self, actuation: f32) -> Self {
        self.base.actuation = actuation;
        self
    }

    #[must_use]
    pub fn with_time_kind(mut self, kind: TimeKind) -> Self {
        self.base.time_kind = kind;
        self
    }
}

impl InputTrigger for HoldAndRelease {
    fn update_state(
        &mut self,
        _actions: &ActionStates,
        time: &InputTime,
        value: ActionValue,
        last_value: ActionValue,
    ) -> TriggerState {
        // Computed before the base update resets it on release.
        let held_duration = self.base.next_held_duration(time);

        let state = self.base.update(time, value);
        let actuation = self.base.actuation;
        if last_value.is_actuated(actuation)
            && !value.is_actuated(actuation)
            && held_duration >= self.hold_time
        {
            TriggerState::Triggered
        } else {
            state
        }
    }
}
