use super::timed::TimedBase;
use crate::prelude::*;

/// Returns [`TriggerState::Ongoing`] when the input becomes actuated and
/// [`TriggerState::Triggered`] when input remained actuated for the defined hold time.
///
/// Returns [`TriggerState::None`] when the input stops being actuated earlier than the defined hold time.
/// May optionally fire once, or repeatedly fire.
#[derive(Debug, Clone)]
pub struct Hold {
    /// Should this trigger fire only once, or fire every tick once the hold time threshold is met?
    pub one_shot: bool,

    /// Hold time in seconds.
    pub hold_time: f32,

    base: TimedBase,
    triggered: bool,
}

impl Hold {
    /// Creates a new instance with the given hold time in seconds.
    #[must_use]
    pub fn new(hold_time: f32) -> Self {
        Self {
            one_shot: false,
            hold_time,
            base: TimedBase::new(),
            triggered: false,
        }
    }

    #[must_use]
    pub fn one_shot(mut self, one_shot: bool) -> Self {
        self.one_shot = one_shot;
        self
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

    /// Returns how long the input has been held.
    #[must_use]
    pub fn held_duration(&self) -> f32 {
        self.base.held_duration
    }
}

impl InputTrigger for Hold {
    fn update_state(
        &mut self,
        _actions: &ActionStates,
        time: &InputTime,
        value: ActionValue,
        _last_value: ActionValue,
    ) -> TriggerState {
        let state = self.base.update(time, value);

        let first_trigger = !self.triggered;
        self.triggered = self.base.held_duration >= self.hold_time;
        if self.triggered {
            if first_trigger || !self.one_shot {
                TriggerState::Triggered
            } else {
                TriggerState::None
            }
        } else {
            state
        }
    }
}
