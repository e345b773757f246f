use super::timed::TimedBase;
use crate::prelude::*;

/// Returns [`TriggerState::Ongoing`] while the input is actuated and [`TriggerState::Triggered`]
/// when it's released within the defined time.
///
/// Releasing exactly at the threshold still counts as a tap.
/// Once the input is held past the threshold, returns [`TriggerState::None`]
/// until it's released, and the release doesn't fire.
#[derive(Debug, Clone)]
pub struct Tap {
    /// Maximum hold time in seconds for the release to count as a tap.
    pub release_time: f32,

    base: TimedBase,
}

impl Tap {
    /// Creates a new instance with the given release time threshold in seconds.
    #[must_use]
    pub fn new(release_time: f32) -> Self {
        Self {
            release_time,
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

impl InputTrigger for Tap {
    fn update_state(
        &mut self,
        _actions: &ActionStates,
        time: &InputTime,
        value: ActionValue,
        last_value: ActionValue,
    ) -> TriggerState {
        let last_held_duration = self.base.held_duration;
        let state = self.base.update(time, value);

        if state == TriggerState::None
            && last_value.is_actuated(self.base.actuation)
            && last_held_duration <= self.release_time
        {
            TriggerState::Triggered
        } else if self.base.held_duration > self.release_time {
            TriggerState::None
        } else {
            state
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tap() {
        let actions = ActionStates::default();
        let time = InputTime::from_secs(0.1);

        let mut trigger = Tap::new(0.2);
        assert_eq!(
            trigger.update_state(&actions, &time, 1.0.into(), 0.0.into()),
            TriggerState::Ongoing,
        );
        assert_eq!(
            trigger.update_state(&actions, &time, 0.0.into(), 1.0.into()),
            TriggerState::Triggered,
        );
        assert_eq!(
            trigger.update_state(&actions, &time, 0.0.into(), 0.0.into()),
            TriggerState::None
        );
    }

    #[test]
    fn release_at_threshold() {
        let actions = ActionStates::default();
        let time = InputTime::from_secs(0.2);

        let mut trigger = Tap::new(0.2);
        assert_eq!(
            trigger.update_state(&actions, &time, 1.0.into(), 0.0.into()),
            TriggerState::Ongoing,
        );
        assert_eq!(
            trigger.update_state(&actions, &time, 0.0.into(), 1.0.into()),
            TriggerState::Triggered,
        );
    }

    #[test]
    fn held_past_threshold() {
        let actions = ActionStates::default();
        let time = InputTime::from_secs(0.1);

        let mut trigger = Tap::new(0.2);
        let mut last = ActionValue::from(0.0);
        for expected in [
            TriggerState::Ongoing,
            TriggerState::Ongoing,
            TriggerState::None,
            TriggerState::None,
        ] {
            assert_eq!(
                trigger.update_state(&actions, &time, 1.0.into(), last),
                expected
            );
            last = 1.0.into();
        }

        assert_eq!(
            trigger.update_state(&actions, &time, 0.0.into(), last),
            TriggerState::None,
            "release after the threshold shouldn't fire"
        );
    }
}
