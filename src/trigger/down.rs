#[cfg(feature = "reflect")]
use bevy::prelude::*;

use super::DEFAULT_ACTUATION;
use crate::prelude::*;

/// Returns [`TriggerState::Triggered`] while the input exceeds the actuation threshold.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    feature = "reflect",
    derive(Reflect),
    reflect(Clone, Debug, Default)
)]
pub struct Down {
    /// Trigger threshold.
    pub actuation: f32,
}

impl Down {
    #[must_use]
    pub const fn new(actuation: f32) -> Self {
        Self { actuation }
    }
}

impl Default for Down {
    fn default() -> Self {
        Self::new(DEFAULT_ACTUATION)
    }
}

impl InputTrigger for Down {
    fn update_state(
        &mut self,
        _actions: &ActionStates,
        _time: &InputTime,
        value: ActionValue,
        _last_value: ActionValue,
    ) -> TriggerState {
        if value.is_actuated(self.actuation) {
            TriggerState::Triggered
        } else {
            TriggerState::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down() {
        let actions = ActionStates::default();
        let time = InputTime::default();

        let mut trigger = Down::new(1.0);
        assert_eq!(
            trigger.update_state(&actions, &time, 0.0.into(), 0.0.into()),
            TriggerState::None
        );
        assert_eq!(
            trigger.update_state(&actions, &time, 1.0.into(), 0.0.into()),
            TriggerState::Triggered,
        );
        assert_eq!(
            trigger.update_state(&actions, &time, 1.0.into(), 1.0.into()),
            TriggerState::Triggered,
        );
    }

    #[test]
    fn every_actuated_tick() {
        let actions = ActionStates::default();
        let time = InputTime::default();
        let sequence = [false, true, true, false, true, false, false];

        let mut trigger = Down::default();
        let mut last = ActionValue::default();
        for actuated in sequence {
            let value = actuated.into();
            let expected = if actuated {
                TriggerState::Triggered
            } else {
                TriggerState::None
            };
            assert_eq!(trigger.update_state(&actions, &time, value, last), expected);
            last = value;
        }
    }
}
