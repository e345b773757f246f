#[cfg(feature = "reflect")]
use bevy::prelude::*;

use super::DEFAULT_ACTUATION;
use crate::prelude::*;

/// Returns [`TriggerState::Ongoing`] while the input is actuated and [`TriggerState::Triggered`]
/// once on the tick it stops being actuated.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    feature = "reflect",
    derive(Reflect),
    reflect(Clone, Debug, Default)
)]
pub struct Released {
    /// Trigger threshold.
    pub actuation: f32,
}

impl Released {
    #[must_use]
    pub const fn new(actuation: f32) -> Self {
        Self { actuation }
    }
}

impl Default for Released {
    fn default() -> Self {
        Self::new(DEFAULT_ACTUATION)
    }
}

impl InputTrigger for Released {
    fn update_state(
        &mut self,
        _actions: &ActionStates,
        _time: &InputTime,
        value: ActionValue,
        last_value: ActionValue,
    ) -> TriggerState {
        if value.is_actuated(self.actuation) {
            TriggerState::Ongoing
        } else if last_value.is_actuated(self.actuation) {
            TriggerState::Triggered
        } else {
            TriggerState::None
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn released() {
        let actions = ActionStates::default();
        let time = InputTime::default();

        let mut trigger = Released::default();
        assert_eq!(
            trigger.update_state(&actions, &time, 0.0.into(), 0.0.into()),
            TriggerState::None
        );
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
    fn tick_after_run() {
        let actions = ActionStates::default();
        let time = InputTime::default();
        let sequence = [true, true, false, false, true, false];

        let mut trigger = Released::default();
        let mut last = ActionValue::default();
        let mut fired_ticks = Vec::new();
        for (tick, actuated) in sequence.into_iter().enumerate() {
            let value = actuated.into();
            if trigger.update_state(&actions, &time, value, last) == TriggerState::Triggered {
                fired_ticks.push(tick);
            }
            last = value;
        }

        assert_eq!(fired_ticks, [2, 5]);
    }
}
