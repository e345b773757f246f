#[cfg(feature = "reflect")]
use bevy::prelude::*;

use super::DEFAULT_ACTUATION;
use crate::prelude::*;

/// Like [`Down`] but returns [`TriggerState::Triggered`] only on the tick the input becomes actuated.
///
/// Holding the input will not cause further triggers.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    feature = "reflect",
    derive(Reflect),
    reflect(Clone, Debug, Default)
)]
pub struct Pressed {
    /// Trigger threshold.
    pub actuation: f32,
}

impl Pressed {
    #[must_use]
    pub const fn new(actuation: f32) -> Self {
        Self { actuation }
    }
}

impl Default for Pressed {
    fn default() -> Self {
        Self::new(DEFAULT_ACTUATION)
    }
}

impl InputTrigger for Pressed {
    fn update_state(
        &mut self,
        _actions: &ActionStates,
        _time: &InputTime,
        value: ActionValue,
        last_value: ActionValue,
    ) -> TriggerState {
        if value.is_actuated(self.actuation) && !last_value.is_actuated(self.actuation) {
            TriggerState::Triggered
        } else {
            TriggerState::None
        }
    }
}
