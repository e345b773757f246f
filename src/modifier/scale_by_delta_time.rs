#[cfg(feature = "reflect")]
use bevy::prelude::*;

use crate::prelude::*;

/// Multiplies the input value by the frame delta time.
///
/// Useful for making keyboard input frame-rate independent.
/// Boolean values are passed through unchanged.
#[derive(Default, Debug, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, Default))]
pub struct ScaleByDeltaTime {
    /// The type of time used to scale.
    pub time_kind: TimeKind,
}

impl ScaleByDeltaTime {
    #[must_use]
    pub const fn new(time_kind: TimeKind) -> Self {
        Self { time_kind }
    }
}

impl InputModifier for ScaleByDeltaTime {
    fn modify_raw(&mut self, value: ActionValue, context: &ModifierContext) -> ActionValue {
        let delta_secs = context.time.delta_kind(self.time_kind);
        match value {
            ActionValue::Bool(_) => value,
            ActionValue::Axis1D(value) => (value * delta_secs).into(),
            ActionValue::Axis2D(value) => (value * delta_secs).into(),
            ActionValue::Axis3D(value) => (value * delta_secs).into(),
        }
    }
}
