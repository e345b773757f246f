use bevy::{ecs::system::SystemParam, prelude::*};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Frame timing passed to triggers and modifiers.
#[derive(Debug, Default, PartialEq, Clone, Copy)]
pub struct InputTime {
    /// Virtual (dilated) delta.
    pub delta_secs: f32,

    /// Real delta, unaffected by time scaling.
    pub real_delta_secs: f32,
}

impl InputTime {
    /// Creates timing where both clocks advanced by the same amount.
    #[must_use]
    pub fn from_secs(delta_secs: f32) -> Self {
        Self {
            delta_secs,
            real_delta_secs: delta_secs,
        }
    }

    /// Returns the delta for the given clock.
    #[must_use]
    pub fn delta_kind(&self, kind: TimeKind) -> f32 {
        match kind {
            TimeKind::Virtual => self.delta_secs,
            TimeKind::Real => self.real_delta_secs,
        }
    }
}

/// Clock used by a time-based trigger or modifier.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum TimeKind {
    /// Follows [`Time<Virtual>`], so pausing or slowing the game affects it.
    Virtual,
    /// Follows [`Time<Real>`].
    #[default]
    Real,
}

/// Reads [`InputTime`] and the paused flag from Bevy clocks.
#[derive(SystemParam)]
pub(crate) struct ContextTime<'w> {
    time: Res<'w, Time>,
    real_time: Res<'w, Time<Real>>,
    virtual_time: Option<Res<'w, Time<Virtual>>>,
}

impl ContextTime<'_> {
    pub(crate) fn input_time(&self) -> InputTime {
        InputTime {
            delta_secs: self.time.delta_secs(),
            real_delta_secs: self.real_time.delta_secs(),
        }
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.virtual_time
            .as_ref()
            .is_some_and(|time| time.is_paused())
    }
}
