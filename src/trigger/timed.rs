use crate::prelude::*;

/// Held-duration tracking shared by time-based triggers.
#[derive(Debug, Clone, Copy)]
pub(super) struct TimedBase {
    pub(super) actuation: f32,
    pub(super) time_kind: TimeKind,
    pub(super) held_duration: f32,
}

impl TimedBase {
    pub(super) fn new() -> Self {
        Self {
            actuation: DEFAULT_ACTUATION,
            time_kind: Default::default(),
            held_duration: 0.0,
        }
    }

    /// Returns what the held duration becomes if the input stays actuated this tick.
    pub(super) fn next_held_duration(&self, time: &InputTime) -> f32 {
        self.held_duration + time.delta_kind(self.time_kind)
    }

    /// Returns [`TriggerState::Ongoing`] while actuated, accumulating the held duration,
    /// or resets the duration and returns [`TriggerState::None`].
    pub(super) fn update(&mut self, time: &InputTime, value: ActionValue) -> TriggerState {
        if value.is_actuated(self.actuation) {
            self.held_duration = self.next_held_duration(time);
            TriggerState::Ongoing
        } else {
            self.held_duration = 0.0;
            TriggerState::None
        }
    }
}
