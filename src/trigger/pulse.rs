use super::timed::TimedBase;
use crate::prelude::*;

/// Returns [`TriggerState::Ongoing`] when input becomes actuated and [`TriggerState::Triggered`]
/// each time the held duration passes another interval.
///
/// Note: [`TriggerEvent::Completed`] only fires when input is released immediately after
/// being triggered. Otherwise, [`TriggerEvent::Canceled`] is fired when input is released.
#[derive(Debug, Clone)]
pub struct Pulse {
    /// Number of times the trigger can fire during one hold (0 means no limit).
    pub trigger_limit: u32,

    /// Whether to trigger when the input first exceeds the actuation threshold or wait for the first interval.
    pub trigger_on_start: bool,

    /// Interval between pulses in seconds.
    pub interval: f32,

    base: TimedBase,
    trigger_count: u32,
}

impl Pulse {
    /// Creates a new instance with the given interval in seconds.
    #[must_use]
    pub fn new(interval: f32) -> Self {
        Self {
            trigger_limit: 0,
            trigger_on_start: true,
            interval,
            base: TimedBase::new(),
            trigger_count: 0,
        }
    }

    #[must_use]
    pub fn with_trigger_limit(mut self, trigger_limit: u32) -> Self {
        self.trigger_limit = trigger_limit;
        self
    }

    #[must_use]
    pub fn trigger_on_start(mut self, trigger_on_start: bool) -> Self {
        self.trigger_on_start = trigger_on_start;
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
}

impl InputTrigger for Pulse {
    fn update_state(
        &mut self,
        _actions: &ActionStates,
        time: &InputTime,
        value: ActionValue,
        _last_value: ActionValue,
    ) -> TriggerState {
        let state = self.base.update(time, value);
        if state != TriggerState::Ongoing {
            self.trigger_count = 0;
            return state;
        }

        if self.trigger_limit != 0 && self.trigger_count >= self.trigger_limit {
            return TriggerState::None;
        }

        let pulses = if self.trigger_on_start {
            self.trigger_count
        } else {
            self.trigger_count + 1
        };
        let threshold = self.interval * pulses as f32;
        if (self.trigger_on_start && self.trigger_count == 0)
            || self.base.held_duration > threshold
        {
            self.trigger_count += 1;
            TriggerState::Triggered
        } else {
            TriggerState::Ongoing
        }
    }
}
