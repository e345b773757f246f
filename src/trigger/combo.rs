use alloc::vec::Vec;

use bevy::prelude::*;
use log::warn;
use smallvec::SmallVec;

use crate::prelude::*;

/**
Sequence of actions that needs to be completed in a specific order.

The combo resets if a step is completed out of order, any cancel action fires,
or the next step isn't completed within its [`ComboStep::timeout`].

After the first step, returns [`TriggerState::Ongoing`] until the last step.
Once all steps are completed, returns [`TriggerState::Triggered`] once, then resets.

Updated every tick, even when no key of the owning mapping is touched.

# Examples

Double click:

```
use std::sync::Arc;

use bevy::prelude::*;
use bevy_enhanced_player_input::prelude::*;

let click = Arc::new(InputAction::new("Click", ActionValueType::Boolean));
let double_click = Arc::new(
    InputAction::new("DoubleClick", ActionValueType::Boolean)
        .with_trigger(Combo::default().with_step(&click).with_step(&click)),
);

let context = InputMappingContext::new("Menu")
    .with_mapping(ActionKeyMapping::new(&click, MouseButton::Left))
    .with_mapping(ActionKeyMapping::new(&double_click, MouseButton::Left));
# assert!(context.validate().is_empty());
```
*/
#[derive(Default, Debug, Clone)]
pub struct Combo {
    /// Ordered sequence of steps that define the combo.
    pub steps: Vec<ComboStep>,

    /// Actions that can cancel the combo.
    ///
    /// If a cancel action matches the action from the current step, it will be ignored.
    pub cancel_actions: Vec<CancelAction>,

    /// The type of time used to advance the step timeout.
    pub time_kind: TimeKind,

    step_index: usize,
    step_elapsed: f32,
}

impl Combo {
    /// Adds an action step to the combo.
    ///
    /// If you don't need to configure the step, you can just pass the action.
    #[must_use]
    pub fn with_step(mut self, step: impl Into<ComboStep>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Adds an action that cancels the combo.
    #[must_use]
    pub fn with_cancel(mut self, action: impl Into<CancelAction>) -> Self {
        self.cancel_actions.push(action.into());
        self
    }

    #[must_use]
    pub fn with_time_kind(mut self, kind: TimeKind) -> Self {
        self.time_kind = kind;
        self
    }

    /// Returns the index of the step the combo is waiting for.
    #[must_use]
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    fn reset(&mut self) {
        self.step_index = 0;
        self.step_elapsed = 0.0;
    }

    fn is_cancelled(&self, actions: &ActionStates) -> bool {
        let current_step = &self.steps[self.step_index];
        for cancel in &self.cancel_actions {
            if cancel.action == current_step.action {
                continue;
            }

            if actions.events(&cancel.action).intersects(cancel.events) {
                return true;
            }
        }

        // Check if any other step is also completed, breaking the order.
        for step in &self.steps {
            if step.action == current_step.action {
                continue;
            }

            if actions.events(&step.action).intersects(step.events) {
                return true;
            }
        }

        false
    }
}

impl InputTrigger for Combo {
    fn update_state(
        &mut self,
        actions: &ActionStates,
        time: &InputTime,
        _value: ActionValue,
        _last_value: ActionValue,
    ) -> TriggerState {
        if self.steps.is_empty() {
            debug_assert!(false, "combo should have at least one step");
            warn!("combo has no steps");
            return TriggerState::None;
        }

        if self.is_cancelled(actions) {
            // Not returning since the first step could be completed.
            self.reset();
        }

        if self.step_index > 0 {
            self.step_elapsed += time.delta_kind(self.time_kind);
            if self.step_elapsed >= self.steps[self.step_index].timeout {
                self.reset();
            }
        }

        let current_step = &self.steps[self.step_index];
        if actions
            .events(&current_step.action)
            .intersects(current_step.events)
        {
            self.step_index += 1;
            self.step_elapsed = 0.0;

            if self.step_index >= self.steps.len() {
                self.reset();
                return TriggerState::Triggered;
            }
        }

        if self.step_index > 0 {
            TriggerState::Ongoing
        } else {
            TriggerState::None
        }
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::Implicit
    }

    fn should_always_tick(&self) -> bool {
        true
    }

    fn dependencies(&self) -> SmallVec<[ActionId; 2]> {
        let mut dependencies = SmallVec::<[ActionId; 2]>::new();
        let actions = self
            .steps
            .iter()
            .map(|step| &step.action)
            .chain(self.cancel_actions.iter().map(|cancel| &cancel.action));
        for action in actions {
            if !dependencies.contains(action) {
                dependencies.push(action.clone());
            }
        }

        dependencies
    }
}

/// An action with associated events that progress [`Combo`].
#[derive(Debug, Clone)]
pub struct ComboStep {
    /// Associated action.
    pub action: ActionId,

    /// Events for the action to complete this step.
    pub events: ActionEvents,

    /// Time in seconds to complete this step before the combo is reset.
    ///
    /// Starts once the previous step is completed.
    /// Ignored for the first step.
    pub timeout: f32,
}

impl ComboStep {
    /// Creates a new instance with [`Self::events`] set to [`ActionEvents::COMPLETED`]
    /// and [`Self::timeout`] set to 0.5.
    #[must_use]
    pub fn new(action: impl Into<ActionId>) -> Self {
        Self {
            action: action.into(),
            events: ActionEvents::COMPLETED,
            timeout: 0.5,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: ActionEvents) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: f32) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<T: Into<ActionId>> From<T> for ComboStep {
    fn from(action: T) -> Self {
        Self::new(action)
    }
}

/// An action with associated events that cancel a [`Combo`].
#[derive(Debug, Clone)]
pub struct CancelAction {
    /// Associated action.
    pub action: ActionId,

    /// Events that cancel the combo if any occur.
    pub events: ActionEvents,
}

impl CancelAction {
    /// Creates a new instance with events set to [`ActionEvents::ONGOING`] and [`ActionEvents::TRIGGERED`].
    #[must_use]
    pub fn new(action: impl Into<ActionId>) -> Self {
        Self {
            action: action.into(),
            events: ActionEvents::ONGOING | ActionEvents::TRIGGERED,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: ActionEvents) -> Self {
        self.events = events;
        self
    }
}

impl<T: Into<ActionId>> From<T> for CancelAction {
    fn from(action: T) -> Self {
        Self::new(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(actions: &mut ActionStates, action: &str) {
        actions.insert(
            action.into(),
            ActionSnapshot {
                events: ActionEvents::COMPLETED,
                ..Default::default()
            },
        );
    }

    #[test]
    fn timeout() {
        let mut actions = ActionStates::default();
        completed(&mut actions, "A");
        let time = InputTime::from_secs(1.0);

        let mut trigger = Combo::default().with_step("A").with_step("B");
        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::Ongoing,
            "first step shouldn't be affected by time"
        );
        assert_eq!(trigger.step_index(), 1);

        actions.clear();
        completed(&mut actions, "B");
        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::None
        );
        assert_eq!(trigger.step_index(), 0);
    }

    #[test]
    fn steps() {
        let mut actions = ActionStates::default();
        actions.insert(
            "A".into(),
            ActionSnapshot {
                events: ActionEvents::ONGOING,
                ..Default::default()
            },
        );

        let mut trigger = Combo::default()
            .with_step(ComboStep::new("A").with_events(ActionEvents::ONGOING))
            .with_step(ComboStep::new("B").with_timeout(0.6))
            .with_step(ComboStep::new("C").with_timeout(0.3));

        let time = InputTime::from_secs(0.0);
        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::Ongoing
        );
        assert_eq!(trigger.step_index(), 1);

        actions.clear();
        completed(&mut actions, "B");
        let time = InputTime::from_secs(0.5);
        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::Ongoing
        );
        assert_eq!(trigger.step_index(), 2);

        actions.clear();
        completed(&mut actions, "C");
        let time = InputTime::from_secs(0.2);
        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::Triggered
        );
        assert_eq!(trigger.step_index(), 0);

        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::None
        );
    }

    #[test]
    fn same_action() {
        let mut actions = ActionStates::default();
        completed(&mut actions, "A");
        let time = InputTime::default();

        let mut trigger = Combo::default().with_step("A").with_step("A");
        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::Ongoing
        );
        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::Triggered
        );
    }

    #[test]
    fn out_of_order() {
        let mut actions = ActionStates::default();
        completed(&mut actions, "B");
        let time = InputTime::default();

        let mut trigger = Combo::default()
            .with_step("A")
            .with_step("B")
            .with_step("C");
        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::None
        );

        actions.clear();
        completed(&mut actions, "A");
        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::Ongoing
        );
        assert_eq!(trigger.step_index(), 1);

        actions.clear();
        completed(&mut actions, "C");
        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::None
        );
        assert_eq!(trigger.step_index(), 0);
    }

    #[test]
    fn cancel() {
        let mut actions = ActionStates::default();
        completed(&mut actions, "A");
        let time = InputTime::default();

        let mut trigger = Combo::default()
            .with_step("A")
            .with_step("B")
            .with_cancel("C");
        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::Ongoing
        );

        actions.clear();
        completed(&mut actions, "B");
        actions.insert(
            "C".into(),
            ActionSnapshot {
                events: ActionEvents::TRIGGERED,
                ..Default::default()
            },
        );
        assert_eq!(
            trigger.update_state(&actions, &time, false.into(), false.into()),
            TriggerState::None
        );
        assert_eq!(trigger.step_index(), 0);
    }

    #[test]
    fn ignore_same_cancel_action() {
        let mut actions = ActionStates::default();
        completed(&mut actions, "A");

        let mut trigger = Combo::default().with_step("A").with_cancel(
            CancelAction::new("A").with_events(ActionEvents::COMPLETED),
        );
        assert_eq!(
            trigger.update_state(&actions, &InputTime::default(), false.into(), false.into()),
            TriggerState::Triggered
        );
    }

    #[test]
    fn dependencies() {
        let trigger = Combo::default()
            .with_step("A")
            .with_step("A")
            .with_step("B")
            .with_cancel("C");
        assert_eq!(
            trigger.dependencies().as_slice(),
            [ActionId::new("A"), ActionId::new("B"), ActionId::new("C")]
        );
        assert!(trigger.should_always_tick());
    }
}
