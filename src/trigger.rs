/*!
Triggers decide whether the input accumulated for a mapping or an action fires this tick.

Each trigger is a small state machine returning a [`TriggerState`]. Triggers can be attached
both to [`ActionKeyMapping`]s and to [`InputAction`]s. Mapping triggers are evaluated once per key
per tick, while action triggers are evaluated once per action per tick with the merged value.

Results are combined according to [`InputTrigger::kind`]:

- Any [`TriggerKind::Blocker`] that returns [`TriggerState::Triggered`] forces the result to
  [`TriggerState::None`].
- The result is [`TriggerState::Triggered`] when there are no explicit triggers or at least one
  of them fired, and all implicit triggers fired.
- Otherwise it's [`TriggerState::Ongoing`] if any trigger was active.

If neither the mapping nor its action has triggers, the mapping behaves as if it had a [`Down`]
trigger with a zero actuation threshold.

# Examples

```
use std::sync::Arc;

use bevy::prelude::*;
use bevy_enhanced_player_input::prelude::*;

let fire = Arc::new(
    // The action will trigger every 0.5 seconds while held.
    InputAction::new("Fire", ActionValueType::Boolean).with_trigger(Pulse::new(0.5)),
);
let jump = Arc::new(InputAction::new("Jump", ActionValueType::Boolean));

let context = InputMappingContext::new("OnFoot")
    // The action will trigger only if held for 1 second.
    .with_mapping(ActionKeyMapping::new(&jump, KeyCode::Space).with_trigger(Hold::new(1.0)))
    // The right trigger only counts if its value is greater than 0.3.
    .with_mapping(
        ActionKeyMapping::new(&fire, GamepadButton::RightTrigger2).with_trigger(Down::new(0.3)),
    )
    .with_mapping(ActionKeyMapping::new(&fire, MouseButton::Left));
# assert!(context.validate().is_empty());
```
*/

pub mod chord;
pub mod combo;
pub mod down;
pub mod hold;
pub mod hold_and_release;
pub mod pressed;
pub mod pulse;
pub mod released;
pub mod tap;
mod timed;
pub(crate) mod tracker;

use alloc::boxed::Box;
use core::fmt::Debug;

use bevy::prelude::*;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::prelude::*;

/// Default actuation threshold for all triggers.
pub const DEFAULT_ACTUATION: f32 = 0.5;

/// Result of a single trigger evaluation.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum TriggerState {
    /// The trigger conditions are not met.
    #[default]
    None,
    /// Partially met, for example a [`Hold`] that hasn't reached its threshold yet.
    Ongoing,
    /// The trigger conditions are met.
    Triggered,
}

/// Determines how a trigger contributes to the combined [`TriggerState`].
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum TriggerKind {
    /// At least one explicit trigger must fire.
    #[default]
    Explicit,
    /// All implicit triggers must fire.
    Implicit,
    /// Fires nothing on its own, but blocks everything while triggered.
    Blocker,
}

/// Stateful classifier deciding whether input fires.
///
/// Implementors only need [`Clone`] in addition to this trait: every mapping and
/// action instance gets its own copy through [`TriggerClone::clone_box`], so internal
/// state like held durations never leaks between players or rebuilds.
pub trait InputTrigger: TriggerClone + Debug + Send + Sync + 'static {
    /// Returns the new state.
    ///
    /// `actions` contains states of actions already evaluated this tick.
    /// `last_value` is the value this trigger saw on its previous update.
    fn update_state(
        &mut self,
        actions: &ActionStates,
        time: &InputTime,
        value: ActionValue,
        last_value: ActionValue,
    ) -> TriggerState;

    /// Returns how the trigger is combined with others.
    fn kind(&self) -> TriggerKind {
        TriggerKind::Explicit
    }

    /// Returns `true` if the trigger should be updated even without any input this tick.
    fn should_always_tick(&self) -> bool {
        false
    }

    /// Returns `true` if the trigger requires another action to be active.
    ///
    /// Chorded mappings never claim their key and get a chord blocker injected
    /// into lower priority mappings of the same key.
    fn is_chord(&self) -> bool {
        false
    }

    /// Returns actions whose state this trigger reads.
    ///
    /// Used to evaluate referenced actions before the action owning this trigger.
    fn dependencies(&self) -> SmallVec<[ActionId; 2]> {
        SmallVec::new()
    }
}

/// Produces an independent boxed copy of a trigger.
///
/// Implemented automatically for all cloneable triggers.
pub trait TriggerClone {
    fn clone_box(&self) -> Box<dyn InputTrigger>;
}

impl<T: InputTrigger + Clone> TriggerClone for T {
    fn clone_box(&self) -> Box<dyn InputTrigger> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn InputTrigger> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Trigger together with the last value it was updated with.
#[derive(Debug, Clone)]
pub struct TrackedTrigger {
    trigger: Box<dyn InputTrigger>,
    last_value: ActionValue,
}

impl TrackedTrigger {
    #[must_use]
    pub fn new(trigger: Box<dyn InputTrigger>) -> Self {
        Self {
            trigger,
            last_value: Default::default(),
        }
    }

    pub fn trigger(&self) -> &dyn InputTrigger {
        &*self.trigger
    }

    #[must_use]
    pub fn last_value(&self) -> ActionValue {
        self.last_value
    }

    pub(crate) fn update(
        &mut self,
        actions: &ActionStates,
        time: &InputTime,
        value: ActionValue,
    ) -> TriggerState {
        self.trigger
            .update_state(actions, time, value, self.last_value)
    }

    pub(crate) fn set_last_value(&mut self, value: ActionValue) {
        self.last_value = value;
    }
}

impl<T: InputTrigger> From<T> for TrackedTrigger {
    fn from(trigger: T) -> Self {
        Self::new(Box::new(trigger))
    }
}

/// Returns `true` if any of the kinds is explicit.
pub(crate) fn has_explicit(kinds: impl IntoIterator<Item = TriggerKind>) -> bool {
    kinds.into_iter().any(|kind| kind == TriggerKind::Explicit)
}
