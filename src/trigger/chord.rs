use log::warn;
use smallvec::{SmallVec, smallvec};

use crate::prelude::*;

/**
Mirrors the state of another action, requiring it to be active for the owning mapping to fire.

Implicit, so the owner only fires while the referenced action is triggered.

When a chorded mapping shares a key with a lower priority mapping of another action,
rebuilding control mappings injects a [`ChordBlocker`] into the lower mapping, so holding the
chord key suppresses it.

# Examples

Heal while the modifier key is held, attack otherwise:

```
use std::sync::Arc;

use bevy::prelude::*;
use bevy_enhanced_player_input::prelude::*;

let modifier = Arc::new(InputAction::new("Modifier", ActionValueType::Boolean));
let heal = Arc::new(InputAction::new("Heal", ActionValueType::Boolean));
let attack = Arc::new(InputAction::new("Attack", ActionValueType::Boolean));

let context = InputMappingContext::new("Combat")
    .with_mapping(ActionKeyMapping::new(&modifier, GamepadButton::LeftTrigger))
    .with_mapping(
        ActionKeyMapping::new(&heal, GamepadButton::West).with_trigger(ChordAction::new(&modifier)),
    )
    .with_mapping(ActionKeyMapping::new(&attack, GamepadButton::West));
# assert!(context.validate().is_empty());
```
*/
#[derive(Debug, Clone)]
pub struct ChordAction {
    /// Action whose state is mirrored.
    pub action: Option<ActionId>,
}

impl ChordAction {
    #[must_use]
    pub fn new(action: impl Into<ActionId>) -> Self {
        Self {
            action: Some(action.into()),
        }
    }
}

impl InputTrigger for ChordAction {
    fn update_state(
        &mut self,
        actions: &ActionStates,
        _time: &InputTime,
        _value: ActionValue,
        _last_value: ActionValue,
    ) -> TriggerState {
        mirror_state(self.action.as_ref(), actions)
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::Implicit
    }

    fn is_chord(&self) -> bool {
        true
    }

    fn dependencies(&self) -> SmallVec<[ActionId; 2]> {
        self.action.iter().cloned().collect()
    }
}

/// Like [`ChordAction`], but blocks the owner while the referenced action is triggered.
///
/// Injected automatically on rebuild, but can also be attached manually.
#[derive(Debug, Clone)]
pub struct ChordBlocker {
    /// Action whose state blocks the owner.
    pub action: Option<ActionId>,
}

impl ChordBlocker {
    #[must_use]
    pub fn new(action: impl Into<ActionId>) -> Self {
        Self {
            action: Some(action.into()),
        }
    }
}

impl InputTrigger for ChordBlocker {
    fn update_state(
        &mut self,
        actions: &ActionStates,
        _time: &InputTime,
        _value: ActionValue,
        _last_value: ActionValue,
    ) -> TriggerState {
        mirror_state(self.action.as_ref(), actions)
    }

    fn kind(&self) -> TriggerKind {
        TriggerKind::Blocker
    }

    fn dependencies(&self) -> SmallVec<[ActionId; 2]> {
        match &self.action {
            Some(action) => smallvec![action.clone()],
            None => SmallVec::new(),
        }
    }
}

fn mirror_state(action: Option<&ActionId>, actions: &ActionStates) -> TriggerState {
    let Some(action) = action else {
        debug_assert!(false, "chord trigger should reference an action");
        warn!("chord trigger has no action assigned");
        return TriggerState::None;
    };

    actions.state(action)
}
