//! Physical keys and their bindings to actions.

use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};
use core::fmt::{self, Display, Formatter};

use bevy::prelude::*;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::{prelude::*, trigger};

/// Identifies a physical input.
///
/// Digital inputs are captured as [`ActionValueType::Boolean`], analog ones keep
/// their dimensionality. See [`Self::value_type`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum InputKey {
    Keyboard(KeyCode),
    MouseButton(MouseButton),
    /// Accumulated mouse movement over the frame.
    MouseMotion,
    /// Accumulated vertical scroll over the frame.
    MouseWheel,
    GamepadButton(GamepadButton),
    GamepadAxis(GamepadAxis),
    GamepadStick(GamepadStick),
}

impl InputKey {
    /// Returns the natural dimensionality of the input.
    ///
    /// Analog gamepad triggers are 1D even though Bevy models them as buttons.
    #[must_use]
    pub fn value_type(self) -> ActionValueType {
        match self {
            InputKey::Keyboard(_) | InputKey::MouseButton(_) => ActionValueType::Boolean,
            InputKey::GamepadButton(GamepadButton::LeftTrigger2 | GamepadButton::RightTrigger2) => {
                ActionValueType::Axis1D
            }
            InputKey::GamepadButton(_) => ActionValueType::Boolean,
            InputKey::MouseWheel | InputKey::GamepadAxis(_) => ActionValueType::Axis1D,
            InputKey::MouseMotion | InputKey::GamepadStick(_) => ActionValueType::Axis2D,
        }
    }

    /// Returns `true` if the input reports continuous values.
    ///
    /// Analog inputs are considered down while their value is non-zero.
    #[must_use]
    pub fn is_analog(self) -> bool {
        self.value_type() != ActionValueType::Boolean
    }

    /// Returns `true` if the input comes from a gamepad.
    #[must_use]
    pub fn is_gamepad(self) -> bool {
        matches!(
            self,
            InputKey::GamepadButton(_) | InputKey::GamepadAxis(_) | InputKey::GamepadStick(_)
        )
    }
}

impl Display for InputKey {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            InputKey::Keyboard(key) => write!(f, "{key:?}"),
            InputKey::MouseButton(button) => write!(f, "Mouse {button:?}"),
            InputKey::MouseMotion => write!(f, "Mouse Motion"),
            InputKey::MouseWheel => write!(f, "Mouse Wheel"),
            InputKey::GamepadButton(button) => write!(f, "Gamepad {button:?}"),
            InputKey::GamepadAxis(axis) => write!(f, "Gamepad {axis:?}"),
            InputKey::GamepadStick(stick) => write!(f, "Gamepad {stick:?} Stick"),
        }
    }
}

impl From<KeyCode> for InputKey {
    fn from(value: KeyCode) -> Self {
        Self::Keyboard(value)
    }
}

impl From<MouseButton> for InputKey {
    fn from(value: MouseButton) -> Self {
        Self::MouseButton(value)
    }
}

impl From<GamepadButton> for InputKey {
    fn from(value: GamepadButton) -> Self {
        Self::GamepadButton(value)
    }
}

impl From<GamepadAxis> for InputKey {
    fn from(value: GamepadAxis) -> Self {
        Self::GamepadAxis(value)
    }
}

impl From<GamepadStick> for InputKey {
    fn from(value: GamepadStick) -> Self {
        Self::GamepadStick(value)
    }
}

/// Gamepad stick read as a single 2D input.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum GamepadStick {
    Left,
    Right,
}

/// Binding of a single key to an action.
///
/// Triggers and modifiers attached here affect only this key. When a context is applied
/// to a player, mappings are cloned together with their triggers and modifiers, so
/// each player gets independent state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use bevy::prelude::*;
/// use bevy_enhanced_player_input::prelude::*;
///
/// let jump = Arc::new(InputAction::new("Jump", ActionValueType::Boolean));
/// let mapping = ActionKeyMapping::new(&jump, KeyCode::Space)
///     .with_trigger(Pressed::default())
///     .player_mappable("Jump");
/// assert_eq!(mapping.key, InputKey::Keyboard(KeyCode::Space));
/// ```
#[derive(Debug, Clone)]
pub struct ActionKeyMapping {
    action: Option<Arc<InputAction>>,

    pub key: InputKey,

    /// Triggers evaluated once per tick with this key's value.
    pub triggers: Vec<TrackedTrigger>,

    /// Modifiers applied to this key's raw value before the action modifiers.
    pub modifiers: Vec<Box<dyn InputModifier>>,

    /// Whether players can rebind this mapping through
    /// [`EnhancedPlayerInput::add_player_mapped_key`].
    pub is_player_mappable: bool,

    /// Name used to reference this mapping when rebinding.
    ///
    /// Must be unique within the context if [`Self::is_player_mappable`] is set.
    pub player_mappable_name: String,

    pub(crate) last_trigger_state: TriggerState,
    pub(crate) elapsed_actuated_secs: f32,
}

impl ActionKeyMapping {
    #[must_use]
    pub fn new(action: &Arc<InputAction>, key: impl Into<InputKey>) -> Self {
        Self {
            action: Some(action.clone()),
            ..Self::unassigned(key)
        }
    }

    /// Creates a mapping without an action.
    ///
    /// Reported by [`InputMappingContext::validate`] and ignored by players.
    #[must_use]
    pub fn unassigned(key: impl Into<InputKey>) -> Self {
        Self {
            action: None,
            key: key.into(),
            triggers: Default::default(),
            modifiers: Default::default(),
            is_player_mappable: false,
            player_mappable_name: Default::default(),
            last_trigger_state: Default::default(),
            elapsed_actuated_secs: 0.0,
        }
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: impl InputTrigger) -> Self {
        self.triggers.push(trigger.into());
        self
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: impl InputModifier) -> Self {
        self.modifiers.push(Box::new(modifier));
        self
    }

    /// Marks the mapping as rebindable under the given name.
    #[must_use]
    pub fn player_mappable(mut self, name: impl Into<String>) -> Self {
        self.is_player_mappable = true;
        self.player_mappable_name = name.into();
        self
    }

    #[must_use]
    pub fn action(&self) -> Option<&Arc<InputAction>> {
        self.action.as_ref()
    }

    /// Returns the identifier of the bound action.
    #[must_use]
    pub fn action_id(&self) -> Option<&ActionId> {
        self.action.as_deref().map(InputAction::id)
    }

    /// Returns `true` if the mapping or its action has a chord trigger.
    #[must_use]
    pub fn is_chorded(&self) -> bool {
        self.triggers
            .iter()
            .any(|tracked| tracked.trigger().is_chord())
            || self
                .action
                .as_ref()
                .is_some_and(|action| action.has_chord_trigger())
    }

    /// Returns `true` if the mapping or its action has an explicit trigger.
    #[must_use]
    pub fn has_explicit_trigger(&self) -> bool {
        let mapping_kinds = self.triggers.iter().map(|tracked| tracked.trigger().kind());
        let action_kinds = self
            .action
            .iter()
            .flat_map(|action| action.triggers.iter().map(|trigger| trigger.kind()));
        trigger::has_explicit(mapping_kinds.chain(action_kinds))
    }

    /// Returns the combined state of this mapping's triggers from the last tick.
    #[must_use]
    pub fn last_trigger_state(&self) -> TriggerState {
        self.last_trigger_state
    }

    /// Time the key's modified value has been non-zero.
    #[must_use]
    pub fn elapsed_actuated_secs(&self) -> f32 {
        self.elapsed_actuated_secs
    }

    /// Returns a copy with fresh runtime state, bound to the given key.
    pub(crate) fn resolve(&self, key: InputKey) -> Self {
        let mut resolved = self.clone();
        resolved.key = key;
        resolved.last_trigger_state = TriggerState::None;
        resolved.elapsed_actuated_secs = 0.0;
        for tracked in &mut resolved.triggers {
            tracked.set_last_value(Default::default());
        }

        resolved
    }
}
