//! Actions represent high-level user intents, such as "Jump" or "Move Forward".
//!
//! An [`InputAction`] is an immutable declaration shared through [`Arc`] between
//! [mapping contexts](crate::context) and players. It defines the
//! [`ActionValueType`] the action produces and carries action-level
//! [triggers](crate::trigger) and [modifiers](crate::modifier).
//!
//! Actions are identified by name through [`ActionId`], which triggers like
//! [`ChordAction`] and [`Combo`] use to reference other actions.
//!
//! At runtime each player keeps one [`ActionInstance`] per action with the current
//! value, [`TriggerEvent`] and timings, plus private copies of the action's
//! triggers and modifiers.
//!
//! # Responding to actions
//!
//! Each evaluation produces [action events](events). They can be observed with
//! [`InputActionEvent`], polled through [`EnhancedPlayerInput::action_instance`], or
//! received by handlers bound through [`InputComponent`].

pub mod events;
pub mod value;

use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};
use core::fmt::{self, Display, Formatter};

use bevy::{platform::collections::HashMap, prelude::*};

use crate::prelude::*;

/// Name-based identity of an [`InputAction`].
///
/// Cheap to clone.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct ActionId(Arc<str>);

impl ActionId {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ActionId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ActionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&InputAction> for ActionId {
    fn from(value: &InputAction) -> Self {
        value.id.clone()
    }
}

impl From<&Arc<InputAction>> for ActionId {
    fn from(value: &Arc<InputAction>) -> Self {
        value.id.clone()
    }
}

/// A gameplay-related action which can be bound to keys.
///
/// Read-only once shared with mapping contexts.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use bevy_enhanced_player_input::prelude::*;
///
/// let movement = Arc::new(
///     InputAction::new("Movement", ActionValueType::Axis2D)
///         .with_modifier(DeadZone::default())
///         .with_consume_input(false),
/// );
/// assert_eq!(movement.id().as_str(), "Movement");
/// ```
#[derive(Debug, Clone)]
pub struct InputAction {
    id: ActionId,

    /// Type of the value the action produces.
    pub value_type: ActionValueType,

    /// Whether mappings of this action claim their keys,
    /// hiding lower priority mappings to the same key.
    ///
    /// By default set to `true`.
    pub consume_input: bool,

    /// Whether the action is still evaluated while the game is paused.
    ///
    /// By default set to `false`.
    pub trigger_when_paused: bool,

    /// Whether keys of this action should be reported as reserved
    /// by [mapping queries](crate::subsystem::query).
    ///
    /// By default set to `false`.
    pub reserve_all_mappings: bool,

    /// Triggers evaluated once per tick with the merged value.
    pub triggers: Vec<Box<dyn InputTrigger>>,

    /// Modifiers applied to each mapping's value after the mapping modifiers.
    pub modifiers: Vec<Box<dyn InputModifier>>,

    /// Modifiers applied once to the merged value.
    pub final_modifiers: Vec<Box<dyn InputModifier>>,
}

impl InputAction {
    #[must_use]
    pub fn new(name: impl Into<ActionId>, value_type: ActionValueType) -> Self {
        Self {
            id: name.into(),
            value_type,
            consume_input: true,
            trigger_when_paused: false,
            reserve_all_mappings: false,
            triggers: Default::default(),
            modifiers: Default::default(),
            final_modifiers: Default::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &ActionId {
        &self.id
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: impl InputTrigger) -> Self {
        self.triggers.push(Box::new(trigger));
        self
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: impl InputModifier) -> Self {
        self.modifiers.push(Box::new(modifier));
        self
    }

    #[must_use]
    pub fn with_final_modifier(mut self, modifier: impl InputModifier) -> Self {
        self.final_modifiers.push(Box::new(modifier));
        self
    }

    #[must_use]
    pub fn with_consume_input(mut self, consume_input: bool) -> Self {
        self.consume_input = consume_input;
        self
    }

    #[must_use]
    pub fn with_trigger_when_paused(mut self, trigger_when_paused: bool) -> Self {
        self.trigger_when_paused = trigger_when_paused;
        self
    }

    #[must_use]
    pub fn with_reserve_all_mappings(mut self, reserve_all_mappings: bool) -> Self {
        self.reserve_all_mappings = reserve_all_mappings;
        self
    }

    /// Returns `true` if any action-level trigger is a chord.
    #[must_use]
    pub fn has_chord_trigger(&self) -> bool {
        self.triggers.iter().any(|trigger| trigger.is_chord())
    }

    /// Collects authoring problems of this action.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.id.as_str().is_empty() {
            issues.push(ValidationIssue::EmptyActionName);
        }

        for trigger in &self.triggers {
            if trigger.dependencies().contains(&self.id) {
                issues.push(ValidationIssue::SelfReferencingTrigger {
                    action: self.id.clone(),
                });
            }
        }

        issues
    }
}

/// Per-player runtime state of an action.
#[derive(Debug, Clone)]
pub struct ActionInstance {
    action: Arc<InputAction>,
    pub(crate) value: ActionValue,
    pub(crate) state: TriggerState,
    pub(crate) event: TriggerEventInternal,
    pub(crate) triggers: Vec<TrackedTrigger>,
    pub(crate) per_input_modifiers: Vec<Box<dyn InputModifier>>,
    pub(crate) final_modifiers: Vec<Box<dyn InputModifier>>,
    pub(crate) elapsed_processed_secs: f32,
    pub(crate) elapsed_triggered_secs: f32,

    /// Whether any source fed a value this tick.
    pub(crate) modified_this_tick: bool,
}

impl ActionInstance {
    /// Creates a new instance with private copies of the action triggers and modifiers.
    #[must_use]
    pub fn new(action: Arc<InputAction>) -> Self {
        Self {
            value: ActionValue::zero(action.value_type),
            state: Default::default(),
            event: Default::default(),
            triggers: action
                .triggers
                .iter()
                .map(|trigger| TrackedTrigger::new(trigger.clone()))
                .collect(),
            per_input_modifiers: action.modifiers.clone(),
            final_modifiers: action.final_modifiers.clone(),
            elapsed_processed_secs: 0.0,
            elapsed_triggered_secs: 0.0,
            modified_this_tick: false,
            action,
        }
    }

    #[must_use]
    pub fn action(&self) -> &Arc<InputAction> {
        &self.action
    }

    #[must_use]
    pub fn id(&self) -> &ActionId {
        self.action.id()
    }

    #[must_use]
    pub fn value(&self) -> ActionValue {
        self.value
    }

    /// Returns the combined trigger state from the last evaluation.
    #[must_use]
    pub fn state(&self) -> TriggerState {
        self.state
    }

    #[must_use]
    pub fn trigger_event(&self) -> TriggerEvent {
        self.event.into()
    }

    #[must_use]
    pub fn trigger_event_internal(&self) -> TriggerEventInternal {
        self.event
    }

    #[must_use]
    pub fn events(&self) -> ActionEvents {
        self.event.into()
    }

    /// Time the action has been started, ongoing or triggered.
    #[must_use]
    pub fn elapsed_processed_secs(&self) -> f32 {
        self.elapsed_processed_secs
    }

    /// Time the action has been triggered.
    #[must_use]
    pub fn elapsed_triggered_secs(&self) -> f32 {
        self.elapsed_triggered_secs
    }

    #[must_use]
    pub fn snapshot(&self) -> ActionSnapshot {
        ActionSnapshot {
            state: self.state,
            events: self.events(),
            value: self.value,
        }
    }
}

/// Read-only state of an evaluated action.
#[derive(Debug, Default, PartialEq, Clone, Copy)]
pub struct ActionSnapshot {
    pub state: TriggerState,
    pub events: ActionEvents,
    pub value: ActionValue,
}

/// States of actions already evaluated during the current tick.
///
/// Passed to triggers that depend on other actions.
/// Actions not evaluated yet are reported as [`TriggerState::None`] without events.
#[derive(Debug, Default, Clone)]
pub struct ActionStates(HashMap<ActionId, ActionSnapshot>);

impl ActionStates {
    #[must_use]
    pub fn get(&self, action: &ActionId) -> Option<&ActionSnapshot> {
        self.0.get(action)
    }

    #[must_use]
    pub fn state(&self, action: &ActionId) -> TriggerState {
        self.get(action)
            .map(|snapshot| snapshot.state)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn events(&self, action: &ActionId) -> ActionEvents {
        self.get(action)
            .map(|snapshot| snapshot.events)
            .unwrap_or_default()
    }

    pub fn insert(&mut self, action: ActionId, snapshot: ActionSnapshot) {
        self.0.insert(action, snapshot);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
