/*!
Mapping contexts group [`ActionKeyMapping`]s into swappable control schemes, such as "On foot" or "In car".

Contexts are authored once and shared through [`Arc`]. They are applied to a player with a priority using
[`EnhancedPlayerInput::add_mapping_context`]. The player resolves all applied contexts into its own list
of mappings, walking contexts from the highest priority to the lowest. A key claimed by an action with
[`InputAction::consume_input`] hides mappings of the same key in lower priority contexts.

The player never mutates a context, it only clones mappings out of it.
*/

use alloc::{string::String, sync::Arc, vec::Vec};
use core::fmt::{self, Display, Formatter};

use bevy::platform::collections::{HashMap, HashSet};

use crate::prelude::*;

/// Ordered collection of key mappings.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use bevy::prelude::*;
/// use bevy_enhanced_player_input::prelude::*;
///
/// let drive = Arc::new(InputAction::new("Drive", ActionValueType::Axis1D));
/// let context = InputMappingContext::new("InCar")
///     .with_mapping(ActionKeyMapping::new(&drive, KeyCode::KeyW))
///     .with_mapping(ActionKeyMapping::new(&drive, KeyCode::KeyS).with_modifier(Negate::all()));
///
/// assert_eq!(context.mappings.len(), 2);
/// assert!(context.validate().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct InputMappingContext {
    name: Arc<str>,
    pub mappings: Vec<ActionKeyMapping>,
}

impl InputMappingContext {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            mappings: Default::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn with_mapping(mut self, mapping: ActionKeyMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    /// Returns all keys mapped to the given action in declaration order.
    pub fn keys_for_action<'a>(
        &'a self,
        action: &'a ActionId,
    ) -> impl Iterator<Item = InputKey> + 'a {
        self.mappings
            .iter()
            .filter(move |mapping| mapping.action_id() == Some(action))
            .map(|mapping| mapping.key)
    }

    /// Collects authoring problems of the context and every action it references.
    ///
    /// Problems never prevent the context from being applied, broken mappings are skipped instead.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut validated_actions = HashSet::<&ActionId>::default();
        let mut mappable_names = HashMap::<&str, usize>::default();

        for (index, mapping) in self.mappings.iter().enumerate() {
            match mapping.action() {
                Some(action) => {
                    if validated_actions.insert(action.id()) {
                        issues.extend(action.validate());
                    }
                }
                None => issues.push(ValidationIssue::MissingAction { mapping: index }),
            }

            if mapping.is_player_mappable {
                if mapping.player_mappable_name.is_empty() {
                    issues.push(ValidationIssue::MissingPlayerMappableName { mapping: index });
                } else {
                    let count = mappable_names
                        .entry(mapping.player_mappable_name.as_str())
                        .or_default();
                    *count += 1;
                    if *count == 2 {
                        issues.push(ValidationIssue::DuplicatePlayerMappableName {
                            name: mapping.player_mappable_name.clone(),
                        });
                    }
                }
            }
        }

        issues
    }
}

/// A context applied to a player with its priority.
#[derive(Debug, Clone)]
pub struct AppliedContext {
    pub context: Arc<InputMappingContext>,

    /// Contexts with higher priority are resolved first.
    pub priority: i32,
}

/// Options for [`EnhancedPlayerInput::add_mapping_context`] and
/// [`EnhancedPlayerInput::remove_mapping_context`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ModifyContextOptions {
    /// Rebuild mappings right away instead of on the next update.
    ///
    /// By default set to `false`.
    pub force_immediately: bool,

    /// Keys of the changed context that were down during the last tick
    /// read as up until they are released.
    ///
    /// Prevents a key that opened a menu from immediately activating
    /// an action in the menu's context.
    ///
    /// By default set to `true`.
    pub ignore_all_pressed_keys_until_release: bool,
}

impl ModifyContextOptions {
    #[must_use]
    pub fn force_immediately(mut self, force_immediately: bool) -> Self {
        self.force_immediately = force_immediately;
        self
    }

    #[must_use]
    pub fn ignore_all_pressed_keys_until_release(mut self, ignore: bool) -> Self {
        self.ignore_all_pressed_keys_until_release = ignore;
        self
    }
}

impl Default for ModifyContextOptions {
    fn default() -> Self {
        Self {
            force_immediately: false,
            ignore_all_pressed_keys_until_release: true,
        }
    }
}

/// Content authoring problem.
///
/// Never raised at runtime. Broken entries are skipped when evaluating.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ValidationIssue {
    /// An action has no name.
    EmptyActionName,
    /// A trigger of an action depends on the action itself.
    SelfReferencingTrigger { action: ActionId },
    /// A mapping doesn't reference any action.
    MissingAction { mapping: usize },
    /// A mapping is player mappable but has no name.
    MissingPlayerMappableName { mapping: usize },
    /// Two player mappable mappings in the same context share a name.
    DuplicatePlayerMappableName { name: String },
    /// A trigger entry could not be constructed.
    NullTrigger { owner: IssueOwner, index: usize },
    /// A modifier entry could not be constructed.
    NullModifier { owner: IssueOwner, index: usize },
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ValidationIssue::EmptyActionName => write!(f, "action has an empty name"),
            ValidationIssue::SelfReferencingTrigger { action } => {
                write!(f, "trigger of action `{action}` references the action itself")
            }
            ValidationIssue::MissingAction { mapping } => {
                write!(f, "mapping {mapping} has no action")
            }
            ValidationIssue::MissingPlayerMappableName { mapping } => {
                write!(f, "player mappable mapping {mapping} has no name")
            }
            ValidationIssue::DuplicatePlayerMappableName { name } => {
                write!(f, "player mappable name `{name}` is used more than once")
            }
            ValidationIssue::NullTrigger { owner, index } => {
                write!(f, "trigger {index} of {owner} is empty")
            }
            ValidationIssue::NullModifier { owner, index } => {
                write!(f, "modifier {index} of {owner} is empty")
            }
        }
    }
}

/// Location of a broken entry.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum IssueOwner {
    Action(ActionId),
    Mapping(usize),
}

impl Display for IssueOwner {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            IssueOwner::Action(action) => write!(f, "action `{action}`"),
            IssueOwner::Mapping(index) => write!(f, "mapping {index}"),
        }
    }
}
