//! Previewing the effect of a new key mapping before committing it.
//!
//! Rebinding screens call [`query_map_key_in_context_set`] to find out whether a key
//! can be bound to an action without breaking other mappings.

use alloc::{sync::Arc, vec::Vec};
use core::cmp::{Ordering, Reverse};

use bevy::prelude::*;
use bitflags::bitflags;
use log::trace;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::prelude::*;

/// Outcome of a mapping query.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum MappingQueryResult {
    /// No blocking issue was found.
    MappingAvailable,
    /// At least one issue matches the blocking mask.
    NotMappable,
    /// The queried context isn't among the active contexts.
    ErrorInputContextNotInActiveContexts,
}

/// Problems a new mapping would cause.
#[derive(Default, Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
pub struct MappingQueryIssue(u8);

bitflags! {
    impl MappingQueryIssue: u8 {
        /// The action of an existing mapping to the key reserves all its keys.
        const RESERVED_BY_ACTION = 0b00000001;
        /// A consuming mapping in a higher priority context already owns the key.
        const HIDDEN_BY_EXISTING_MAPPING = 0b00000010;
        /// The new mapping would hide a mapping in a lower priority context.
        const HIDES_EXISTING_MAPPING = 0b00000100;
        /// The key is already mapped to another action in the same context.
        const COLLISION_WITH_MAPPING_IN_SAME_CONTEXT = 0b00001000;
        /// The key has fewer dimensions than the action.
        const FORCES_TYPE_PROMOTION = 0b00010000;
        /// The key has more dimensions than the action, the extra axes are lost.
        const FORCES_TYPE_DEMOTION = 0b00100000;

        /// Issues treated as blocking by rebinding screens unless configured otherwise.
        const DEFAULT_BLOCKING = Self::RESERVED_BY_ACTION.bits()
            | Self::HIDES_EXISTING_MAPPING.bits()
            | Self::COLLISION_WITH_MAPPING_IN_SAME_CONTEXT.bits();
    }
}

#[cfg(feature = "serialize")]
impl Serialize for MappingQueryIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        bitflags::serde::serialize(self, serializer)
    }
}

#[cfg(feature = "serialize")]
impl<'de> Deserialize<'de> for MappingQueryIssue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bitflags::serde::deserialize(deserializer)
    }
}

/// A single issue found by a mapping query.
#[derive(Debug, Clone)]
pub struct MappingQueryIssueReport {
    /// Contains exactly one flag.
    pub issue: MappingQueryIssue,

    /// Context of the conflicting mapping.
    ///
    /// [`None`] for type issues.
    pub blocking_context: Option<Arc<InputMappingContext>>,

    /// Action of the conflicting mapping.
    ///
    /// [`None`] for type issues.
    pub blocking_action: Option<Arc<InputAction>>,
}

/// Checks what mapping `key` to `action` inside `context` would do to the active contexts.
///
/// Existing mappings of the same key are classified by the priority of their context
/// relative to `context`. Mappings of `action` itself never conflict.
///
/// Returns [`MappingQueryResult::NotMappable`] if any found issue intersects `blocking_issues`.
/// Reports are returned even if the mapping is available.
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
/// let crouch = Arc::new(InputAction::new("Crouch", ActionValueType::Boolean));
/// let context = Arc::new(
///     InputMappingContext::new("OnFoot").with_mapping(ActionKeyMapping::new(&jump, KeyCode::Space)),
/// );
/// let active = [AppliedContext {
///     context: context.clone(),
///     priority: 0,
/// }];
///
/// let (result, issues) = query_map_key_in_context_set(
///     &active,
///     &context,
///     &crouch,
///     KeyCode::Space.into(),
///     MappingQueryIssue::DEFAULT_BLOCKING,
/// );
/// assert_eq!(result, MappingQueryResult::NotMappable);
/// assert_eq!(issues[0].issue, MappingQueryIssue::COLLISION_WITH_MAPPING_IN_SAME_CONTEXT);
/// ```
pub fn query_map_key_in_context_set(
    active_contexts: &[AppliedContext],
    context: &Arc<InputMappingContext>,
    action: &Arc<InputAction>,
    key: InputKey,
    blocking_issues: MappingQueryIssue,
) -> (MappingQueryResult, Vec<MappingQueryIssueReport>) {
    let mut sorted: Vec<_> = active_contexts.iter().collect();
    sorted.sort_by_key(|applied| Reverse(applied.priority));

    let Some(target) = sorted
        .iter()
        .position(|applied| Arc::ptr_eq(&applied.context, context))
    else {
        return (
            MappingQueryResult::ErrorInputContextNotInActiveContexts,
            Vec::new(),
        );
    };

    let mut reports = Vec::new();
    match key.value_type().cmp(&action.value_type) {
        Ordering::Less => reports.push(type_issue(MappingQueryIssue::FORCES_TYPE_PROMOTION)),
        Ordering::Greater => reports.push(type_issue(MappingQueryIssue::FORCES_TYPE_DEMOTION)),
        Ordering::Equal => (),
    }

    for (index, applied) in sorted.iter().enumerate() {
        for mapping in &applied.context.mappings {
            if mapping.key != key {
                continue;
            }
            let Some(existing) = mapping.action() else {
                continue;
            };
            if existing.id() == action.id() {
                continue;
            }

            let issue = if existing.reserve_all_mappings {
                MappingQueryIssue::RESERVED_BY_ACTION
            } else {
                match index.cmp(&target) {
                    Ordering::Less if existing.consume_input => {
                        MappingQueryIssue::HIDDEN_BY_EXISTING_MAPPING
                    }
                    Ordering::Equal => MappingQueryIssue::COLLISION_WITH_MAPPING_IN_SAME_CONTEXT,
                    Ordering::Greater if action.consume_input => {
                        MappingQueryIssue::HIDES_EXISTING_MAPPING
                    }
                    _ => continue,
                }
            };

            reports.push(MappingQueryIssueReport {
                issue,
                blocking_context: Some(applied.context.clone()),
                blocking_action: Some(existing.clone()),
            });
        }
    }

    let issues = reports
        .iter()
        .fold(MappingQueryIssue::empty(), |issues, report| {
            issues | report.issue
        });
    let result = if issues.intersects(blocking_issues) {
        MappingQueryResult::NotMappable
    } else {
        MappingQueryResult::MappingAvailable
    };

    trace!(
        "mapping `{key}` to `{}` in `{}`: {result:?} with issues {issues:?}",
        action.id(),
        context.name(),
    );

    (result, reports)
}

fn type_issue(issue: MappingQueryIssue) -> MappingQueryIssueReport {
    MappingQueryIssueReport {
        issue,
        blocking_context: None,
        blocking_action: None,
    }
}

impl EnhancedPlayerInput {
    /// Runs [`query_map_key_in_context_set`] against contexts applied to this player.
    pub fn query_map_key_in_active_context_set(
        &self,
        context: &Arc<InputMappingContext>,
        action: &Arc<InputAction>,
        key: impl Into<InputKey>,
        blocking_issues: MappingQueryIssue,
    ) -> (MappingQueryResult, Vec<MappingQueryIssueReport>) {
        query_map_key_in_context_set(
            &self.applied_contexts,
            context,
            action,
            key.into(),
            blocking_issues,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_active() {
        let action = Arc::new(InputAction::new("Action", ActionValueType::Boolean));
        let context = Arc::new(InputMappingContext::new("Test"));

        let (result, issues) = query_map_key_in_context_set(
            &[],
            &context,
            &action,
            KeyCode::KeyA.into(),
            MappingQueryIssue::all(),
        );
        assert_eq!(result, MappingQueryResult::ErrorInputContextNotInActiveContexts);
        assert!(issues.is_empty());
    }

    #[test]
    fn stages() {
        let high_action = Arc::new(InputAction::new("High", ActionValueType::Boolean));
        let low_action = Arc::new(InputAction::new("Low", ActionValueType::Boolean));
        let same_action = Arc::new(InputAction::new("Same", ActionValueType::Boolean));
        let action = Arc::new(InputAction::new("Action", ActionValueType::Boolean));

        let high = Arc::new(
            InputMappingContext::new("High")
                .with_mapping(ActionKeyMapping::new(&high_action, KeyCode::KeyA)),
        );
        let target = Arc::new(
            InputMappingContext::new("Target")
                .with_mapping(ActionKeyMapping::new(&same_action, KeyCode::KeyA))
                .with_mapping(ActionKeyMapping::new(&action, KeyCode::KeyA))
                .with_mapping(ActionKeyMapping::new(&same_action, KeyCode::KeyB)),
        );
        let low = Arc::new(
            InputMappingContext::new("Low")
                .with_mapping(ActionKeyMapping::new(&low_action, KeyCode::KeyA)),
        );
        let active = [
            AppliedContext {
                context: low.clone(),
                priority: 0,
            },
            AppliedContext {
                context: high.clone(),
                priority: 2,
            },
            AppliedContext {
                context: target.clone(),
                priority: 1,
            },
        ];

        let (result, reports) = query_map_key_in_context_set(
            &active,
            &target,
            &action,
            KeyCode::KeyA.into(),
            MappingQueryIssue::HIDDEN_BY_EXISTING_MAPPING,
        );
        assert_eq!(result, MappingQueryResult::NotMappable);

        let issues: Vec<_> = reports.iter().map(|report| report.issue).collect();
        assert_eq!(
            issues,
            [
                MappingQueryIssue::HIDDEN_BY_EXISTING_MAPPING,
                MappingQueryIssue::COLLISION_WITH_MAPPING_IN_SAME_CONTEXT,
                MappingQueryIssue::HIDES_EXISTING_MAPPING,
            ]
        );
        let blocking_action = reports[2].blocking_action.as_ref().unwrap();
        assert_eq!(blocking_action.id(), low_action.id());
        let blocking_context = reports[2].blocking_context.as_ref().unwrap();
        assert!(Arc::ptr_eq(blocking_context, &low));

        let (result, _) = query_map_key_in_context_set(
            &active,
            &target,
            &action,
            KeyCode::KeyA.into(),
            MappingQueryIssue::FORCES_TYPE_DEMOTION,
        );
        assert_eq!(result, MappingQueryResult::MappingAvailable);
    }

    #[test]
    fn non_consuming() {
        let existing = Arc::new(
            InputAction::new("Existing", ActionValueType::Boolean).with_consume_input(false),
        );
        let action = Arc::new(
            InputAction::new("Action", ActionValueType::Boolean).with_consume_input(false),
        );
        let high = Arc::new(
            InputMappingContext::new("High")
                .with_mapping(ActionKeyMapping::new(&existing, KeyCode::KeyA)),
        );
        let target = Arc::new(InputMappingContext::new("Target"));
        let low = Arc::new(
            InputMappingContext::new("Low")
                .with_mapping(ActionKeyMapping::new(&existing, KeyCode::KeyA)),
        );
        let active = [
            AppliedContext {
                context: high,
                priority: 1,
            },
            AppliedContext {
                context: target.clone(),
                priority: 0,
            },
            AppliedContext {
                context: low,
                priority: -1,
            },
        ];

        let (result, reports) = query_map_key_in_context_set(
            &active,
            &target,
            &action,
            KeyCode::KeyA.into(),
            MappingQueryIssue::all(),
        );
        assert_eq!(result, MappingQueryResult::MappingAvailable);
        assert!(reports.is_empty());
    }

    #[test]
    fn reserved() {
        let reserved = Arc::new(
            InputAction::new("Reserved", ActionValueType::Boolean).with_reserve_all_mappings(true),
        );
        let action = Arc::new(InputAction::new("Action", ActionValueType::Boolean));
        let reserving = Arc::new(
            InputMappingContext::new("Reserving")
                .with_mapping(ActionKeyMapping::new(&reserved, KeyCode::Escape)),
        );
        let target = Arc::new(InputMappingContext::new("Target"));

        let mut player = EnhancedPlayerInput::default();
        player.add_mapping_context(reserving, -1, Default::default());
        player.add_mapping_context(target.clone(), 0, Default::default());

        let (result, reports) = player.query_map_key_in_active_context_set(
            &target,
            &action,
            KeyCode::Escape,
            MappingQueryIssue::DEFAULT_BLOCKING,
        );
        assert_eq!(result, MappingQueryResult::NotMappable);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].issue, MappingQueryIssue::RESERVED_BY_ACTION);
    }

    #[test]
    fn value_types() {
        let action = Arc::new(InputAction::new("Action", ActionValueType::Axis1D));
        let context = Arc::new(InputMappingContext::new("Test"));
        let active = [AppliedContext {
            context: context.clone(),
            priority: 0,
        }];

        let (result, reports) = query_map_key_in_context_set(
            &active,
            &context,
            &action,
            KeyCode::KeyA.into(),
            MappingQueryIssue::DEFAULT_BLOCKING,
        );
        assert_eq!(result, MappingQueryResult::MappingAvailable);
        assert_eq!(reports[0].issue, MappingQueryIssue::FORCES_TYPE_PROMOTION);

        let (result, reports) = query_map_key_in_context_set(
            &active,
            &context,
            &action,
            GamepadStick::Left.into(),
            MappingQueryIssue::FORCES_TYPE_DEMOTION,
        );
        assert_eq!(result, MappingQueryResult::NotMappable);
        assert_eq!(reports[0].issue, MappingQueryIssue::FORCES_TYPE_DEMOTION);
        assert!(reports[0].blocking_action.is_none());
    }
}
