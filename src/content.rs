/*!
Serializable descriptors for authoring actions and contexts as data.

Descriptors mirror [`InputAction`], [`ActionKeyMapping`] and [`InputMappingContext`], but reference
actions by name and describe triggers and modifiers as [`TriggerDesc`] and [`ModifierDesc`].
[`ContentRegistry`] turns them into runtime types.

Entries that can't be resolved, such as an unregistered [`TriggerDesc::Custom`] or a mapping to
an unknown action, are skipped when building and reported by validation.

# Examples

```
use std::sync::Arc;

use bevy_enhanced_player_input::prelude::*;

let action: ActionDesc = ron::from_str(
    r#"(
        name: "Jump",
        value_type: Boolean,
        triggers: [Pressed()],
    )"#,
)
.unwrap();

let context: ContextDesc = ron::from_str(
    r#"(
        name: "OnFoot",
        mappings: [
            (action: "Jump", key: Keyboard(Space)),
            (action: "Jump", key: GamepadButton(South), triggers: [Custom(name: "Unknown")]),
        ],
    )"#,
)
.unwrap();

let registry = ContentRegistry::default();
let jump = Arc::new(registry.build_action(&action));
let built = registry.build_context(&context, &[jump.clone()]);
assert_eq!(built.mappings.len(), 2);
assert!(built.mappings[1].triggers.is_empty());
assert_eq!(
    registry.validate_context(&context, &[jump]),
    [ValidationIssue::NullTrigger {
        owner: IssueOwner::Mapping(1),
        index: 0
    }]
);
```
*/

use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};

use bevy::{platform::collections::HashMap, prelude::*};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Descriptor of an [`InputAction`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDesc {
    pub name: String,
    pub value_type: ActionValueType,
    #[serde(default = "default_true")]
    pub consume_input: bool,
    #[serde(default)]
    pub trigger_when_paused: bool,
    #[serde(default)]
    pub reserve_all_mappings: bool,
    #[serde(default)]
    pub triggers: Vec<TriggerDesc>,
    #[serde(default)]
    pub modifiers: Vec<ModifierDesc>,
    #[serde(default)]
    pub final_modifiers: Vec<ModifierDesc>,
}

/// Descriptor of an [`ActionKeyMapping`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingDesc {
    /// Name of the mapped action.
    pub action: String,
    pub key: InputKey,
    #[serde(default)]
    pub triggers: Vec<TriggerDesc>,
    #[serde(default)]
    pub modifiers: Vec<ModifierDesc>,

    /// Makes the mapping player mappable under this name.
    #[serde(default)]
    pub player_mappable_name: Option<String>,
}

/// Descriptor of an [`InputMappingContext`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextDesc {
    pub name: String,
    #[serde(default)]
    pub mappings: Vec<MappingDesc>,
}

/// Descriptor of a trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TriggerDesc {
    Down {
        #[serde(default = "default_actuation")]
        actuation: f32,
    },
    Pressed {
        #[serde(default = "default_actuation")]
        actuation: f32,
    },
    Released {
        #[serde(default = "default_actuation")]
        actuation: f32,
    },
    Hold {
        hold_time: f32,
        #[serde(default)]
        one_shot: bool,
        #[serde(default = "default_actuation")]
        actuation: f32,
        #[serde(default)]
        time_kind: TimeKind,
    },
    HoldAndRelease {
        hold_time: f32,
        #[serde(default = "default_actuation")]
        actuation: f32,
        #[serde(default)]
        time_kind: TimeKind,
    },
    Tap {
        release_time: f32,
        #[serde(default = "default_actuation")]
        actuation: f32,
        #[serde(default)]
        time_kind: TimeKind,
    },
    Pulse {
        interval: f32,
        #[serde(default)]
        trigger_limit: u32,
        #[serde(default = "default_true")]
        trigger_on_start: bool,
        #[serde(default = "default_actuation")]
        actuation: f32,
        #[serde(default)]
        time_kind: TimeKind,
    },
    ChordAction {
        action: Option<String>,
    },
    ChordBlocker {
        action: Option<String>,
    },
    Combo {
        steps: Vec<ComboStepDesc>,
        #[serde(default)]
        cancel_actions: Vec<CancelActionDesc>,
        #[serde(default)]
        time_kind: TimeKind,
    },
    /// Trigger registered with [`ContentRegistry::register_trigger`].
    Custom {
        name: String,
    },
}

/// Descriptor of a [`ComboStep`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboStepDesc {
    pub action: String,
    #[serde(default = "default_step_events")]
    pub events: ActionEvents,
    #[serde(default = "default_step_timeout")]
    pub timeout: f32,
}

/// Descriptor of a [`CancelAction`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelActionDesc {
    pub action: String,
    #[serde(default = "default_cancel_events")]
    pub events: ActionEvents,
}

/// Descriptor of a modifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModifierDesc {
    DeadZone {
        #[serde(default)]
        kind: DeadZoneKind,
        #[serde(default = "default_lower_threshold")]
        lower_threshold: f32,
        #[serde(default = "default_one")]
        upper_threshold: f32,
    },
    Scalar {
        factor: Vec3,
    },
    Negate {
        #[serde(default)]
        x: bool,
        #[serde(default)]
        y: bool,
        #[serde(default)]
        z: bool,
    },
    SwizzleAxis(SwizzleAxis),
    ExponentialCurve {
        exponent: Vec3,
    },
    ScaleByDeltaTime {
        #[serde(default)]
        time_kind: TimeKind,
    },
    Smooth {
        samples: usize,
    },
    FovScaling {
        #[serde(default)]
        kind: FovScalingKind,
        #[serde(default = "default_one")]
        scale: f32,
    },
    ToWorldSpace,
    Collection {
        modifiers: Vec<ModifierDesc>,
        #[serde(default)]
        permit_value_type_modification: bool,
    },
    /// Modifier registered with [`ContentRegistry::register_modifier`].
    Custom {
        name: String,
    },
}

fn default_true() -> bool {
    true
}

fn default_one() -> f32 {
    1.0
}

fn default_actuation() -> f32 {
    DEFAULT_ACTUATION
}

fn default_lower_threshold() -> f32 {
    0.2
}

fn default_step_events() -> ActionEvents {
    ActionEvents::COMPLETED
}

fn default_step_timeout() -> f32 {
    0.5
}

fn default_cancel_events() -> ActionEvents {
    ActionEvents::ONGOING | ActionEvents::TRIGGERED
}

type TriggerConstructor = Box<dyn Fn() -> Box<dyn InputTrigger> + Send + Sync>;
type ModifierConstructor = Box<dyn Fn() -> Box<dyn InputModifier> + Send + Sync>;

/// Constructors for custom triggers and modifiers referenced by descriptors.
///
/// Inserted by [`EnhancedInputPlugin`].
#[derive(Resource, Default)]
pub struct ContentRegistry {
    triggers: HashMap<String, TriggerConstructor>,
    modifiers: HashMap<String, ModifierConstructor>,
}

impl ContentRegistry {
    /// Makes [`TriggerDesc::Custom`] with the name resolve to triggers returned by `constructor`.
    pub fn register_trigger<T: InputTrigger>(
        &mut self,
        name: impl Into<String>,
        constructor: impl Fn() -> T + Send + Sync + 'static,
    ) -> &mut Self {
        self.triggers
            .insert(name.into(), Box::new(move || -> Box<dyn InputTrigger> {
                Box::new(constructor())
            }));
        self
    }

    /// Makes [`ModifierDesc::Custom`] with the name resolve to modifiers returned by `constructor`.
    pub fn register_modifier<M: InputModifier>(
        &mut self,
        name: impl Into<String>,
        constructor: impl Fn() -> M + Send + Sync + 'static,
    ) -> &mut Self {
        self.modifiers
            .insert(name.into(), Box::new(move || -> Box<dyn InputModifier> {
                Box::new(constructor())
            }));
        self
    }

    /// Returns [`None`] for unregistered custom triggers.
    #[must_use]
    pub fn build_trigger(&self, desc: &TriggerDesc) -> Option<Box<dyn InputTrigger>> {
        let trigger: Box<dyn InputTrigger> = match *desc {
            TriggerDesc::Down { actuation } => Box::new(Down::new(actuation)),
            TriggerDesc::Pressed { actuation } => Box::new(Pressed::new(actuation)),
            TriggerDesc::Released { actuation } => Box::new(Released::new(actuation)),
            TriggerDesc::Hold {
                hold_time,
                one_shot,
                actuation,
                time_kind,
            } => Box::new(
                Hold::new(hold_time)
                    .one_shot(one_shot)
                    .with_actuation(actuation)
                    .with_time_kind(time_kind),
            ),
            TriggerDesc::HoldAndRelease {
                hold_time,
                actuation,
                time_kind,
            } => Box::new(
                HoldAndRelease::new(hold_time)
                    .with_actuation(actuation)
                    .with_time_kind(time_kind),
            ),
            TriggerDesc::Tap {
                release_time,
                actuation,
                time_kind,
            } => Box::new(
                Tap::new(release_time)
                    .with_actuation(actuation)
                    .with_time_kind(time_kind),
            ),
            TriggerDesc::Pulse {
                interval,
                trigger_limit,
                trigger_on_start,
                actuation,
                time_kind,
            } => Box::new(
                Pulse::new(interval)
                    .with_trigger_limit(trigger_limit)
                    .trigger_on_start(trigger_on_start)
                    .with_actuation(actuation)
                    .with_time_kind(time_kind),
            ),
            TriggerDesc::ChordAction { ref action } => Box::new(ChordAction {
                action: action.as_deref().map(Into::into),
            }),
            TriggerDesc::ChordBlocker { ref action } => Box::new(ChordBlocker {
                action: action.as_deref().map(Into::into),
            }),
            TriggerDesc::Combo {
                ref steps,
                ref cancel_actions,
                time_kind,
            } => {
                let mut combo = Combo::default().with_time_kind(time_kind);
                for step in steps {
                    combo = combo.with_step(
                        ComboStep::new(step.action.as_str())
                            .with_events(step.events)
                            .with_timeout(step.timeout),
                    );
                }
                for cancel in cancel_actions {
                    combo = combo.with_cancel(
                        CancelAction::new(cancel.action.as_str()).with_events(cancel.events),
                    );
                }
                Box::new(combo)
            }
            TriggerDesc::Custom { ref name } => {
                let constructor = self.triggers.get(name)?;
                constructor()
            }
        };

        Some(trigger)
    }

    /// Returns [`None`] for unregistered custom modifiers.
    ///
    /// Unresolved modifiers nested in [`ModifierDesc::Collection`] are dropped from it.
    #[must_use]
    pub fn build_modifier(&self, desc: &ModifierDesc) -> Option<Box<dyn InputModifier>> {
        let modifier: Box<dyn InputModifier> = match *desc {
            ModifierDesc::DeadZone {
                kind,
                lower_threshold,
                upper_threshold,
            } => Box::new(
                DeadZone::new(kind)
                    .with_lower_threshold(lower_threshold)
                    .with_upper_threshold(upper_threshold),
            ),
            ModifierDesc::Scalar { factor } => Box::new(Scalar::new(factor)),
            ModifierDesc::Negate { x, y, z } => Box::new(Negate { x, y, z }),
            ModifierDesc::SwizzleAxis(swizzle) => Box::new(swizzle),
            ModifierDesc::ExponentialCurve { exponent } => {
                Box::new(ExponentialCurve::new(exponent))
            }
            ModifierDesc::ScaleByDeltaTime { time_kind } => {
                Box::new(ScaleByDeltaTime::new(time_kind))
            }
            ModifierDesc::Smooth { samples } => Box::new(Smooth::new(samples)),
            ModifierDesc::FovScaling { kind, scale } => {
                Box::new(FovScaling::new(kind).with_scale(scale))
            }
            ModifierDesc::ToWorldSpace => Box::new(ToWorldSpace),
            ModifierDesc::Collection {
                ref modifiers,
                permit_value_type_modification,
            } => Box::new(ModifierCollection {
                modifiers: self.build_modifiers(modifiers),
                permit_value_type_modification,
            }),
            ModifierDesc::Custom { ref name } => {
                let constructor = self.modifiers.get(name)?;
                constructor()
            }
        };

        Some(modifier)
    }

    /// Builds an action, skipping unresolved triggers and modifiers.
    #[must_use]
    pub fn build_action(&self, desc: &ActionDesc) -> InputAction {
        let mut action = InputAction::new(desc.name.as_str(), desc.value_type)
            .with_consume_input(desc.consume_input)
            .with_trigger_when_paused(desc.trigger_when_paused)
            .with_reserve_all_mappings(desc.reserve_all_mappings);
        action.triggers = self.build_triggers(&desc.triggers);
        action.modifiers = self.build_modifiers(&desc.modifiers);
        action.final_modifiers = self.build_modifiers(&desc.final_modifiers);

        action
    }

    /// Builds a context with mappings to `actions` by name.
    ///
    /// Mappings to unknown actions are kept unassigned and skipped by players.
    #[must_use]
    pub fn build_context(
        &self,
        desc: &ContextDesc,
        actions: &[Arc<InputAction>],
    ) -> InputMappingContext {
        let mut context = InputMappingContext::new(desc.name.as_str());
        for mapping_desc in &desc.mappings {
            let mut mapping = match find_action(actions, &mapping_desc.action) {
                Some(action) => ActionKeyMapping::new(action, mapping_desc.key),
                None => {
                    debug!(
                        "mapping `{}` in context `{}` references unknown action `{}`",
                        mapping_desc.key, desc.name, mapping_desc.action
                    );
                    ActionKeyMapping::unassigned(mapping_desc.key)
                }
            };
            mapping.triggers = self
                .build_triggers(&mapping_desc.triggers)
                .into_iter()
                .map(TrackedTrigger::new)
                .collect();
            mapping.modifiers = self.build_modifiers(&mapping_desc.modifiers);
            if let Some(name) = &mapping_desc.player_mappable_name {
                mapping = mapping.player_mappable(name.as_str());
            }

            context.mappings.push(mapping);
        }

        context
    }

    /// Collects problems of the built action together with unresolved entries.
    #[must_use]
    pub fn validate_action(&self, desc: &ActionDesc) -> Vec<ValidationIssue> {
        let owner = IssueOwner::Action(desc.name.as_str().into());
        let mut issues = self.build_action(desc).validate();
        self.null_triggers(&desc.triggers, &owner, &mut issues);
        self.null_modifiers(&desc.modifiers, &owner, &mut issues);
        self.null_modifiers(&desc.final_modifiers, &owner, &mut issues);

        issues
    }

    /// Collects problems of the built context together with unresolved entries.
    ///
    /// Doesn't validate the referenced actions, use [`Self::validate_action`] for them.
    #[must_use]
    pub fn validate_context(
        &self,
        desc: &ContextDesc,
        actions: &[Arc<InputAction>],
    ) -> Vec<ValidationIssue> {
        let mut issues: Vec<_> = self
            .build_context(desc, actions)
            .validate()
            .into_iter()
            .filter(|issue| {
                !matches!(
                    issue,
                    ValidationIssue::EmptyActionName
                        | ValidationIssue::SelfReferencingTrigger { .. }
                )
            })
            .collect();

        for (index, mapping) in desc.mappings.iter().enumerate() {
            let owner = IssueOwner::Mapping(index);
            self.null_triggers(&mapping.triggers, &owner, &mut issues);
            self.null_modifiers(&mapping.modifiers, &owner, &mut issues);
        }

        issues
    }

    fn build_triggers(&self, descs: &[TriggerDesc]) -> Vec<Box<dyn InputTrigger>> {
        descs
            .iter()
            .filter_map(|desc| {
                let trigger = self.build_trigger(desc);
                if trigger.is_none() {
                    debug!("skipping unresolved trigger `{desc:?}`");
                }
                trigger
            })
            .collect()
    }

    fn build_modifiers(&self, descs: &[ModifierDesc]) -> Vec<Box<dyn InputModifier>> {
        descs
            .iter()
            .filter_map(|desc| {
                let modifier = self.build_modifier(desc);
                if modifier.is_none() {
                    debug!("skipping unresolved modifier `{desc:?}`");
                }
                modifier
            })
            .collect()
    }

    fn null_triggers(
        &self,
        descs: &[TriggerDesc],
        owner: &IssueOwner,
        issues: &mut Vec<ValidationIssue>,
    ) {
        for (index, desc) in descs.iter().enumerate() {
            if let TriggerDesc::Custom { name } = desc
                && !self.triggers.contains_key(name)
            {
                issues.push(ValidationIssue::NullTrigger {
                    owner: owner.clone(),
                    index,
                });
            }
        }
    }

    fn null_modifiers(
        &self,
        descs: &[ModifierDesc],
        owner: &IssueOwner,
        issues: &mut Vec<ValidationIssue>,
    ) {
        for (index, desc) in descs.iter().enumerate() {
            if self.is_null_modifier(desc) {
                issues.push(ValidationIssue::NullModifier {
                    owner: owner.clone(),
                    index,
                });
            }
        }
    }

    fn is_null_modifier(&self, desc: &ModifierDesc) -> bool {
        match desc {
            ModifierDesc::Custom { name } => !self.modifiers.contains_key(name),
            ModifierDesc::Collection { modifiers, .. } => {
                modifiers.iter().any(|nested| self.is_null_modifier(nested))
            }
            _ => false,
        }
    }
}

fn find_action<'a>(actions: &'a [Arc<InputAction>], name: &str) -> Option<&'a Arc<InputAction>> {
    actions.iter().find(|action| action.id().as_str() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_triggers() {
        let action: ActionDesc = ron::from_str(
            r#"(
                name: "Fire",
                value_type: Axis1D,
                consume_input: false,
                triggers: [
                    Hold(hold_time: 0.5, one_shot: true),
                    Combo(steps: [(action: "Aim"), (action: "Aim", timeout: 0.2)]),
                    ChordAction(action: Some("Aim")),
                ],
                modifiers: [DeadZone(), Negate(x: true)],
            )"#,
        )
        .unwrap();

        let registry = ContentRegistry::default();
        let action = registry.build_action(&action);
        assert_eq!(action.id().as_str(), "Fire");
        assert_eq!(action.value_type, ActionValueType::Axis1D);
        assert!(!action.consume_input);
        assert_eq!(action.triggers.len(), 3);
        assert_eq!(action.modifiers.len(), 2);
        assert!(action.has_chord_trigger());

        let dependencies = action.triggers[1].dependencies();
        assert_eq!(dependencies.as_slice(), [ActionId::from("Aim")]);
    }

    #[test]
    fn custom_entries() {
        let desc: ActionDesc = ron::from_str(
            r#"(
                name: "Look",
                value_type: Axis2D,
                triggers: [Custom(name: "Always")],
                modifiers: [Custom(name: "Double"), Collection(modifiers: [Custom(name: "Missing")])],
            )"#,
        )
        .unwrap();

        let mut registry = ContentRegistry::default();
        assert_eq!(
            registry.validate_action(&desc),
            [
                ValidationIssue::NullTrigger {
                    owner: IssueOwner::Action("Look".into()),
                    index: 0
                },
                ValidationIssue::NullModifier {
                    owner: IssueOwner::Action("Look".into()),
                    index: 0
                },
                ValidationIssue::NullModifier {
                    owner: IssueOwner::Action("Look".into()),
                    index: 1
                },
            ]
        );

        registry
            .register_trigger("Always", Down::default)
            .register_modifier("Double", || Scalar::splat(2.0));
        assert_eq!(
            registry.validate_action(&desc),
            [ValidationIssue::NullModifier {
                owner: IssueOwner::Action("Look".into()),
                index: 1
            }]
        );

        let action = registry.build_action(&desc);
        assert_eq!(action.triggers.len(), 1);
        assert_eq!(action.modifiers.len(), 2);
    }

    #[test]
    fn unknown_action() {
        let context: ContextDesc = ron::from_str(
            r#"(
                name: "Menu",
                mappings: [
                    (action: "Confirm", key: Keyboard(Enter), player_mappable_name: Some("Confirm")),
                    (action: "Back", key: Keyboard(Escape)),
                ],
            )"#,
        )
        .unwrap();

        let confirm = Arc::new(InputAction::new("Confirm", ActionValueType::Boolean));
        let registry = ContentRegistry::default();
        let actions = [confirm];

        let built = registry.build_context(&context, &actions);
        assert_eq!(built.name(), "Menu");
        assert!(built.mappings[0].is_player_mappable);
        assert!(built.mappings[1].action().is_none());
        assert_eq!(
            registry.validate_context(&context, &actions),
            [ValidationIssue::MissingAction { mapping: 1 }]
        );
    }
}
