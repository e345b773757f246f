/*!
Control mapping lifecycle of a player.

Contexts, player mapped keys and forced input are changed through methods on
[`EnhancedPlayerInput`]. Changes mark the player for a rebuild, which the plugin performs in
[`EnhancedInputSystems::Prepare`] before the next tick. Pass
[`ModifyContextOptions::force_immediately`] to rebuild right away.

Rebuilding walks applied contexts from the highest priority to the lowest and copies every mapping
into the player, so triggers and modifiers get fresh state. A key claimed by a consuming action hides
mappings of the same key in lower priority contexts. Mappings within a single context never hide
each other.

Chorded mappings never claim their key. Instead, every lower mapping of the same key to another
action receives a [`ChordBlocker`], so it doesn't fire while the chord is active.
*/

pub mod query;

use alloc::{boxed::Box, string::String, sync::Arc, vec, vec::Vec};
use core::cmp::Reverse;

use bevy::{
    platform::collections::{HashMap, HashSet},
    prelude::*,
};
use log::{debug, trace, warn};

use crate::{
    player::{ForcedAction, InjectedInput},
    prelude::*,
};

/// Threshold of the [`Down`] trigger added to mappings that only get a [`ChordBlocker`].
const CHORD_BASE_ACTUATION: f32 = 1e-4;

impl EnhancedPlayerInput {
    /// Applies a context to the player.
    ///
    /// If the context is already applied, only its priority is updated.
    pub fn add_mapping_context(
        &mut self,
        context: Arc<InputMappingContext>,
        priority: i32,
        options: ModifyContextOptions,
    ) {
        if let Some(applied) = self
            .applied_contexts
            .iter_mut()
            .find(|applied| Arc::ptr_eq(&applied.context, &context))
        {
            if applied.priority == priority {
                return;
            }
            debug!(
                "changing priority of context `{}` from {} to {priority}",
                context.name(),
                applied.priority
            );
            applied.priority = priority;
        } else {
            debug!(
                "adding context `{}` with priority {priority}",
                context.name()
            );
            self.applied_contexts.push(AppliedContext {
                context: context.clone(),
                priority,
            });
        }

        if options.ignore_all_pressed_keys_until_release {
            self.ignore_pressed_keys(&context);
        }
        self.request_rebuild_control_mappings(options);
    }

    /// Removes a previously applied context.
    ///
    /// Returns `false` if the context wasn't applied.
    pub fn remove_mapping_context(
        &mut self,
        context: &Arc<InputMappingContext>,
        options: ModifyContextOptions,
    ) -> bool {
        let Some(index) = self
            .applied_contexts
            .iter()
            .position(|applied| Arc::ptr_eq(&applied.context, context))
        else {
            return false;
        };

        debug!("removing context `{}`", context.name());
        self.applied_contexts.remove(index);
        if options.ignore_all_pressed_keys_until_release {
            self.ignore_pressed_keys(context);
        }
        self.request_rebuild_control_mappings(options);

        true
    }

    #[must_use]
    pub fn has_mapping_context(&self, context: &Arc<InputMappingContext>) -> bool {
        self.mapping_context_priority(context).is_some()
    }

    /// Returns the priority of an applied context.
    #[must_use]
    pub fn mapping_context_priority(&self, context: &Arc<InputMappingContext>) -> Option<i32> {
        self.applied_contexts
            .iter()
            .find(|applied| Arc::ptr_eq(&applied.context, context))
            .map(|applied| applied.priority)
    }

    /// Removes all applied contexts.
    pub fn clear_all_mappings(&mut self, options: ModifyContextOptions) {
        debug!("removing all {} contexts", self.applied_contexts.len());
        self.applied_contexts.clear();
        self.request_rebuild_control_mappings(options);
    }

    /// Marks mappings for a rebuild.
    ///
    /// Rebuilds immediately if [`ModifyContextOptions::force_immediately`] is set.
    pub fn request_rebuild_control_mappings(&mut self, options: ModifyContextOptions) {
        self.rebuild_pending = true;
        if options.force_immediately {
            self.rebuild_control_mappings();
        }
    }

    /// Returns `true` if mappings will be rebuilt before the next tick.
    #[must_use]
    pub fn is_rebuild_pending(&self) -> bool {
        self.rebuild_pending
    }

    /// Resolves mappings from applied contexts.
    ///
    /// Does nothing unless a rebuild was requested. Discards all action instances,
    /// so in-flight actions restart from [`TriggerState::None`].
    ///
    /// Returns `true` if mappings were rebuilt.
    pub fn rebuild_control_mappings(&mut self) -> bool {
        if !self.rebuild_pending {
            return false;
        }
        self.rebuild_pending = false;

        let mut contexts = self.applied_contexts.clone();
        contexts.sort_by_key(|applied| Reverse(applied.priority));

        self.mappings.clear();
        self.instances.clear();
        self.injected_sources.clear();

        let mut applied_keys = HashSet::<InputKey>::default();
        let mut chorded = Vec::new();
        for applied in &contexts {
            let mut context_keys = Vec::new();
            for (index, source) in applied.context.mappings.iter().enumerate() {
                let Some(action) = source.action() else {
                    warn!(
                        "skipping mapping {index} to `{}` in context `{}` without an action",
                        source.key,
                        applied.context.name(),
                    );
                    continue;
                };

                let key = self.resolve_key(source);
                if applied_keys.contains(&key) {
                    trace!(
                        "`{key}` for `{}` is hidden by a higher priority mapping",
                        action.id()
                    );
                    continue;
                }

                let mut mapping = source.resolve(key);
                let warm_up = ActionValue::zero(action.value_type);
                apply_modifiers(&mut mapping.modifiers, warm_up, &ModifierContext::default());
                self.instances
                    .entry(action.id().clone())
                    .or_insert_with(|| ActionInstance::new(action.clone()));

                if mapping.is_chorded() {
                    chorded.push(self.mappings.len());
                } else if action.consume_input {
                    context_keys.push(key);
                }

                self.mappings.push(mapping);
            }

            applied_keys.extend(context_keys);
        }

        inject_chord_blockers(&mut self.mappings, &chorded);

        self.action_mappings.clear();
        for (index, mapping) in self.mappings.iter().enumerate() {
            if let Some(action) = mapping.action_id() {
                self.action_mappings
                    .entry(action.clone())
                    .or_default()
                    .push(index);
            }
        }

        self.evaluation_order = evaluation_order(&self.mappings);

        debug!(
            "rebuilt {} mappings for {} actions from {} contexts",
            self.mappings.len(),
            self.action_mappings.len(),
            contexts.len(),
        );

        true
    }

    /// Overrides the key of all player mappable mappings with the given name.
    pub fn add_player_mapped_key(
        &mut self,
        name: impl Into<String>,
        key: impl Into<InputKey>,
        options: ModifyContextOptions,
    ) {
        let name = name.into();
        let key = key.into();
        debug!("mapping `{name}` to `{key}`");
        self.player_mapped_keys.insert(name, key);
        self.request_rebuild_control_mappings(options);
    }

    /// Restores the authored key for the player mappable name.
    ///
    /// Returns `false` if the name had no override.
    pub fn remove_player_mapped_key(&mut self, name: &str, options: ModifyContextOptions) -> bool {
        if self.player_mapped_keys.remove(name).is_none() {
            return false;
        }

        debug!("removing player mapped key for `{name}`");
        self.request_rebuild_control_mappings(options);
        true
    }

    pub fn remove_all_player_mapped_keys(&mut self, options: ModifyContextOptions) {
        if self.player_mapped_keys.is_empty() {
            return;
        }

        debug!(
            "removing all {} player mapped keys",
            self.player_mapped_keys.len()
        );
        self.player_mapped_keys.clear();
        self.request_rebuild_control_mappings(options);
    }

    /// Returns the key the player mapped for the name.
    #[must_use]
    pub fn player_mapped_key(&self, name: &str) -> Option<InputKey> {
        self.player_mapped_keys.get(name).copied()
    }

    /// Injects the value into the action every tick until removed.
    pub fn apply_forced_action_input(
        &mut self,
        action: &Arc<InputAction>,
        value: impl Into<ActionValue>,
    ) {
        self.forced_actions.insert(
            action.id().clone(),
            ForcedAction {
                action: action.clone(),
                value: value.into(),
            },
        );
    }

    pub fn remove_forced_action_input(&mut self, action: &ActionId) -> bool {
        self.forced_actions.remove(action).is_some()
    }

    /// Reads the key as held with the value every tick until removed.
    pub fn apply_forced_key_input(
        &mut self,
        key: impl Into<InputKey>,
        value: impl Into<ActionValue>,
    ) {
        self.forced_keys.insert(key.into(), value.into());
    }

    pub fn remove_forced_key_input(&mut self, key: impl Into<InputKey>) -> bool {
        self.forced_keys.remove(&key.into()).is_some()
    }

    /// Feeds a value into the action for the next tick, independently of physical keys.
    ///
    /// The action doesn't need to be mapped. Injecting on consecutive ticks reports the input
    /// as held, and the tick after the last injection releases it.
    /// Modifiers and triggers of the first injection are kept while the injection continues.
    pub fn inject_input_for_action(
        &mut self,
        action: &Arc<InputAction>,
        value: impl Into<ActionValue>,
        modifiers: Vec<Box<dyn InputModifier>>,
        triggers: Vec<Box<dyn InputTrigger>>,
    ) {
        self.queue_injection(
            action.clone(),
            InjectedInput::new(value.into(), modifiers, triggers),
        );
    }

    /// Returns keys of resolved mappings to the action, highest priority first.
    #[must_use]
    pub fn keys_mapped_to_action(&self, action: &ActionId) -> Vec<InputKey> {
        self.action_mappings
            .get(action)
            .into_iter()
            .flatten()
            .map(|&index| self.mappings[index].key)
            .collect()
    }

    fn resolve_key(&self, mapping: &ActionKeyMapping) -> InputKey {
        if !mapping.is_player_mappable {
            return mapping.key;
        }

        self.player_mapped_keys
            .get(&mapping.player_mappable_name)
            .copied()
            .unwrap_or(mapping.key)
    }

    fn ignore_pressed_keys(&mut self, context: &InputMappingContext) {
        for mapping in &context.mappings {
            let key = self.resolve_key(mapping);
            if self.keys_down.contains(&key) {
                trace!("ignoring `{key}` until release");
                self.keys_ignored_until_release.insert(key);
            }
        }
    }
}

/// Blocks lower mappings of chorded keys while the chord action is triggered.
fn inject_chord_blockers(mappings: &mut [ActionKeyMapping], chorded: &[usize]) {
    for &chord_index in chorded {
        let chord = &mappings[chord_index];
        let Some(chord_action) = chord.action_id().cloned() else {
            continue;
        };
        let key = chord.key;

        for mapping in &mut mappings[chord_index + 1..] {
            if mapping.key != key || mapping.action_id() == Some(&chord_action) {
                continue;
            }

            trace!(
                "blocking `{key}` for `{:?}` by `{chord_action}`",
                mapping.action_id()
            );
            if !mapping.has_explicit_trigger() {
                mapping.triggers.push(Down::new(CHORD_BASE_ACTUATION).into());
            }
            mapping
                .triggers
                .push(ChordBlocker::new(chord_action.clone()).into());
        }
    }
}

/// Orders actions so that actions referenced by triggers are evaluated first.
///
/// Ties keep the declaration order. Actions in a cycle are appended in declaration order.
fn evaluation_order(mappings: &[ActionKeyMapping]) -> Vec<ActionId> {
    let mut actions = Vec::<ActionId>::new();
    let mut indices = HashMap::<ActionId, usize>::default();
    let mut edges = HashSet::<(usize, usize)>::default();

    let mut node = |action: &ActionId, actions: &mut Vec<ActionId>| {
        *indices.entry(action.clone()).or_insert_with(|| {
            actions.push(action.clone());
            actions.len() - 1
        })
    };

    for mapping in mappings {
        let Some(action) = mapping.action() else {
            continue;
        };
        let dependent = node(action.id(), &mut actions);

        let mapping_dependencies = mapping
            .triggers
            .iter()
            .flat_map(|tracked| tracked.trigger().dependencies());
        let action_dependencies = action
            .triggers
            .iter()
            .flat_map(|trigger| trigger.dependencies());
        for dependency in mapping_dependencies.chain(action_dependencies) {
            let dependency = node(&dependency, &mut actions);
            if dependency != dependent {
                edges.insert((dependency, dependent));
            }
        }
    }

    let mut in_degree = vec![0usize; actions.len()];
    let mut dependents = vec![Vec::new(); actions.len()];
    for &(dependency, dependent) in &edges {
        in_degree[dependent] += 1;
        dependents[dependency].push(dependent);
    }

    let mut done = vec![false; actions.len()];
    let mut order = Vec::with_capacity(actions.len());
    while let Some(index) = (0..actions.len()).find(|&index| !done[index] && in_degree[index] == 0)
    {
        done[index] = true;
        order.push(index);
        for &dependent in &dependents[index] {
            in_degree[dependent] -= 1;
        }
    }

    if order.len() < actions.len() {
        warn!("actions have cyclic trigger dependencies, evaluating them in declaration order");
        order.extend((0..actions.len()).filter(|&index| !done[index]));
    }

    order.into_iter().map(|index| actions[index].clone()).collect()
}
