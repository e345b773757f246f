/*!
Per-player evaluation of actions.

[`EnhancedPlayerInput`] is a component that owns everything a single player needs at runtime:
applied [contexts](crate::context), the mappings resolved from them, one [`ActionInstance`] per
action and the stack of [`InputComponent`]s that receive the results.

Each tick walks actions in dependency order. For every action, values of all its mapped keys
and injected inputs are passed through the mapping and action modifiers, evaluated by triggers,
merged by magnitude and finally passed through the final modifiers. The resulting state
transition produces the [`TriggerEvent`] of the tick.

The plugin ticks every player in [`EnhancedInputSystems::Update`]. Call [`EnhancedPlayerInput::tick`]
directly to drive a player from scripted input.
*/

pub mod dispatch;
pub mod raw;

use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};

use bevy::{
    platform::collections::{HashMap, HashSet},
    prelude::*,
};
use log::trace;
use smallvec::SmallVec;

use crate::{prelude::*, trigger::tracker::TriggerStateTracker};
use dispatch::InputStack;

/// Input state of a single player.
///
/// Configured through the methods from the [`subsystem`](crate::subsystem) module.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use bevy::{platform::collections::HashMap, prelude::*};
/// use bevy_enhanced_player_input::prelude::*;
///
/// let jump = Arc::new(InputAction::new("Jump", ActionValueType::Boolean));
/// let context = Arc::new(
///     InputMappingContext::new("OnFoot").with_mapping(ActionKeyMapping::new(&jump, KeyCode::Space)),
/// );
///
/// let mut player = EnhancedPlayerInput::default();
/// player.add_mapping_context(context, 0, ModifyContextOptions::default().force_immediately(true));
///
/// let mut keys = HashMap::<InputKey, KeyState>::default();
/// keys.insert(KeyCode::Space.into(), KeyState::just_pressed());
/// player.tick(&keys, InputTime::from_secs(0.016), false);
///
/// let instance = player.action_instance(jump.id()).unwrap();
/// assert_eq!(instance.trigger_event(), TriggerEvent::Triggered);
/// ```
#[derive(Component, Default)]
pub struct EnhancedPlayerInput {
    /// Field of view of the player's camera in degrees.
    ///
    /// Passed to modifiers such as [`FovScaling`].
    pub camera_fov: Option<f32>,

    pub(crate) applied_contexts: Vec<AppliedContext>,
    pub(crate) rebuild_pending: bool,
    pub(crate) player_mapped_keys: HashMap<String, InputKey>,
    pub(crate) forced_actions: HashMap<ActionId, ForcedAction>,
    pub(crate) forced_keys: HashMap<InputKey, ActionValue>,
    pub(crate) keys_ignored_until_release: HashSet<InputKey>,

    /// Mappings resolved from applied contexts, highest priority first.
    pub(crate) mappings: Vec<ActionKeyMapping>,
    /// Indices into `mappings` per action.
    pub(crate) action_mappings: HashMap<ActionId, Vec<usize>>,
    /// Actions ordered so that referenced actions come before the ones referencing them.
    pub(crate) evaluation_order: Vec<ActionId>,
    pub(crate) instances: HashMap<ActionId, ActionInstance>,

    pub(crate) keys_down: HashSet<InputKey>,
    pending_injections: Vec<(Arc<InputAction>, InjectedInput)>,
    pub(crate) injected_sources: HashMap<ActionId, Vec<InjectedSource>>,
    action_states: ActionStates,
    tick_order: Vec<ActionId>,
    pub(crate) input_stack: InputStack,
}

impl EnhancedPlayerInput {
    /// Returns the runtime state of an action.
    ///
    /// Instances exist for every mapped action and for actions with injected input.
    #[must_use]
    pub fn action_instance(&self, action: &ActionId) -> Option<&ActionInstance> {
        self.instances.get(action)
    }

    /// Returns the current value of an action or [`ActionValue::default`] if it has no instance.
    #[must_use]
    pub fn action_value(&self, action: &ActionId) -> ActionValue {
        self.instances
            .get(action)
            .map(ActionInstance::value)
            .unwrap_or_default()
    }

    /// Returns instances evaluated during the last tick in evaluation order.
    pub fn evaluated_instances(&self) -> impl Iterator<Item = &ActionInstance> {
        self.tick_order
            .iter()
            .filter_map(|action| self.instances.get(action))
    }

    /// Returns mappings resolved by the last rebuild, highest priority first.
    #[must_use]
    pub fn mappings(&self) -> &[ActionKeyMapping] {
        &self.mappings
    }

    /// Returns contexts applied to the player in the order they were added.
    #[must_use]
    pub fn applied_contexts(&self) -> &[AppliedContext] {
        &self.applied_contexts
    }

    /// Returns actions in the order they are evaluated.
    #[must_use]
    pub fn evaluation_order(&self) -> &[ActionId] {
        &self.evaluation_order
    }

    /// Evaluates all actions for a single tick.
    ///
    /// Doesn't rebuild mappings, call [`Self::rebuild_control_mappings`] first if contexts changed.
    /// While `paused`, only actions with [`InputAction::trigger_when_paused`] are evaluated,
    /// other actions report [`TriggerState::None`].
    pub fn tick(&mut self, input: &impl RawInputSource, time: InputTime, paused: bool) {
        self.reset_finished_actions();
        self.tick_forced_input();
        let keys = self.read_keys(input);

        let (mut injections, injected_order) = self.take_injections();
        let order = self.processing_order(&injected_order);

        let context = ModifierContext {
            time,
            camera_fov: self.camera_fov,
        };
        self.action_states.clear();
        for action in &order {
            self.process_action(action, &keys, injections.remove(action), &context, paused);
        }

        self.tick_order = order;
    }

    /// Queues an input for the next tick.
    pub(crate) fn queue_injection(&mut self, action: Arc<InputAction>, input: InjectedInput) {
        self.pending_injections.push((action, input));
    }

    /// Resets timers of finished actions and drops instances nothing refers to anymore.
    fn reset_finished_actions(&mut self) {
        let Self {
            instances,
            action_mappings,
            injected_sources,
            pending_injections,
            forced_actions,
            ..
        } = self;

        instances.retain(|action, instance| {
            if matches!(
                instance.trigger_event(),
                TriggerEvent::None | TriggerEvent::Canceled | TriggerEvent::Completed
            ) {
                instance.elapsed_processed_secs = 0.0;
            }
            if instance.trigger_event() != TriggerEvent::Triggered {
                instance.elapsed_triggered_secs = 0.0;
            }

            let referenced = action_mappings.contains_key(action)
                || injected_sources.contains_key(action)
                || forced_actions.contains_key(action)
                || pending_injections
                    .iter()
                    .any(|(pending, _)| pending.id() == action);
            if !referenced && instance.state() == TriggerState::None {
                trace!("dropping unreferenced action `{action}`");
                return false;
            }

            true
        });
    }

    fn tick_forced_input(&mut self) {
        for forced in self.forced_actions.values() {
            self.pending_injections.push((
                forced.action.clone(),
                InjectedInput::new(forced.value, Vec::new(), Vec::new()),
            ));
        }
    }

    /// Classifies the activity of each mapped key since the last tick.
    fn read_keys(&mut self, input: &impl RawInputSource) -> HashMap<InputKey, KeyInput> {
        let mut keys = HashMap::<InputKey, KeyInput>::default();
        for mapping in &self.mappings {
            let key = mapping.key;
            if keys.contains_key(&key) {
                continue;
            }

            let mut state = match self.forced_keys.get(&key) {
                Some(&value) => KeyState {
                    is_down: true,
                    ..KeyState::analog(value)
                },
                None => input.key_state(key),
            };

            if self.keys_ignored_until_release.contains(&key) {
                if state.is_down_this_tick() {
                    state = KeyState::default();
                } else {
                    self.keys_ignored_until_release.remove(&key);
                }
            }

            let is_down =
                state.is_down_this_tick() || (key.is_analog() && state.raw_value != Vec3::ZERO);
            let was_down = if is_down {
                !self.keys_down.insert(key)
            } else {
                self.keys_down.remove(&key)
            };

            let event = if is_down && was_down && !state.has_events() {
                KeyEvent::Held
            } else if is_down || was_down || state.has_events() {
                KeyEvent::Actuated
            } else {
                KeyEvent::None
            };

            let raw_value = match event {
                KeyEvent::None => Vec3::ZERO,
                KeyEvent::Held | KeyEvent::Actuated => state.raw_value,
            };

            keys.insert(key, KeyInput { event, raw_value });
        }

        self.keys_down.retain(|key| keys.contains_key(key));

        keys
    }

    /// Groups queued injections by action, preserving the order of first injection.
    ///
    /// Creates instances for injected actions without mappings.
    fn take_injections(&mut self) -> (HashMap<ActionId, Vec<InjectedInput>>, Vec<ActionId>) {
        let mut injections = HashMap::<ActionId, Vec<InjectedInput>>::default();
        let mut order = Vec::new();
        for (action, input) in self.pending_injections.drain(..) {
            let id = action.id().clone();
            self.instances
                .entry(id.clone())
                .or_insert_with(|| ActionInstance::new(action));

            let inputs = injections.entry(id.clone()).or_default();
            if inputs.is_empty() {
                order.push(id);
            }
            inputs.push(input);
        }

        (injections, order)
    }

    /// Returns the dependency order followed by actions that only have injected input.
    fn processing_order(&self, injected: &[ActionId]) -> Vec<ActionId> {
        let mut order = self.evaluation_order.clone();
        let mut seen: HashSet<ActionId> = order.iter().cloned().collect();
        for action in injected {
            if seen.insert(action.clone()) {
                order.push(action.clone());
            }
        }

        let mut rest: Vec<_> = self
            .instances
            .keys()
            .filter(|action| !seen.contains(*action))
            .cloned()
            .collect();
        rest.sort();
        order.extend(rest);

        order
    }

    fn process_action(
        &mut self,
        action: &ActionId,
        keys: &HashMap<InputKey, KeyInput>,
        injected: Option<Vec<InjectedInput>>,
        context: &ModifierContext,
        paused: bool,
    ) {
        let Self {
            instances,
            mappings,
            action_mappings,
            injected_sources,
            action_states,
            ..
        } = self;

        let Some(instance) = instances.get_mut(action) else {
            return;
        };

        let value_type = instance.action().value_type;
        let evaluated = !paused || instance.action().trigger_when_paused;
        let time = &context.time;
        let mut sources = SmallVec::<[Source; 4]>::new();

        if evaluated {
            let action_ticks = instance
                .triggers
                .iter()
                .any(|tracked| tracked.trigger().should_always_tick());

            for &index in action_mappings.get(action).into_iter().flatten() {
                let mapping = &mut mappings[index];
                let key = keys.get(&mapping.key).copied().unwrap_or_default();
                let always_tick = action_ticks
                    || mapping
                        .triggers
                        .iter()
                        .any(|tracked| tracked.trigger().should_always_tick());

                if key.event == KeyEvent::None && !always_tick {
                    mapping.last_trigger_state = TriggerState::None;
                    mapping.elapsed_actuated_secs = 0.0;
                    continue;
                }

                let raw = ActionValue::new(value_type, key.raw_value);
                let value = apply_modifiers(&mut mapping.modifiers, raw, context);
                let value = apply_modifiers(&mut instance.per_input_modifiers, value, context);

                let mut tracker = TriggerStateTracker::default();
                tracker.evaluate(&mut mapping.triggers, action_states, time, value, true);

                if value.is_nonzero() {
                    mapping.elapsed_actuated_secs += time.real_delta_secs;
                } else {
                    mapping.elapsed_actuated_secs = 0.0;
                }

                sources.push(Source {
                    mapping: Some(index),
                    tracker,
                    value,
                });
            }

            match injected {
                Some(inputs) => {
                    let records = injected_sources.entry(action.clone()).or_default();
                    records.truncate(inputs.len());
                    for (index, input) in inputs.into_iter().enumerate() {
                        if index == records.len() {
                            records.push(InjectedSource::new(input.modifiers, input.triggers));
                        }
                        sources.push(records[index].process(
                            input.value,
                            value_type,
                            &mut instance.per_input_modifiers,
                            action_states,
                            context,
                        ));
                    }
                }
                None => {
                    // Injected last tick, but not this one.
                    if let Some(records) = injected_sources.remove(action) {
                        trace!("releasing injected input for `{action}`");
                        for mut record in records {
                            sources.push(record.process(
                                ActionValue::zero(value_type),
                                value_type,
                                &mut instance.per_input_modifiers,
                                action_states,
                                context,
                            ));
                        }
                    }
                }
            }
        }

        let last_state = instance.state;
        let mut state = TriggerState::None;
        let mut event = TriggerEventInternal::None;
        let value;
        if sources.is_empty() {
            value = ActionValue::zero(value_type);
            let mut tracker = TriggerStateTracker::default();
            if evaluated {
                let always_ticking = instance
                    .triggers
                    .iter_mut()
                    .filter(|tracked| tracked.trigger().should_always_tick());
                tracker.evaluate(always_ticking, action_states, time, value, true);
                state = tracker.state(value);
            }
            event = TriggerEventInternal::from_transition(last_state, state);
            instance.modified_this_tick = false;
        } else {
            let merged = sources.iter().fold(Vec3::ZERO, |merged, source| {
                max_magnitude(merged, source.value.as_axis3d())
            });
            let merged = ActionValue::new(value_type, merged);

            let mut action_tracker = TriggerStateTracker::default();
            action_tracker.evaluate(&mut instance.triggers, action_states, time, merged, false);

            value = apply_modifiers(&mut instance.final_modifiers, merged, context);

            for (index, source) in sources.iter().enumerate() {
                let mut tracker = source.tracker;
                tracker.merge(&action_tracker);
                let source_state = tracker.state(source.value);
                if let Some(mapping) = source.mapping {
                    mappings[mapping].last_trigger_state = source_state;
                }

                let source_event = TriggerEventInternal::from_transition(last_state, source_state);
                event = if index == 0 {
                    source_event
                } else {
                    event.max(source_event)
                };
                state = state.max(source_state);
            }

            for tracked in &mut instance.triggers {
                tracked.set_last_value(value);
            }
            instance.modified_this_tick = true;
        }

        instance.value = value;
        instance.state = state;
        instance.event = event;
        if state != TriggerState::None {
            instance.elapsed_processed_secs += time.real_delta_secs;
        }
        if state == TriggerState::Triggered {
            instance.elapsed_triggered_secs += time.real_delta_secs;
        }

        trace!("evaluated `{action}` to `{state:?}` with `{value:?}` and event `{event:?}`");
        action_states.insert(action.clone(), instance.snapshot());
    }
}

/// Input set through [`EnhancedPlayerInput::apply_forced_action_input`].
#[derive(Debug, Clone)]
pub(crate) struct ForcedAction {
    pub(crate) action: Arc<InputAction>,
    pub(crate) value: ActionValue,
}

/// Activity of a key since the last tick.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
enum KeyEvent {
    /// Untouched and not held.
    #[default]
    None,
    /// Down during both ticks without discrete events.
    Held,
    /// Pressed, released or repeated.
    Actuated,
}

#[derive(Debug, Default, Clone, Copy)]
struct KeyInput {
    event: KeyEvent,
    raw_value: Vec3,
}

/// Input injected for a single tick.
#[derive(Debug, Clone)]
pub(crate) struct InjectedInput {
    value: ActionValue,
    modifiers: Vec<Box<dyn InputModifier>>,
    triggers: Vec<Box<dyn InputTrigger>>,
}

impl InjectedInput {
    pub(crate) fn new(
        value: ActionValue,
        modifiers: Vec<Box<dyn InputModifier>>,
        triggers: Vec<Box<dyn InputTrigger>>,
    ) -> Self {
        Self {
            value,
            modifiers,
            triggers,
        }
    }
}

/// Modifiers and triggers of an injected input kept while the injection continues.
#[derive(Debug, Clone)]
pub(crate) struct InjectedSource {
    modifiers: Vec<Box<dyn InputModifier>>,
    triggers: Vec<TrackedTrigger>,
}

impl InjectedSource {
    fn new(modifiers: Vec<Box<dyn InputModifier>>, triggers: Vec<Box<dyn InputTrigger>>) -> Self {
        Self {
            modifiers,
            triggers: triggers.into_iter().map(TrackedTrigger::new).collect(),
        }
    }

    fn process(
        &mut self,
        raw: ActionValue,
        value_type: ActionValueType,
        per_input_modifiers: &mut [Box<dyn InputModifier>],
        action_states: &ActionStates,
        context: &ModifierContext,
    ) -> Source {
        let raw = ActionValue::new(value_type, raw.as_axis3d());
        let value = apply_modifiers(&mut self.modifiers, raw, context);
        let value = apply_modifiers(per_input_modifiers, value, context);

        let mut tracker = TriggerStateTracker::default();
        tracker.evaluate(&mut self.triggers, action_states, &context.time, value, true);

        Source {
            mapping: None,
            tracker,
            value,
        }
    }
}

/// Evaluated input of a mapping or an injection.
struct Source {
    mapping: Option<usize>,
    tracker: TriggerStateTracker,
    value: ActionValue,
}

/// Keeps the component with the larger absolute value.
///
/// Ties keep the current value.
fn max_magnitude(current: Vec3, value: Vec3) -> Vec3 {
    Vec3::select(value.abs().cmpgt(current.abs()), value, current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_magnitude_per_component() {
        assert_eq!(
            max_magnitude(Vec3::new(0.3, -0.2, 0.0), Vec3::new(-0.7, 0.1, 0.0)),
            Vec3::new(-0.7, -0.2, 0.0)
        );
        assert_eq!(
            max_magnitude(Vec3::new(0.5, 0.0, 0.0), Vec3::new(-0.5, 0.0, 0.0)),
            Vec3::new(0.5, 0.0, 0.0),
            "ties should keep the existing value"
        );
    }

    #[test]
    fn key_events() {
        let action = Arc::new(InputAction::new("Action", ActionValueType::Boolean));
        let mut player = player_with(&action, KeyCode::Space);

        let mut keys = HashMap::<InputKey, KeyState>::default();
        let key = InputKey::from(KeyCode::Space);
        assert_eq!(player.read_keys(&keys)[&key].event, KeyEvent::None);

        keys.insert(key, KeyState::just_pressed());
        assert_eq!(player.read_keys(&keys)[&key].event, KeyEvent::Actuated);

        keys.insert(key, KeyState::held());
        let input = player.read_keys(&keys)[&key];
        assert_eq!(input.event, KeyEvent::Held);
        assert_eq!(input.raw_value, Vec3::X);

        keys.insert(key, KeyState::just_released());
        assert_eq!(player.read_keys(&keys)[&key].event, KeyEvent::Actuated);

        keys.insert(key, KeyState::default());
        assert_eq!(player.read_keys(&keys)[&key].event, KeyEvent::None);
    }

    #[test]
    fn ignored_until_release() {
        let action = Arc::new(InputAction::new("Action", ActionValueType::Boolean));
        let mut player = player_with(&action, KeyCode::Space);
        let key = InputKey::from(KeyCode::Space);
        player.keys_ignored_until_release.insert(key);

        let mut keys = HashMap::<InputKey, KeyState>::default();
        keys.insert(key, KeyState::held());
        assert_eq!(player.read_keys(&keys)[&key].event, KeyEvent::None);
        assert!(player.keys_ignored_until_release.contains(&key));

        keys.insert(key, KeyState::default());
        player.read_keys(&keys);
        assert!(player.keys_ignored_until_release.is_empty());

        keys.insert(key, KeyState::just_pressed());
        assert_eq!(player.read_keys(&keys)[&key].event, KeyEvent::Actuated);
    }

    #[test]
    fn forced_key() {
        let action = Arc::new(InputAction::new("Action", ActionValueType::Axis1D));
        let mut player = player_with(&action, GamepadAxis::LeftStickX);
        let key = InputKey::from(GamepadAxis::LeftStickX);
        player.forced_keys.insert(key, 0.5.into());

        let keys = HashMap::<InputKey, KeyState>::default();
        let input = player.read_keys(&keys)[&key];
        assert_eq!(input.event, KeyEvent::Actuated);
        assert_eq!(input.raw_value, Vec3::X * 0.5);
    }

    #[test]
    fn timers() {
        let action = Arc::new(InputAction::new("Action", ActionValueType::Boolean));
        let mut player = player_with(&action, KeyCode::Space);
        let time = InputTime::from_secs(0.5);

        let mut keys = HashMap::<InputKey, KeyState>::default();
        keys.insert(KeyCode::Space.into(), KeyState::just_pressed());
        player.tick(&keys, time, false);
        keys.insert(KeyCode::Space.into(), KeyState::held());
        player.tick(&keys, time, false);

        let instance = player.action_instance(action.id()).unwrap();
        assert_eq!(instance.elapsed_processed_secs(), 1.0);
        assert_eq!(instance.elapsed_triggered_secs(), 1.0);

        keys.insert(KeyCode::Space.into(), KeyState::just_released());
        player.tick(&keys, time, false);
        let instance = player.action_instance(action.id()).unwrap();
        assert_eq!(instance.trigger_event(), TriggerEvent::Completed);
        assert_eq!(
            instance.elapsed_processed_secs(),
            1.0,
            "timers should be kept for the completing tick"
        );

        player.tick(&keys, time, false);
        let instance = player.action_instance(action.id()).unwrap();
        assert_eq!(instance.elapsed_processed_secs(), 0.0);
        assert_eq!(instance.elapsed_triggered_secs(), 0.0);
    }

    #[test]
    fn paused() {
        let action = Arc::new(InputAction::new("Action", ActionValueType::Boolean));
        let paused_action = Arc::new(
            InputAction::new("PausedAction", ActionValueType::Boolean)
                .with_trigger_when_paused(true),
        );
        let mut player = EnhancedPlayerInput::default();
        player.add_mapping_context(
            Arc::new(
                InputMappingContext::new("Test")
                    .with_mapping(ActionKeyMapping::new(&action, KeyCode::KeyA))
                    .with_mapping(ActionKeyMapping::new(&paused_action, KeyCode::KeyB)),
            ),
            0,
            ModifyContextOptions::default().force_immediately(true),
        );

        let mut keys = HashMap::<InputKey, KeyState>::default();
        keys.insert(KeyCode::KeyA.into(), KeyState::just_pressed());
        keys.insert(KeyCode::KeyB.into(), KeyState::just_pressed());
        player.tick(&keys, InputTime::from_secs(0.1), true);

        assert_eq!(
            player.action_instance(action.id()).unwrap().state(),
            TriggerState::None
        );
        assert_eq!(
            player.action_instance(paused_action.id()).unwrap().state(),
            TriggerState::Triggered
        );
    }

    #[test]
    fn final_modifiers_after_triggers() {
        let action = Arc::new(
            InputAction::new("Action", ActionValueType::Axis1D)
                .with_trigger(Down::new(0.5))
                .with_final_modifier(Scalar::splat(0.1)),
        );
        let mut player = player_with(&action, KeyCode::KeyA);

        let mut keys = HashMap::<InputKey, KeyState>::default();
        keys.insert(KeyCode::KeyA.into(), KeyState::just_pressed());
        player.tick(&keys, InputTime::from_secs(0.1), false);

        let instance = player.action_instance(action.id()).unwrap();
        assert_eq!(
            instance.state(),
            TriggerState::Triggered,
            "action triggers should see the value before final modifiers"
        );
        assert_eq!(instance.value(), 0.1.into());
    }

    fn player_with(action: &Arc<InputAction>, key: impl Into<InputKey>) -> EnhancedPlayerInput {
        let mut player = EnhancedPlayerInput::default();
        player.add_mapping_context(
            Arc::new(
                InputMappingContext::new("Test").with_mapping(ActionKeyMapping::new(action, key)),
            ),
            0,
            ModifyContextOptions::default().force_immediately(true),
        );
        player
    }
}
