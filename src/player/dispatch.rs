/*!
Delivery of evaluated actions to game code through a stack of [`InputComponent`]s.

Components are visited from the highest [`InputComponent::priority`] to the lowest, with the most
recently pushed component first among equal priorities. A component with
[`InputComponent::block_input`] stops the propagation: components below it don't receive events
and their cached values are cleared.
*/

use alloc::{boxed::Box, vec::Vec};
use core::{
    cmp::Reverse,
    fmt::{self, Debug, Formatter},
};

use bevy::{platform::collections::HashMap, prelude::*};

use crate::prelude::*;

/// Handle of a pushed [`InputComponent`].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct InputComponentId(u64);

/// Set of bindings that receive action events and values of a player.
///
/// # Examples
///
/// ```
/// use std::sync::{
///     Arc,
///     atomic::{AtomicU32, Ordering},
/// };
///
/// use bevy_enhanced_player_input::prelude::*;
///
/// let jumps = Arc::new(AtomicU32::new(0));
/// let counter = jumps.clone();
///
/// let mut component = InputComponent::new(0);
/// component.bind_action("Jump", TriggerEvent::Triggered, move |_| {
///     counter.fetch_add(1, Ordering::Relaxed);
/// });
/// component.bind_action_value("Movement");
///
/// let mut player = EnhancedPlayerInput::default();
/// let id = player.push_input_component(component);
/// assert!(player.input_component(id).is_some());
/// ```
pub struct InputComponent {
    /// Components with higher priority receive events first.
    pub priority: i32,

    /// Whether components below this one are cut off from input.
    pub block_input: bool,

    event_bindings: Vec<EventBinding>,
    value_bindings: Vec<ValueBinding>,
}

impl InputComponent {
    #[must_use]
    pub fn new(priority: i32) -> Self {
        Self {
            priority,
            block_input: false,
            event_bindings: Default::default(),
            value_bindings: Default::default(),
        }
    }

    #[must_use]
    pub fn with_block_input(mut self, block_input: bool) -> Self {
        self.block_input = block_input;
        self
    }

    /// Calls `handler` each tick the action produces `event`.
    ///
    /// A binding to [`TriggerEvent::Started`] also fires when the action starts
    /// and triggers within the same tick. Bindings to [`TriggerEvent::None`] never fire.
    pub fn bind_action(
        &mut self,
        action: impl Into<ActionId>,
        event: TriggerEvent,
        handler: impl FnMut(&ActionInstance) + Send + Sync + 'static,
    ) -> &mut Self {
        self.event_bindings.push(EventBinding {
            action: action.into(),
            event,
            handler: Box::new(handler),
        });
        self
    }

    /// Caches the value of the action on every dispatch.
    ///
    /// See [`Self::action_value`].
    pub fn bind_action_value(&mut self, action: impl Into<ActionId>) -> &mut Self {
        self.value_bindings.push(ValueBinding {
            action: action.into(),
            value: Default::default(),
        });
        self
    }

    /// Returns the cached value of an action bound with [`Self::bind_action_value`].
    #[must_use]
    pub fn action_value(&self, action: &ActionId) -> Option<ActionValue> {
        self.value_bindings
            .iter()
            .find(|binding| binding.action == *action)
            .map(|binding| binding.value)
    }

    fn dispatch(&mut self, instances: &HashMap<ActionId, ActionInstance>) {
        for binding in &mut self.event_bindings {
            let Some(instance) = instances.get(&binding.action) else {
                continue;
            };

            let flag = binding.event.flag();
            if !flag.is_empty() && instance.events().contains(flag) {
                (binding.handler)(instance);
            }
        }

        for binding in &mut self.value_bindings {
            binding.value = instances
                .get(&binding.action)
                .map(ActionInstance::value)
                .unwrap_or_default();
        }
    }

    fn clear_values(&mut self) {
        for binding in &mut self.value_bindings {
            binding.value = ActionValue::zero(binding.value.value_type());
        }
    }
}

impl Debug for InputComponent {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("InputComponent")
            .field("priority", &self.priority)
            .field("block_input", &self.block_input)
            .field("event_bindings", &self.event_bindings)
            .field("value_bindings", &self.value_bindings)
            .finish()
    }
}

struct EventBinding {
    action: ActionId,
    event: TriggerEvent,
    handler: Box<dyn FnMut(&ActionInstance) + Send + Sync>,
}

impl Debug for EventBinding {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("EventBinding")
            .field("action", &self.action)
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct ValueBinding {
    action: ActionId,
    value: ActionValue,
}

/// Components pushed onto a player.
#[derive(Default, Debug)]
pub(crate) struct InputStack {
    components: Vec<(InputComponentId, InputComponent)>,
    next_id: u64,
}

impl InputStack {
    fn push(&mut self, component: InputComponent) -> InputComponentId {
        let id = InputComponentId(self.next_id);
        self.next_id += 1;
        self.components.push((id, component));
        id
    }

    fn pop(&mut self, id: InputComponentId) -> Option<InputComponent> {
        let index = self
            .components
            .iter()
            .position(|&(component_id, _)| component_id == id)?;
        Some(self.components.remove(index).1)
    }

    fn get_mut(&mut self, id: InputComponentId) -> Option<&mut InputComponent> {
        self.components
            .iter_mut()
            .find(|(component_id, _)| *component_id == id)
            .map(|(_, component)| component)
    }

    fn get(&self, id: InputComponentId) -> Option<&InputComponent> {
        self.components
            .iter()
            .find(|(component_id, _)| *component_id == id)
            .map(|(_, component)| component)
    }

    fn dispatch(&mut self, instances: &HashMap<ActionId, ActionInstance>) {
        self.components
            .sort_by_key(|(id, component)| Reverse((component.priority, *id)));

        let mut blocked = false;
        for (_, component) in &mut self.components {
            if blocked {
                component.clear_values();
                continue;
            }

            component.dispatch(instances);
            blocked |= component.block_input;
        }
    }
}

impl EnhancedPlayerInput {
    /// Adds a component on top of the components with the same priority.
    pub fn push_input_component(&mut self, component: InputComponent) -> InputComponentId {
        self.input_stack.push(component)
    }

    /// Removes a previously pushed component.
    pub fn pop_input_component(&mut self, id: InputComponentId) -> Option<InputComponent> {
        self.input_stack.pop(id)
    }

    #[must_use]
    pub fn input_component(&self, id: InputComponentId) -> Option<&InputComponent> {
        self.input_stack.get(id)
    }

    pub fn input_component_mut(&mut self, id: InputComponentId) -> Option<&mut InputComponent> {
        self.input_stack.get_mut(id)
    }

    /// Delivers results of the last tick to pushed components.
    ///
    /// Called by the plugin in [`EnhancedInputSystems::Apply`].
    pub fn dispatch(&mut self) {
        self.input_stack.dispatch(&self.instances);
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Default, Clone)]
    struct BindingCounter(Arc<AtomicU32>);

    impl BindingCounter {
        /// Returns a handler that increments the counter.
        fn handler(&self) -> impl FnMut(&ActionInstance) + Send + Sync + 'static {
            let counter = self.0.clone();
            move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }

        fn get(&self) -> u32 {
            self.0.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn started_and_triggered() {
        let (instances, action) = instances(TriggerEventInternal::StartedAndTriggered);
        let started = BindingCounter::default();
        let triggered = BindingCounter::default();
        let completed = BindingCounter::default();

        let mut component = InputComponent::new(0);
        component
            .bind_action(action.clone(), TriggerEvent::Started, started.handler())
            .bind_action(action.clone(), TriggerEvent::Triggered, triggered.handler())
            .bind_action(action, TriggerEvent::Completed, completed.handler());

        let mut stack = InputStack::default();
        stack.push(component);
        stack.dispatch(&instances);

        assert_eq!(started.get(), 1);
        assert_eq!(triggered.get(), 1);
        assert_eq!(completed.get(), 0);
    }

    #[test]
    fn none_binding() {
        let (instances, action) = instances(TriggerEventInternal::None);
        let counter = BindingCounter::default();

        let mut component = InputComponent::new(0);
        component.bind_action(action, TriggerEvent::None, counter.handler());

        let mut stack = InputStack::default();
        stack.push(component);
        stack.dispatch(&instances);

        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn blocking() {
        let (instances, action) = instances(TriggerEventInternal::Triggered);
        let top = BindingCounter::default();
        let blocked = BindingCounter::default();

        let mut low = InputComponent::new(0);
        low.bind_action(action.clone(), TriggerEvent::Triggered, blocked.handler())
            .bind_action_value(action.clone());
        let mut high = InputComponent::new(1).with_block_input(true);
        high.bind_action(action.clone(), TriggerEvent::Triggered, top.handler());

        let mut stack = InputStack::default();
        let low = stack.push(low);
        stack.push(high);
        stack.dispatch(&instances);

        assert_eq!(top.get(), 1);
        assert_eq!(blocked.get(), 0);
        assert_eq!(
            stack.get(low).unwrap().action_value(&action),
            Some(false.into())
        );
    }

    #[test]
    fn recent_first() {
        let (instances, action) = instances(TriggerEventInternal::Triggered);
        let first = BindingCounter::default();
        let second = BindingCounter::default();

        let mut first_component = InputComponent::new(0).with_block_input(true);
        first_component.bind_action(action.clone(), TriggerEvent::Triggered, first.handler());
        let mut second_component = InputComponent::new(0).with_block_input(true);
        second_component.bind_action(action, TriggerEvent::Triggered, second.handler());

        let mut stack = InputStack::default();
        stack.push(first_component);
        let second_id = stack.push(second_component);
        stack.dispatch(&instances);

        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);

        stack.pop(second_id);
        stack.dispatch(&instances);
        assert_eq!(first.get(), 1);
    }

    #[test]
    fn values() {
        let (mut instances, action) = instances(TriggerEventInternal::Triggered);
        let mut component = InputComponent::new(0);
        component.bind_action_value(action.clone());

        let mut stack = InputStack::default();
        let id = stack.push(component);
        stack.dispatch(&instances);
        assert_eq!(stack.get(id).unwrap().action_value(&action), Some(true.into()));

        instances.clear();
        stack.dispatch(&instances);
        assert_eq!(
            stack.get(id).unwrap().action_value(&action),
            Some(ActionValue::default())
        );
    }

    fn instances(event: TriggerEventInternal) -> (HashMap<ActionId, ActionInstance>, ActionId) {
        let action = Arc::new(InputAction::new("Action", ActionValueType::Boolean));
        let mut instance = ActionInstance::new(action.clone());
        instance.event = event;
        instance.value = true.into();

        let mut instances = HashMap::default();
        instances.insert(action.id().clone(), instance);

        (instances, action.id().clone())
    }
}
