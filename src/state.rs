/*!
Applies mapping contexts to players depending on [`bevy_state`](bevy::state).

# Example

```
use std::sync::Arc;

use bevy::{prelude::*, state::app::StatesPlugin};
use bevy_enhanced_player_input::prelude::*;

#[derive(States, Clone, PartialEq, Eq, Hash, Debug, Default)]
enum GameMode {
    #[default]
    Playing,
    Paused,
}

let jump = Arc::new(InputAction::new("Jump", ActionValueType::Boolean));
let on_foot = Arc::new(
    InputMappingContext::new("OnFoot").with_mapping(ActionKeyMapping::new(&jump, KeyCode::Space)),
);

let mut app = App::new();
app.add_plugins((MinimalPlugins, StatesPlugin, EnhancedInputPlugin))
    .init_state::<GameMode>()
    .sync_context_to_state::<GameMode>();

app.world_mut().spawn((
    EnhancedPlayerInput::default(),
    ActiveInStates::new([GameMode::Playing], on_foot, 0),
));
```
*/

use alloc::{sync::Arc, vec::Vec};

use bevy::{
    prelude::*,
    state::state::{StateTransitionEvent, StateTransitionSystems, States},
};
use log::debug;

use crate::prelude::*;

/// Applies a context to the player's [`EnhancedPlayerInput`] while state `S` matches
/// any of the listed values.
///
/// Removing or replacing the component removes the context.
#[derive(Component, Debug, Clone)]
pub struct ActiveInStates<S: States> {
    states: Vec<S>,
    context: Arc<InputMappingContext>,
    priority: i32,
}

impl<S: States> ActiveInStates<S> {
    #[must_use]
    pub fn new(
        states: impl IntoIterator<Item = S>,
        context: Arc<InputMappingContext>,
        priority: i32,
    ) -> Self {
        Self {
            states: states.into_iter().collect(),
            context,
            priority,
        }
    }

    #[must_use]
    pub fn context(&self) -> &Arc<InputMappingContext> {
        &self.context
    }

    /// Returns `true` if the current state matches any of the states.
    #[must_use]
    pub fn matches(&self, current: &S) -> bool {
        self.states.contains(current)
    }

    fn sync(&self, player: &mut EnhancedPlayerInput, state: Option<&S>) {
        let active = state.is_some_and(|state| self.matches(state));
        if active {
            player.add_mapping_context(self.context.clone(), self.priority, Default::default());
        } else {
            player.remove_mapping_context(&self.context, Default::default());
        }
    }
}

/// Extension trait for synchronizing contexts with [`bevy_state`](bevy::state).
pub trait StateContextAppExt {
    /// Registers synchronization of [`ActiveInStates<S>`] with state `S`.
    ///
    /// The sync runs in the [`StateTransition`] schedule once the transition is applied,
    /// contexts are rebuilt before the next input update.
    fn sync_context_to_state<S: States>(&mut self) -> &mut Self;
}

impl StateContextAppExt for App {
    fn sync_context_to_state<S: States>(&mut self) -> &mut Self {
        debug!(
            "registering context sync for `{}`",
            ShortName::of::<S>()
        );

        self.add_observer(sync_on_insert::<S>)
            .add_observer(remove_on_replace::<S>)
            .add_systems(
                StateTransition,
                sync_on_transition::<S>.after(StateTransitionSystems::EnterSchedules),
            )
    }
}

fn sync_on_insert<S: States>(
    insert: On<Insert, ActiveInStates<S>>,
    state: Option<Res<State<S>>>,
    mut players: Query<(&ActiveInStates<S>, &mut EnhancedPlayerInput)>,
) {
    let Some(state) = state else {
        return;
    };
    let Ok((active_in, mut player)) = players.get_mut(insert.entity) else {
        return;
    };

    active_in.sync(&mut player, Some(state.get()));
}

fn remove_on_replace<S: States>(
    replace: On<Replace, ActiveInStates<S>>,
    mut players: Query<(&ActiveInStates<S>, &mut EnhancedPlayerInput)>,
) {
    let Ok((active_in, mut player)) = players.get_mut(replace.entity) else {
        return;
    };

    player.remove_mapping_context(&active_in.context, Default::default());
}

fn sync_on_transition<S: States>(
    mut transitions: MessageReader<StateTransitionEvent<S>>,
    mut players: Query<(Entity, &ActiveInStates<S>, &mut EnhancedPlayerInput)>,
) {
    let Some(transition) = transitions.read().last() else {
        return;
    };

    for (entity, active_in, mut player) in &mut players {
        debug!(
            "syncing `{}` on `{entity}` to `{:?}`",
            active_in.context.name(),
            transition.entered
        );
        active_in.sync(&mut player, transition.entered.as_ref());
    }
}
