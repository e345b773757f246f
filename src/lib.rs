/*!
Per-player input mapping for Bevy, modeled on
[Unreal Engine Enhanced Input](https://dev.epicgames.com/documentation/en-us/unreal-engine/enhanced-input-in-unreal-engine).

# Core Concepts

- **Actions** represent something a player can do, like "Jump" or "Movement". An [`InputAction`] declares
  the [`ActionValueType`] it produces, but is not tied to any key.
- **Mappings** bind a physical [`InputKey`] to an action. An [`ActionKeyMapping`] may carry its own
  triggers and modifiers.
- **Contexts** group mappings into swappable control schemes, such as "On foot" or "In car".
  [`InputMappingContext`]s are applied to a player with a priority.
- **Players** are entities with [`EnhancedPlayerInput`]. Each player resolves its applied contexts into
  mappings and keeps per-action runtime state in [`ActionInstance`]s.

## [Triggers](trigger)

Triggers decide whether input fires. [`Down`] fires while the key is held, [`Hold`] after a delay,
[`Tap`] on a quick release, [`ChordAction`] only while another action is triggered, and so on.
Triggers are explicit (any may fire), implicit (all must fire) or blockers (any may veto).
Without any trigger, an action fires while its value is non-zero.

## [Modifiers](modifier)

Modifiers transform raw values before triggers see them, for example [`DeadZone`], [`Negate`] or
[`SwizzleAxis`]. Mapping modifiers run first, then action modifiers. Action final modifiers run once
on the merged value.

# Evaluation

Every tick, in [`PreUpdate`]:

1. [`EnhancedInputSystems::Prepare`] rebuilds mappings of players whose contexts changed.
2. [`EnhancedInputSystems::Update`] reads keys and evaluates every action of every player.
3. [`EnhancedInputSystems::Apply`] delivers the results to [`InputComponent`]s and triggers
   [`InputActionEvent`]s on the player entities.

```
use std::sync::Arc;

use bevy::{input::InputPlugin, prelude::*};
use bevy_enhanced_player_input::prelude::*;

let jump = Arc::new(InputAction::new("Jump", ActionValueType::Boolean));
let on_foot = Arc::new(
    InputMappingContext::new("OnFoot")
        .with_mapping(ActionKeyMapping::new(&jump, KeyCode::Space))
        .with_mapping(ActionKeyMapping::new(&jump, GamepadButton::South)),
);

let mut player = EnhancedPlayerInput::default();
player.add_mapping_context(on_foot, 0, ModifyContextOptions::default());

let mut app = App::new();
app.add_plugins((MinimalPlugins, InputPlugin, EnhancedInputPlugin))
    .add_observer(apply_jump);
app.world_mut().spawn(player);

fn apply_jump(event: On<InputActionEvent>) {
    if event.action.as_str() == "Jump" && event.event == TriggerEvent::Started {
        // Jump with `event.player`...
    }
}
```

# Troubleshooting

The crate logs through [`log`](https://docs.rs/log). Set `RUST_LOG` to `bevy_enhanced_player_input=debug`
to see context changes and rebuilds, or to `trace` for per-tick evaluation.
*/

#![no_std]

extern crate alloc;

pub mod action;
#[cfg(feature = "serialize")]
pub mod content;
pub mod context;
pub mod mapping;
pub mod modifier;
pub mod player;
#[cfg(feature = "state")]
pub mod state;
pub mod subsystem;
pub mod time;
pub mod trigger;

pub mod prelude {
    #[cfg(feature = "serialize")]
    pub use super::content::{
        ActionDesc, CancelActionDesc, ComboStepDesc, ContentRegistry, ContextDesc, MappingDesc,
        ModifierDesc, TriggerDesc,
    };
    #[cfg(feature = "state")]
    pub use super::state::{ActiveInStates, StateContextAppExt};
    pub use super::{
        EnhancedInputPlugin, EnhancedInputSystems,
        action::{
            ActionId, ActionInstance, ActionSnapshot, ActionStates, InputAction,
            events::*,
            value::{ActionValue, ActionValueType},
        },
        context::{
            AppliedContext, InputMappingContext, IssueOwner, ModifyContextOptions,
            ValidationIssue,
        },
        mapping::{ActionKeyMapping, GamepadStick, InputKey},
        modifier::{
            InputModifier, ModifierClone, ModifierContext, apply_modifiers, collection::*,
            dead_zone::*, exponential_curve::*, fov_scaling::*, negate::*, scalar::*,
            scale_by_delta_time::*, smooth::*, swizzle_axis::*, to_world_space::*,
        },
        player::{
            EnhancedPlayerInput,
            dispatch::{InputComponent, InputComponentId},
            raw::{GamepadDevice, KeyState, RawInputSource},
        },
        subsystem::query::{
            MappingQueryIssue, MappingQueryIssueReport, MappingQueryResult,
            query_map_key_in_context_set,
        },
        time::{InputTime, TimeKind},
        trigger::{
            DEFAULT_ACTUATION, InputTrigger, TrackedTrigger, TriggerClone, TriggerKind,
            TriggerState, chord::*, combo::*, down::*, hold::*, hold_and_release::*, pressed::*,
            pulse::*, released::*, tap::*,
        },
    };
}

use bevy::{input::InputSystems, prelude::*};

use player::raw::InputReader;
use prelude::*;
use time::ContextTime;

/// Evaluates [`EnhancedPlayerInput`] of every player entity.
///
/// See also [`EnhancedInputSystems`].
pub struct EnhancedInputPlugin;

impl Plugin for EnhancedInputPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(feature = "serialize")]
        app.init_resource::<ContentRegistry>();

        app.configure_sets(
            PreUpdate,
            (
                EnhancedInputSystems::Prepare,
                EnhancedInputSystems::Update,
                EnhancedInputSystems::Apply,
            )
                .chain()
                .after(InputSystems),
        )
        .add_systems(
            PreUpdate,
            (
                rebuild.in_set(EnhancedInputSystems::Prepare),
                update.in_set(EnhancedInputSystems::Update),
                apply.in_set(EnhancedInputSystems::Apply),
            ),
        );
    }
}

/// Label for the systems that evaluate players.
#[derive(Debug, PartialEq, Eq, Clone, Hash, SystemSet)]
pub enum EnhancedInputSystems {
    /// Rebuilds mappings of players with pending context changes.
    Prepare,
    /// Reads keys and evaluates actions.
    Update,
    /// Dispatches evaluated actions to [`InputComponent`]s and triggers [`InputActionEvent`]s.
    Apply,
}

fn rebuild(mut players: Query<&mut EnhancedPlayerInput>) {
    for mut player in &mut players {
        if player.is_rebuild_pending() {
            player.rebuild_control_mappings();
        }
    }
}

fn update(
    reader: InputReader,
    time: ContextTime,
    mut players: Query<(&mut EnhancedPlayerInput, Option<&GamepadDevice>)>,
) {
    let input_time = time.input_time();
    let paused = time.is_paused();
    for (mut player, gamepad) in &mut players {
        let source = reader.source(gamepad.copied().unwrap_or_default());
        player.tick(&source, input_time, paused);
    }
}

fn apply(mut commands: Commands, mut players: Query<(Entity, &mut EnhancedPlayerInput)>) {
    for (entity, mut player) in &mut players {
        player.dispatch();

        for instance in player.evaluated_instances() {
            for event in instance.events().iter_events() {
                commands.trigger(InputActionEvent {
                    player: entity,
                    action: instance.id().clone(),
                    event,
                    value: instance.value(),
                    elapsed_processed_secs: instance.elapsed_processed_secs(),
                    elapsed_triggered_secs: instance.elapsed_triggered_secs(),
                });
            }
        }
    }
}
