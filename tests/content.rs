#![cfg(feature = "serialize")]

use std::sync::Arc;

use bevy::{input::InputPlugin, prelude::*};
use bevy_enhanced_player_input::prelude::*;
use test_log::test;

#[test]
fn loaded_context() {
    let move_desc: ActionDesc = ron::from_str(
        r#"(
            name: "Move",
            value_type: Axis2D,
            modifiers: [DeadZone(kind: Radial)],
        )"#,
    )
    .unwrap();

    let context_desc: ContextDesc = ron::from_str(
        r#"(
            name: "OnFoot",
            mappings: [
                (action: "Move", key: Keyboard(KeyW), modifiers: [SwizzleAxis(YXZ)]),
                (
                    action: "Move",
                    key: Keyboard(KeyS),
                    modifiers: [Negate(x: true, y: true, z: true), SwizzleAxis(YXZ)],
                    player_mappable_name: Some("move_backward"),
                ),
            ],
        )"#,
    )
    .unwrap();

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, InputPlugin, EnhancedInputPlugin));

    let registry = app.world().resource::<ContentRegistry>();
    assert!(registry.validate_action(&move_desc).is_empty());

    let move_action = Arc::new(registry.build_action(&move_desc));
    assert!(
        registry
            .validate_context(&context_desc, &[move_action.clone()])
            .is_empty()
    );
    let context = Arc::new(registry.build_context(&context_desc, &[move_action.clone()]));

    let mut player = EnhancedPlayerInput::default();
    player.add_mapping_context(context, 0, Default::default());
    player.add_player_mapped_key("move_backward", KeyCode::ArrowDown, Default::default());
    let player = app.world_mut().spawn(player).id();

    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(KeyCode::KeyW);

    app.update();

    let player_input = app.world().get::<EnhancedPlayerInput>(player).unwrap();
    assert_eq!(player_input.action_value(move_action.id()), Vec2::Y.into());

    let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
    keys.release(KeyCode::KeyW);
    keys.press(KeyCode::ArrowDown);

    app.update();

    let player_input = app.world().get::<EnhancedPlayerInput>(player).unwrap();
    assert_eq!(
        player_input.action_value(move_action.id()),
        Vec2::NEG_Y.into()
    );
}

#[test]
fn custom_trigger() {
    let action_desc: ActionDesc = ron::from_str(
        r#"(
            name: "Interact",
            value_type: Boolean,
            triggers: [Custom(name: "LongPress")],
        )"#,
    )
    .unwrap();

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, InputPlugin, EnhancedInputPlugin));

    let registry = app.world().resource::<ContentRegistry>();
    assert_eq!(
        registry.validate_action(&action_desc),
        [ValidationIssue::NullTrigger {
            owner: IssueOwner::Action("Interact".into()),
            index: 0
        }]
    );

    app.world_mut()
        .resource_mut::<ContentRegistry>()
        .register_trigger("LongPress", || Hold::new(1.0));

    let registry = app.world().resource::<ContentRegistry>();
    assert!(registry.validate_action(&action_desc).is_empty());

    let action = registry.build_action(&action_desc);
    assert_eq!(action.triggers.len(), 1);
}
