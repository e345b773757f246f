//! Raw per-key input consumed by [`EnhancedPlayerInput::tick`].

use bevy::{
    ecs::system::SystemParam,
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll},
    platform::collections::HashMap,
    prelude::*,
};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// State of a single physical key for the current tick.
#[derive(Debug, Default, PartialEq, Clone, Copy)]
pub struct KeyState {
    /// Current value. Digital keys report `1.0` on X while down.
    pub raw_value: Vec3,

    pub is_down: bool,

    /// Number of press events since the last tick.
    pub pressed_events: u32,

    /// Number of release events since the last tick.
    pub released_events: u32,

    /// Number of repeat events since the last tick.
    pub repeat_events: u32,
}

impl KeyState {
    /// Returns a state of a digital key that was just pressed.
    #[must_use]
    pub fn just_pressed() -> Self {
        Self {
            pressed_events: 1,
            ..Self::held()
        }
    }

    /// Returns a state of a digital key held since the previous tick.
    #[must_use]
    pub fn held() -> Self {
        Self {
            raw_value: Vec3::X,
            is_down: true,
            ..Default::default()
        }
    }

    /// Returns a state of a digital key that was just released.
    #[must_use]
    pub fn just_released() -> Self {
        Self {
            released_events: 1,
            ..Default::default()
        }
    }

    /// Returns a state of an analog input, down while the value is non-zero.
    #[must_use]
    pub fn analog(value: impl Into<ActionValue>) -> Self {
        let raw_value = value.into().as_axis3d();
        Self {
            raw_value,
            is_down: raw_value != Vec3::ZERO,
            ..Default::default()
        }
    }

    /// Returns `true` if the key is down or had any press or repeat event since the last tick.
    #[must_use]
    pub fn is_down_this_tick(&self) -> bool {
        self.is_down || self.pressed_events > 0 || self.repeat_events > 0
    }

    /// Returns `true` if the key had any discrete event since the last tick.
    #[must_use]
    pub fn has_events(&self) -> bool {
        self.pressed_events > 0 || self.released_events > 0 || self.repeat_events > 0
    }
}

/// Provider of raw key states.
///
/// Implemented for the Bevy input resources and for plain maps, which
/// is handy for scripted input and tests.
pub trait RawInputSource {
    /// Returns the state of the key for the current tick.
    fn key_state(&self, key: InputKey) -> KeyState;
}

impl RawInputSource for HashMap<InputKey, KeyState> {
    fn key_state(&self, key: InputKey) -> KeyState {
        self.get(&key).copied().unwrap_or_default()
    }
}

/// Associated gamepad for the player entity.
///
/// If not present, input will be read from all connected gamepads.
#[derive(Component, Debug, Default, Hash, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum GamepadDevice {
    /// Matches input from any gamepad.
    ///
    /// For an axis, the value is the sum of inputs from all gamepads.
    /// For a button, it's down if any gamepad has it down.
    #[default]
    Any,
    /// Matches input from specific gamepad.
    Single(Entity),
    /// Ignores all gamepad input.
    None,
}

impl From<Entity> for GamepadDevice {
    fn from(value: Entity) -> Self {
        Self::Single(value)
    }
}

impl From<Option<Entity>> for GamepadDevice {
    fn from(value: Option<Entity>) -> Self {
        match value {
            Some(entity) => GamepadDevice::Single(entity),
            None => GamepadDevice::None,
        }
    }
}

/// Reads key states from Bevy input resources.
///
/// Missing resources read as released keys.
#[derive(SystemParam)]
pub(crate) struct InputReader<'w, 's> {
    keys: Option<Res<'w, ButtonInput<KeyCode>>>,
    mouse_buttons: Option<Res<'w, ButtonInput<MouseButton>>>,
    mouse_motion: Option<Res<'w, AccumulatedMouseMotion>>,
    mouse_scroll: Option<Res<'w, AccumulatedMouseScroll>>,
    gamepads: Query<'w, 's, &'static Gamepad>,
}

impl<'w, 's> InputReader<'w, 's> {
    /// Returns a source reading gamepads according to the device.
    pub(crate) fn source(&self, gamepad: GamepadDevice) -> DeviceInput<'_, 'w, 's> {
        DeviceInput {
            reader: self,
            gamepad,
        }
    }

    fn button_state<T: Copy + Eq + core::hash::Hash + Send + Sync + 'static>(
        input: Option<&ButtonInput<T>>,
        button: T,
    ) -> KeyState {
        let Some(input) = input else {
            return KeyState::default();
        };

        let is_down = input.pressed(button);
        KeyState {
            raw_value: if is_down { Vec3::X } else { Vec3::ZERO },
            is_down,
            pressed_events: input.just_pressed(button) as u32,
            released_events: input.just_released(button) as u32,
            repeat_events: 0,
        }
    }
}

/// [`RawInputSource`] bound to a specific [`GamepadDevice`].
pub(crate) struct DeviceInput<'a, 'w, 's> {
    reader: &'a InputReader<'w, 's>,
    gamepad: GamepadDevice,
}

impl DeviceInput<'_, '_, '_> {
    fn gamepads(&self) -> impl Iterator<Item = &Gamepad> {
        let gamepads = &self.reader.gamepads;
        let (all, single) = match self.gamepad {
            GamepadDevice::Any => (true, None),
            GamepadDevice::Single(entity) => (false, gamepads.get(entity).ok()),
            GamepadDevice::None => (false, None),
        };

        gamepads.iter().filter(move |_| all).chain(single)
    }
}

impl RawInputSource for DeviceInput<'_, '_, '_> {
    fn key_state(&self, key: InputKey) -> KeyState {
        match key {
            InputKey::Keyboard(key) => {
                InputReader::button_state(self.reader.keys.as_deref(), key)
            }
            InputKey::MouseButton(button) => {
                InputReader::button_state(self.reader.mouse_buttons.as_deref(), button)
            }
            InputKey::MouseMotion => KeyState::analog(
                self.reader
                    .mouse_motion
                    .as_ref()
                    .map(|motion| motion.delta)
                    .unwrap_or_default(),
            ),
            InputKey::MouseWheel => KeyState::analog(
                self.reader
                    .mouse_scroll
                    .as_ref()
                    .map(|scroll| scroll.delta.y)
                    .unwrap_or_default(),
            ),
            InputKey::GamepadButton(button) if key.is_analog() => KeyState::analog(
                self.gamepads()
                    .filter_map(|gamepad| gamepad.get(button))
                    .sum::<f32>(),
            ),
            InputKey::GamepadButton(button) => {
                let mut state = KeyState::default();
                for gamepad in self.gamepads() {
                    state.is_down |= gamepad.pressed(button);
                    state.pressed_events += gamepad.just_pressed(button) as u32;
                    state.released_events += gamepad.just_released(button) as u32;
                }
                if state.is_down {
                    state.raw_value = Vec3::X;
                }
                state
            }
            InputKey::GamepadAxis(axis) => KeyState::analog(
                self.gamepads()
                    .filter_map(|gamepad| gamepad.get(axis))
                    .sum::<f32>(),
            ),
            InputKey::GamepadStick(stick) => KeyState::analog(
                self.gamepads()
                    .map(|gamepad| match stick {
                        GamepadStick::Left => gamepad.left_stick(),
                        GamepadStick::Right => gamepad.right_stick(),
                    })
                    .sum::<Vec2>(),
            ),
        }
    }
}
