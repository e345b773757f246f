/*!
Modifiers pre-process the raw value of a key before triggers see it.

They are useful for applying sensitivity settings, smoothing input over multiple frames,
or changing how input maps to axes.

Modifiers can be attached at three levels, applied in this order:

1. To an [`ActionKeyMapping`], affecting only that key.
2. To an [`InputAction`] through [`InputAction::with_modifier`], affecting every key of the action.
3. To an [`InputAction`] through [`InputAction::with_final_modifier`], applied once to the merged value.

Within a single level, modifiers are evaluated in insertion order.
After each step the result is converted back to the type of the value that entered
the pipeline, so a modifier can't silently change the dimensionality.
Use [`ModifierCollection::permit_value_type_modification`] to allow intermediate changes.

# Examples

```
use std::sync::Arc;

use bevy::prelude::*;
use bevy_enhanced_player_input::prelude::*;

let movement = Arc::new(
    InputAction::new("Movement", ActionValueType::Axis2D)
        .with_modifier(DeadZone::default())
        .with_final_modifier(Smooth::default()),
);

let context = InputMappingContext::new("OnFoot")
    .with_mapping(ActionKeyMapping::new(&movement, GamepadStick::Left))
    // Maps W to the Y axis.
    .with_mapping(
        ActionKeyMapping::new(&movement, KeyCode::KeyW).with_modifier(SwizzleAxis::YXZ),
    )
    .with_mapping(
        ActionKeyMapping::new(&movement, KeyCode::KeyS)
            .with_modifier(SwizzleAxis::YXZ)
            .with_modifier(Negate::all()),
    );
# assert!(context.validate().is_empty());
```
*/

pub mod collection;
pub mod dead_zone;
pub mod exponential_curve;
pub mod fov_scaling;
pub mod negate;
pub mod scalar;
pub mod scale_by_delta_time;
pub mod smooth;
pub mod swizzle_axis;
pub mod to_world_space;

use alloc::boxed::Box;
use core::fmt::Debug;

use bevy::prelude::*;

use crate::prelude::*;

/// Pre-processor that alters raw input values.
///
/// Implementors only need [`Clone`] in addition to this trait. Each mapping and
/// action instance gets a private copy, so stateful modifiers like [`Smooth`]
/// keep separate history per player.
pub trait InputModifier: ModifierClone + Debug + Send + Sync + 'static {
    /// Returns pre-processed value.
    ///
    /// Called each tick for every value passing through the modifier.
    fn modify_raw(&mut self, value: ActionValue, context: &ModifierContext) -> ActionValue;
}

/// Produces an independent boxed copy of a modifier.
///
/// Implemented automatically for all cloneable modifiers.
pub trait ModifierClone {
    fn clone_box(&self) -> Box<dyn InputModifier>;
}

impl<T: InputModifier + Clone> ModifierClone for T {
    fn clone_box(&self) -> Box<dyn InputModifier> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn InputModifier> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Per-tick data available to modifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModifierContext {
    pub time: InputTime,

    /// Field of view of the player's camera in degrees, if known.
    pub camera_fov: Option<f32>,
}

impl ModifierContext {
    #[must_use]
    pub fn new(time: InputTime) -> Self {
        Self {
            time,
            camera_fov: None,
        }
    }
}

/// Applies modifiers in order, converting back to the source type after each step.
pub fn apply_modifiers(
    modifiers: &mut [Box<dyn InputModifier>],
    value: ActionValue,
    context: &ModifierContext,
) -> ActionValue {
    let value_type = value.value_type();
    modifiers.iter_mut().fold(value, |value, modifier| {
        modifier.modify_raw(value, context).convert(value_type)
    })
}
