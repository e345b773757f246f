#[cfg(feature = "reflect")]
use bevy::prelude::*;

use crate::prelude::*;

/// Converts input axes to world space.
///
/// Input is authored with X pointing right and Y forward,
/// while the world uses X forward and Y right, so the two axes are swapped.
/// Boolean and 1D values are passed through unchanged.
#[derive(Default, Debug, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, Default))]
pub struct ToWorldSpace;

impl InputModifier for ToWorldSpace {
    fn modify_raw(&mut self, value: ActionValue, _context: &ModifierContext) -> ActionValue {
        match value {
            ActionValue::Bool(_) | ActionValue::Axis1D(_) => value,
            ActionValue::Axis2D(value) => value.yx().into(),
            ActionValue::Axis3D(value) => value.yxz().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::*;

    #[test]
    fn swap() {
        let mut modifier = ToWorldSpace;
        let context = ModifierContext::default();

        assert_eq!(modifier.modify_raw(0.5.into(), &context), 0.5.into());
        assert_eq!(
            modifier.modify_raw(Vec2::new(1.0, 2.0).into(), &context),
            Vec2::new(2.0, 1.0).into()
        );
        assert_eq!(
            modifier.modify_raw(Vec3::new(1.0, 2.0, 3.0).into(), &context),
            Vec3::new(2.0, 1.0, 3.0).into()
        );
    }
}
