use bevy::prelude::*;

use crate::prelude::*;

/// Multiplies the input value by a factor per axis.
///
/// Boolean values are passed through unchanged.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, Default))]
pub struct Scalar {
    /// The factor applied to each axis.
    pub factor: Vec3,
}

impl Scalar {
    #[must_use]
    pub const fn new(factor: Vec3) -> Self {
        Self { factor }
    }

    /// Creates a new instance with all axes scaled by `value`.
    #[must_use]
    pub const fn splat(value: f32) -> Self {
        Self::new(Vec3::splat(value))
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Self::splat(1.0)
    }
}

impl InputModifier for Scalar {
    fn modify_raw(&mut self, value: ActionValue, _context: &ModifierContext) -> ActionValue {
        match value {
            ActionValue::Bool(_) => value,
            ActionValue::Axis1D(value) => (value * self.factor.x).into(),
            ActionValue::Axis2D(value) => (value * self.factor.truncate()).into(),
            ActionValue::Axis3D(value) => (value * self.factor).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling() {
        let mut modifier = Scalar::new(Vec3::new(2.0, 3.0, 4.0));
        let context = ModifierContext::default();

        assert_eq!(modifier.modify_raw(true.into(), &context), true.into());
        assert_eq!(modifier.modify_raw(1.0.into(), &context), 2.0.into());
        assert_eq!(
            modifier.modify_raw(Vec2::ONE.into(), &context),
            Vec2::new(2.0, 3.0).into()
        );
        assert_eq!(
            modifier.modify_raw(Vec3::ONE.into(), &context),
            Vec3::new(2.0, 3.0, 4.0).into()
        );
    }
}
