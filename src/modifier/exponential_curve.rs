use bevy::{math::ops, prelude::*};

use crate::prelude::*;

/// Response curve exponential.
///
/// Applies `sign(x) * |x|^exponent` to each axis.
/// Boolean values are passed through unchanged.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, Default))]
pub struct ExponentialCurve {
    /// Curve exponent per axis.
    pub exponent: Vec3,
}

impl ExponentialCurve {
    #[must_use]
    pub const fn new(exponent: Vec3) -> Self {
        Self { exponent }
    }

    /// Creates a new instance with the same exponent on all axes.
    #[must_use]
    pub const fn splat(value: f32) -> Self {
        Self::new(Vec3::splat(value))
    }
}

impl Default for ExponentialCurve {
    fn default() -> Self {
        Self::splat(1.0)
    }
}

impl InputModifier for ExponentialCurve {
    fn modify_raw(&mut self, value: ActionValue, _context: &ModifierContext) -> ActionValue {
        match value {
            ActionValue::Bool(_) => value,
            ActionValue::Axis1D(value) => curve(value, self.exponent.x).into(),
            ActionValue::Axis2D(value) => Vec2::new(
                curve(value.x, self.exponent.x),
                curve(value.y, self.exponent.y),
            )
            .into(),
            ActionValue::Axis3D(value) => Vec3::new(
                curve(value.x, self.exponent.x),
                curve(value.y, self.exponent.y),
                curve(value.z, self.exponent.z),
            )
            .into(),
        }
    }
}

fn curve(value: f32, exponent: f32) -> f32 {
    if value == 0.0 {
        return 0.0;
    }

    ops::powf(value.abs(), exponent).copysign(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential() {
        let mut modifier = ExponentialCurve::splat(2.0);
        let context = ModifierContext::default();

        assert_eq!(modifier.modify_raw(true.into(), &context), true.into());
        assert_eq!(modifier.modify_raw(0.5.into(), &context), 0.25.into());
        assert_eq!(modifier.modify_raw((-0.5).into(), &context), (-0.25).into());
        assert_eq!(modifier.modify_raw(0.0.into(), &context), 0.0.into());
        assert_eq!(
            modifier.modify_raw(Vec2::new(2.0, -2.0).into(), &context),
            Vec2::new(4.0, -4.0).into()
        );
    }

    #[test]
    fn per_axis() {
        let mut modifier = ExponentialCurve::new(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            modifier.modify_raw(Vec3::splat(2.0).into(), &Default::default()),
            Vec3::new(2.0, 4.0, 8.0).into()
        );
    }
}
