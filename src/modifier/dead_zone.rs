use bevy::prelude::*;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Remaps input within `[lower_threshold, upper_threshold]` into `[0, 1]`.
///
/// Values below the lower threshold become zero and values above the upper one are clamped to one,
/// keeping the sign. Boolean values are passed through unchanged.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, Default))]
pub struct DeadZone {
    pub kind: DeadZoneKind,

    /// Threshold below which input is ignored.
    pub lower_threshold: f32,

    /// Threshold above which input is clamped to 1.
    pub upper_threshold: f32,
}

impl DeadZone {
    #[must_use]
    pub fn new(kind: DeadZoneKind) -> Self {
        Self {
            kind,
            lower_threshold: 0.2,
            upper_threshold: 1.0,
        }
    }

    #[must_use]
    pub fn with_lower_threshold(mut self, lower_threshold: f32) -> Self {
        self.lower_threshold = lower_threshold;
        self
    }

    #[must_use]
    pub fn with_upper_threshold(mut self, upper_threshold: f32) -> Self {
        self.upper_threshold = upper_threshold;
        self
    }

    fn dead_zone(self, axis_value: f32) -> f32 {
        let range = self.upper_threshold - self.lower_threshold;
        if range <= 0.0 {
            return 0.0;
        }

        let normalized = ((axis_value.abs() - self.lower_threshold).max(0.0) / range).min(1.0);
        normalized.copysign(axis_value)
    }
}

impl Default for DeadZone {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

impl InputModifier for DeadZone {
    fn modify_raw(&mut self, value: ActionValue, _context: &ModifierContext) -> ActionValue {
        match value {
            ActionValue::Bool(value) => value.into(),
            ActionValue::Axis1D(value) => self.dead_zone(value).into(),
            ActionValue::Axis2D(value) => match self.kind {
                DeadZoneKind::Radial => {
                    let magnitude = self.dead_zone(value.length());
                    (value.normalize_or_zero() * magnitude).into()
                }
                DeadZoneKind::Axial => {
                    Vec2::new(self.dead_zone(value.x), self.dead_zone(value.y)).into()
                }
            },
            ActionValue::Axis3D(value) => match self.kind {
                DeadZoneKind::Radial => {
                    let magnitude = self.dead_zone(value.length());
                    (value.normalize_or_zero() * magnitude).into()
                }
                DeadZoneKind::Axial => Vec3::new(
                    self.dead_zone(value.x),
                    self.dead_zone(value.y),
                    self.dead_zone(value.z),
                )
                .into(),
            },
        }
    }
}

/// Dead zone behavior.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, Default, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum DeadZoneKind {
    /// Apply dead zone logic to all axes simultaneously.
    ///
    /// This gives smooth input (circular/spherical coverage). On a 1D axis
    /// this is identical to [`Self::Axial`].
    #[default]
    Radial,
    /// Apply dead zone to axes individually.
    ///
    /// This will result in input being chamfered at the corners for 2D/3D axis inputs.
    Axial,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn assert_approx(actual: ActionValue, expected: ActionValue) {
        assert_eq!(actual.value_type(), expected.value_type());
        assert!(
            actual.as_axis3d().abs_diff_eq(expected.as_axis3d(), 1e-5),
            "`{actual:?}` should be approximately `{expected:?}`"
        );
    }

    #[test]
    fn radial() {
        let mut modifier = DeadZone::new(DeadZoneKind::Radial);
        let context = ModifierContext::default();

        assert_eq!(modifier.modify_raw(true.into(), &context), true.into());
        assert_eq!(modifier.modify_raw(false.into(), &context), false.into());
        assert_eq!(modifier.modify_raw(1.0.into(), &context), 1.0.into());
        assert_eq!(modifier.modify_raw((-1.0).into(), &context), (-1.0).into());
        assert_approx(modifier.modify_raw(0.6.into(), &context), 0.5.into());
        assert_eq!(modifier.modify_raw(0.1.into(), &context), 0.0.into());
        assert_eq!(modifier.modify_raw(2.0.into(), &context), 1.0.into());

        let diagonal = Vec2::ONE.normalize();
        assert_approx(
            modifier.modify_raw((diagonal * 0.6).into(), &context),
            (diagonal * 0.5).into(),
        );
        assert_eq!(
            modifier.modify_raw((Vec2::ONE * 0.1).into(), &context),
            Vec2::ZERO.into()
        );
        assert_approx(
            modifier.modify_raw((Vec3::X * 0.6).into(), &context),
            (Vec3::X * 0.5).into(),
        );
    }

    #[test]
    fn axial() {
        let mut modifier = DeadZone::new(DeadZoneKind::Axial);
        let context = ModifierContext::default();

        assert_approx(modifier.modify_raw(0.6.into(), &context), 0.5.into());
        assert_approx(
            modifier.modify_raw(Vec2::new(0.6, -0.1).into(), &context),
            Vec2::new(0.5, 0.0).into(),
        );
        assert_approx(
            modifier.modify_raw(Vec3::new(-0.6, 1.0, 0.1).into(), &context),
            Vec3::new(-0.5, 1.0, 0.0).into(),
        );
    }

    #[test]
    fn invalid_range() {
        let mut modifier = DeadZone::default().with_lower_threshold(1.0);
        assert_eq!(
            modifier.modify_raw(0.5.into(), &Default::default()),
            0.0.into()
        );
    }
}
