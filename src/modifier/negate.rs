use bevy::prelude::*;

use crate::prelude::*;

/// Inverts the sign of the selected axes.
///
/// Boolean values are passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, Default, PartialEq))]
pub struct Negate {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Negate {
    /// Returns [`Self`] with inversion for all axes set to `invert`.
    #[must_use]
    pub const fn splat(invert: bool) -> Self {
        Self {
            x: invert,
            y: invert,
            z: invert,
        }
    }

    /// Returns [`Self`] with all axes inverted.
    #[must_use]
    pub const fn all() -> Self {
        Self::splat(true)
    }

    /// Returns [`Self`] with only the X axis inverted.
    #[must_use]
    pub const fn x() -> Self {
        Self {
            x: true,
            y: false,
            z: false,
        }
    }

    /// Returns [`Self`] with only the Y axis inverted.
    #[must_use]
    pub const fn y() -> Self {
        Self {
            x: false,
            y: true,
            z: false,
        }
    }

    /// Returns [`Self`] with only the Z axis inverted.
    #[must_use]
    pub const fn z() -> Self {
        Self {
            x: false,
            y: false,
            z: true,
        }
    }

    fn signs(self) -> Vec3 {
        let sign = |invert: bool| if invert { -1.0 } else { 1.0 };
        Vec3::new(sign(self.x), sign(self.y), sign(self.z))
    }
}

impl Default for Negate {
    fn default() -> Self {
        Self::all()
    }
}

impl InputModifier for Negate {
    fn modify_raw(&mut self, value: ActionValue, _context: &ModifierContext) -> ActionValue {
        let signs = self.signs();
        match value {
            ActionValue::Bool(_) => value,
            ActionValue::Axis1D(value) => (value * signs.x).into(),
            ActionValue::Axis2D(value) => (value * signs.truncate()).into(),
            ActionValue::Axis3D(value) => (value * signs).into(),
        }
    }
}
