use bevy::prelude::*;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Squared magnitude below which a value is treated as zero.
const ZERO_TOLERANCE_SQ: f32 = 1e-8;

/// Value of an action or of a single input feeding it.
///
/// Only the components covered by the variant are meaningful. Converting to a
/// narrower type drops the trailing components.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ActionValue {
    Bool(bool),
    Axis1D(f32),
    Axis2D(Vec2),
    Axis3D(Vec3),
}

impl ActionValue {
    /// Creates a value of the given type from three raw components.
    ///
    /// Components beyond the type's dimensionality are discarded.
    /// A boolean is `true` when the vector is non-zero.
    #[must_use]
    pub fn new(value_type: ActionValueType, raw: Vec3) -> Self {
        match value_type {
            ActionValueType::Boolean => Self::Bool(raw.length_squared() >= ZERO_TOLERANCE_SQ),
            ActionValueType::Axis1D => Self::Axis1D(raw.x),
            ActionValueType::Axis2D => Self::Axis2D(raw.truncate()),
            ActionValueType::Axis3D => Self::Axis3D(raw),
        }
    }

    /// Returns a zero-initialized value of the given type.
    #[must_use]
    pub fn zero(value_type: ActionValueType) -> Self {
        match value_type {
            ActionValueType::Boolean => Self::Bool(false),
            ActionValueType::Axis1D => Self::Axis1D(0.0),
            ActionValueType::Axis2D => Self::Axis2D(Vec2::ZERO),
            ActionValueType::Axis3D => Self::Axis3D(Vec3::ZERO),
        }
    }

    #[must_use]
    pub fn value_type(self) -> ActionValueType {
        match self {
            Self::Bool(_) => ActionValueType::Boolean,
            Self::Axis1D(_) => ActionValueType::Axis1D,
            Self::Axis2D(_) => ActionValueType::Axis2D,
            Self::Axis3D(_) => ActionValueType::Axis3D,
        }
    }

    /// Converts the value into another type, keeping the leading components.
    #[must_use]
    pub fn convert(self, value_type: ActionValueType) -> Self {
        Self::new(value_type, self.as_axis3d())
    }

    /// Returns all three components, with booleans mapped to `0.0` or `1.0` on X.
    #[must_use]
    pub fn as_axis3d(self) -> Vec3 {
        match self {
            Self::Bool(value) => Vec3::new(if value { 1.0 } else { 0.0 }, 0.0, 0.0),
            Self::Axis1D(value) => Vec3::new(value, 0.0, 0.0),
            Self::Axis2D(value) => value.extend(0.0),
            Self::Axis3D(value) => value,
        }
    }

    #[must_use]
    pub fn as_axis1d(self) -> f32 {
        self.as_axis3d().x
    }

    #[must_use]
    pub fn as_axis2d(self) -> Vec2 {
        self.as_axis3d().truncate()
    }

    #[must_use]
    pub fn as_bool(self) -> bool {
        self.is_nonzero()
    }

    #[must_use]
    pub fn magnitude_sq(self) -> f32 {
        self.as_axis3d().length_squared()
    }

    /// Returns `true` if the magnitude reaches the given threshold.
    #[must_use]
    pub fn is_actuated(self, threshold: f32) -> bool {
        self.magnitude_sq() >= threshold * threshold
    }

    #[must_use]
    pub fn is_nonzero(self) -> bool {
        self.magnitude_sq() >= ZERO_TOLERANCE_SQ
    }
}

impl Default for ActionValue {
    fn default() -> Self {
        Self::Bool(false)
    }
}

impl From<bool> for ActionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for ActionValue {
    fn from(value: f32) -> Self {
        Self::Axis1D(value)
    }
}

impl From<Vec2> for ActionValue {
    fn from(value: Vec2) -> Self {
        Self::Axis2D(value)
    }
}

impl From<Vec3> for ActionValue {
    fn from(value: Vec3) -> Self {
        Self::Axis3D(value)
    }
}

/// Declared dimensionality of an [`ActionValue`].
///
/// Ordered by dimensionality, so a mapping from a wider key into a narrower
/// action is a demotion.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ActionValueType {
    #[default]
    Boolean,
    Axis1D,
    Axis2D,
    Axis3D,
}

impl ActionValueType {
    /// Number of meaningful components.
    #[must_use]
    pub fn dimensions(self) -> usize {
        match self {
            Self::Boolean | Self::Axis1D => 1,
            Self::Axis2D => 2,
            Self::Axis3D => 3,
        }
    }
}
