use bevy::prelude::*;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Swizzle axis components of an input value.
///
/// Useful to map a 1D input onto the Y axis of a 2D action.
/// Boolean values are passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum SwizzleAxis {
    /// Swap X and Y axis. Useful for binding 1D inputs to the Y axis for 2D actions.
    YXZ,
    /// Swap X and Z axis.
    ZYX,
    /// Swap Y and Z axis.
    XZY,
    /// Reorder all axes, Y first.
    YZX,
    /// Reorder all axes, Z first.
    ZXY,
}

impl SwizzleAxis {
    fn swizzle(self, value: Vec3) -> Vec3 {
        match self {
            Self::YXZ => value.yxz(),
            Self::ZYX => value.zyx(),
            Self::XZY => value.xzy(),
            Self::YZX => value.yzx(),
            Self::ZXY => value.zxy(),
        }
    }
}

impl InputModifier for SwizzleAxis {
    fn modify_raw(&mut self, value: ActionValue, _context: &ModifierContext) -> ActionValue {
        match value {
            ActionValue::Bool(_) => value,
            // Promoted to 3D so the result can land on another axis.
            // The pipeline drops it again if the source was narrower.
            ActionValue::Axis1D(_) | ActionValue::Axis2D(_) | ActionValue::Axis3D(_) => {
                self.swizzle(value.as_axis3d()).into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swizzle() {
        let context = ModifierContext::default();
        let value = Vec3::new(1.0, 2.0, 3.0);

        for (mut modifier, expected) in [
            (SwizzleAxis::YXZ, Vec3::new(2.0, 1.0, 3.0)),
            (SwizzleAxis::ZYX, Vec3::new(3.0, 2.0, 1.0)),
            (SwizzleAxis::XZY, Vec3::new(1.0, 3.0, 2.0)),
            (SwizzleAxis::YZX, Vec3::new(2.0, 3.0, 1.0)),
            (SwizzleAxis::ZXY, Vec3::new(3.0, 1.0, 2.0)),
        ] {
            assert_eq!(
                modifier.modify_raw(value.into(), &context),
                expected.into(),
                "`{modifier:?}` should reorder components"
            );
        }
    }

    #[test]
    fn bool_passthrough() {
        let mut modifier = SwizzleAxis::YXZ;
        assert_eq!(
            modifier.modify_raw(true.into(), &Default::default()),
            true.into()
        );
    }

    #[test]
    fn one_dimensional() {
        let mut modifier = SwizzleAxis::YXZ;
        assert_eq!(
            modifier.modify_raw(0.5.into(), &Default::default()),
            Vec3::new(0.0, 0.5, 0.0).into()
        );
    }
}
