use bevy::math::ops;
#[cfg(feature = "reflect")]
use bevy::prelude::*;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Reference field of view in degrees for [`FovScalingKind::Standard`].
const REFERENCE_FOV: f32 = 80.0;

/// Scales input by the camera field of view.
///
/// Keeps aiming sensitivity consistent when zooming in.
/// Passes the value through when [`ModifierContext::camera_fov`] is unknown.
/// Boolean values are passed through unchanged.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, Default))]
pub struct FovScaling {
    /// Extra multiplier applied on top of the FOV scale.
    pub scale: f32,

    pub kind: FovScalingKind,
}

impl FovScaling {
    #[must_use]
    pub fn new(kind: FovScalingKind) -> Self {
        Self { scale: 1.0, kind }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for FovScaling {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

impl InputModifier for FovScaling {
    fn modify_raw(&mut self, value: ActionValue, context: &ModifierContext) -> ActionValue {
        let Some(fov) = context.camera_fov else {
            return value;
        };

        let fov_scale = match self.kind {
            FovScalingKind::Standard => {
                ops::tan(fov.to_radians() * 0.5) / ops::tan(REFERENCE_FOV.to_radians() * 0.5)
            }
            FovScalingKind::BackCompat => fov / 90.0,
        };
        let factor = self.scale * fov_scale;

        match value {
            ActionValue::Bool(_) => value,
            ActionValue::Axis1D(value) => (value * factor).into(),
            ActionValue::Axis2D(value) => (value * factor).into(),
            ActionValue::Axis3D(value) => (value * factor).into(),
        }
    }
}

/// Formula used by [`FovScaling`].
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, Default, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum FovScalingKind {
    /// Ratio of the half-angle tangents relative to an 80 degree view.
    #[default]
    Standard,
    /// Linear in the angle, relative to a 90 degree view.
    BackCompat,
}
