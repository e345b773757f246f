use alloc::{boxed::Box, vec::Vec};

use bevy::prelude::*;

use crate::prelude::*;

/// Applies a nested list of modifiers as a single one.
///
/// Handy for sharing a group of modifiers between several mappings.
#[derive(Default, Debug, Clone)]
pub struct ModifierCollection {
    pub modifiers: Vec<Box<dyn InputModifier>>,

    /// Whether nested modifiers may change the value type between steps.
    ///
    /// The result is still converted back once the whole collection is applied.
    /// By default set to `false`.
    pub permit_value_type_modification: bool,
}

impl ModifierCollection {
    #[must_use]
    pub fn with_modifier(mut self, modifier: impl InputModifier) -> Self {
        self.modifiers.push(Box::new(modifier));
        self
    }

    #[must_use]
    pub fn permit_value_type_modification(mut self, permit: bool) -> Self {
        self.permit_value_type_modification = permit;
        self
    }
}

impl InputModifier for ModifierCollection {
    fn modify_raw(&mut self, value: ActionValue, context: &ModifierContext) -> ActionValue {
        if self.permit_value_type_modification {
            self.modifiers
                .iter_mut()
                .fold(value, |value, modifier| modifier.modify_raw(value, context))
                .convert(value.value_type())
        } else {
            apply_modifiers(&mut self.modifiers, value, context)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested() {
        let mut modifier = ModifierCollection::default()
            .with_modifier(Scalar::splat(2.0))
            .with_modifier(Negate::all());
        assert_eq!(
            modifier.modify_raw(Vec2::ONE.into(), &Default::default()),
            Vec2::splat(-2.0).into()
        );
    }

    #[test]
    fn value_type_modification() {
        // Moves X to Y and back, which only survives without intermediate snapping.
        let build = |permit| {
            ModifierCollection::default()
                .with_modifier(SwizzleAxis::YXZ)
                .with_modifier(SwizzleAxis::YXZ)
                .permit_value_type_modification(permit)
        };

        assert_eq!(
            build(false).modify_raw(0.5.into(), &Default::default()),
            0.0.into()
        );
        assert_eq!(
            build(true).modify_raw(0.5.into(), &Default::default()),
            0.5.into()
        );
    }
}
