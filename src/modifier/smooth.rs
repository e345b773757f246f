use alloc::collections::VecDeque;

use bevy::prelude::*;

use crate::prelude::*;

/// Frame delta after which the sample history is discarded.
const MAX_SAMPLE_GAP_SECS: f32 = 0.25;

/// Smooth inputs out over multiple ticks by averaging recent samples.
///
/// Non-zero samples fill a rolling window of [`Self::samples`] entries.
/// Once input stops, zero samples push the average towards zero and the
/// history is cleared after it fully decays.
#[derive(Debug, Clone)]
pub struct Smooth {
    /// Number of samples to average.
    pub samples: usize,

    history: VecDeque<Vec3>,
}

impl Smooth {
    #[must_use]
    pub fn new(samples: usize) -> Self {
        Self {
            samples: samples.max(1),
            history: Default::default(),
        }
    }

    fn push(&mut self, sample: Vec3) {
        if self.history.len() >= self.samples {
            self.history.pop_front();
        }
        self.history.push_back(sample);
    }

    fn average(&self) -> Vec3 {
        if self.history.is_empty() {
            return Vec3::ZERO;
        }

        self.history.iter().sum::<Vec3>() / self.history.len() as f32
    }
}

impl Default for Smooth {
    fn default() -> Self {
        Self::new(4)
    }
}

impl InputModifier for Smooth {
    fn modify_raw(&mut self, value: ActionValue, context: &ModifierContext) -> ActionValue {
        if context.time.real_delta_secs > MAX_SAMPLE_GAP_SECS {
            self.history.clear();
        }

        if value.is_nonzero() {
            self.push(value.as_axis3d());
        } else if !self.history.is_empty() {
            self.push(Vec3::ZERO);
            if self.history.iter().all(|sample| *sample == Vec3::ZERO) {
                self.history.clear();
            }
        }

        ActionValue::new(value.value_type(), self.average())
    }
}
