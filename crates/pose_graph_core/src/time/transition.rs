use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Easing, TimeSpan};
use crate::edge_data::BlendProfile;

/// Timing of a blend between two poses: a linear 0..1 ramp over `duration`, shaped by `easing`.
///
/// An optional [`BlendProfile`] stretches the ramp per joint, so that e.g. the spine can settle
/// later than the arms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub duration: TimeSpan,
    #[serde(default)]
    pub easing: Easing,
    #[serde(default)]
    pub blend_profile: Option<Arc<BlendProfile>>,
}

impl Transition {
    /// Effectively instant: one tick long, but the constant curve shows the target right away.
    pub const INSTANT: Self = Self {
        duration: TimeSpan::from_ticks(1.),
        easing: Easing::Constant,
        blend_profile: None,
    };

    pub const SINGLE_TICK: Self = Self {
        duration: TimeSpan::from_ticks(1.),
        easing: Easing::Linear,
        blend_profile: None,
    };

    pub fn new(duration: TimeSpan) -> Self {
        Self {
            duration,
            easing: Easing::Linear,
            blend_profile: None,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_blend_profile(mut self, blend_profile: impl Into<Arc<BlendProfile>>) -> Self {
        self.blend_profile = Some(blend_profile.into());
        self
    }

    pub fn apply_easing(&self, t: f32) -> f32 {
        self.easing.ease(t)
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::SINGLE_TICK
    }
}
