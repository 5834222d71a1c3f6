use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::lookup_name;
use crate::skeleton::JointSkeleton;

/// Per-joint transition duration multipliers. A joint with multiplier `0.5` finishes its part
/// of a transition in half the time. Unlisted joints use `1`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendProfile {
    #[serde(default)]
    multipliers: IndexMap<String, f32>,
    #[serde(default)]
    mirrored: bool,
}

impl BlendProfile {
    pub const MIN_MULTIPLIER: f32 = 0.001;

    pub fn builder() -> BlendProfileBuilder {
        BlendProfileBuilder::default()
    }

    pub fn duration_multiplier(&self, joint: &str, skeleton: &JointSkeleton) -> f32 {
        if !skeleton.contains_joint(joint) {
            return 1.;
        }
        self.multipliers
            .get(lookup_name(joint, skeleton, self.mirrored))
            .copied()
            .unwrap_or(1.)
    }

    /// Remaps a transition's linear progress for one joint.
    pub fn joint_progress(&self, joint: &str, skeleton: &JointSkeleton, progress: f32) -> f32 {
        (progress / self.duration_multiplier(joint, skeleton)).clamp(0., 1.)
    }

    pub fn mirrored(&self) -> Self {
        Self {
            mirrored: !self.mirrored,
            ..self.clone()
        }
    }
}

#[derive(Default)]
pub struct BlendProfileBuilder {
    profile: BlendProfile,
}

impl BlendProfileBuilder {
    /// Multiplier is clamped to `[0.001, 1]`.
    pub fn define_for_joint(mut self, joint: impl Into<String>, multiplier: f32) -> Self {
        self.profile.multipliers.insert(
            joint.into(),
            multiplier.clamp(BlendProfile::MIN_MULTIPLIER, 1.),
        );
        self
    }

    pub fn define_for_joints<I, S>(mut self, joints: I, multiplier: f32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for joint in joints {
            self = self.define_for_joint(joint, multiplier);
        }
        self
    }

    pub fn build(self) -> BlendProfile {
        self.profile
    }
}
