use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::lookup_name;
use crate::skeleton::JointSkeleton;

/// Per-joint blend weights, used to restrict a blend to part of the skeleton.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendMask {
    #[serde(default)]
    weights: IndexMap<String, f32>,
    #[serde(default)]
    base: BlendMaskType,
    #[serde(default)]
    mirrored: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum BlendMaskType {
    /// If a joint is in the weights map, weight is given. Otherwise, weight is zero
    #[default]
    Positive,
    /// If a joint is not in the weights map, weight is 1. Otherwise, weight is as given
    Negative,
}

impl BlendMask {
    pub fn builder() -> BlendMaskBuilder {
        BlendMaskBuilder::default()
    }

    /// Masks in every joint.
    pub fn all() -> Self {
        Self {
            base: BlendMaskType::Negative,
            ..Default::default()
        }
    }

    /// Masks out every joint.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn joint_weight(&self, joint: &str, skeleton: &JointSkeleton) -> f32 {
        let default = match self.base {
            BlendMaskType::Positive => 0.,
            BlendMaskType::Negative => 1.,
        };
        if !skeleton.contains_joint(joint) {
            return default;
        }
        self.weights
            .get(lookup_name(joint, skeleton, self.mirrored))
            .copied()
            .unwrap_or(default)
    }

    /// The same mask with left and right swapped.
    pub fn mirrored(&self) -> Self {
        Self {
            mirrored: !self.mirrored,
            ..self.clone()
        }
    }
}

#[derive(Default)]
pub struct BlendMaskBuilder {
    mask: BlendMask,
}

impl BlendMaskBuilder {
    pub fn with_base(mut self, base: BlendMaskType) -> Self {
        self.mask.base = base;
        self
    }

    /// Weight is clamped to `[0, 1]`.
    pub fn define_for_joint(mut self, joint: impl Into<String>, weight: f32) -> Self {
        self.mask
            .weights
            .insert(joint.into(), weight.clamp(0., 1.));
        self
    }

    pub fn define_for_joints<I, S>(mut self, joints: I, weight: f32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for joint in joints {
            self = self.define_for_joint(joint, weight);
        }
        self
    }

    pub fn build(self) -> BlendMask {
        self.mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::tests::test_skeleton;

    #[test]
    fn positive_mask_defaults_to_zero() {
        let skeleton = test_skeleton();
        let mask = BlendMask::builder()
            .define_for_joints(["arm_L", "hand_L"], 1.)
            .define_for_joint("head", 7.)
            .build();
        assert_eq!(mask.joint_weight("arm_L", &skeleton), 1.);
        assert_eq!(mask.joint_weight("head", &skeleton), 1.);
        assert_eq!(mask.joint_weight("arm_R", &skeleton), 0.);
        assert_eq!(BlendMask::all().joint_weight("body", &skeleton), 1.);
    }

    #[test]
    fn mirrored_mask_reads_partner() {
        let skeleton = test_skeleton();
        let mask = BlendMask::builder().define_for_joint("arm_L", 0.75).build();
        let mirrored = mask.mirrored();
        assert_eq!(mirrored.joint_weight("arm_R", &skeleton), 0.75);
        assert_eq!(mirrored.joint_weight("arm_L", &skeleton), 0.);
        assert_eq!(mirrored.mirrored(), mask);
    }

    #[test]
    fn mask_from_ron() {
        let skeleton = test_skeleton();
        let mask: BlendMask =
            ron::from_str(r#"(weights: {"head": 0.0}, base: Negative)"#).unwrap();
        assert_eq!(mask.joint_weight("head", &skeleton), 0.);
        assert_eq!(mask.joint_weight("body", &skeleton), 1.);
    }
}
