use serde::{Deserialize, Serialize};

use super::JointSkeleton;
use crate::{errors::AnimationResult, symmetry::serial::PatternMapperSerial};

/// RON representation of a [`JointSkeleton`].
///
/// ```ron
/// (
///     root: "root",
///     joints: [("body", "root"), ("arm_L", "body"), ("arm_R", "body")],
///     mirror_pattern: Some((key_1: "L", key_2: "R", pattern_before: "^.*", pattern_after: "$")),
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkeletonSerial {
    pub root: String,
    /// `(joint, parent)` pairs, parents listed before their children.
    #[serde(default)]
    pub joints: Vec<(String, String)>,
    #[serde(default)]
    pub mirrors: Vec<(String, String)>,
    #[serde(default)]
    pub mirror_pattern: Option<PatternMapperSerial>,
}

impl SkeletonSerial {
    pub fn to_value(&self) -> AnimationResult<JointSkeleton> {
        let mut builder = JointSkeleton::builder(self.root.clone());
        for (joint, parent) in &self.joints {
            builder = builder.add_joint_under_parent(joint.clone(), parent.clone());
        }
        for (a, b) in &self.mirrors {
            builder = builder.set_mirror_joint(a.clone(), b.clone());
        }
        if let Some(pattern) = &self.mirror_pattern {
            builder = builder.with_mirror_pattern(pattern.to_value()?);
        }
        builder.build()
    }

    pub fn from_value(value: &JointSkeleton) -> Self {
        let name = |index| value.joint_name(index).unwrap_or_default().to_string();
        let mut joints = Vec::new();
        let mut mirrors = Vec::new();
        for (index, joint) in value.joint_names().enumerate() {
            if let Some(parent) = value.parent_index(index) {
                joints.push((joint.to_string(), name(parent)));
            }
            if let Some(mirror) = value.mirror_index(index)
                && index < mirror
            {
                mirrors.push((joint.to_string(), name(mirror)));
            }
        }
        Self {
            root: value.root().to_string(),
            joints,
            mirrors,
            mirror_pattern: None,
        }
    }
}

impl JointSkeleton {
    pub fn from_ron_str(source: &str) -> AnimationResult<Self> {
        ron::from_str::<SkeletonSerial>(source)?.to_value()
    }
}
