pub mod serial;

use std::fmt::Debug;

use bevy_log::warn;
use indexmap::{IndexMap, map::Entry};

use crate::{
    errors::{AnimationError, AnimationResult},
    symmetry::PatternMapper,
};

/// Index of a joint within its [`JointSkeleton`]. Parents always have a lower index than
/// their children.
pub type JointIndex = usize;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JointConfiguration {
    pub parent: Option<JointIndex>,
    pub children: Vec<JointIndex>,
    pub mirror_joint: Option<JointIndex>,
}

/// Immutable rooted tree of named joints.
///
/// Every joint but the root has exactly one parent, and the mirror relation is symmetric:
/// if `a` mirrors to `b`, then `b` mirrors to `a`.
#[derive(Clone, PartialEq, Eq)]
pub struct JointSkeleton {
    joints: IndexMap<String, JointConfiguration>,
}

impl JointSkeleton {
    pub fn builder(root: impl Into<String>) -> JointSkeletonBuilder {
        JointSkeletonBuilder::new(root)
    }

    pub fn root(&self) -> &str {
        // The builder always inserts the root first.
        self.joints
            .get_index(0)
            .map(|(name, _)| name.as_str())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn contains_joint(&self, joint: &str) -> bool {
        self.joints.contains_key(joint)
    }

    pub fn joint_index(&self, joint: &str) -> Option<JointIndex> {
        self.joints.get_index_of(joint)
    }

    pub fn joint_name(&self, index: JointIndex) -> Option<&str> {
        self.joints.get_index(index).map(|(name, _)| name.as_str())
    }

    pub fn joint_configuration(&self, joint: &str) -> Option<&JointConfiguration> {
        self.joints.get(joint)
    }

    pub fn parent_index(&self, index: JointIndex) -> Option<JointIndex> {
        self.joints.get_index(index)?.1.parent
    }

    pub fn mirror_index(&self, index: JointIndex) -> Option<JointIndex> {
        self.joints.get_index(index)?.1.mirror_joint
    }

    pub fn mirror_joint(&self, joint: &str) -> Option<&str> {
        let index = self.joints.get(joint)?.mirror_joint?;
        self.joint_name(index)
    }

    /// Joint names in topological order (parents before children).
    pub fn joint_names(&self) -> impl Iterator<Item = &str> {
        self.joints.keys().map(String::as_str)
    }

    fn fmt_joint(
        &self,
        index: JointIndex,
        depth: usize,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let Some((name, config)) = self.joints.get_index(index) else {
            return Ok(());
        };
        write!(f, "{}{name}", "  ".repeat(depth))?;
        if let Some(mirror) = config.mirror_joint.and_then(|m| self.joint_name(m)) {
            write!(f, " <-> {mirror}")?;
        }
        writeln!(f)?;
        for child in &config.children {
            self.fmt_joint(*child, depth + 1, f)?;
        }
        Ok(())
    }
}

impl Debug for JointSkeleton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "JointSkeleton:")?;
        if self.joints.is_empty() {
            return Ok(());
        }
        self.fmt_joint(0, 1, f)
    }
}

pub struct JointSkeletonBuilder {
    root: String,
    joints: Vec<(String, String)>,
    mirrors: Vec<(String, String)>,
    mirror_pattern: Option<PatternMapper>,
}

impl JointSkeletonBuilder {
    fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            joints: Vec::new(),
            mirrors: Vec::new(),
            mirror_pattern: None,
        }
    }

    pub fn add_joint_under_root(self, joint: impl Into<String>) -> Self {
        let root = self.root.clone();
        self.add_joint_under_parent(joint, root)
    }

    /// The parent must already have been added.
    pub fn add_joint_under_parent(
        mut self,
        joint: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        self.joints.push((joint.into(), parent.into()));
        self
    }

    /// Pairs two joints as mirror partners. A joint that was already paired loses its
    /// previous partner.
    pub fn set_mirror_joint(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.mirrors.push((a.into(), b.into()));
        self
    }

    /// Pairs every still-unpaired joint with the joint whose name `mapper` flips it to.
    pub fn with_mirror_pattern(mut self, mapper: PatternMapper) -> Self {
        self.mirror_pattern = Some(mapper);
        self
    }

    pub fn build(self) -> AnimationResult<JointSkeleton> {
        let mut joints: IndexMap<String, JointConfiguration> = IndexMap::new();
        joints.insert(self.root.clone(), JointConfiguration::default());

        for (joint, parent) in self.joints {
            let parent_index = joints
                .get_index_of(&parent)
                .ok_or_else(|| AnimationError::UnknownJoint(parent.clone()))?;
            let index = match joints.entry(joint) {
                Entry::Occupied(entry) => {
                    return Err(AnimationError::DuplicateJoint(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    let index = entry.index();
                    entry.insert(JointConfiguration {
                        parent: Some(parent_index),
                        ..Default::default()
                    });
                    index
                }
            };
            joints[parent_index].children.push(index);
        }

        let mut skeleton = JointSkeleton { joints };

        for (a, b) in self.mirrors {
            let a = skeleton
                .joint_index(&a)
                .ok_or(AnimationError::UnknownJoint(a))?;
            let b = skeleton
                .joint_index(&b)
                .ok_or(AnimationError::UnknownJoint(b))?;
            skeleton.pair_mirrors(a, b);
        }

        if let Some(mapper) = self.mirror_pattern {
            for index in 0..skeleton.len() {
                if skeleton.joints[index].mirror_joint.is_some() {
                    continue;
                }
                let Some(flipped) = skeleton.joint_name(index).and_then(|n| mapper.flip(n)) else {
                    continue;
                };
                match skeleton.joint_index(&flipped) {
                    Some(partner) if skeleton.joints[partner].mirror_joint.is_none() => {
                        skeleton.pair_mirrors(index, partner);
                    }
                    Some(_) => {}
                    None => warn!(
                        "Joint {:?} has a mirrored name {flipped:?} that is not in the skeleton",
                        skeleton.joint_name(index)
                    ),
                }
            }
        }

        Ok(skeleton)
    }
}

impl JointSkeleton {
    fn pair_mirrors(&mut self, a: JointIndex, b: JointIndex) {
        for joint in [a, b] {
            if let Some(old_partner) = self.joints[joint].mirror_joint.take() {
                self.joints[old_partner].mirror_joint = None;
            }
        }
        if a != b {
            self.joints[a].mirror_joint = Some(b);
            self.joints[b].mirror_joint = Some(a);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::symmetry::serial::PatternMapperSerial;

    /// root
    /// └ body
    ///   ├ arm_L ─ hand_L
    ///   ├ arm_R ─ hand_R
    ///   └ head
    pub(crate) fn test_skeleton() -> JointSkeleton {
        JointSkeleton::builder("root")
            .add_joint_under_root("body")
            .add_joint_under_parent("arm_L", "body")
            .add_joint_under_parent("hand_L", "arm_L")
            .add_joint_under_parent("arm_R", "body")
            .add_joint_under_parent("hand_R", "arm_R")
            .add_joint_under_parent("head", "body")
            .set_mirror_joint("arm_L", "arm_R")
            .set_mirror_joint("hand_L", "hand_R")
            .build()
            .unwrap()
    }

    #[test]
    fn parents_precede_children() {
        let skeleton = test_skeleton();
        assert_eq!(skeleton.root(), "root");
        for name in skeleton.joint_names() {
            let index = skeleton.joint_index(name).unwrap();
            if let Some(parent) = skeleton.parent_index(index) {
                assert!(parent < index);
            } else {
                assert_eq!(name, "root");
            }
        }
    }

    #[test]
    fn mirror_relation_is_symmetric() {
        let skeleton = test_skeleton();
        assert_eq!(skeleton.mirror_joint("arm_L"), Some("arm_R"));
        assert_eq!(skeleton.mirror_joint("arm_R"), Some("arm_L"));
        assert_eq!(skeleton.mirror_joint("head"), None);
    }

    #[test]
    fn re_pairing_drops_stale_partner() {
        let skeleton = JointSkeleton::builder("root")
            .add_joint_under_root("a")
            .add_joint_under_root("b")
            .add_joint_under_root("c")
            .set_mirror_joint("a", "b")
            .set_mirror_joint("a", "c")
            .build()
            .unwrap();
        assert_eq!(skeleton.mirror_joint("a"), Some("c"));
        assert_eq!(skeleton.mirror_joint("c"), Some("a"));
        assert_eq!(skeleton.mirror_joint("b"), None);
    }

    #[test]
    fn mirror_pattern_pairs_by_name() {
        let skeleton = JointSkeleton::builder("root")
            .add_joint_under_root("leg_L")
            .add_joint_under_root("leg_R")
            .add_joint_under_root("tail")
            .with_mirror_pattern(PatternMapperSerial::default().to_value().unwrap())
            .build()
            .unwrap();
        assert_eq!(skeleton.mirror_joint("leg_L"), Some("leg_R"));
        assert_eq!(skeleton.mirror_joint("tail"), None);
    }

    #[test]
    fn unknown_parent_and_duplicates_are_rejected() {
        let missing_parent = JointSkeleton::builder("root")
            .add_joint_under_parent("hand", "arm")
            .build();
        assert!(matches!(missing_parent, Err(AnimationError::UnknownJoint(j)) if j == "arm"));

        let duplicate = JointSkeleton::builder("root")
            .add_joint_under_root("arm")
            .add_joint_under_root("arm")
            .build();
        assert!(matches!(duplicate, Err(AnimationError::DuplicateJoint(j)) if j == "arm"));
    }
}
