//! Conversion between local-space and component-space poses.
//!
//! Both directions walk the skeleton once in topological order, so a joint's parent is always
//! resolved before the joint itself.

use crate::{
    joint::JointChannel,
    pose::{ComponentSpacePose, LocalSpacePose},
};

impl LocalSpacePose {
    /// Accumulates parent transforms top-down. The output buffer doubles as the cache of
    /// accumulated parent transforms.
    pub fn to_component_space(&self) -> ComponentSpacePose {
        let skeleton = self.skeleton();
        let mut component: Vec<JointChannel> = Vec::with_capacity(skeleton.len());

        for index in 0..skeleton.len() {
            let local = self
                .channel_at(index)
                .copied()
                .unwrap_or(JointChannel::IDENTITY);
            let channel = match skeleton.parent_index(index) {
                Some(parent) => change_space_down(&component[parent], &local),
                None => local,
            };
            component.push(channel);
        }

        ComponentSpacePose::from_channels(skeleton.clone(), component)
    }
}

impl ComponentSpacePose {
    /// Strips accumulated parent transforms. Each parent's inverse is computed once and
    /// cached for the remaining children of the pass.
    pub fn to_local_space(&self) -> LocalSpacePose {
        let skeleton = self.skeleton();
        let mut inverse_cache: Vec<Option<JointChannel>> = vec![None; skeleton.len()];
        let mut local = Vec::with_capacity(skeleton.len());

        for index in 0..skeleton.len() {
            let component = self
                .channel_at(index)
                .copied()
                .unwrap_or(JointChannel::IDENTITY);
            let channel = match skeleton.parent_index(index) {
                Some(parent) => {
                    let parent_inverse = *inverse_cache[parent].get_or_insert_with(|| {
                        self.channel_at(parent)
                            .copied()
                            .unwrap_or(JointChannel::IDENTITY)
                            .inverse()
                    });
                    change_space_down(&parent_inverse, &component)
                }
                None => component,
            };
            local.push(channel);
        }

        LocalSpacePose::from_channels(skeleton.clone(), local)
    }
}

/// Expresses `child` in the frame that `parent` is expressed in. Visibility stays the
/// child's own.
fn change_space_down(parent: &JointChannel, child: &JointChannel) -> JointChannel {
    JointChannel {
        visible: child.visible,
        ..parent.compose(child)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bevy_math::Vec3;

    use super::*;
    use crate::{pose::tests::posed, skeleton::tests::test_skeleton};

    #[test]
    fn local_component_roundtrip() {
        let skeleton = Arc::new(test_skeleton());
        let mut pose = posed(&skeleton, 0.3);
        pose.set_channel(
            "arm_L",
            JointChannel {
                scale: Vec3::splat(1.5),
                visible: false,
                ..pose.channel("arm_L")
            },
        );

        let roundtrip = pose.to_component_space().to_local_space();
        assert!(roundtrip.abs_diff_eq(&pose, 1e-4));
    }

    #[test]
    fn component_space_accumulates_parents() {
        let skeleton = Arc::new(test_skeleton());
        let mut pose = LocalSpacePose::new(skeleton);
        pose.set_channel("root", JointChannel::from_translation(Vec3::Y));
        pose.set_channel("body", JointChannel::from_translation(Vec3::X));
        pose.set_channel("arm_L", JointChannel::from_translation(Vec3::Z));

        let component = pose.to_component_space();
        assert!(
            component
                .channel("arm_L")
                .translation
                .abs_diff_eq(Vec3::ONE, 1e-6)
        );
        assert!(
            component
                .channel("head")
                .translation
                .abs_diff_eq(Vec3::new(1., 1., 0.), 1e-6)
        );
    }
}
