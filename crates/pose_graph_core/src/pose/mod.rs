use std::{fmt::Debug, marker::PhantomData, sync::Arc};

use crate::{
    animation_clip::AnimationSequence,
    edge_data::BlendMask,
    joint::{JointChannel, TransformSpace},
    skeleton::{JointIndex, JointSkeleton},
    symmetry::SymmetryMode,
    time::{TimeSpan, Transition},
};

/// Marker for the frame a [`Pose`]'s channels are expressed in.
pub trait PoseSpace: Clone + Copy + Debug + Default + Send + Sync + 'static {}

/// Channels are relative to the parent joint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocalSpace;

/// Channels are relative to the skeleton root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ComponentSpace;

impl PoseSpace for LocalSpace {}
impl PoseSpace for ComponentSpace {}

/// A transform for every joint of a skeleton. Joints never written to hold the identity.
#[derive(Clone, Debug)]
pub struct Pose<S: PoseSpace> {
    skeleton: Arc<JointSkeleton>,
    channels: Vec<JointChannel>,
    _space: PhantomData<S>,
}

pub type LocalSpacePose = Pose<LocalSpace>;
pub type ComponentSpacePose = Pose<ComponentSpace>;

impl<S: PoseSpace> Pose<S> {
    pub fn new(skeleton: Arc<JointSkeleton>) -> Self {
        let channels = vec![JointChannel::IDENTITY; skeleton.len()];
        Self {
            skeleton,
            channels,
            _space: PhantomData,
        }
    }

    pub(crate) fn from_channels(skeleton: Arc<JointSkeleton>, channels: Vec<JointChannel>) -> Self {
        debug_assert_eq!(skeleton.len(), channels.len());
        Self {
            skeleton,
            channels,
            _space: PhantomData,
        }
    }

    pub fn skeleton(&self) -> &Arc<JointSkeleton> {
        &self.skeleton
    }

    /// Channel of `joint`, or the identity for joints outside the skeleton.
    pub fn channel(&self, joint: &str) -> JointChannel {
        self.skeleton
            .joint_index(joint)
            .and_then(|index| self.channels.get(index))
            .copied()
            .unwrap_or(JointChannel::IDENTITY)
    }

    pub fn channel_at(&self, index: JointIndex) -> Option<&JointChannel> {
        self.channels.get(index)
    }

    pub fn channel_mut(&mut self, joint: &str) -> Option<&mut JointChannel> {
        let index = self.skeleton.joint_index(joint)?;
        self.channels.get_mut(index)
    }

    /// Writes the channel of `joint`. Joints outside the skeleton are ignored.
    pub fn set_channel(&mut self, joint: &str, channel: JointChannel) {
        if let Some(slot) = self.channel_mut(joint) {
            *slot = channel;
        }
    }

    pub fn channels(&self) -> impl Iterator<Item = (&str, &JointChannel)> {
        self.skeleton.joint_names().zip(self.channels.iter())
    }

    pub fn interpolated(&self, other: &Self, weight: f32) -> Self {
        self.interpolated_with_mask(other, weight, None)
    }

    /// Blends towards `other`, scaling the weight of each joint by `mask` when one is given.
    pub fn interpolated_with_mask(&self, other: &Self, weight: f32, mask: Option<&BlendMask>) -> Self {
        self.blend_per_joint(other, |joint| match mask {
            Some(mask) => weight * mask.joint_weight(joint, &self.skeleton),
            None => weight,
        })
    }

    /// Blends towards `other` by a transition's linear progress `weight`, applying the
    /// transition's blend profile and easing per joint.
    pub fn interpolated_by_transition(&self, other: &Self, weight: f32, transition: &Transition) -> Self {
        self.blend_per_joint(other, |joint| {
            let progress = match &transition.blend_profile {
                Some(profile) => profile.joint_progress(joint, &self.skeleton, weight),
                None => weight,
            };
            transition.apply_easing(progress)
        })
    }

    fn blend_per_joint(&self, other: &Self, joint_weight: impl Fn(&str) -> f32) -> Self {
        let channels = self
            .channels()
            .zip(other.channels.iter())
            .map(|((joint, a), b)| a.interpolated(b, joint_weight(joint)))
            .collect();
        Self::from_channels(self.skeleton.clone(), channels)
    }

    /// Composes each joint of `other` onto the matching joint of this pose.
    pub fn multiply(&mut self, other: &Self, space: TransformSpace) {
        for (channel, operand) in self.channels.iter_mut().zip(other.channels.iter()) {
            channel.multiply(operand, space);
        }
    }

    pub fn inverted(&self) -> Self {
        let channels = self.channels.iter().map(JointChannel::inverse).collect();
        Self::from_channels(self.skeleton.clone(), channels)
    }

    pub fn invert(&mut self) {
        for channel in &mut self.channels {
            channel.invert();
        }
    }

    /// Swaps every joint with its mirror partner and mirrors the swapped channels.
    pub fn mirrored(&self, mode: SymmetryMode) -> Self {
        let channels = (0..self.channels.len())
            .map(|index| {
                let source = self.skeleton.mirror_index(index).unwrap_or(index);
                self.channels[source].mirrored(mode)
            })
            .collect();
        Self::from_channels(self.skeleton.clone(), channels)
    }

    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.channels.len() == other.channels.len()
            && self
                .channels
                .iter()
                .zip(other.channels.iter())
                .all(|(a, b)| a.abs_diff_eq(b, max_abs_diff))
    }
}

impl LocalSpacePose {
    /// Samples every joint of `sequence` at `time`. Joints the clip does not animate keep the
    /// identity.
    pub fn from_sequence(
        skeleton: Arc<JointSkeleton>,
        sequence: &AnimationSequence,
        time: TimeSpan,
        looping: bool,
    ) -> Self {
        let mut pose = Self::new(skeleton);
        for (index, joint) in pose.skeleton.clone().joint_names().enumerate() {
            if let Some(channel) = sequence.sample_channel(joint, time, looping) {
                pose.channels[index] = channel;
            }
        }
        pose
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use bevy_math::{Quat, Vec3};

    use super::*;
    use crate::{
        edge_data::BlendProfile,
        skeleton::tests::test_skeleton,
        time::{Easing, TimeSpan},
    };

    pub(crate) fn posed(skeleton: &Arc<JointSkeleton>, seed: f32) -> LocalSpacePose {
        let mut pose = LocalSpacePose::new(skeleton.clone());
        for (index, joint) in skeleton.joint_names().enumerate() {
            let k = seed + index as f32;
            pose.set_channel(
                joint,
                JointChannel {
                    translation: Vec3::new(k, 0.5 * k, -k),
                    rotation: Quat::from_rotation_y(0.1 * k) * Quat::from_rotation_x(0.05 * k),
                    scale: Vec3::ONE,
                    visible: true,
                },
            );
        }
        pose
    }

    #[test]
    fn unknown_joints_resolve_to_identity() {
        let mut pose = LocalSpacePose::new(Arc::new(test_skeleton()));
        pose.set_channel("tail", JointChannel::from_translation(Vec3::X));
        assert_eq!(pose.channel("tail"), JointChannel::IDENTITY);
        assert_eq!(pose.channel("head"), JointChannel::IDENTITY);
    }

    #[test]
    fn masked_interpolation_only_touches_masked_joints() {
        let skeleton = Arc::new(test_skeleton());
        let a = LocalSpacePose::new(skeleton.clone());
        let b = posed(&skeleton, 1.);
        let mask = BlendMask::builder().define_for_joint("head", 1.).build();
        let blended = a.interpolated_with_mask(&b, 1., Some(&mask));
        assert_eq!(blended.channel("head"), b.channel("head"));
        assert_eq!(blended.channel("arm_L"), JointChannel::IDENTITY);
    }

    #[test]
    fn transition_blend_uses_profile_per_joint() {
        let skeleton = Arc::new(test_skeleton());
        let a = LocalSpacePose::new(skeleton.clone());
        let b = posed(&skeleton, 1.);
        let transition = Transition::new(TimeSpan::from_ticks(4.))
            .with_easing(Easing::Linear)
            .with_blend_profile(BlendProfile::builder().define_for_joint("head", 0.5).build());
        let blended = a.interpolated_by_transition(&b, 0.5, &transition);
        assert_eq!(blended.channel("head"), b.channel("head"));
        assert!(
            blended
                .channel("body")
                .translation
                .abs_diff_eq(b.channel("body").translation * 0.5, 1e-5)
        );
    }

    #[test]
    fn mirrored_pose_swaps_partners() {
        let skeleton = Arc::new(test_skeleton());
        let pose = posed(&skeleton, 0.);
        let mirrored = pose.mirrored(SymmetryMode::MirrorX);
        assert_eq!(
            mirrored.channel("arm_R"),
            pose.channel("arm_L").mirrored(SymmetryMode::MirrorX)
        );
        assert_eq!(
            mirrored.channel("head"),
            pose.channel("head").mirrored(SymmetryMode::MirrorX)
        );
    }
}
