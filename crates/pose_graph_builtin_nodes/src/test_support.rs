use std::sync::Arc;

use bevy_math::Vec3;
use pose_graph_core::{
    animation_clip::AnimationSequence,
    context::{EvaluationState, InterpolationContext},
    driver::DriverContainer,
    errors::AnimationResult,
    montage::MontageManager,
    pose::{Pose, PoseSpace},
    pose_function::PoseFunction,
    skeleton::JointSkeleton,
    time::TimeSpan,
};

pub(crate) fn skeleton() -> Arc<JointSkeleton> {
    Arc::new(
        JointSkeleton::builder("root")
            .add_joint_under_root("body")
            .add_joint_under_parent("arm_L", "body")
            .add_joint_under_parent("arm_R", "body")
            .add_joint_under_parent("head", "body")
            .set_mirror_joint("arm_L", "arm_R")
            .build()
            .unwrap(),
    )
}

/// Clip moving `joint` linearly from `from` at tick 0 to `to` at its last tick.
pub(crate) fn slide(length: f32, joint: &str, from: Vec3, to: Vec3) -> Arc<AnimationSequence> {
    Arc::new(
        AnimationSequence::builder(TimeSpan::from_ticks(length))
            .translation_keyframe(joint, TimeSpan::ZERO, from)
            .translation_keyframe(joint, TimeSpan::from_ticks(length), to)
            .build(),
    )
}

/// Owns the state a container would own and drives single nodes through ticks and frames.
pub(crate) struct Harness {
    pub drivers: DriverContainer,
    pub montages: MontageManager,
    pub skeleton: Arc<JointSkeleton>,
    pub current_tick: u64,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            drivers: DriverContainer::new(),
            montages: MontageManager::new(),
            skeleton: skeleton(),
            current_tick: 0,
        }
    }

    pub fn tick<S: PoseSpace>(&mut self, node: &mut impl PoseFunction<S>) -> AnimationResult<()> {
        self.current_tick += 1;
        self.drivers.push_all_to_previous();
        let mut state = EvaluationState::new(&mut self.drivers, &mut self.montages, self.current_tick);
        node.tick(&mut state)
    }

    pub fn tick_montages(&mut self) {
        for callback in self.montages.tick() {
            let mut state = EvaluationState::new(&mut self.drivers, &mut self.montages, self.current_tick);
            callback(&mut state);
        }
    }

    pub fn compute<S: PoseSpace>(&self, node: &impl PoseFunction<S>, partial_tick: f32) -> AnimationResult<Pose<S>> {
        let ctx = InterpolationContext::new(
            &self.drivers,
            &self.montages,
            &self.skeleton,
            partial_tick,
            TimeSpan::from_ticks(self.current_tick as f32 + partial_tick),
        );
        node.compute(&ctx)
    }
}
