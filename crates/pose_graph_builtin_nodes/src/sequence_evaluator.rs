use std::sync::Arc;

use pose_graph_core::{
    animation_clip::AnimationSequence,
    context::{EvaluationState, InterpolationContext},
    errors::AnimationResult,
    pose::LocalSpacePose,
    pose_function::{InterpolationFn, PoseFunction, interpolation_fn},
    time::TimeSpan,
};

/// Samples a clip at an explicit time. Holds no clock, so ticking is a no-op; typically used
/// for static reference poses.
#[derive(Clone)]
pub struct SequenceEvaluatorFunction {
    sequence_fn: InterpolationFn<Arc<AnimationSequence>>,
    time_fn: InterpolationFn<TimeSpan>,
}

impl SequenceEvaluatorFunction {
    pub fn builder(sequence: Arc<AnimationSequence>) -> SequenceEvaluatorBuilder {
        Self::builder_from_fn(move |_| sequence.clone())
    }

    /// Picks the clip to sample every frame.
    pub fn builder_from_fn(
        sequence_fn: impl Fn(&InterpolationContext<'_>) -> Arc<AnimationSequence> + Send + Sync + 'static,
    ) -> SequenceEvaluatorBuilder {
        SequenceEvaluatorBuilder {
            sequence_fn: interpolation_fn(sequence_fn),
            time_fn: interpolation_fn(|_| TimeSpan::ZERO),
        }
    }
}

impl PoseFunction for SequenceEvaluatorFunction {
    fn tick(&mut self, _state: &mut EvaluationState) -> AnimationResult<()> {
        Ok(())
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        let sequence = (self.sequence_fn)(ctx);
        Ok(LocalSpacePose::from_sequence(
            ctx.skeleton.clone(),
            &sequence,
            (self.time_fn)(ctx),
            false,
        ))
    }
}

pub struct SequenceEvaluatorBuilder {
    sequence_fn: InterpolationFn<Arc<AnimationSequence>>,
    time_fn: InterpolationFn<TimeSpan>,
}

impl SequenceEvaluatorBuilder {
    /// Defaults to the start of the clip.
    pub fn evaluates_pose_at(mut self, time: TimeSpan) -> Self {
        self.time_fn = interpolation_fn(move |_| time);
        self
    }

    pub fn evaluates_pose_at_fn(
        mut self,
        time_fn: impl Fn(&InterpolationContext<'_>) -> TimeSpan + Send + Sync + 'static,
    ) -> Self {
        self.time_fn = interpolation_fn(time_fn);
        self
    }

    pub fn build(self) -> SequenceEvaluatorFunction {
        SequenceEvaluatorFunction {
            sequence_fn: self.sequence_fn,
            time_fn: self.time_fn,
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec3;

    use super::*;
    use crate::test_support::{Harness, slide};

    #[test]
    fn samples_the_requested_time_regardless_of_ticks() {
        let mut harness = Harness::new();
        let mut evaluator = SequenceEvaluatorFunction::builder(slide(10., "body", Vec3::ZERO, Vec3::X * 10.))
            .evaluates_pose_at(TimeSpan::from_ticks(4.))
            .build();
        for _ in 0..3 {
            harness.tick(&mut evaluator).unwrap();
        }
        let pose = harness.compute(&evaluator, 0.5).unwrap();
        assert!((pose.channel("body").translation.x - 4.).abs() < 1e-4);
        assert!(evaluator.most_relevant_animation_player().is_none());
    }

    #[test]
    fn times_past_the_end_are_clamped() {
        let harness = Harness::new();
        let evaluator = SequenceEvaluatorFunction::builder(slide(10., "body", Vec3::ZERO, Vec3::X * 10.))
            .evaluates_pose_at_fn(|ctx| TimeSpan::from_ticks(100. * ctx.partial_tick))
            .build();
        let pose = harness.compute(&evaluator, 1.).unwrap();
        assert!((pose.channel("body").translation.x - 10.).abs() < 1e-4);
    }
}
