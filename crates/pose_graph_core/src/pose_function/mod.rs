//! The contract every graph node implements.
//!
//! A pose function is ticked exactly once per simulation tick and computed any number of
//! times per tick with different partial-tick fractions. Each consumer owns its own subtree;
//! [`CachedPoseFunction`] is the only node that may be referenced from several places.

mod cache;
mod time_based;

pub use cache::*;
pub use time_based::*;

use std::sync::Arc;

use crate::{
    context::{EvaluationState, InterpolationContext},
    errors::AnimationResult,
    pose::{LocalSpace, Pose, PoseSpace},
    time::TimeSpan,
};

/// Value recomputed once per tick from the evaluation state (play rates, flags, weights).
pub type EvaluationFn<T> = Arc<dyn Fn(&EvaluationState<'_>) -> T + Send + Sync>;

/// Value recomputed every frame from the interpolation context.
pub type InterpolationFn<T> = Arc<dyn Fn(&InterpolationContext<'_>) -> T + Send + Sync>;

pub fn evaluation_fn<T>(f: impl Fn(&EvaluationState<'_>) -> T + Send + Sync + 'static) -> EvaluationFn<T> {
    Arc::new(f)
}

pub fn interpolation_fn<T>(
    f: impl Fn(&InterpolationContext<'_>) -> T + Send + Sync + 'static,
) -> InterpolationFn<T> {
    Arc::new(f)
}

pub trait PoseFunction<S: PoseSpace = LocalSpace>: PoseFunctionClone<S> + Send + Sync + 'static {
    /// Advances internal time and state, then ticks whichever inputs are relevant.
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()>;

    /// Samples the pose at `ctx.partial_tick`. Must not change tick-scoped state.
    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<Pose<S>>;

    /// Copy of this node whose whole subtree is owned by the copy. Cached poses stay shared.
    fn wrap_unique(&self) -> Box<dyn PoseFunction<S>> {
        self.clone_pose_function()
    }

    /// Nearest clip player that drives finish detection, searched in each node's own order
    /// of relevance. Nodes that should be ignored by the search return `None`.
    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        None
    }

    fn into_boxed(self) -> Box<dyn PoseFunction<S>>
    where
        Self: Sized,
    {
        Box::new(self)
    }
}

pub trait PoseFunctionClone<S: PoseSpace> {
    fn clone_pose_function(&self) -> Box<dyn PoseFunction<S>>;
}

impl<T, S> PoseFunctionClone<S> for T
where
    T: 'static + PoseFunction<S> + Clone,
    S: PoseSpace,
{
    fn clone_pose_function(&self) -> Box<dyn PoseFunction<S>> {
        Box::new(self.clone())
    }
}

impl<S: PoseSpace> Clone for Box<dyn PoseFunction<S>> {
    fn clone(&self) -> Self {
        self.clone_pose_function()
    }
}

impl<S: PoseSpace> PoseFunction<S> for Box<dyn PoseFunction<S>> {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        (**self).tick(state)
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<Pose<S>> {
        (**self).compute(ctx)
    }

    fn wrap_unique(&self) -> Box<dyn PoseFunction<S>> {
        (**self).wrap_unique()
    }

    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        (**self).most_relevant_animation_player()
    }

    fn into_boxed(self) -> Box<dyn PoseFunction<S>> {
        self
    }
}

/// A node that plays back a clip over time.
pub trait AnimationPlayer {
    /// Time left in the clip as of the previous and the current tick.
    fn remaining_time(&self) -> (TimeSpan, TimeSpan);

    fn animation_length(&self) -> TimeSpan;

    /// Whether the remaining time crossed `threshold` during the last tick, either counting
    /// down towards the end or wrapping around the loop point.
    fn is_finishing_within(&self, threshold: TimeSpan) -> bool {
        let (previous, current) = self.remaining_time();
        let threshold = threshold.in_ticks();
        let (previous, current) = (previous.in_ticks(), current.in_ticks());
        if previous > current {
            threshold < previous && threshold >= current
        } else if previous < current {
            threshold < previous
        } else {
            false
        }
    }
}
