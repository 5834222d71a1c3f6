use std::sync::Arc;

use pose_graph_core::{
    animation_clip::ClipStore,
    driver::DriverContainer,
    errors::AnimationResult,
    montage::MontageManager,
    pose_function::{CachedPoseContainer, PoseFunction},
    skeleton::JointSkeleton,
};
use serde::{Deserialize, Serialize};

/// How often the container evaluates the pose graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoseCalculationFrequency {
    /// Every call to `compute_pose` evaluates the graph at the requested partial tick.
    #[default]
    EveryFrame,
    /// The graph is evaluated once at the end of each tick, and frames blend between the last
    /// two tick poses.
    OncePerTick,
}

/// Implemented by the host for each kind of animated subject.
///
/// The animator describes the graph; an
/// [`AnimationDataContainer`](crate::container::AnimationDataContainer) instantiates and owns a
/// fresh copy of it for every subject.
pub trait JointAnimator {
    /// Gameplay state the animator reads drivers from.
    type Source;

    fn build_skeleton(&self) -> AnimationResult<JointSkeleton>;

    /// Builds the root of the graph. Pose functions shared between several consumers are
    /// registered in `cached_poses` and fetched back from it while building.
    fn construct_pose_function(
        &self,
        skeleton: &Arc<JointSkeleton>,
        cached_poses: &mut CachedPoseContainer,
        clips: &dyn ClipStore,
    ) -> AnimationResult<Box<dyn PoseFunction>>;

    fn pose_calculation_frequency(&self) -> PoseCalculationFrequency {
        PoseCalculationFrequency::EveryFrame
    }

    /// Called once per tick before the graph is ticked.
    fn extract_animation_data(&self, source: &Self::Source, drivers: &mut DriverContainer, montages: &mut MontageManager);
}
