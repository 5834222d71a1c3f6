//! # Pose Graph
//!
//! A runtime for procedural skeletal animation. A graph of pose functions samples, blends
//! and layers baked clips, steered by values gameplay code writes into drivers once per
//! simulation tick, and is sampled at any frame rate in between ticks.
//!
//! ## Getting started
//!
//! Implement [`JointAnimator`](animator::JointAnimator) for each kind of animated subject.
//! It describes the skeleton, builds the graph out of the nodes in
//! [`builtin_nodes`] and [`core::state_machine`], and copies gameplay state into drivers:
//!
//! ```ignore
//! impl JointAnimator for BipedAnimator {
//!     type Source = Biped;
//!
//!     fn build_skeleton(&self) -> AnimationResult<JointSkeleton> {
//!         JointSkeleton::from_ron_str(BIPED_SKELETON)
//!     }
//!
//!     fn construct_pose_function(
//!         &self,
//!         _skeleton: &Arc<JointSkeleton>,
//!         _cached_poses: &mut CachedPoseContainer,
//!         clips: &dyn ClipStore,
//!     ) -> AnimationResult<Box<dyn PoseFunction>> {
//!         let walk = SequencePlayerFunction::builder(clips.get_or_err(&"walk".into())?)
//!             .looping(true)
//!             .with_play_rate_fn(|state| state.driver_value(&WALK_SPEED))
//!             .build();
//!         Ok(MontageSlotFunction::new(walk, "full_body").into_boxed())
//!     }
//!
//!     fn extract_animation_data(&self, biped: &Biped, drivers: &mut DriverContainer, _: &mut MontageManager) {
//!         drivers.driver_mut(&WALK_SPEED).set_value(biped.speed);
//!     }
//! }
//! ```
//!
//! Then create one [`AnimationDataContainer`](container::AnimationDataContainer) per subject,
//! call [`run_tick`](container::AnimationDataContainer::run_tick) once per simulation tick and
//! [`compute_pose`](container::AnimationDataContainer::compute_pose) once per rendered frame.
//!
//! ## Nodes
//!
//! - [`SequencePlayerFunction`](builtin_nodes::sequence_player::SequencePlayerFunction): plays
//!   a clip, looping or not, and fires time-marker callbacks.
//! - [`SequenceEvaluatorFunction`](builtin_nodes::sequence_evaluator::SequenceEvaluatorFunction):
//!   samples a clip at an explicit time.
//! - [`BlendSpace1DFunction`](builtin_nodes::blend_space_1d::BlendSpace1DFunction): blends
//!   clips laid out along one parameter.
//! - [`BlendPosesFunction`](builtin_nodes::blend_poses::BlendPosesFunction): weighted and
//!   masked layers.
//! - [`ApplyAdditiveFunction`](builtin_nodes::additive::ApplyAdditiveFunction),
//!   [`ComposeAdditiveFunction`](builtin_nodes::additive::ComposeAdditiveFunction) and
//!   [`MakeDynamicAdditiveFunction`](builtin_nodes::additive::MakeDynamicAdditiveFunction):
//!   additive layering.
//! - [`MirrorFunction`](builtin_nodes::mirror::MirrorFunction): left/right mirroring.
//! - [`MontageSlotFunction`](builtin_nodes::montage_slot::MontageSlotFunction): where montages
//!   are layered in.
//! - [`JointTransformerFunction`](builtin_nodes::joint_transformer::JointTransformerFunction):
//!   procedural offsets on one joint.
//! - [`StateMachineFunction`](core::state_machine::StateMachineFunction): blends between states
//!   as transitions are taken.
//! - [`CachedPoseFunction`](core::pose_function::CachedPoseFunction): a subtree shared by
//!   several consumers.

pub use pose_graph_builtin_nodes as builtin_nodes;
pub use pose_graph_core as core;

pub mod animator;
pub mod container;

pub mod prelude {
    pub use super::animator::*;
    pub use super::builtin_nodes::{
        additive::*, blend_poses::*, blend_space_1d::*, joint_transformer::*, mirror::*,
        montage_slot::*, sequence_evaluator::*, sequence_player::*, space_conversion::*,
    };
    pub use super::container::*;
    pub use super::core::{
        animation_clip::*,
        context::*,
        driver::*,
        edge_data::*,
        errors::*,
        joint::*,
        montage::*,
        pose::*,
        pose_function::*,
        skeleton::{JointSkeleton, serial::SkeletonSerial},
        state_machine::*,
        symmetry::*,
        time::*,
    };
}
