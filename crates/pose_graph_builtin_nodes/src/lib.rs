//! Concrete pose functions.
//!
//! - [`SequencePlayerFunction`](sequence_player::SequencePlayerFunction): plays a clip over
//!   time, firing time-marker callbacks.
//! - [`SequenceEvaluatorFunction`](sequence_evaluator::SequenceEvaluatorFunction): samples a
//!   clip at an explicit time.
//! - [`BlendSpace1DFunction`](blend_space_1d::BlendSpace1DFunction): blends clips laid out on
//!   one axis.
//! - [`BlendPosesFunction`](blend_poses::BlendPosesFunction): weighted, optionally masked,
//!   layers over a base pose.
//! - [`additive`]: building and applying additive poses.
//! - [`MirrorFunction`](mirror::MirrorFunction): left/right mirroring.
//! - [`space_conversion`]: local-space and component-space adapters.
//! - [`MontageSlotFunction`](montage_slot::MontageSlotFunction): where montages are layered in.
//! - [`JointTransformerFunction`](joint_transformer::JointTransformerFunction): procedural
//!   offsets on a single joint.
//!
//! The state machine and the cached pose live in `pose_graph_core`.

pub mod additive;
pub mod blend_poses;
pub mod blend_space_1d;
pub mod joint_transformer;
pub mod mirror;
pub mod montage_slot;
pub mod sequence_evaluator;
pub mod sequence_player;
pub mod space_conversion;

#[cfg(test)]
mod test_support;
