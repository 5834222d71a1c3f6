//! # Pose Graph Core
//!
//! The runtime underneath `pose_graph`: the value types, drivers and pose containers that
//! pose functions are built from, plus the two stateful nodes that need the framework's
//! internals (the state machine and the cached pose).
//!
//! ## Ticks and frames
//!
//! Simulation runs at a fixed rate of [`TimeSpan::TICKS_PER_SECOND`](time::TimeSpan::TICKS_PER_SECOND) ticks per second. Every
//! value that changes over time keeps both its previous-tick and current-tick value, so a
//! renderer running at any rate can sample between the two with a *partial tick* in
//! `[0, 1]`:
//!
//! - [`PoseFunction::tick`](pose_function::PoseFunction::tick) runs exactly once per tick
//!   and receives a mutable [`EvaluationState`](context::EvaluationState).
//! - [`PoseFunction::compute`](pose_function::PoseFunction::compute) runs any number of
//!   times per tick and receives a read-only
//!   [`InterpolationContext`](context::InterpolationContext).
//!
//! ## Drivers
//!
//! Gameplay code feeds the graph by writing into [`driver::DriverContainer`] through typed
//! [`driver::DriverKey`]s. Drivers are created lazily from the key's factory the first
//! time they are touched.
//!
//! ## Sharing
//!
//! Every consumer owns its own copy of a subtree ([`PoseFunction::wrap_unique`](pose_function::PoseFunction::wrap_unique)).
//! The one exception is [`pose_function::CachedPoseFunction`], registered by id in a
//! [`pose_function::CachedPoseContainer`], which ticks its input at most once per tick and
//! computes it at most once per tick however many consumers reference it.

pub mod animation_clip;
pub mod context;
pub mod driver;
pub mod edge_data;
pub mod errors;
pub mod interpolation;
pub mod joint;
pub mod montage;
pub mod pose;
pub mod pose_function;
pub mod skeleton;
pub mod space_conversion;
pub mod state_machine;
pub mod symmetry;
pub mod time;
