use thiserror::Error;

use crate::animation_clip::ClipId;

/// Configuration errors. These indicate a mistake in how a graph, skeleton or montage was
/// put together and are reported at construction time or on the first tick.
#[non_exhaustive]
#[derive(Debug, Error, Clone)]
pub enum AnimationError {
    #[error("No animation clip with id {0:?} in the clip store")]
    MissingClip(ClipId),
    #[error("State {0} was registered more than once")]
    DuplicateState(String),
    #[error("State {0} is not part of this state machine")]
    MissingState(String),
    #[error("Blend space has no entries")]
    EmptyBlendSpace,
    #[error("State machine has no active state layers; was it ticked before computing?")]
    EmptyStateStack,
    #[error("Cached pose {0} was registered more than once")]
    DuplicateCachedPose(String),
    #[error("No cached pose registered under {0}")]
    MissingCachedPose(String),
    #[error("Joint {0} is not part of the skeleton")]
    UnknownJoint(String),
    #[error("Joint {0} was added to the skeleton more than once")]
    DuplicateJoint(String),
    #[error("Invalid mirror name pattern: {0}")]
    InvalidMirrorPattern(#[from] regex::Error),
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),
}

pub type AnimationResult<T> = Result<T, AnimationError>;
