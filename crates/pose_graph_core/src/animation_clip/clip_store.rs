use std::sync::Arc;

use bevy_platform::collections::HashMap;

use super::{AnimationSequence, ClipId};
use crate::errors::{AnimationError, AnimationResult};

/// Source of baked clips. Clips are immutable once loaded and shared by reference.
pub trait ClipStore {
    fn get(&self, id: &ClipId) -> Option<Arc<AnimationSequence>>;

    /// Fails with [`AnimationError::MissingClip`] instead of substituting a default.
    fn get_or_err(&self, id: &ClipId) -> AnimationResult<Arc<AnimationSequence>> {
        self.get(id)
            .ok_or_else(|| AnimationError::MissingClip(id.clone()))
    }
}

/// A [`ClipStore`] backed by a plain map, for hosts that load clips up front.
#[derive(Clone, Debug, Default)]
pub struct InMemoryClipStore {
    clips: HashMap<ClipId, Arc<AnimationSequence>>,
}

impl InMemoryClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<ClipId>, sequence: AnimationSequence) -> &mut Self {
        self.clips.insert(id.into(), Arc::new(sequence));
        self
    }

    pub fn with_clip(mut self, id: impl Into<ClipId>, sequence: AnimationSequence) -> Self {
        self.insert(id, sequence);
        self
    }
}

impl ClipStore for InMemoryClipStore {
    fn get(&self, id: &ClipId) -> Option<Arc<AnimationSequence>> {
        self.clips.get(id).cloned()
    }
}
