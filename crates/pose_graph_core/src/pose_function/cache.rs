use std::{
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use bevy_log::debug;
use indexmap::IndexMap;

use super::PoseFunction;
use crate::{
    context::{EvaluationState, InterpolationContext},
    errors::{AnimationError, AnimationResult},
    pose::LocalSpacePose,
};

struct CachedPoseState {
    input: Box<dyn PoseFunction>,
    resets_upon_relevant: bool,
    last_ticked: Option<u64>,
    pose: Option<LocalSpacePose>,
}

/// Shared handle to a pose function that several consumers may read from.
///
/// Clones of the handle (including those made by [`PoseFunction::wrap_unique`]) refer to the
/// same input. The input is ticked at most once per simulation tick, and its pose is computed
/// once and reused until [`CachedPoseContainer::clear_caches`] runs.
#[derive(Clone)]
pub struct CachedPoseFunction {
    id: Arc<str>,
    state: Arc<Mutex<CachedPoseState>>,
}

impl CachedPoseFunction {
    fn new(id: &str, input: Box<dyn PoseFunction>, resets_upon_relevant: bool) -> Self {
        Self {
            id: id.into(),
            state: Arc::new(Mutex::new(CachedPoseState {
                input: input.wrap_unique(),
                resets_upon_relevant,
                last_ticked: None,
                pose: None,
            })),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn lock(&self) -> MutexGuard<'_, CachedPoseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn clear_cache(&self) {
        self.lock().pose = None;
    }
}

impl PoseFunction for CachedPoseFunction {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        let mut cached = self.lock();
        let current_tick = state.current_tick;
        let resetting = match cached.last_ticked {
            Some(last) if last == current_tick => return Ok(()),
            Some(last) => cached.resets_upon_relevant && current_tick > last + 1,
            None => false,
        };
        if resetting {
            debug!("Cached pose {} relevant again, resetting its input", self.id);
        }
        cached.last_ticked = Some(current_tick);
        cached.input.tick(&mut state.with_reset(resetting))
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        let mut cached = self.lock();
        if let Some(pose) = &cached.pose {
            return Ok(pose.clone());
        }
        let pose = cached.input.compute(ctx)?;
        cached.pose = Some(pose.clone());
        Ok(pose)
    }
}

impl Debug for CachedPoseFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CachedPoseFunction").field(&self.id).finish()
    }
}

/// Registry of the cached poses of one animation data container.
#[derive(Debug, Default)]
pub struct CachedPoseContainer {
    cached_poses: IndexMap<String, CachedPoseFunction>,
    last_cleared_tick: Option<u64>,
}

impl CachedPoseContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        id: impl Into<String>,
        input: impl PoseFunction,
        resets_upon_relevant: bool,
    ) -> AnimationResult<()> {
        let id = id.into();
        if self.cached_poses.contains_key(&id) {
            return Err(AnimationError::DuplicateCachedPose(id));
        }
        let cached = CachedPoseFunction::new(&id, input.into_boxed(), resets_upon_relevant);
        self.cached_poses.insert(id, cached);
        Ok(())
    }

    /// Handle to the cached pose registered under `id`.
    pub fn get_or_err(&self, id: &str) -> AnimationResult<CachedPoseFunction> {
        self.cached_poses
            .get(id)
            .cloned()
            .ok_or_else(|| AnimationError::MissingCachedPose(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.cached_poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cached_poses.is_empty()
    }

    pub fn clear_caches(&self) {
        for cached in self.cached_poses.values() {
            cached.clear_cache();
        }
    }

    /// Clears every cache the first time it is called for `tick`; later calls for the same
    /// tick keep the memoized poses.
    pub fn clear_caches_for_tick(&mut self, tick: u64) {
        if self.last_cleared_tick != Some(tick) {
            self.clear_caches();
            self.last_cleared_tick = Some(tick);
        }
    }
}
