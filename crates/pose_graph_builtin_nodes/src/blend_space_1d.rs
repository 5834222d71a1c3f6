use std::sync::Arc;

use bevy_log::warn;
use pose_graph_core::{
    animation_clip::AnimationSequence,
    context::{EvaluationState, InterpolationContext},
    driver::{Driver, DriverKey, VariableDriver},
    errors::{AnimationError, AnimationResult},
    pose::LocalSpacePose,
    pose_function::{EvaluationFn, PoseFunction, TimeBasedPlayback, evaluation_fn},
    time::TimeSpan,
};

#[derive(Clone, Debug)]
struct BlendSpaceEntry {
    position: f32,
    sequence: Arc<AnimationSequence>,
    play_rate: f32,
}

/// The table entries around a blend position, and how far the position is from the lower one.
struct Neighbours<'a> {
    floor: &'a BlendSpaceEntry,
    ceiling: &'a BlendSpaceEntry,
    fraction: f32,
}

/// Blends looping clips placed along a single axis, driven by a per-tick position.
///
/// Both neighbouring clips are sampled at the same elapsed time, and the play rate follows
/// the position so clips of different cadence stay in step.
#[derive(Clone)]
pub struct BlendSpace1DFunction {
    entries: Vec<BlendSpaceEntry>,
    position_fn: EvaluationFn<f32>,
    position: VariableDriver<f32>,
    playback: TimeBasedPlayback,
}

impl BlendSpace1DFunction {
    pub fn builder(
        position_fn: impl Fn(&EvaluationState<'_>) -> f32 + Send + Sync + 'static,
    ) -> BlendSpace1DBuilder {
        BlendSpace1DBuilder {
            entries: Vec::new(),
            position_fn: evaluation_fn(position_fn),
            playback: TimeBasedPlayback::new(),
        }
    }

    /// Blend space positioned by the value of a float driver.
    pub fn builder_from_driver<D>(key: DriverKey<D>) -> BlendSpace1DBuilder
    where
        D: Driver<Value = f32>,
    {
        Self::builder(move |state| state.driver_value(&key))
    }

    fn neighbours(&self, position: f32) -> Option<Neighbours<'_>> {
        let below = self.entries.partition_point(|entry| entry.position <= position);
        let above = self.entries.partition_point(|entry| entry.position < position);
        let floor = below.checked_sub(1).and_then(|index| self.entries.get(index));
        let ceiling = self.entries.get(above);

        let (floor, ceiling) = match (floor, ceiling) {
            (Some(floor), Some(ceiling)) => (floor, ceiling),
            (Some(only), None) | (None, Some(only)) => (only, only),
            (None, None) => return None,
        };
        let span = ceiling.position - floor.position;
        let fraction = if span > 0. {
            (position - floor.position) / span
        } else {
            0.
        };
        Some(Neighbours {
            floor,
            ceiling,
            fraction,
        })
    }

    fn play_rate_at(&self, position: f32) -> f32 {
        self.neighbours(position)
            .map(|n| n.floor.play_rate + (n.ceiling.play_rate - n.floor.play_rate) * n.fraction)
            .unwrap_or(1.)
    }
}

impl PoseFunction for BlendSpace1DFunction {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        let position = (self.position_fn)(state);
        self.position.push_current_to_previous();
        self.position.set_value(position);

        let rate_scale = self.play_rate_at(position);
        self.playback.tick_scaled(state, rate_scale);
        Ok(())
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        let position = self.position.value_interpolated(ctx.partial_tick);
        let time = self.playback.elapsed_interpolated(ctx.partial_tick);
        let neighbours = self
            .neighbours(position)
            .ok_or(AnimationError::EmptyBlendSpace)?;

        let floor_pose =
            LocalSpacePose::from_sequence(ctx.skeleton.clone(), &neighbours.floor.sequence, time, true);
        if neighbours.floor.position == neighbours.ceiling.position {
            return Ok(floor_pose);
        }
        let ceiling_pose =
            LocalSpacePose::from_sequence(ctx.skeleton.clone(), &neighbours.ceiling.sequence, time, true);
        Ok(floor_pose.interpolated(&ceiling_pose, neighbours.fraction))
    }
}

pub struct BlendSpace1DBuilder {
    entries: Vec<BlendSpaceEntry>,
    position_fn: EvaluationFn<f32>,
    playback: TimeBasedPlayback,
}

impl BlendSpace1DBuilder {
    /// Places `sequence` at `position`, played at `play_rate` when the blend position is
    /// exactly there. An entry at an existing position replaces it.
    pub fn add_entry(mut self, position: f32, sequence: Arc<AnimationSequence>, play_rate: f32) -> Self {
        let entry = BlendSpaceEntry {
            position,
            sequence,
            play_rate,
        };
        match self
            .entries
            .binary_search_by(|entry| entry.position.total_cmp(&position))
        {
            Ok(index) => {
                warn!("Blend space entry at {position} replaced");
                self.entries[index] = entry;
            }
            Err(index) => self.entries.insert(index, entry),
        }
        self
    }

    /// Global play rate, multiplied with the rate interpolated from the table.
    pub fn with_play_rate_fn(
        mut self,
        play_rate: impl Fn(&EvaluationState<'_>) -> f32 + Send + Sync + 'static,
    ) -> Self {
        self.playback = self.playback.with_play_rate_fn(play_rate);
        self
    }

    pub fn with_is_playing_fn(
        mut self,
        is_playing: impl Fn(&EvaluationState<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.playback = self.playback.with_is_playing_fn(is_playing);
        self
    }

    pub fn with_reset_offset(mut self, offset: TimeSpan) -> Self {
        self.playback = self.playback.with_reset_offset(offset);
        self
    }

    pub fn build(self) -> AnimationResult<BlendSpace1DFunction> {
        if self.entries.is_empty() {
            return Err(AnimationError::EmptyBlendSpace);
        }
        Ok(BlendSpace1DFunction {
            entries: self.entries,
            position_fn: self.position_fn,
            position: VariableDriver::interpolated(0.),
            playback: self.playback,
        })
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec3;

    use super::*;
    use crate::test_support::{Harness, slide};

    const SPEED: DriverKey<VariableDriver<f32>> =
        DriverKey::new("speed", || VariableDriver::interpolated(0.));

    fn walk() -> Arc<AnimationSequence> {
        slide(20., "body", Vec3::ZERO, Vec3::X * 20.)
    }

    fn run() -> Arc<AnimationSequence> {
        slide(20., "body", Vec3::ZERO, Vec3::Y * 20.)
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(
            BlendSpace1DFunction::builder(|_| 0.).build(),
            Err(AnimationError::EmptyBlendSpace)
        ));
    }

    #[test]
    fn quarter_position_blends_a_quarter_of_the_way() {
        let mut harness = Harness::new();
        let (walk, run) = (walk(), run());
        let mut blend_space = BlendSpace1DFunction::builder(|_| 0.25)
            .add_entry(0., walk.clone(), 1.)
            .add_entry(1., run.clone(), 1.)
            .build()
            .unwrap();
        for _ in 0..4 {
            harness.tick(&mut blend_space).unwrap();
        }

        let pose = harness.compute(&blend_space, 1.).unwrap();
        let time = TimeSpan::from_ticks(4.);
        let a = LocalSpacePose::from_sequence(harness.skeleton.clone(), &walk, time, true);
        let b = LocalSpacePose::from_sequence(harness.skeleton.clone(), &run, time, true);
        assert!(pose.abs_diff_eq(&a.interpolated(&b, 0.25), 1e-4));
    }

    #[test]
    fn play_rate_follows_position() {
        let mut harness = Harness::new();
        let mut blend_space = BlendSpace1DFunction::builder_from_driver(SPEED)
            .add_entry(0., walk(), 1.)
            .add_entry(2., run(), 3.)
            .build()
            .unwrap();

        harness.drivers.driver_mut(&SPEED).set_value(1.);
        harness.tick(&mut blend_space).unwrap();
        assert_eq!(blend_space.playback.current_elapsed().in_ticks(), 2.);

        harness.drivers.driver_mut(&SPEED).set_value(5.);
        harness.tick(&mut blend_space).unwrap();
        assert_eq!(blend_space.playback.current_elapsed().in_ticks(), 5.);

        harness.drivers.driver_mut(&SPEED).set_value(-1.);
        harness.tick(&mut blend_space).unwrap();
        assert_eq!(blend_space.playback.current_elapsed().in_ticks(), 6.);
    }

    #[test]
    fn position_on_an_entry_samples_that_clip_alone() {
        let mut harness = Harness::new();
        let run = run();
        let mut blend_space = BlendSpace1DFunction::builder(|_| 1.)
            .add_entry(0., walk(), 1.)
            .add_entry(1., run.clone(), 1.)
            .build()
            .unwrap();
        harness.tick(&mut blend_space).unwrap();

        let pose = harness.compute(&blend_space, 1.).unwrap();
        let expected =
            LocalSpacePose::from_sequence(harness.skeleton.clone(), &run, TimeSpan::from_ticks(1.), true);
        assert!(pose.abs_diff_eq(&expected, 1e-5));
    }
}
