use std::sync::Arc;

use pose_graph_core::{
    animation_clip::AnimationSequence,
    context::{EvaluationState, InterpolationContext},
    errors::AnimationResult,
    pose::LocalSpacePose,
    pose_function::{AnimationPlayer, PoseFunction, TimeBasedPlayback, TimeMarkerBindings},
    time::TimeSpan,
};

/// Plays a clip back over time, either looping or holding the last frame.
#[derive(Clone, Debug)]
pub struct SequencePlayerFunction {
    sequence: Arc<AnimationSequence>,
    looping: bool,
    playback: TimeBasedPlayback,
    time_marker_bindings: TimeMarkerBindings,
}

impl SequencePlayerFunction {
    pub fn builder(sequence: Arc<AnimationSequence>) -> SequencePlayerBuilder {
        SequencePlayerBuilder {
            node: Self {
                sequence,
                looping: false,
                playback: TimeBasedPlayback::new(),
                time_marker_bindings: TimeMarkerBindings::default(),
            },
        }
    }

    pub fn sequence(&self) -> &Arc<AnimationSequence> {
        &self.sequence
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Playhead position within the clip as of the current tick.
    pub fn current_clip_time(&self) -> TimeSpan {
        TimeSpan::from_ticks(
            self.sequence
                .clip_time(self.playback.current_elapsed(), self.looping),
        )
    }

    fn remaining_at(&self, elapsed: TimeSpan) -> TimeSpan {
        let clip_time = self.sequence.clip_time(elapsed, self.looping);
        TimeSpan::from_ticks(self.sequence.length().in_ticks() - clip_time)
    }
}

impl PoseFunction for SequencePlayerFunction {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        self.playback.tick(state);

        if !self.time_marker_bindings.is_empty() {
            let markers = self.sequence.markers_in_range(
                self.playback.previous_elapsed(),
                self.playback.current_elapsed(),
                self.looping,
            );
            self.time_marker_bindings.fire(markers, state);
        }
        Ok(())
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        Ok(LocalSpacePose::from_sequence(
            ctx.skeleton.clone(),
            &self.sequence,
            self.playback.elapsed_interpolated(ctx.partial_tick),
            self.looping,
        ))
    }

    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        Some(self)
    }
}

impl AnimationPlayer for SequencePlayerFunction {
    fn remaining_time(&self) -> (TimeSpan, TimeSpan) {
        (
            self.remaining_at(self.playback.previous_elapsed()),
            self.remaining_at(self.playback.current_elapsed()),
        )
    }

    fn animation_length(&self) -> TimeSpan {
        self.sequence.length()
    }
}

pub struct SequencePlayerBuilder {
    node: SequencePlayerFunction,
}

impl SequencePlayerBuilder {
    /// Wraps around at the end of the clip instead of holding the last frame. The whole clip
    /// is looped; the reset offset only moves where playback starts.
    pub fn looping(mut self, looping: bool) -> Self {
        self.node.looping = looping;
        self
    }

    pub fn with_play_rate(mut self, play_rate: f32) -> Self {
        self.node.playback = self.node.playback.with_play_rate(play_rate);
        self
    }

    pub fn with_play_rate_fn(
        mut self,
        play_rate: impl Fn(&EvaluationState<'_>) -> f32 + Send + Sync + 'static,
    ) -> Self {
        self.node.playback = self.node.playback.with_play_rate_fn(play_rate);
        self
    }

    pub fn with_is_playing_fn(
        mut self,
        is_playing: impl Fn(&EvaluationState<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.node.playback = self.node.playback.with_is_playing_fn(is_playing);
        self
    }

    pub fn with_reset_offset(mut self, offset: TimeSpan) -> Self {
        self.node.playback = self.node.playback.with_reset_offset(offset);
        self
    }

    /// Runs `callback` every time playback passes a marker named `marker`. Callbacks bound to
    /// the same marker run in the order they were bound.
    pub fn bind_to_time_marker(
        mut self,
        marker: impl Into<String>,
        callback: impl Fn(&mut EvaluationState<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.node.time_marker_bindings.bind(marker, callback);
        self
    }

    pub fn build(self) -> SequencePlayerFunction {
        self.node
    }
}
