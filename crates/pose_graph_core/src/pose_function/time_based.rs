use std::{fmt::Debug, sync::Arc};

use indexmap::IndexMap;

use super::{EvaluationFn, evaluation_fn};
use crate::{
    context::EvaluationState,
    driver::{Driver, VariableDriver},
    time::TimeSpan,
};

/// Playhead shared by every node that advances through time.
///
/// Each tick the play state and rate are re-evaluated, then the elapsed time advances by
/// `play_rate` ticks. A reset-marked evaluation state snaps the playhead back to the reset
/// offset for both the previous and current tick, so nothing blends across the reset.
#[derive(Clone)]
pub struct TimeBasedPlayback {
    is_playing_fn: EvaluationFn<bool>,
    play_rate_fn: EvaluationFn<f32>,
    reset_offset: TimeSpan,
    ticks_elapsed: VariableDriver<f32>,
    is_playing: bool,
    play_rate: f32,
}

impl Default for TimeBasedPlayback {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeBasedPlayback {
    pub fn new() -> Self {
        Self {
            is_playing_fn: evaluation_fn(|_| true),
            play_rate_fn: evaluation_fn(|_| 1.),
            reset_offset: TimeSpan::ZERO,
            ticks_elapsed: VariableDriver::interpolated(0.),
            is_playing: true,
            play_rate: 1.,
        }
    }

    pub fn with_play_rate(self, play_rate: f32) -> Self {
        self.with_play_rate_fn(move |_| play_rate)
    }

    pub fn with_play_rate_fn(
        mut self,
        play_rate: impl Fn(&EvaluationState<'_>) -> f32 + Send + Sync + 'static,
    ) -> Self {
        self.play_rate_fn = evaluation_fn(play_rate);
        self
    }

    pub fn with_is_playing_fn(
        mut self,
        is_playing: impl Fn(&EvaluationState<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_playing_fn = evaluation_fn(is_playing);
        self
    }

    /// Where the playhead lands after a reset. The playhead also starts there.
    pub fn with_reset_offset(mut self, offset: TimeSpan) -> Self {
        self.reset_offset = offset;
        self.ticks_elapsed = VariableDriver::interpolated(offset.in_ticks());
        self
    }

    pub fn tick(&mut self, state: &EvaluationState) {
        self.tick_scaled(state, 1.);
    }

    /// Like [`Self::tick`], with the evaluated play rate multiplied by `rate_scale`.
    pub fn tick_scaled(&mut self, state: &EvaluationState, rate_scale: f32) {
        self.is_playing = (self.is_playing_fn)(state);
        self.play_rate = if self.is_playing {
            (self.play_rate_fn)(state) * rate_scale
        } else {
            0.
        };

        self.ticks_elapsed.push_current_to_previous();
        if state.is_resetting() {
            self.reset_time();
        } else if self.is_playing {
            let play_rate = self.play_rate;
            self.ticks_elapsed.modify_value(|elapsed| elapsed + play_rate);
        }
    }

    pub fn reset_time(&mut self) {
        self.ticks_elapsed.hard_reset();
    }

    pub fn elapsed_interpolated(&self, partial_tick: f32) -> TimeSpan {
        TimeSpan::from_ticks(self.ticks_elapsed.value_interpolated(partial_tick))
    }

    pub fn previous_elapsed(&self) -> TimeSpan {
        TimeSpan::from_ticks(*self.ticks_elapsed.previous())
    }

    pub fn current_elapsed(&self) -> TimeSpan {
        TimeSpan::from_ticks(*self.ticks_elapsed.current())
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Rate applied on the last tick; zero while paused.
    pub fn play_rate(&self) -> f32 {
        self.play_rate
    }
}

impl Debug for TimeBasedPlayback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeBasedPlayback")
            .field("ticks_elapsed", &self.ticks_elapsed)
            .field("is_playing", &self.is_playing)
            .field("play_rate", &self.play_rate)
            .finish()
    }
}

pub type TimeMarkerCallback = Arc<dyn Fn(&mut EvaluationState<'_>) + Send + Sync>;

/// Callbacks bound to named time markers, fired in binding order.
#[derive(Clone, Default)]
pub struct TimeMarkerBindings {
    bindings: IndexMap<String, Vec<TimeMarkerCallback>>,
}

impl TimeMarkerBindings {
    pub fn bind(
        &mut self,
        marker: impl Into<String>,
        callback: impl Fn(&mut EvaluationState<'_>) + Send + Sync + 'static,
    ) {
        self.bindings
            .entry(marker.into())
            .or_default()
            .push(Arc::new(callback));
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Callbacks bound to any of `markers`, in marker order, then binding order.
    pub fn callbacks_for<'a, 'm>(
        &'a self,
        markers: impl IntoIterator<Item = &'m str>,
    ) -> impl Iterator<Item = &'a TimeMarkerCallback> {
        markers
            .into_iter()
            .filter_map(|marker| self.bindings.get(marker))
            .flatten()
    }

    pub fn fire<'m>(&self, markers: impl IntoIterator<Item = &'m str>, state: &mut EvaluationState) {
        for callback in self.callbacks_for(markers) {
            callback(state);
        }
    }
}

impl Debug for TimeMarkerBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.bindings.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        driver::{DriverContainer, DriverKey},
        montage::MontageManager,
    };

    const HITS: DriverKey<VariableDriver<f32>> =
        DriverKey::new("hits", || VariableDriver::interpolated(0.));

    #[test]
    fn playhead_advances_by_play_rate() {
        let mut drivers = DriverContainer::new();
        let mut montages = MontageManager::new();
        let state = EvaluationState::new(&mut drivers, &mut montages, 1);

        let mut playback = TimeBasedPlayback::new().with_play_rate(2.);
        playback.tick(&state);
        playback.tick(&state);
        assert_eq!(playback.previous_elapsed().in_ticks(), 2.);
        assert_eq!(playback.current_elapsed().in_ticks(), 4.);
        assert_eq!(playback.elapsed_interpolated(0.5).in_ticks(), 3.);
    }

    #[test]
    fn paused_playhead_holds() {
        let mut drivers = DriverContainer::new();
        let mut montages = MontageManager::new();
        let state = EvaluationState::new(&mut drivers, &mut montages, 1);

        let mut playback = TimeBasedPlayback::new().with_is_playing_fn(|_| false);
        playback.tick(&state);
        assert_eq!(playback.current_elapsed(), TimeSpan::ZERO);
        assert_eq!(playback.play_rate(), 0.);
    }

    #[test]
    fn reset_snaps_to_offset_without_blending() {
        let mut drivers = DriverContainer::new();
        let mut montages = MontageManager::new();
        let mut state = EvaluationState::new(&mut drivers, &mut montages, 1);

        let mut playback = TimeBasedPlayback::new().with_reset_offset(TimeSpan::from_ticks(3.));
        for _ in 0..4 {
            playback.tick(&state);
        }
        assert_eq!(playback.current_elapsed().in_ticks(), 7.);

        playback.tick(&state.marked_for_reset());
        assert_eq!(playback.previous_elapsed().in_ticks(), 3.);
        assert_eq!(playback.current_elapsed().in_ticks(), 3.);
    }

    #[test]
    fn marker_callbacks_fire_in_binding_order() {
        let mut drivers = DriverContainer::new();
        let mut montages = MontageManager::new();
        let mut state = EvaluationState::new(&mut drivers, &mut montages, 1);

        let mut bindings = TimeMarkerBindings::default();
        bindings.bind("step", |state| state.driver_mut(&HITS).modify_value(|v| v * 10. + 1.));
        bindings.bind("step", |state| state.driver_mut(&HITS).modify_value(|v| v * 10. + 2.));
        bindings.bind("other", |state| state.driver_mut(&HITS).set_value(-1.));

        bindings.fire(["step", "unbound"], &mut state);
        assert_eq!(state.driver_value(&HITS), 12.);
    }
}
