use std::{fmt::Debug, sync::Arc};

use crate::{
    animation_clip::AnimationSequence,
    context::EvaluationState,
    driver::DriverContainer,
    pose_function::TimeMarkerBindings,
    time::{TimeSpan, Transition},
};

pub type MontagePlayRateFn = Arc<dyn Fn(&DriverContainer) -> f32 + Send + Sync>;

fn unit_play_rate(_: &DriverContainer) -> f32 {
    1.
}

/// Template for a triggerable one-shot clip layered onto one or more slots.
#[derive(Clone)]
pub struct MontageConfiguration {
    pub id: String,
    pub slots: Vec<String>,
    pub sequence: Arc<AnimationSequence>,
    /// Evaluated once when the montage starts; the rate stays fixed for the whole playback.
    pub play_rate: MontagePlayRateFn,
    pub time_marker_bindings: TimeMarkerBindings,
    pub transition_in: Transition,
    pub transition_out: Transition,
    pub start_offset: TimeSpan,
    /// At `1` the exit transition ends with the clip, at `0` it starts when the clip ends.
    pub transition_out_crossfade: f32,
    /// Minimum time between two instances of this montage.
    pub cooldown: TimeSpan,
    /// Reference clip an additive montage is layered onto. `None` for regular montages.
    pub additive_base: Option<Arc<AnimationSequence>>,
}

impl MontageConfiguration {
    pub fn builder(id: impl Into<String>, sequence: Arc<AnimationSequence>) -> MontageConfigurationBuilder {
        MontageConfigurationBuilder {
            config: MontageConfiguration {
                id: id.into(),
                slots: Vec::new(),
                sequence,
                play_rate: Arc::new(unit_play_rate),
                time_marker_bindings: TimeMarkerBindings::default(),
                transition_in: Transition::SINGLE_TICK,
                transition_out: Transition::SINGLE_TICK,
                start_offset: TimeSpan::ZERO,
                transition_out_crossfade: 1.,
                cooldown: TimeSpan::ZERO,
                additive_base: None,
            },
        }
    }

    pub fn is_additive(&self) -> bool {
        self.additive_base.is_some()
    }

    pub fn plays_in_slot(&self, slot: &str) -> bool {
        self.slots.iter().any(|s| s == slot)
    }
}

impl Debug for MontageConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MontageConfiguration")
            .field("id", &self.id)
            .field("slots", &self.slots)
            .field("transition_in", &self.transition_in)
            .field("transition_out", &self.transition_out)
            .field("start_offset", &self.start_offset)
            .field("cooldown", &self.cooldown)
            .field("additive", &self.is_additive())
            .finish()
    }
}

pub struct MontageConfigurationBuilder {
    config: MontageConfiguration,
}

impl MontageConfigurationBuilder {
    pub fn plays_in_slot(mut self, slot: impl Into<String>) -> Self {
        self.config.slots.push(slot.into());
        self
    }

    pub fn plays_in_slots<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.slots.extend(slots.into_iter().map(Into::into));
        self
    }

    pub fn with_play_rate(self, play_rate: f32) -> Self {
        self.with_play_rate_fn(move |_| play_rate)
    }

    pub fn with_play_rate_fn(
        mut self,
        play_rate: impl Fn(&DriverContainer) -> f32 + Send + Sync + 'static,
    ) -> Self {
        self.config.play_rate = Arc::new(play_rate);
        self
    }

    /// Fires `callback` whenever playback passes a marker named `marker`. Callbacks bound to
    /// the same marker run in binding order.
    pub fn bind_to_time_marker(
        mut self,
        marker: impl Into<String>,
        callback: impl Fn(&mut EvaluationState<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.config.time_marker_bindings.bind(marker, callback);
        self
    }

    pub fn with_transition_in(mut self, transition: Transition) -> Self {
        self.config.transition_in = transition;
        self
    }

    pub fn with_transition_out(mut self, transition: Transition) -> Self {
        self.config.transition_out = transition;
        self
    }

    pub fn with_start_offset(mut self, offset: TimeSpan) -> Self {
        self.config.start_offset = offset;
        self
    }

    pub fn with_transition_out_crossfade(mut self, crossfade: f32) -> Self {
        self.config.transition_out_crossfade = crossfade.clamp(0., 1.);
        self
    }

    pub fn with_cooldown(mut self, cooldown: TimeSpan) -> Self {
        self.config.cooldown = cooldown;
        self
    }

    /// Plays the clip as a delta from its first frame, layered onto `base`.
    pub fn additive_onto(mut self, base: Arc<AnimationSequence>) -> Self {
        self.config.additive_base = Some(base);
        self
    }

    pub fn build(self) -> MontageConfiguration {
        self.config
    }
}
