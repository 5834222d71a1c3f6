use std::{fmt::Debug, sync::{Arc, OnceLock}};

use super::MontageConfiguration;
use crate::{
    driver::{Driver, DriverContainer, VariableDriver},
    pose::LocalSpacePose,
    pose_function::TimeMarkerCallback,
    skeleton::JointSkeleton,
    time::{TimeSpan, Transition},
};

const MIN_TRANSITION_TICKS: f32 = 0.01;

#[derive(Clone, Debug)]
struct Interrupt {
    elapsed_at: f32,
    transition: Transition,
}

/// One playing montage.
pub(super) struct MontageInstance {
    pub(super) config: Arc<MontageConfiguration>,
    play_rate: f32,
    ticks_elapsed: VariableDriver<f32>,
    ticks_since_start: f32,
    /// Un-eased envelope, used for removal and override checks.
    linear_weight: VariableDriver<f32>,
    interrupt: Option<Interrupt>,
    additive_base: OnceLock<LocalSpacePose>,
    additive_reference: OnceLock<LocalSpacePose>,
}

impl MontageInstance {
    pub(super) fn new(config: Arc<MontageConfiguration>, drivers: &DriverContainer) -> Self {
        let play_rate = (config.play_rate)(drivers);
        let start = config.start_offset.in_ticks();
        Self {
            config,
            play_rate,
            ticks_elapsed: VariableDriver::interpolated(start),
            ticks_since_start: 0.,
            linear_weight: VariableDriver::interpolated(0.),
            interrupt: None,
            additive_base: OnceLock::new(),
            additive_reference: OnceLock::new(),
        }
    }

    /// Advances the playhead and returns the callbacks of the markers it passed.
    pub(super) fn tick(&mut self) -> Vec<TimeMarkerCallback> {
        self.ticks_elapsed.push_current_to_previous();
        self.linear_weight.push_current_to_previous();

        let play_rate = self.play_rate;
        self.ticks_elapsed.modify_value(|elapsed| elapsed + play_rate);
        self.ticks_since_start += 1.;
        let weight = self.weight_at(*self.ticks_elapsed.current(), false);
        self.linear_weight.set_value(weight);

        let previous = TimeSpan::from_ticks(*self.ticks_elapsed.previous());
        let current = TimeSpan::from_ticks(*self.ticks_elapsed.current());
        let markers = self.config.sequence.markers_in_range(previous, current, false);
        self.config
            .time_marker_bindings
            .callbacks_for(markers)
            .cloned()
            .collect()
    }

    pub(super) fn interrupt(&mut self, transition: Transition) {
        if self.interrupt.is_none() {
            self.interrupt = Some(Interrupt {
                elapsed_at: *self.ticks_elapsed.current(),
                transition,
            });
        }
    }

    pub(super) fn is_in_cooldown(&self) -> bool {
        self.ticks_since_start < self.config.cooldown.in_ticks()
    }

    pub(super) fn has_faded_out(&self) -> bool {
        self.ticks_since_start > 0.
            && *self.linear_weight.previous() <= 0.
            && *self.linear_weight.current() <= 0.
    }

    /// Full weight on both the previous and the current tick, hiding whatever is below.
    pub(super) fn is_fully_overriding(&self) -> bool {
        !self.config.is_additive()
            && *self.linear_weight.previous() >= 1.
            && *self.linear_weight.current() >= 1.
    }

    pub(super) fn weight(&self, partial_tick: f32) -> f32 {
        self.weight_at(self.ticks_elapsed.value_interpolated(partial_tick), true)
    }

    fn weight_at(&self, elapsed: f32, eased: bool) -> f32 {
        let config = &self.config;
        let length = config.sequence.length().in_ticks();
        let ease = |transition: &Transition, progress: f32| {
            let progress = progress.clamp(0., 1.);
            if eased {
                transition.apply_easing(progress)
            } else {
                progress
            }
        };

        let in_duration = config.transition_in.duration.in_ticks().max(MIN_TRANSITION_TICKS);
        let out_duration = config.transition_out.duration.in_ticks().max(MIN_TRANSITION_TICKS);
        let in_end = config.start_offset.in_ticks() + in_duration;
        let out_start = length - config.transition_out.duration.in_ticks() * config.transition_out_crossfade;

        let mut weight = 1.;
        if elapsed < in_end {
            let progress = (elapsed - config.start_offset.in_ticks()) / in_duration;
            weight = ease(&config.transition_in, progress);
        }
        if elapsed > out_start {
            let progress = (elapsed - out_start) / out_duration;
            weight = f32::min(weight, 1. - ease(&config.transition_out, progress));
        }
        if let Some(interrupt) = &self.interrupt {
            let duration = interrupt.transition.duration.in_ticks().max(MIN_TRANSITION_TICKS);
            let progress = (elapsed - interrupt.elapsed_at) / duration;
            weight *= 1. - ease(&interrupt.transition, progress);
        }
        weight.clamp(0., 1.)
    }

    pub(super) fn pose(&self, skeleton: &Arc<JointSkeleton>, partial_tick: f32) -> LocalSpacePose {
        let time = TimeSpan::from_ticks(self.ticks_elapsed.value_interpolated(partial_tick));
        let sampled = LocalSpacePose::from_sequence(skeleton.clone(), &self.config.sequence, time, false);
        let Some(base_sequence) = &self.config.additive_base else {
            return sampled;
        };

        let reference = self.additive_reference.get_or_init(|| {
            LocalSpacePose::from_sequence(
                skeleton.clone(),
                &self.config.sequence,
                self.config.start_offset,
                false,
            )
        });
        let base = self.additive_base.get_or_init(|| {
            LocalSpacePose::from_sequence(skeleton.clone(), base_sequence, TimeSpan::ZERO, false)
        });
        base.with_additive(&sampled.additive_relative_to(reference), 1.)
    }
}

impl Debug for MontageInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MontageInstance")
            .field("id", &self.config.id)
            .field("play_rate", &self.play_rate)
            .field("ticks_elapsed", &self.ticks_elapsed)
            .field("linear_weight", &self.linear_weight)
            .field("interrupt", &self.interrupt)
            .finish()
    }
}
