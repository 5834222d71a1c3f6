//! One-shot overlay clips ("montages") triggered by gameplay code and layered onto named
//! slots of the graph.

mod configuration;
mod instance;

pub use configuration::*;

use std::sync::Arc;

use bevy_log::debug;
use instance::MontageInstance;

use crate::{
    driver::DriverContainer, pose::LocalSpacePose, pose_function::TimeMarkerCallback,
    time::Transition,
};

/// Ordered stack of playing montages; later entries layer on top of earlier ones.
#[derive(Debug, Default)]
pub struct MontageManager {
    stack: Vec<MontageInstance>,
}

impl MontageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every montage, drops those that have fully faded out, and returns the
    /// callbacks of the time markers passed on this tick, to be run by the caller.
    pub fn tick(&mut self) -> Vec<TimeMarkerCallback> {
        let callbacks = self
            .stack
            .iter_mut()
            .flat_map(MontageInstance::tick)
            .collect();
        self.stack.retain(|instance| {
            let keep = !instance.has_faded_out();
            if !keep {
                debug!("Montage {} finished", instance.config.id);
            }
            keep
        });
        callbacks
    }

    /// Starts a new instance of `config`, unless an instance with the same id is still within
    /// its cooldown. Returns whether the montage started.
    pub fn play_montage(
        &mut self,
        config: impl Into<Arc<MontageConfiguration>>,
        drivers: &DriverContainer,
    ) -> bool {
        let config = config.into();
        if self
            .stack
            .iter()
            .any(|instance| instance.config.id == config.id && instance.is_in_cooldown())
        {
            debug!("Montage {} still cooling down, ignoring", config.id);
            return false;
        }
        debug!("Playing montage {} in slots {:?}", config.id, config.slots);
        self.stack.push(MontageInstance::new(config, drivers));
        true
    }

    /// Fades out every montage playing in `slot` over `transition`.
    pub fn interrupt_montages_in_slot(&mut self, slot: &str, transition: Transition) {
        for instance in self
            .stack
            .iter_mut()
            .filter(|instance| instance.config.plays_in_slot(slot))
        {
            instance.interrupt(transition.clone());
        }
    }

    pub fn is_montage_playing(&self, id: &str) -> bool {
        self.stack.iter().any(|instance| instance.config.id == id)
    }

    pub fn is_anything_playing_in_slot(&self, slot: &str) -> bool {
        self.stack
            .iter()
            .any(|instance| instance.config.plays_in_slot(slot))
    }

    /// Whether some montage in `slot` has been at full weight for the last two ticks, so the
    /// slot's input pose cannot show through.
    pub fn is_slot_fully_overridden(&self, slot: &str) -> bool {
        self.stack
            .iter()
            .any(|instance| instance.config.plays_in_slot(slot) && instance.is_fully_overriding())
    }

    /// Layers every montage playing in `slot` onto `base`, in stack order.
    pub fn layered_slot_pose(&self, base: LocalSpacePose, slot: &str, partial_tick: f32) -> LocalSpacePose {
        let skeleton = base.skeleton().clone();
        self.stack
            .iter()
            .filter(|instance| instance.config.plays_in_slot(slot))
            .fold(base, |pose, instance| {
                pose.interpolated(&instance.pose(&skeleton, partial_tick), instance.weight(partial_tick))
            })
    }

    /// Eased weight of the topmost montage with the given id.
    pub fn montage_weight(&self, id: &str, partial_tick: f32) -> Option<f32> {
        self.stack
            .iter()
            .rev()
            .find(|instance| instance.config.id == id)
            .map(|instance| instance.weight(partial_tick))
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use bevy_math::Vec3;

    use super::*;
    use crate::{
        animation_clip::AnimationSequence, context::EvaluationState, pose::LocalSpacePose,
        skeleton::tests::test_skeleton, time::TimeSpan,
    };

    fn wave_clip() -> Arc<AnimationSequence> {
        Arc::new(
            AnimationSequence::builder(TimeSpan::from_ticks(20.))
                .translation_keyframe("arm_R", TimeSpan::ZERO, Vec3::ZERO)
                .translation_keyframe("arm_R", TimeSpan::from_ticks(20.), Vec3::new(0., 20., 0.))
                .time_marker("peak", TimeSpan::from_ticks(10.))
                .build(),
        )
    }

    fn wave() -> MontageConfiguration {
        MontageConfiguration::builder("wave", wave_clip())
            .plays_in_slot("upper_body")
            .with_transition_in(Transition::new(TimeSpan::from_ticks(4.)))
            .with_transition_out(Transition::new(TimeSpan::from_ticks(4.)))
            .with_cooldown(TimeSpan::from_ticks(5.))
            .build()
    }

    fn tick_n(manager: &mut MontageManager, n: usize) {
        for _ in 0..n {
            manager.tick();
        }
    }

    #[test]
    fn cooldown_drops_repeated_requests() {
        let drivers = DriverContainer::new();
        let mut manager = MontageManager::new();
        let config = Arc::new(wave());

        assert!(manager.play_montage(config.clone(), &drivers));
        assert!(!manager.play_montage(config.clone(), &drivers));
        assert_eq!(manager.len(), 1);

        tick_n(&mut manager, 5);
        assert!(manager.play_montage(config, &drivers));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn weight_follows_envelope_then_instance_is_removed() {
        let drivers = DriverContainer::new();
        let mut manager = MontageManager::new();
        manager.play_montage(wave(), &drivers);

        tick_n(&mut manager, 2);
        assert!((manager.montage_weight("wave", 1.).unwrap() - 0.5).abs() < 1e-5);
        assert!((manager.montage_weight("wave", 0.).unwrap() - 0.25).abs() < 1e-5);

        tick_n(&mut manager, 8);
        assert_eq!(manager.montage_weight("wave", 1.), Some(1.));
        assert!(manager.is_slot_fully_overridden("upper_body"));
        assert!(!manager.is_slot_fully_overridden("legs"));

        tick_n(&mut manager, 8);
        assert!((manager.montage_weight("wave", 1.).unwrap() - 0.5).abs() < 1e-5);
        assert!(!manager.is_slot_fully_overridden("upper_body"));

        tick_n(&mut manager, 2);
        assert!(manager.is_montage_playing("wave"));
        tick_n(&mut manager, 1);
        assert!(!manager.is_montage_playing("wave"));
        assert!(manager.is_empty());
    }

    #[test]
    fn interrupt_fades_out_and_removes() {
        let drivers = DriverContainer::new();
        let mut manager = MontageManager::new();
        manager.play_montage(wave(), &drivers);
        tick_n(&mut manager, 6);

        manager.interrupt_montages_in_slot("upper_body", Transition::new(TimeSpan::from_ticks(2.)));
        tick_n(&mut manager, 1);
        assert!((manager.montage_weight("wave", 1.).unwrap() - 0.5).abs() < 1e-5);
        tick_n(&mut manager, 1);
        assert!(manager.is_anything_playing_in_slot("upper_body"));
        tick_n(&mut manager, 1);
        assert!(!manager.is_anything_playing_in_slot("upper_body"));
    }

    #[test]
    fn layered_pose_blends_by_weight() {
        let skeleton = Arc::new(test_skeleton());
        let drivers = DriverContainer::new();
        let mut manager = MontageManager::new();
        manager.play_montage(wave(), &drivers);
        tick_n(&mut manager, 2);

        let base = LocalSpacePose::new(skeleton.clone());
        let untouched = manager.layered_slot_pose(base.clone(), "legs", 1.);
        assert!(untouched.abs_diff_eq(&base, 0.));

        let layered = manager.layered_slot_pose(base, "upper_body", 1.);
        let arm = layered.channel("arm_R");
        assert!((arm.translation.y - 1.).abs() < 1e-4);
    }

    #[test]
    fn additive_montage_starts_from_its_base() {
        let skeleton = Arc::new(test_skeleton());
        let base_clip = Arc::new(
            AnimationSequence::builder(TimeSpan::from_ticks(1.))
                .translation_keyframe("arm_R", TimeSpan::ZERO, Vec3::new(1., 0., 0.))
                .build(),
        );
        let config = MontageConfiguration::builder("nod", wave_clip())
            .plays_in_slot("upper_body")
            .additive_onto(base_clip)
            .build();
        let drivers = DriverContainer::new();
        let mut manager = MontageManager::new();
        manager.play_montage(config, &drivers);
        tick_n(&mut manager, 5);
        assert!(!manager.is_slot_fully_overridden("upper_body"));

        let pose = manager.layered_slot_pose(LocalSpacePose::new(skeleton), "upper_body", 0.);
        let arm = pose.channel("arm_R");
        assert!(arm.translation.abs_diff_eq(Vec3::new(1., 4., 0.), 1e-4));
    }

    #[test]
    fn marker_callbacks_are_returned_once() {
        const HITS: crate::driver::DriverKey<crate::driver::VariableDriver<f32>> =
            crate::driver::DriverKey::new("hits", || crate::driver::VariableDriver::interpolated(0.));

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let config = MontageConfiguration::builder("wave", wave_clip())
            .plays_in_slot("upper_body")
            .bind_to_time_marker("peak", move |state| {
                counter.fetch_add(1, Ordering::SeqCst);
                state.driver_mut(&HITS).modify_value(|hits| hits + 1.);
            })
            .build();

        let mut drivers = DriverContainer::new();
        let mut manager = MontageManager::new();
        manager.play_montage(config, &drivers);

        let mut callbacks = Vec::new();
        for _ in 0..15 {
            callbacks.extend(manager.tick());
        }
        assert_eq!(callbacks.len(), 1);

        let mut other = MontageManager::new();
        let mut state = EvaluationState::new(&mut drivers, &mut other, 15);
        for callback in &callbacks {
            callback(&mut state);
        }
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(state.driver_value(&HITS), 1.);
    }
}
