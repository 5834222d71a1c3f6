use std::sync::Arc;

use bevy_log::debug;
use pose_graph_core::{
    animation_clip::ClipStore,
    context::{EvaluationState, InterpolationContext},
    driver::{Driver, DriverContainer, DriverKey, VariableDriver},
    errors::AnimationResult,
    montage::{MontageConfiguration, MontageManager},
    pose::{LocalSpacePose, Pose},
    pose_function::{CachedPoseContainer, PoseFunction},
    skeleton::JointSkeleton,
    time::{TimeSpan, Transition},
};

use crate::animator::{JointAnimator, PoseCalculationFrequency};

/// Blends the poses of the last two ticks, or takes whichever one exists.
fn interpolate_tick_poses(
    previous: &Option<LocalSpacePose>,
    current: &Option<LocalSpacePose>,
    partial_tick: f32,
) -> Option<LocalSpacePose> {
    match (previous, current) {
        (Some(previous), Some(current)) => Some(previous.interpolated(current, partial_tick)),
        (None, current) => current.clone(),
        (previous, None) => previous.clone(),
    }
}

/// Everything one animated subject needs: its own instance of the graph, its drivers, its
/// montages and its cached poses.
///
/// The host drives it once per simulation tick with [`Self::pre_tick`],
/// [`Self::extract_animation_data`], [`Self::tick`] and [`Self::post_tick`] (or
/// [`Self::run_tick`], which does all four), and once per rendered frame with
/// [`Self::compute_pose`].
pub struct AnimationDataContainer {
    skeleton: Arc<JointSkeleton>,
    drivers: DriverContainer,
    montages: MontageManager,
    cached_poses: CachedPoseContainer,
    root: Box<dyn PoseFunction>,
    frequency: PoseCalculationFrequency,
    tick_poses: VariableDriver<Option<LocalSpacePose>>,
    current_tick: u64,
}

impl AnimationDataContainer {
    /// Builds a fresh graph from `animator`. Missing clips and malformed graphs fail here.
    pub fn new<A: JointAnimator>(animator: &A, clips: &dyn ClipStore) -> AnimationResult<Self> {
        let skeleton = Arc::new(animator.build_skeleton()?);
        let mut cached_poses = CachedPoseContainer::new();
        let root = animator
            .construct_pose_function(&skeleton, &mut cached_poses, clips)?
            .wrap_unique();
        debug!(
            "Created animation data container with {} joints and {} cached poses",
            skeleton.len(),
            cached_poses.len()
        );
        Ok(Self {
            skeleton,
            drivers: DriverContainer::new(),
            montages: MontageManager::new(),
            cached_poses,
            root,
            frequency: animator.pose_calculation_frequency(),
            tick_poses: VariableDriver::new(|| None, interpolate_tick_poses),
            current_tick: 0,
        })
    }

    pub fn skeleton(&self) -> &Arc<JointSkeleton> {
        &self.skeleton
    }

    pub fn drivers(&self) -> &DriverContainer {
        &self.drivers
    }

    pub fn drivers_mut(&mut self) -> &mut DriverContainer {
        &mut self.drivers
    }

    pub fn montages(&self) -> &MontageManager {
        &self.montages
    }

    pub fn montages_mut(&mut self) -> &mut MontageManager {
        &mut self.montages
    }

    pub fn pose_calculation_frequency(&self) -> PoseCalculationFrequency {
        self.frequency
    }

    /// Number of ticks run so far.
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn driver_value<D: Driver>(&self, key: &DriverKey<D>, partial_tick: f32) -> D::Value {
        self.drivers.driver_value(key, partial_tick)
    }

    pub fn driver_mut<D: Driver>(&mut self, key: &DriverKey<D>) -> &mut D {
        self.drivers.driver_mut(key)
    }

    /// See [`MontageManager::play_montage`]. The montage's play rate is read from the drivers
    /// as they are now.
    pub fn play_montage(&mut self, config: impl Into<Arc<MontageConfiguration>>) -> bool {
        self.montages.play_montage(config, &self.drivers)
    }

    pub fn interrupt_montages_in_slot(&mut self, slot: &str, transition: Transition) {
        self.montages.interrupt_montages_in_slot(slot, transition);
    }

    pub fn pre_tick(&mut self) {
        self.drivers.push_all_to_previous();
        self.tick_poses.push_current_to_previous();
    }

    pub fn extract_animation_data<A: JointAnimator>(&mut self, animator: &A, source: &A::Source) {
        animator.extract_animation_data(source, &mut self.drivers, &mut self.montages);
    }

    /// Advances drivers, then montages, then the graph.
    pub fn tick(&mut self) -> AnimationResult<()> {
        self.current_tick += 1;
        self.drivers.tick_all();

        for callback in self.montages.tick() {
            let mut state = EvaluationState::new(&mut self.drivers, &mut self.montages, self.current_tick);
            callback(&mut state);
        }

        let mut state = EvaluationState::new(&mut self.drivers, &mut self.montages, self.current_tick);
        self.root.tick(&mut state)?;

        if self.frequency == PoseCalculationFrequency::OncePerTick {
            let pose = self.evaluate_root(1.)?;
            self.tick_poses.set_value(Some(pose));
        }
        Ok(())
    }

    pub fn post_tick(&mut self) {
        self.drivers.post_tick_all();
    }

    /// One full simulation tick.
    pub fn run_tick<A: JointAnimator>(&mut self, animator: &A, source: &A::Source) -> AnimationResult<()> {
        self.pre_tick();
        self.extract_animation_data(animator, source);
        self.tick()?;
        self.post_tick();
        Ok(())
    }

    /// Pose for a frame rendered `partial_tick` of the way from the previous tick to the
    /// current one.
    ///
    /// In [`PoseCalculationFrequency::OncePerTick`] mode, this blends the last two tick poses
    /// and returns the skeleton's rest pose before the first tick.
    pub fn compute_pose(&mut self, partial_tick: f32) -> AnimationResult<LocalSpacePose> {
        match self.frequency {
            PoseCalculationFrequency::EveryFrame => self.evaluate_root(partial_tick),
            PoseCalculationFrequency::OncePerTick => Ok(self
                .tick_poses
                .value_interpolated(partial_tick)
                .unwrap_or_else(|| Pose::new(self.skeleton.clone()))),
        }
    }

    fn evaluate_root(&mut self, partial_tick: f32) -> AnimationResult<LocalSpacePose> {
        self.cached_poses.clear_caches_for_tick(self.current_tick);
        let ctx = InterpolationContext::new(
            &self.drivers,
            &self.montages,
            &self.skeleton,
            partial_tick,
            TimeSpan::from_ticks(self.current_tick.saturating_sub(1) as f32 + partial_tick),
        );
        self.root.compute(&ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use bevy_math::Vec3;
    use pose_graph_builtin_nodes::{
        blend_poses::BlendPosesFunction, montage_slot::MontageSlotFunction, mirror::MirrorFunction,
        sequence_player::SequencePlayerFunction,
    };
    use pose_graph_core::{
        animation_clip::{AnimationSequence, ClipId, InMemoryClipStore},
        driver::TriggerDriver,
        errors::AnimationError,
    };

    use super::*;

    const SPEED: DriverKey<VariableDriver<f32>> = DriverKey::new("speed", || VariableDriver::interpolated(1.));
    const MIRROR_WEIGHT: DriverKey<VariableDriver<f32>> =
        DriverKey::new("mirror_weight", || VariableDriver::interpolated(0.));
    const WAVE: DriverKey<TriggerDriver> = DriverKey::new("wave", TriggerDriver::new);

    struct Character {
        speed: f32,
        mirror_weight: f32,
        waving: bool,
    }

    impl Default for Character {
        fn default() -> Self {
            Self {
                speed: 1.,
                mirror_weight: 0.,
                waving: false,
            }
        }
    }

    struct CharacterAnimator {
        frequency: PoseCalculationFrequency,
        footsteps: Arc<AtomicUsize>,
    }

    impl CharacterAnimator {
        fn new(frequency: PoseCalculationFrequency) -> Self {
            Self {
                frequency,
                footsteps: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl JointAnimator for CharacterAnimator {
        type Source = Character;

        fn build_skeleton(&self) -> AnimationResult<JointSkeleton> {
            JointSkeleton::builder("root")
                .add_joint_under_root("body")
                .add_joint_under_parent("arm_L", "body")
                .add_joint_under_parent("arm_R", "body")
                .set_mirror_joint("arm_L", "arm_R")
                .build()
        }

        fn construct_pose_function(
            &self,
            _skeleton: &Arc<JointSkeleton>,
            cached_poses: &mut CachedPoseContainer,
            clips: &dyn ClipStore,
        ) -> AnimationResult<Box<dyn PoseFunction>> {
            let footsteps = self.footsteps.clone();
            let walk = SequencePlayerFunction::builder(clips.get_or_err(&"walk".into())?)
                .looping(true)
                .with_play_rate_fn(|state| state.driver_value(&SPEED))
                .bind_to_time_marker("footstep", move |_| {
                    footsteps.fetch_add(1, Ordering::SeqCst);
                })
                .build();
            cached_poses.register("locomotion", walk, false)?;
            let locomotion = cached_poses.get_or_err("locomotion")?;

            let blended = BlendPosesFunction::builder(locomotion.clone())
                .add_blend_input(MirrorFunction::new(locomotion), |state| {
                    state.driver_value(&MIRROR_WEIGHT)
                })
                .build();
            Ok(MontageSlotFunction::new(blended, "upper_body").into_boxed())
        }

        fn pose_calculation_frequency(&self) -> PoseCalculationFrequency {
            self.frequency
        }

        fn extract_animation_data(&self, source: &Character, drivers: &mut DriverContainer, _: &mut MontageManager) {
            drivers.driver_mut(&SPEED).set_value(source.speed);
            drivers.driver_mut(&MIRROR_WEIGHT).set_value(source.mirror_weight);
            if source.waving {
                drivers.driver_mut(&WAVE).trigger();
            }
        }
    }

    fn clips() -> InMemoryClipStore {
        InMemoryClipStore::new()
            .with_clip(
                "walk",
                AnimationSequence::builder(TimeSpan::from_ticks(20.))
                    .translation_keyframe("body", TimeSpan::ZERO, Vec3::ZERO)
                    .translation_keyframe("body", TimeSpan::from_ticks(20.), Vec3::X * 20.)
                    .translation_keyframe("arm_L", TimeSpan::ZERO, Vec3::Y)
                    .translation_keyframe("arm_L", TimeSpan::from_ticks(20.), Vec3::Y)
                    .time_marker("footstep", TimeSpan::from_ticks(3.))
                    .build(),
            )
            .with_clip(
                "wave",
                AnimationSequence::builder(TimeSpan::from_ticks(10.))
                    .translation_keyframe("arm_R", TimeSpan::ZERO, Vec3::Z * 5.)
                    .translation_keyframe("arm_R", TimeSpan::from_ticks(10.), Vec3::Z * 5.)
                    .build(),
            )
    }

    #[test]
    fn missing_clip_fails_construction() {
        let animator = CharacterAnimator::new(PoseCalculationFrequency::EveryFrame);
        let result = AnimationDataContainer::new(&animator, &InMemoryClipStore::new());
        assert!(matches!(result, Err(AnimationError::MissingClip(id)) if id == ClipId::from("walk")));
    }

    #[test]
    fn shared_cached_pose_is_ticked_once_per_tick() {
        let animator = CharacterAnimator::new(PoseCalculationFrequency::EveryFrame);
        let mut container = AnimationDataContainer::new(&animator, &clips()).unwrap();
        let character = Character {
            mirror_weight: 1.,
            ..Default::default()
        };

        for _ in 0..5 {
            container.run_tick(&animator, &character).unwrap();
        }
        assert_eq!(container.current_tick(), 5);

        // Both blend inputs read the same player; a double tick would put the body at -10.
        let pose = container.compute_pose(1.).unwrap();
        assert!(pose.channel("body").translation.abs_diff_eq(Vec3::X * -5., 1e-4));
        assert!(pose.channel("arm_R").translation.abs_diff_eq(Vec3::Y, 1e-4));
        assert_eq!(animator.footsteps.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drivers_written_by_extraction_steer_the_graph() {
        let animator = CharacterAnimator::new(PoseCalculationFrequency::EveryFrame);
        let mut container = AnimationDataContainer::new(&animator, &clips()).unwrap();
        let character = Character {
            speed: 2.,
            ..Default::default()
        };

        for _ in 0..3 {
            container.run_tick(&animator, &character).unwrap();
        }
        assert_eq!(container.driver_value(&SPEED, 0.5), 2.);
        let pose = container.compute_pose(1.).unwrap();
        assert!(pose.channel("body").translation.abs_diff_eq(Vec3::X * 6., 1e-4));
    }

    #[test]
    fn triggers_decay_after_post_tick() {
        let animator = CharacterAnimator::new(PoseCalculationFrequency::EveryFrame);
        let mut container = AnimationDataContainer::new(&animator, &clips()).unwrap();

        container.pre_tick();
        container.extract_animation_data(&animator, &Character {
            waving: true,
            ..Default::default()
        });
        container.tick().unwrap();
        assert!(container.driver_mut(&WAVE).is_triggered());
        container.post_tick();

        container.run_tick(&animator, &Character::default()).unwrap();
        assert!(!container.driver_mut(&WAVE).is_triggered());
    }

    #[test]
    fn montages_layer_into_their_slot() {
        let animator = CharacterAnimator::new(PoseCalculationFrequency::EveryFrame);
        let store = clips();
        let mut container = AnimationDataContainer::new(&animator, &store).unwrap();
        let wave = MontageConfiguration::builder("wave", store.get_or_err(&"wave".into()).unwrap())
            .plays_in_slot("upper_body")
            .build();
        assert!(container.play_montage(wave));
        assert!(container.montages().is_montage_playing("wave"));

        for _ in 0..3 {
            container.run_tick(&animator, &Character::default()).unwrap();
        }
        let pose = container.compute_pose(1.).unwrap();
        assert!(pose.channel("arm_R").translation.abs_diff_eq(Vec3::Z * 5., 1e-4));
    }

    #[test]
    fn once_per_tick_blends_tick_poses() {
        let animator = CharacterAnimator::new(PoseCalculationFrequency::OncePerTick);
        let mut container = AnimationDataContainer::new(&animator, &clips()).unwrap();

        let rest = container.compute_pose(0.5).unwrap();
        assert!(rest.channel("body").translation.abs_diff_eq(Vec3::ZERO, 1e-5));

        for _ in 0..4 {
            container.run_tick(&animator, &Character::default()).unwrap();
        }
        let pose = container.compute_pose(0.25).unwrap();
        assert!(pose.channel("body").translation.abs_diff_eq(Vec3::X * 3.25, 1e-4));
    }
}
