use pose_graph_core::{
    context::{EvaluationState, InterpolationContext},
    errors::AnimationResult,
    pose::LocalSpacePose,
    pose_function::{AnimationPlayer, InterpolationFn, PoseFunction, interpolation_fn},
    symmetry::SymmetryMode,
};

/// Swaps every joint with its mirror partner and mirrors the channels, while `enabled_fn`
/// holds.
#[derive(Clone)]
pub struct MirrorFunction {
    input: Box<dyn PoseFunction>,
    enabled_fn: InterpolationFn<bool>,
    mode: SymmetryMode,
}

impl MirrorFunction {
    pub fn new(input: impl PoseFunction) -> Self {
        Self {
            input: input.into_boxed(),
            enabled_fn: interpolation_fn(|_| true),
            mode: SymmetryMode::default(),
        }
    }

    pub fn with_enabled_fn(
        mut self,
        enabled_fn: impl Fn(&InterpolationContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.enabled_fn = interpolation_fn(enabled_fn);
        self
    }

    pub fn with_mode(mut self, mode: SymmetryMode) -> Self {
        self.mode = mode;
        self
    }
}

impl PoseFunction for MirrorFunction {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        self.input.tick(state)
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        let pose = self.input.compute(ctx)?;
        if (self.enabled_fn)(ctx) {
            Ok(pose.mirrored(self.mode))
        } else {
            Ok(pose)
        }
    }

    fn wrap_unique(&self) -> Box<dyn PoseFunction> {
        Box::new(Self {
            input: self.input.wrap_unique(),
            enabled_fn: self.enabled_fn.clone(),
            mode: self.mode,
        })
    }

    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        self.input.most_relevant_animation_player()
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec3;
    use pose_graph_core::driver::{DriverKey, VariableDriver};

    use super::*;
    use crate::{
        sequence_player::SequencePlayerFunction,
        test_support::{Harness, slide},
    };

    const MIRRORED: DriverKey<VariableDriver<bool>> =
        DriverKey::new("mirrored", || VariableDriver::interpolated(false));

    #[test]
    fn mirroring_swaps_left_and_right() {
        let mut harness = Harness::new();
        let player = SequencePlayerFunction::builder(slide(10., "arm_L", Vec3::ZERO, Vec3::new(10., 10., 0.)))
            .build();
        let mut mirror = MirrorFunction::new(player).with_enabled_fn(|ctx| ctx.driver_value(&MIRRORED));
        harness.tick(&mut mirror).unwrap();

        let plain = harness.compute(&mirror, 1.).unwrap();
        assert!(plain.channel("arm_L").translation.abs_diff_eq(Vec3::new(1., 1., 0.), 1e-4));

        harness.drivers.driver_mut(&MIRRORED).set_value(true);
        let mirrored = harness.compute(&mirror, 1.).unwrap();
        assert!(mirrored.channel("arm_R").translation.abs_diff_eq(Vec3::new(-1., 1., 0.), 1e-4));
        assert!(mirrored.channel("arm_L").translation.abs_diff_eq(Vec3::ZERO, 1e-4));
    }
}
