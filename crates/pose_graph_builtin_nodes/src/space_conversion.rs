use pose_graph_core::{
    context::{EvaluationState, InterpolationContext},
    errors::AnimationResult,
    pose::{ComponentSpace, ComponentSpacePose, LocalSpace, LocalSpacePose},
    pose_function::{AnimationPlayer, PoseFunction},
};

/// Exposes a local-space input as a component-space pose.
#[derive(Clone)]
pub struct LocalToComponentFunction {
    input: Box<dyn PoseFunction<LocalSpace>>,
}

impl LocalToComponentFunction {
    pub fn new(input: impl PoseFunction<LocalSpace>) -> Self {
        Self {
            input: input.into_boxed(),
        }
    }
}

impl PoseFunction<ComponentSpace> for LocalToComponentFunction {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        self.input.tick(state)
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<ComponentSpacePose> {
        Ok(self.input.compute(ctx)?.to_component_space())
    }

    fn wrap_unique(&self) -> Box<dyn PoseFunction<ComponentSpace>> {
        Box::new(Self {
            input: self.input.wrap_unique(),
        })
    }

    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        self.input.most_relevant_animation_player()
    }
}

/// Exposes a component-space input as a local-space pose.
#[derive(Clone)]
pub struct ComponentToLocalFunction {
    input: Box<dyn PoseFunction<ComponentSpace>>,
}

impl ComponentToLocalFunction {
    pub fn new(input: impl PoseFunction<ComponentSpace>) -> Self {
        Self {
            input: input.into_boxed(),
        }
    }
}

impl PoseFunction<LocalSpace> for ComponentToLocalFunction {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        self.input.tick(state)
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        Ok(self.input.compute(ctx)?.to_local_space())
    }

    fn wrap_unique(&self) -> Box<dyn PoseFunction<LocalSpace>> {
        Box::new(Self {
            input: self.input.wrap_unique(),
        })
    }

    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        self.input.most_relevant_animation_player()
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec3;

    use super::*;
    use crate::{
        sequence_player::SequencePlayerFunction,
        test_support::{Harness, slide},
    };

    #[test]
    fn child_picks_up_parent_translation_in_component_space() {
        let mut harness = Harness::new();
        let player = SequencePlayerFunction::builder(slide(10., "body", Vec3::ZERO, Vec3::Y * 10.)).build();
        let mut component = LocalToComponentFunction::new(player);
        harness.tick(&mut component).unwrap();

        let pose = harness.compute(&component, 1.).unwrap();
        assert!(pose.channel("head").translation.abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn round_trip_restores_local_pose() {
        let mut harness = Harness::new();
        let player = SequencePlayerFunction::builder(slide(10., "body", Vec3::ZERO, Vec3::Y * 10.)).build();
        let mut round_trip = ComponentToLocalFunction::new(LocalToComponentFunction::new(player.clone()));
        let mut direct = player;
        harness.tick(&mut round_trip).unwrap();
        harness.tick(&mut direct).unwrap();

        let restored = harness.compute(&round_trip, 0.5).unwrap();
        let expected = harness.compute(&direct, 0.5).unwrap();
        assert!(restored.abs_diff_eq(&expected, 1e-4));
        assert!(round_trip.most_relevant_animation_player().is_some());
    }
}
