use pose_graph_core::{
    context::{EvaluationState, InterpolationContext},
    errors::AnimationResult,
    pose::LocalSpacePose,
    pose_function::{AnimationPlayer, PoseFunction},
};

/// Point in the graph where montages playing in `slot` are layered over the input pose.
#[derive(Clone)]
pub struct MontageSlotFunction {
    input: Box<dyn PoseFunction>,
    slot: String,
}

impl MontageSlotFunction {
    pub fn new(input: impl PoseFunction, slot: impl Into<String>) -> Self {
        Self {
            input: input.into_boxed(),
            slot: slot.into(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }
}

impl PoseFunction for MontageSlotFunction {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        // A fully overriding montage hides the input entirely.
        if state.montages.is_slot_fully_overridden(&self.slot) {
            return Ok(());
        }
        self.input.tick(state)
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        let base = self.input.compute(ctx)?;
        Ok(ctx
            .montages
            .layered_slot_pose(base, &self.slot, ctx.partial_tick))
    }

    fn wrap_unique(&self) -> Box<dyn PoseFunction> {
        Box::new(Self {
            input: self.input.wrap_unique(),
            slot: self.slot.clone(),
        })
    }

    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        self.input.most_relevant_animation_player()
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec3;
    use pose_graph_core::{
        montage::MontageConfiguration,
        time::{TimeSpan, Transition},
    };

    use super::*;
    use crate::{
        sequence_player::SequencePlayerFunction,
        test_support::{Harness, slide},
    };

    #[test]
    fn fully_overriding_montage_pauses_the_input() {
        let mut harness = Harness::new();
        let mut slot = MontageSlotFunction::new(
            SequencePlayerFunction::builder(slide(40., "body", Vec3::ZERO, Vec3::X * 40.)).build(),
            "upper_body",
        );
        let wave = MontageConfiguration::builder("wave", slide(20., "arm_R", Vec3::ZERO, Vec3::Y * 20.))
            .plays_in_slot("upper_body")
            .with_transition_in(Transition::new(TimeSpan::from_ticks(2.)))
            .with_transition_out(Transition::new(TimeSpan::from_ticks(2.)))
            .build();
        harness.montages.play_montage(wave, &harness.drivers);

        for _ in 0..6 {
            harness.tick_montages();
            harness.tick(&mut slot).unwrap();
        }
        // Full weight on ticks 2 and 3, so the input stopped ticking from tick 3 on.
        let input = harness.compute(&slot.input, 1.).unwrap();
        assert!(input.channel("body").translation.abs_diff_eq(Vec3::X * 2., 1e-4));

        let pose = harness.compute(&slot, 1.).unwrap();
        assert!(pose.channel("body").translation.abs_diff_eq(Vec3::ZERO, 1e-4));
        assert!(pose.channel("arm_R").translation.abs_diff_eq(Vec3::Y * 6., 1e-4));
    }

    #[test]
    fn other_slots_are_left_alone() {
        let mut harness = Harness::new();
        let mut slot = MontageSlotFunction::new(
            SequencePlayerFunction::builder(slide(40., "body", Vec3::ZERO, Vec3::X * 40.)).build(),
            "legs",
        );
        let wave = MontageConfiguration::builder("wave", slide(20., "arm_R", Vec3::ZERO, Vec3::Y * 20.))
            .plays_in_slot("upper_body")
            .build();
        harness.montages.play_montage(wave, &harness.drivers);

        for _ in 0..4 {
            harness.tick_montages();
            harness.tick(&mut slot).unwrap();
        }
        let pose = harness.compute(&slot, 1.).unwrap();
        assert!(pose.channel("body").translation.abs_diff_eq(Vec3::X * 4., 1e-4));
        assert!(pose.channel("arm_R").translation.abs_diff_eq(Vec3::ZERO, 1e-4));
    }
}
