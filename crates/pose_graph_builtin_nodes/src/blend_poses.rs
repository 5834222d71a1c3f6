use std::sync::Arc;

use pose_graph_core::{
    context::{EvaluationState, InterpolationContext},
    driver::{Driver, VariableDriver},
    edge_data::BlendMask,
    errors::AnimationResult,
    pose::LocalSpacePose,
    pose_function::{AnimationPlayer, EvaluationFn, PoseFunction, evaluation_fn},
};

#[derive(Clone)]
struct BlendInput {
    input: Box<dyn PoseFunction>,
    weight_fn: EvaluationFn<f32>,
    blend_mask: Option<Arc<BlendMask>>,
    weight: VariableDriver<f32>,
}

/// Layers any number of weighted inputs over a base pose, in the order they were added.
///
/// An input whose weight is zero on a tick is neither ticked nor computed, so its clock holds
/// until it becomes relevant again.
#[derive(Clone)]
pub struct BlendPosesFunction {
    base: Box<dyn PoseFunction>,
    inputs: Vec<BlendInput>,
}

impl BlendPosesFunction {
    pub fn builder(base: impl PoseFunction) -> BlendPosesBuilder {
        BlendPosesBuilder {
            node: Self {
                base: base.into_boxed(),
                inputs: Vec::new(),
            },
        }
    }
}

impl PoseFunction for BlendPosesFunction {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        self.base.tick(state)?;
        for blend_input in &mut self.inputs {
            let weight = (blend_input.weight_fn)(state).clamp(0., 1.);
            blend_input.weight.push_current_to_previous();
            blend_input.weight.set_value(weight);
            if weight != 0. {
                blend_input.input.tick(state)?;
            }
        }
        Ok(())
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        let mut pose = self.base.compute(ctx)?;
        for blend_input in &self.inputs {
            let weight = blend_input.weight.value_interpolated(ctx.partial_tick);
            if weight != 0. {
                let input_pose = blend_input.input.compute(ctx)?;
                pose = pose.interpolated_with_mask(&input_pose, weight, blend_input.blend_mask.as_deref());
            }
        }
        Ok(pose)
    }

    fn wrap_unique(&self) -> Box<dyn PoseFunction> {
        Box::new(Self {
            base: self.base.wrap_unique(),
            inputs: self
                .inputs
                .iter()
                .map(|blend_input| BlendInput {
                    input: blend_input.input.wrap_unique(),
                    weight_fn: blend_input.weight_fn.clone(),
                    blend_mask: blend_input.blend_mask.clone(),
                    weight: blend_input.weight.clone(),
                })
                .collect(),
        })
    }

    /// The topmost input currently blended in at half weight or more, falling back to the base.
    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        self.inputs
            .iter()
            .rev()
            .find(|blend_input| *blend_input.weight.current() >= 0.5)
            .and_then(|blend_input| blend_input.input.most_relevant_animation_player())
            .or_else(|| self.base.most_relevant_animation_player())
    }
}

pub struct BlendPosesBuilder {
    node: BlendPosesFunction,
}

impl BlendPosesBuilder {
    pub fn add_blend_input(
        self,
        input: impl PoseFunction,
        weight_fn: impl Fn(&EvaluationState<'_>) -> f32 + Send + Sync + 'static,
    ) -> Self {
        self.add_masked_blend_input(input, weight_fn, None::<BlendMask>)
    }

    /// Like [`Self::add_blend_input`], scaling the weight of each joint by `blend_mask`.
    pub fn add_masked_blend_input(
        mut self,
        input: impl PoseFunction,
        weight_fn: impl Fn(&EvaluationState<'_>) -> f32 + Send + Sync + 'static,
        blend_mask: impl Into<Option<BlendMask>>,
    ) -> Self {
        self.node.inputs.push(BlendInput {
            input: input.into_boxed(),
            weight_fn: evaluation_fn(weight_fn),
            blend_mask: blend_mask.into().map(Arc::new),
            weight: VariableDriver::interpolated(0.),
        });
        self
    }

    pub fn build(self) -> BlendPosesFunction {
        self.node
    }
}
