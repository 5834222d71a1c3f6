//! Additive layering.
//!
//! An additive pose is a per-joint delta, `reference⁻¹ ∘ source`, composed onto a base pose in
//! component space. These nodes build such deltas and apply them.

use pose_graph_core::{
    context::{EvaluationState, InterpolationContext},
    errors::AnimationResult,
    pose::LocalSpacePose,
    pose_function::{AnimationPlayer, InterpolationFn, PoseFunction, interpolation_fn},
};

fn full_weight() -> InterpolationFn<f32> {
    interpolation_fn(|_| 1.)
}

/// Composes an already-additive input onto a base pose.
#[derive(Clone)]
pub struct ApplyAdditiveFunction {
    base: Box<dyn PoseFunction>,
    additive: Box<dyn PoseFunction>,
    weight_fn: InterpolationFn<f32>,
}

impl ApplyAdditiveFunction {
    pub fn new(base: impl PoseFunction, additive: impl PoseFunction) -> Self {
        Self {
            base: base.into_boxed(),
            additive: additive.into_boxed(),
            weight_fn: full_weight(),
        }
    }

    pub fn with_weight_fn(
        mut self,
        weight_fn: impl Fn(&InterpolationContext<'_>) -> f32 + Send + Sync + 'static,
    ) -> Self {
        self.weight_fn = interpolation_fn(weight_fn);
        self
    }
}

impl PoseFunction for ApplyAdditiveFunction {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        self.base.tick(state)?;
        self.additive.tick(state)
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        let base = self.base.compute(ctx)?;
        let additive = self.additive.compute(ctx)?;
        Ok(base.with_additive(&additive, (self.weight_fn)(ctx)))
    }

    fn wrap_unique(&self) -> Box<dyn PoseFunction> {
        Box::new(Self {
            base: self.base.wrap_unique(),
            additive: self.additive.wrap_unique(),
            weight_fn: self.weight_fn.clone(),
        })
    }

    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        self.base
            .most_relevant_animation_player()
            .or_else(|| self.additive.most_relevant_animation_player())
    }
}

/// Makes `additive` relative to `reference`, then composes the delta onto a base pose.
#[derive(Clone)]
pub struct ComposeAdditiveFunction {
    base: Box<dyn PoseFunction>,
    additive: Box<dyn PoseFunction>,
    reference: Box<dyn PoseFunction>,
    weight_fn: InterpolationFn<f32>,
}

impl ComposeAdditiveFunction {
    pub fn new(base: impl PoseFunction, additive: impl PoseFunction, reference: impl PoseFunction) -> Self {
        Self {
            base: base.into_boxed(),
            additive: additive.into_boxed(),
            reference: reference.into_boxed(),
            weight_fn: full_weight(),
        }
    }

    pub fn with_weight_fn(
        mut self,
        weight_fn: impl Fn(&InterpolationContext<'_>) -> f32 + Send + Sync + 'static,
    ) -> Self {
        self.weight_fn = interpolation_fn(weight_fn);
        self
    }
}

impl PoseFunction for ComposeAdditiveFunction {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        self.base.tick(state)?;
        self.additive.tick(state)?;
        self.reference.tick(state)
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        let base = self.base.compute(ctx)?;
        let delta = self
            .additive
            .compute(ctx)?
            .additive_relative_to(&self.reference.compute(ctx)?);
        Ok(base.with_additive(&delta, (self.weight_fn)(ctx)))
    }

    fn wrap_unique(&self) -> Box<dyn PoseFunction> {
        Box::new(Self {
            base: self.base.wrap_unique(),
            additive: self.additive.wrap_unique(),
            reference: self.reference.wrap_unique(),
            weight_fn: self.weight_fn.clone(),
        })
    }

    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        self.base
            .most_relevant_animation_player()
            .or_else(|| self.additive.most_relevant_animation_player())
    }
}

/// Produces the delta between two runtime inputs: the pose that, composed onto `base`,
/// yields `additive`.
#[derive(Clone)]
pub struct MakeDynamicAdditiveFunction {
    additive: Box<dyn PoseFunction>,
    base: Box<dyn PoseFunction>,
}

impl MakeDynamicAdditiveFunction {
    pub fn new(additive: impl PoseFunction, base: impl PoseFunction) -> Self {
        Self {
            additive: additive.into_boxed(),
            base: base.into_boxed(),
        }
    }
}

impl PoseFunction for MakeDynamicAdditiveFunction {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        self.additive.tick(state)?;
        self.base.tick(state)
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        let additive = self.additive.compute(ctx)?;
        Ok(additive.additive_relative_to(&self.base.compute(ctx)?))
    }

    fn wrap_unique(&self) -> Box<dyn PoseFunction> {
        Box::new(Self {
            additive: self.additive.wrap_unique(),
            base: self.base.wrap_unique(),
        })
    }

    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        self.additive
            .most_relevant_animation_player()
            .or_else(|| self.base.most_relevant_animation_player())
    }
}
