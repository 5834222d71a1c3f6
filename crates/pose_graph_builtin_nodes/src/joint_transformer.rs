use std::sync::Arc;

use bevy_math::{Quat, Vec3};
use pose_graph_core::{
    context::{EvaluationState, InterpolationContext},
    errors::{AnimationError, AnimationResult},
    joint::{JointChannel, TransformSpace, TransformType},
    pose::{LocalSpace, Pose, PoseSpace},
    pose_function::{AnimationPlayer, InterpolationFn, PoseFunction, interpolation_fn},
    skeleton::JointSkeleton,
};

#[derive(Clone)]
struct ChannelOperation<T> {
    value_fn: InterpolationFn<T>,
    ty: TransformType,
    space: TransformSpace,
}

/// Procedurally offsets a single joint of its input pose, in whichever space the input is in.
#[derive(Clone)]
pub struct JointTransformerFunction<S: PoseSpace = LocalSpace> {
    input: Box<dyn PoseFunction<S>>,
    joint: String,
    translation: Option<ChannelOperation<Vec3>>,
    rotation: Option<ChannelOperation<Quat>>,
    scale: Option<ChannelOperation<Vec3>>,
    weight_fn: InterpolationFn<f32>,
}

impl<S: PoseSpace> JointTransformerFunction<S> {
    pub fn builder(input: impl PoseFunction<S>, joint: impl Into<String>) -> JointTransformerBuilder<S> {
        JointTransformerBuilder {
            node: Self {
                input: input.into_boxed(),
                joint: joint.into(),
                translation: None,
                rotation: None,
                scale: None,
                weight_fn: interpolation_fn(|_| 1.),
            },
        }
    }

    fn transformed(&self, mut channel: JointChannel, ctx: &InterpolationContext) -> JointChannel {
        if let Some(op) = &self.translation {
            channel.translate((op.value_fn)(ctx), op.space, op.ty);
        }
        if let Some(op) = &self.rotation {
            channel.rotate((op.value_fn)(ctx), op.space, op.ty);
        }
        if let Some(op) = &self.scale {
            channel.scale_by((op.value_fn)(ctx), op.ty);
        }
        channel
    }
}

impl<S: PoseSpace> PoseFunction<S> for JointTransformerFunction<S> {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        self.input.tick(state)
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<Pose<S>> {
        let mut pose = self.input.compute(ctx)?;
        let weight = (self.weight_fn)(ctx).clamp(0., 1.);
        if weight <= 0. {
            return Ok(pose);
        }
        if let Some(channel) = pose.channel_mut(&self.joint) {
            let transformed = self.transformed(*channel, ctx);
            *channel = channel.interpolated(&transformed, weight);
        }
        Ok(pose)
    }

    fn wrap_unique(&self) -> Box<dyn PoseFunction<S>> {
        Box::new(Self {
            input: self.input.wrap_unique(),
            joint: self.joint.clone(),
            translation: self.translation.clone(),
            rotation: self.rotation.clone(),
            scale: self.scale.clone(),
            weight_fn: self.weight_fn.clone(),
        })
    }

    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        self.input.most_relevant_animation_player()
    }
}

pub struct JointTransformerBuilder<S: PoseSpace> {
    node: JointTransformerFunction<S>,
}

impl<S: PoseSpace> JointTransformerBuilder<S> {
    pub fn with_translation(
        mut self,
        value_fn: impl Fn(&InterpolationContext<'_>) -> Vec3 + Send + Sync + 'static,
        ty: TransformType,
        space: TransformSpace,
    ) -> Self {
        self.node.translation = Some(ChannelOperation {
            value_fn: interpolation_fn(value_fn),
            ty,
            space,
        });
        self
    }

    pub fn with_rotation(
        mut self,
        value_fn: impl Fn(&InterpolationContext<'_>) -> Quat + Send + Sync + 'static,
        ty: TransformType,
        space: TransformSpace,
    ) -> Self {
        self.node.rotation = Some(ChannelOperation {
            value_fn: interpolation_fn(value_fn),
            ty,
            space,
        });
        self
    }

    /// Scale is always applied per-axis on the joint itself, so it takes no space.
    pub fn with_scale(
        mut self,
        value_fn: impl Fn(&InterpolationContext<'_>) -> Vec3 + Send + Sync + 'static,
        ty: TransformType,
    ) -> Self {
        self.node.scale = Some(ChannelOperation {
            value_fn: interpolation_fn(value_fn),
            ty,
            space: TransformSpace::Local,
        });
        self
    }

    /// Blends between the untouched and the transformed joint. Defaults to fully transformed.
    pub fn with_weight_fn(
        mut self,
        weight_fn: impl Fn(&InterpolationContext<'_>) -> f32 + Send + Sync + 'static,
    ) -> Self {
        self.node.weight_fn = interpolation_fn(weight_fn);
        self
    }

    /// Fails with [`AnimationError::UnknownJoint`] when the joint is not part of `skeleton`.
    pub fn build(self, skeleton: &Arc<JointSkeleton>) -> AnimationResult<JointTransformerFunction<S>> {
        if !skeleton.contains_joint(&self.node.joint) {
            return Err(AnimationError::UnknownJoint(self.node.joint));
        }
        Ok(self.node)
    }
}
