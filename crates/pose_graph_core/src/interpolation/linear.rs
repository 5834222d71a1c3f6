use bevy_math::{Quat, Vec3};

use crate::{
    joint::JointChannel,
    pose::{Pose, PoseSpace},
};

pub trait InterpolateLinear {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self;
}

// Weighted-sum form so that f == 0 and f == 1 return the endpoints exactly.
impl InterpolateLinear for f32 {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        self * (1. - f) + other * f
    }
}

impl InterpolateLinear for Vec3 {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        *self * (1. - f) + *other * f
    }
}

/// Shortest-path spherical interpolation, exact at both endpoints.
impl InterpolateLinear for Quat {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        if f <= 0. {
            *self
        } else if f >= 1. {
            *other
        } else {
            self.slerp(*other, f)
        }
    }
}

/// Discrete values snap to `other` at the halfway point.
impl InterpolateLinear for bool {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        if f >= 0.5 { *other } else { *self }
    }
}

impl InterpolateLinear for JointChannel {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        self.interpolated(other, f)
    }
}

impl<S: PoseSpace> InterpolateLinear for Pose<S> {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        self.interpolated(other, f)
    }
}
