use bevy_math::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{interpolation::linear::InterpolateLinear, symmetry::SymmetryMode};

/// Frame a transform operation is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformSpace {
    /// Relative to the joint's own axes: the operand is applied after the existing transform.
    #[default]
    Local,
    /// Relative to the joint's parent frame: the operand is applied before the existing transform.
    Component,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformType {
    /// Compose the value on top of the current transform.
    #[default]
    Add,
    /// Overwrite the current transform with the value.
    Replace,
}

/// Transform of a single joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointChannel {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub visible: bool,
}

impl Default for JointChannel {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl JointChannel {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
        visible: true,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn from_matrix(matrix: Mat4, visible: bool) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
            visible,
        }
    }

    /// `self ∘ other`: `other` expressed in the frame defined by `self`.
    pub fn compose(&self, other: &JointChannel) -> JointChannel {
        JointChannel {
            translation: self.translation + self.rotation * (self.scale * other.translation),
            rotation: (self.rotation * other.rotation).normalize(),
            scale: self.scale * other.scale,
            visible: self.visible,
        }
    }

    /// Composes `other` onto this channel in the given space. Visibility is kept.
    pub fn multiply(&mut self, other: &JointChannel, space: TransformSpace) {
        let visible = self.visible;
        *self = match space {
            TransformSpace::Local => self.compose(other),
            TransformSpace::Component => other.compose(self),
        };
        self.visible = visible;
    }

    /// Inverse transform. A degenerate (zero-scale) transform inverts to the identity.
    pub fn inverse(&self) -> JointChannel {
        let matrix = self.to_matrix();
        if matrix.determinant().abs() <= f32::EPSILON {
            return JointChannel {
                visible: self.visible,
                ..Self::IDENTITY
            };
        }
        Self::from_matrix(matrix.inverse(), self.visible)
    }

    pub fn invert(&mut self) {
        *self = self.inverse();
    }

    pub fn mirrored(&self, mode: SymmetryMode) -> JointChannel {
        JointChannel {
            translation: mode.apply_position(self.translation),
            rotation: mode.apply_quat(self.rotation),
            scale: self.scale,
            visible: self.visible,
        }
    }

    /// Blends towards `other`. Endpoints are exact; visibility switches at the halfway point.
    pub fn interpolated(&self, other: &JointChannel, weight: f32) -> JointChannel {
        if weight <= 0. {
            return *self;
        }
        if weight >= 1. {
            return *other;
        }
        JointChannel {
            translation: self.translation.interpolate_linear(&other.translation, weight),
            rotation: self.rotation.interpolate_linear(&other.rotation, weight),
            scale: self.scale.interpolate_linear(&other.scale, weight),
            visible: self.visible.interpolate_linear(&other.visible, weight),
        }
    }

    pub fn translate(&mut self, translation: Vec3, space: TransformSpace, ty: TransformType) {
        match (ty, space) {
            (TransformType::Replace, _) => self.translation = translation,
            (TransformType::Add, TransformSpace::Component) => self.translation += translation,
            (TransformType::Add, TransformSpace::Local) => {
                self.translation += self.rotation * (self.scale * translation)
            }
        }
    }

    pub fn rotate(&mut self, rotation: Quat, space: TransformSpace, ty: TransformType) {
        self.rotation = match (ty, space) {
            (TransformType::Replace, _) => rotation,
            (TransformType::Add, TransformSpace::Component) => rotation * self.rotation,
            (TransformType::Add, TransformSpace::Local) => self.rotation * rotation,
        }
        .normalize();
    }

    pub fn scale_by(&mut self, scale: Vec3, ty: TransformType) {
        match ty {
            TransformType::Replace => self.scale = scale,
            TransformType::Add => self.scale *= scale,
        }
    }

    pub fn abs_diff_eq(&self, other: &JointChannel, max_abs_diff: f32) -> bool {
        self.visible == other.visible
            && self.translation.abs_diff_eq(other.translation, max_abs_diff)
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
            // q and -q are the same rotation
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }
}
