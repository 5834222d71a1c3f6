use crate::{
    joint::TransformSpace,
    pose::{Pose, PoseSpace},
};

impl<S: PoseSpace> Pose<S> {
    /// Delta that takes `reference` to this pose: `reference⁻¹ ∘ self` per joint, so that
    /// composing it onto `reference` yields this pose again.
    pub fn additive_relative_to(&self, reference: &Self) -> Self {
        let mut additive = self.clone();
        additive.multiply(&reference.inverted(), TransformSpace::Component);
        additive
    }

    /// Composes `additive` onto this pose, scaled by `weight`. A weight of 1 applies the full
    /// delta and 0 leaves this pose untouched.
    pub fn with_additive(&self, additive: &Self, weight: f32) -> Self {
        if weight <= 0. {
            return self.clone();
        }
        let mut applied = additive.clone();
        applied.multiply(self, TransformSpace::Component);
        if weight >= 1. {
            applied
        } else {
            self.interpolated(&applied, weight)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        pose::{LocalSpacePose, tests::posed},
        skeleton::tests::test_skeleton,
    };

    #[test]
    fn additive_of_reference_is_identity() {
        let skeleton = Arc::new(test_skeleton());
        let reference = posed(&skeleton, 2.);
        let additive = reference.additive_relative_to(&reference);
        assert!(additive.abs_diff_eq(&LocalSpacePose::new(skeleton), 1e-4));
    }

    #[test]
    fn applying_delta_to_reference_restores_source() {
        let skeleton = Arc::new(test_skeleton());
        let reference = posed(&skeleton, 2.);
        let source = posed(&skeleton, 5.);
        let additive = source.additive_relative_to(&reference);
        assert!(reference.with_additive(&additive, 1.).abs_diff_eq(&source, 1e-4));
    }

    #[test]
    fn zero_weight_keeps_base() {
        let skeleton = Arc::new(test_skeleton());
        let base = posed(&skeleton, 1.);
        let additive = posed(&skeleton, 3.);
        assert!(base.with_additive(&additive, 0.).abs_diff_eq(&base, 0.));
    }
}
