use std::{fmt::Debug, sync::Arc};

use super::Driver;
use crate::interpolation::linear::InterpolateLinear;

/// Blends a previous and a current value.
pub type Interpolator<D> = fn(&D, &D, f32) -> D;

type DefaultValue<D> = Arc<dyn Fn() -> D + Send + Sync>;

/// Plain previous/current value holder.
#[derive(Clone)]
pub struct VariableDriver<D> {
    default: DefaultValue<D>,
    interpolator: Interpolator<D>,
    previous: D,
    current: D,
}

impl<D: Clone + Send + Sync + 'static> VariableDriver<D> {
    pub fn new(default: impl Fn() -> D + Send + Sync + 'static, interpolator: Interpolator<D>) -> Self {
        let initial = default();
        Self {
            default: Arc::new(default),
            interpolator,
            previous: initial.clone(),
            current: initial,
        }
    }

    /// Driver for values that cannot be blended; always reads the current value.
    pub fn constant(default: D) -> Self {
        Self::new(move || default.clone(), |_, current, _| current.clone())
    }

    pub fn previous(&self) -> &D {
        &self.previous
    }

    pub fn current(&self) -> &D {
        &self.current
    }

    pub fn set_value(&mut self, value: D) {
        self.current = value;
    }

    pub fn modify_value(&mut self, modify: impl FnOnce(&D) -> D) {
        self.current = modify(&self.current);
    }

    /// Restores the default as the current value; the previous value still blends in.
    pub fn reset(&mut self) {
        self.current = (self.default)();
    }

    /// Restores the default for both values, so there is nothing to blend from.
    pub fn hard_reset(&mut self) {
        self.reset();
        self.previous = self.current.clone();
    }

    pub fn interpolate(&self, previous: &D, current: &D, partial_tick: f32) -> D {
        (self.interpolator)(previous, current, partial_tick)
    }
}

impl<D: Clone + InterpolateLinear + Send + Sync + 'static> VariableDriver<D> {
    /// Driver blended with the value type's [`InterpolateLinear`] rule: lerp for scalars and
    /// vectors, slerp for rotations, snap at one half for booleans.
    pub fn interpolated(default: D) -> Self {
        Self::new(move || default.clone(), D::interpolate_linear)
    }
}

impl<D: Clone + Send + Sync + 'static> Driver for VariableDriver<D> {
    type Value = D;

    fn value_interpolated(&self, partial_tick: f32) -> D {
        self.interpolate(&self.previous, &self.current, partial_tick)
    }

    fn push_current_to_previous(&mut self) {
        self.previous = self.current.clone();
    }
}

impl<D: Debug> Debug for VariableDriver<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableDriver")
            .field("previous", &self.previous)
            .field("current", &self.current)
            .finish()
    }
}
