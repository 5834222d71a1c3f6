use std::{
    fmt::Debug,
    ops::{Add, Mul, Sub},
    sync::Arc,
};

use bevy_math::Vec3;

use super::{Driver, VariableDriver};
use crate::interpolation::linear::InterpolateLinear;

/// Arithmetic a value needs for spring integration.
pub trait SpringValue:
    Copy
    + Default
    + InterpolateLinear
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + Send
    + Sync
    + 'static
{
}

impl SpringValue for f32 {}
impl SpringValue for Vec3 {}

/// Damped spring chasing a target value.
///
/// [`SpringDriver::set_value`] moves the target; every tick integrates one step of
/// `acceleration = mass * (-stiffness * displacement - damping * velocity)`. In delta mode the
/// driver reads as the spring's lag behind the target instead of its absolute value, which is
/// what secondary-motion overlays want.
#[derive(Clone)]
pub struct SpringDriver<D> {
    stiffness: f32,
    damping: f32,
    mass: f32,
    returns_delta: bool,
    target: VariableDriver<D>,
    value: VariableDriver<D>,
    velocity: D,
}

impl<D: SpringValue> SpringDriver<D> {
    pub const MIN_MASS: f32 = 0.1;

    pub fn new(
        stiffness: f32,
        damping: f32,
        mass: f32,
        default: impl Fn() -> D + Send + Sync + 'static,
        returns_delta: bool,
    ) -> Self {
        let default: Arc<dyn Fn() -> D + Send + Sync> = Arc::new(default);
        let target_default = default.clone();
        Self {
            stiffness,
            damping,
            mass: mass.max(Self::MIN_MASS),
            returns_delta,
            target: VariableDriver::new(move || target_default(), D::interpolate_linear),
            value: VariableDriver::new(move || default(), D::interpolate_linear),
            velocity: D::default(),
        }
    }

    /// Sets the target the spring moves towards.
    pub fn set_value(&mut self, target: D) {
        self.target.set_value(target);
    }

    pub fn target(&self) -> D {
        *self.target.current()
    }

    pub fn velocity(&self) -> D {
        self.velocity
    }

    /// Undamped position of the spring on the current tick.
    pub fn spring_value(&self) -> D {
        *self.value.current()
    }

    pub fn reset(&mut self) {
        self.target.hard_reset();
        self.value.hard_reset();
        self.velocity = D::default();
    }
}

impl<D: SpringValue> Driver for SpringDriver<D> {
    type Value = D;

    fn value_interpolated(&self, partial_tick: f32) -> D {
        let value = self.value.value_interpolated(partial_tick);
        if self.returns_delta {
            self.target.value_interpolated(partial_tick) - value
        } else {
            value
        }
    }

    fn push_current_to_previous(&mut self) {
        self.target.push_current_to_previous();
        self.value.push_current_to_previous();
    }

    fn tick(&mut self) {
        let displacement = *self.value.current() - *self.target.current();
        let spring_force = displacement * -self.stiffness;
        let damping_force = self.velocity * -self.damping;
        let acceleration = (spring_force + damping_force) * self.mass;

        self.velocity = self.velocity + acceleration;
        let velocity = self.velocity;
        self.value.modify_value(|value| *value + velocity);
    }
}

impl<D: Debug> Debug for SpringDriver<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpringDriver")
            .field("target", &self.target)
            .field("value", &self.value)
            .field("velocity", &self.velocity)
            .finish()
    }
}
