use std::sync::Arc;

use crate::{
    driver::{Driver, DriverContainer, DriverKey},
    montage::MontageManager,
    skeleton::JointSkeleton,
    time::TimeSpan,
};

/// Read-only view handed to [`PoseFunction::compute`](crate::pose_function::PoseFunction::compute),
/// possibly several times per tick with different `partial_tick` values.
#[derive(Clone, Copy)]
pub struct InterpolationContext<'a> {
    pub drivers: &'a DriverContainer,
    pub montages: &'a MontageManager,
    pub skeleton: &'a Arc<JointSkeleton>,
    /// Position between the previous tick (`0`) and the current one (`1`).
    pub partial_tick: f32,
    /// Ticks since the container was created, including `partial_tick`.
    pub game_time: TimeSpan,
}

impl<'a> InterpolationContext<'a> {
    pub fn new(
        drivers: &'a DriverContainer,
        montages: &'a MontageManager,
        skeleton: &'a Arc<JointSkeleton>,
        partial_tick: f32,
        game_time: TimeSpan,
    ) -> Self {
        Self {
            drivers,
            montages,
            skeleton,
            partial_tick: partial_tick.clamp(0., 1.),
            game_time,
        }
    }

    /// Value of the driver behind `key`, blended at this context's partial tick.
    pub fn driver_value<D: Driver>(&self, key: &DriverKey<D>) -> D::Value {
        self.drivers.driver_value(key, self.partial_tick)
    }

    pub fn with_partial_tick(&self, partial_tick: f32) -> Self {
        Self {
            partial_tick: partial_tick.clamp(0., 1.),
            ..*self
        }
    }
}
