use std::fmt::Debug;

use super::Driver;

/// Typed handle to a driver: a stable name plus the factory that creates the driver the first
/// time it is looked up.
///
/// Keys are usually declared as constants next to the animator that reads them:
///
/// ```
/// # use pose_graph_core::driver::{DriverKey, VariableDriver};
/// const WALK_SPEED: DriverKey<VariableDriver<f32>> =
///     DriverKey::new("walk_speed", || VariableDriver::interpolated(0.));
/// ```
pub struct DriverKey<D> {
    name: &'static str,
    factory: fn() -> D,
}

impl<D: Driver> DriverKey<D> {
    pub const fn new(name: &'static str, factory: fn() -> D) -> Self {
        Self { name, factory }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn create_driver(&self) -> D {
        (self.factory)()
    }
}

impl<D> Clone for DriverKey<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for DriverKey<D> {}

impl<D> Debug for DriverKey<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DriverKey").field(&self.name).finish()
    }
}
