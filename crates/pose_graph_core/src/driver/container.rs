use std::{any::TypeId, fmt::Debug};

use bevy_platform::collections::HashMap;

use super::{Driver, DriverKey, ErasedDriver};

type DriverId = (&'static str, TypeId);

/// Owns every driver of one animated subject, keyed by [`DriverKey`].
///
/// Drivers are created lazily from their key's factory on first mutable access. Two keys
/// with the same name but different driver types address different drivers.
#[derive(Default)]
pub struct DriverContainer {
    drivers: HashMap<DriverId, Box<dyn ErasedDriver>>,
}

impl DriverContainer {
    pub fn new() -> Self {
        Self::default()
    }

    fn id<D: Driver>(key: &DriverKey<D>) -> DriverId {
        (key.name(), TypeId::of::<D>())
    }

    pub fn driver<D: Driver>(&self, key: &DriverKey<D>) -> Option<&D> {
        self.drivers
            .get(&Self::id(key))
            .and_then(|driver| driver.as_any().downcast_ref::<D>())
    }

    pub fn driver_mut<D: Driver>(&mut self, key: &DriverKey<D>) -> &mut D {
        self.drivers
            .entry(Self::id(key))
            .or_insert_with(|| Box::new(key.create_driver()))
            .as_any_mut()
            .downcast_mut::<D>()
            // The entry under `(name, TypeId::of::<D>())` was inserted from a `DriverKey<D>`, so it
            // always holds a `D`.
            .expect("driver stored under a different TypeId")
    }

    /// Interpolated value of the driver behind `key`. A driver that was never created reads
    /// as its factory default.
    pub fn driver_value<D: Driver>(&self, key: &DriverKey<D>, partial_tick: f32) -> D::Value {
        match self.driver(key) {
            Some(driver) => driver.value_interpolated(partial_tick),
            None => key.create_driver().value_interpolated(partial_tick),
        }
    }

    /// Value on the current tick.
    pub fn current_value<D: Driver>(&self, key: &DriverKey<D>) -> D::Value {
        self.driver_value(key, 1.)
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn push_all_to_previous(&mut self) {
        for driver in self.drivers.values_mut() {
            driver.push_current_to_previous();
        }
    }

    pub fn tick_all(&mut self) {
        for driver in self.drivers.values_mut() {
            driver.tick();
        }
    }

    pub fn post_tick_all(&mut self) {
        for driver in self.drivers.values_mut() {
            driver.post_tick();
        }
    }
}

impl Debug for DriverContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.drivers.keys().map(|(name, _)| name))
            .finish()
    }
}
