//! Per-tick value holders.
//!
//! A driver keeps a `previous` and a `current` value. Every tick the container first pushes
//! `current` into `previous`, gameplay code then writes new values, [`Driver::tick`] runs any
//! internal update and [`Driver::post_tick`] cleans up. Rendering reads values blended between
//! the two with [`Driver::value_interpolated`].

mod container;
mod key;
mod spring;
mod trigger;
mod variable;

pub use container::*;
pub use key::*;
pub use spring::*;
pub use trigger::*;
pub use variable::*;

use std::any::Any;

pub trait Driver: Send + Sync + 'static {
    type Value;

    /// Value blended between the previous and current tick; `0` is the previous value and `1`
    /// the current one.
    fn value_interpolated(&self, partial_tick: f32) -> Self::Value;

    fn push_current_to_previous(&mut self);

    fn tick(&mut self) {}

    fn post_tick(&mut self) {}
}

/// Object-safe view of a [`Driver`], used for type-erased storage.
pub trait ErasedDriver: Send + Sync + 'static {
    fn push_current_to_previous(&mut self);
    fn tick(&mut self);
    fn post_tick(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Driver> ErasedDriver for T {
    fn push_current_to_previous(&mut self) {
        Driver::push_current_to_previous(self);
    }

    fn tick(&mut self) {
        Driver::tick(self);
    }

    fn post_tick(&mut self) {
        Driver::post_tick(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
