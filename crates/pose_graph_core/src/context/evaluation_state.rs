use crate::{
    driver::{Driver, DriverContainer, DriverKey},
    montage::MontageManager,
};

/// Mutable state threaded through [`PoseFunction::tick`](crate::pose_function::PoseFunction::tick)
/// once per simulation tick.
pub struct EvaluationState<'a> {
    pub drivers: &'a mut DriverContainer,
    pub montages: &'a mut MontageManager,
    /// Set when the receiving subgraph should restart from scratch without blending.
    pub resetting: bool,
    pub current_tick: u64,
}

impl<'a> EvaluationState<'a> {
    pub fn new(
        drivers: &'a mut DriverContainer,
        montages: &'a mut MontageManager,
        current_tick: u64,
    ) -> Self {
        Self {
            drivers,
            montages,
            resetting: false,
            current_tick,
        }
    }

    /// Shorter-lived copy with the same reset flag, for handing to children.
    pub fn reborrow(&mut self) -> EvaluationState<'_> {
        self.with_reset(self.resetting)
    }

    /// Copy that tells the receiver to hard-reset.
    pub fn marked_for_reset(&mut self) -> EvaluationState<'_> {
        self.with_reset(true)
    }

    /// Copy with the reset flag cleared.
    pub fn cleared(&mut self) -> EvaluationState<'_> {
        self.with_reset(false)
    }

    pub fn with_reset(&mut self, resetting: bool) -> EvaluationState<'_> {
        EvaluationState {
            drivers: self.drivers,
            montages: self.montages,
            resetting,
            current_tick: self.current_tick,
        }
    }

    pub fn is_resetting(&self) -> bool {
        self.resetting
    }

    /// Value the driver behind `key` holds on this tick.
    pub fn driver_value<D: Driver>(&self, key: &DriverKey<D>) -> D::Value {
        self.drivers.current_value(key)
    }

    pub fn driver_mut<D: Driver>(&mut self, key: &DriverKey<D>) -> &mut D {
        self.drivers.driver_mut(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::VariableDriver;

    const FLAG: DriverKey<VariableDriver<bool>> =
        DriverKey::new("flag", || VariableDriver::interpolated(false));

    #[test]
    fn reborrows_keep_everything_but_the_reset_flag() {
        let mut drivers = DriverContainer::new();
        let mut montages = MontageManager::new();
        let mut state = EvaluationState::new(&mut drivers, &mut montages, 7);
        state.driver_mut(&FLAG).set_value(true);

        let mut reset = state.marked_for_reset();
        assert!(reset.is_resetting());
        assert_eq!(reset.current_tick, 7);
        assert!(reset.driver_value(&FLAG));

        let cleared = reset.cleared();
        assert!(!cleared.is_resetting());
        assert!(!state.is_resetting());
    }
}
