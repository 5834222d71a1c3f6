use super::Driver;

/// One-shot boolean pulse.
///
/// [`TriggerDriver::trigger`] arms the pulse for a number of ticks; the first
/// [`TriggerDriver::run_if_triggered`] call consumes it, and an unconsumed pulse decays on its
/// own during `post_tick` once the armed ticks have passed.
#[derive(Clone, Debug)]
pub struct TriggerDriver {
    triggered: bool,
    ticks_remaining: u32,
    duration_ticks: u32,
}

impl Default for TriggerDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerDriver {
    pub fn new() -> Self {
        Self::with_duration(1)
    }

    /// Pulse that stays armed for `duration_ticks` ticks (at least one).
    pub fn with_duration(duration_ticks: u32) -> Self {
        Self {
            triggered: false,
            ticks_remaining: 0,
            duration_ticks: duration_ticks.max(1),
        }
    }

    pub fn trigger(&mut self) {
        self.triggered = true;
        self.ticks_remaining = self.duration_ticks;
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Runs `action` and consumes the pulse if the driver is armed. Returns whether it ran.
    pub fn run_if_triggered(&mut self, action: impl FnOnce()) -> bool {
        if !self.triggered {
            return false;
        }
        self.triggered = false;
        self.ticks_remaining = 0;
        action();
        true
    }
}

impl Driver for TriggerDriver {
    type Value = bool;

    fn value_interpolated(&self, _partial_tick: f32) -> bool {
        self.triggered
    }

    fn push_current_to_previous(&mut self) {}

    fn post_tick(&mut self) {
        if self.triggered {
            self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
            if self.ticks_remaining == 0 {
                self.triggered = false;
            }
        }
    }
}
