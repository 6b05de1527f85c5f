//! Scheduler configuration.

use std::time::Duration;

/// Default yield threshold: stop when less than 1 ms of the slice remains.
pub const DEFAULT_YIELD_THRESHOLD: Duration = Duration::from_millis(1);

/// Default budget `Runtime::tick` grants itself (~60fps).
pub const DEFAULT_FRAME_BUDGET: Duration = Duration::from_millis(16);

/// Tuning knobs for the work loop.
///
/// Deadlines are advisory: the loop checks them between units of work and
/// never interrupts a unit in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Yield once the deadline reports less than this much time remaining.
    pub yield_threshold: Duration,
    /// Slice length used by `tick` when the environment supplies no deadline.
    pub frame_budget: Duration,
}

impl SchedulerConfig {
    /// Builder: set the yield threshold.
    pub fn with_yield_threshold(mut self, threshold: Duration) -> Self {
        self.yield_threshold = threshold;
        self
    }

    /// Builder: set the frame budget.
    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = budget;
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            yield_threshold: DEFAULT_YIELD_THRESHOLD,
            frame_budget: DEFAULT_FRAME_BUDGET,
        }
    }
}
