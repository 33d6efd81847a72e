//! Adaptive full-pass scheduler.
//!
//! The full decision pass is the expensive part of a step, and its
//! cost swings with army size. The scheduler converts the measured
//! wall-clock cost of the last full pass into the number of steps to
//! wait before the next one, so a heavy pass thins itself out and a
//! cheap one runs nearly every step. Wall-clock time never enters the
//! simulated state; only the resulting interval does.

use std::time::Duration;

/// Wall-clock budget for one full pass, in seconds.
pub const BUDGET_SECONDS: f64 = 0.125;

/// Simulated steps per nominal second, the unit the interval is
/// expressed in.
pub const STEPS_PER_SECOND: f64 = 8.0;

/// Persistent scheduler state: the current full-pass interval.
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// A fresh scheduler runs a full pass on every step until the
    /// first cost measurement arrives.
    #[must_use]
    pub fn new() -> Self {
        Self { interval: 1 }
    }

    /// Current full-pass interval in steps. Always at least 1.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Whether `step` is a full decision pass under the current
    /// interval.
    #[must_use]
    pub fn is_full_pass(&self, step: u64) -> bool {
        step % u64::from(self.interval) == 0
    }

    /// Fold the measured cost of a full pass into the interval.
    ///
    /// `interval = round(cost / budget x steps_per_second) x 2`,
    /// floored to 1. The doubling biases toward skipping: a pass that
    /// exactly consumes the budget earns a 2-second gap rather than a
    /// 1-second one.
    pub fn record_cost(&mut self, cost: Duration) {
        let scaled = (cost.as_secs_f64() / BUDGET_SECONDS * STEPS_PER_SECOND).round();
        // The cast is safe: scaled is non-negative and a pathological
        // measurement saturates instead of wrapping.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = if scaled >= f64::from(u32::MAX / 2) {
            u32::MAX / 2
        } else {
            scaled as u32
        };
        let next = (steps * 2).max(1);
        if next != self.interval {
            tracing::debug!(
                from = self.interval,
                to = next,
                ?cost,
                "full-pass interval updated"
            );
        }
        self.interval = next;
    }
}
