//! Wall-clock to tick conversion.

use std::time::Duration;

use crate::math::TICK_RATE;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fixed-step accumulator.
///
/// Elapsed time is kept in nanoseconds scaled by the tick rate, so a tick
/// fires exactly when a whole `1 / TICK_RATE` second has built up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchClock {
    scaled_nanos: u128,
    max_catch_up: u32,
    dropped: u64,
}

impl MatchClock {
    /// Clock that runs at most `max_catch_up` ticks per update.
    #[must_use]
    pub const fn new(max_catch_up: u32) -> Self {
        Self {
            scaled_nanos: 0,
            max_catch_up,
            dropped: 0,
        }
    }

    /// Feed elapsed time, returning whole ticks to run.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        self.scaled_nanos += dt.as_nanos() * u128::from(TICK_RATE);
        let due = self.scaled_nanos / NANOS_PER_SEC;
        self.scaled_nanos %= NANOS_PER_SEC;

        let cap = u128::from(self.max_catch_up);
        if due > cap {
            let dropped = u64::try_from(due - cap).unwrap_or(u64::MAX);
            self.dropped = self.dropped.saturating_add(dropped);
            tracing::trace!(dropped, "Clock fell behind");
        }
        u32::try_from(due.min(cap)).unwrap_or(self.max_catch_up)
    }

    /// Ticks skipped because an update exceeded the cap.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Discard partial time.
    pub fn reset(&mut self) {
        self.scaled_nanos = 0;
    }
}
