//! Monotonic clocks.
//!
//! Times are milliseconds as `f64`, matching what frame callbacks receive.

use std::cell::Cell;
use std::time::Instant;

/// A monotonic millisecond clock.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock that only moves when told to. Used by tests and headless hosts.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ms: f64) -> Self {
        Self { now: Cell::new(ms) }
    }

    /// Jump to `ms`. Going backwards is ignored.
    pub fn set(&self, ms: f64) {
        if ms >= self.now.get() {
            self.now.set(ms);
        }
    }

    pub fn advance(&self, ms: f64) {
        self.set(self.now.get() + ms.max(0.0));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}
