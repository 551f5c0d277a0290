//! Host-side runtimes for unit tests.

use core::cell::Cell;
use std::time::Instant;

use crate::clock::MonotonicClock;
use crate::runtime::Runtime;

/// Deterministic runtime: time only moves when a test advances it or when
/// the lock yields, each yield costing `yield_cost` microseconds.
pub struct ManualRuntime {
    now: Cell<u32>,
    yield_cost: u32,
    yields: Cell<u32>,
}

impl ManualRuntime {
    pub fn new(yield_cost: u32) -> Self {
        Self::starting_at(0, yield_cost)
    }

    pub fn starting_at(now: u32, yield_cost: u32) -> Self {
        Self {
            now: Cell::new(now),
            yield_cost,
            yields: Cell::new(0),
        }
    }

    pub fn advance(&self, micros: u32) {
        self.now.set(self.now.get().wrapping_add(micros));
    }

    pub fn yields(&self) -> u32 {
        self.yields.get()
    }
}

impl MonotonicClock for ManualRuntime {
    fn now_micros(&self) -> u32 {
        self.now.get()
    }
}

impl Runtime for ManualRuntime {
    fn yield_now(&self) {
        self.yields.set(self.yields.get() + 1);
        self.advance(self.yield_cost);
    }
}

/// Wall-clock runtime for tests that contend from several threads.
pub struct StdRuntime {
    origin: Instant,
}

impl StdRuntime {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl MonotonicClock for StdRuntime {
    fn now_micros(&self) -> u32 {
        // Truncation is the wrap of the counter
        self.origin.elapsed().as_micros() as u32
    }
}

impl Runtime for StdRuntime {
    fn yield_now(&self) {
        std::thread::yield_now();
    }
}
