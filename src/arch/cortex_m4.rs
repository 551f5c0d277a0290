//! # Cortex-M4 Runtime
//!
//! [`Runtime`] for a bare-metal ARM Cortex-M4 (Thumb-2) target.
//!
//! ## Clock
//!
//! The DWT cycle counter (`CYCCNT`) runs at the core clock and wraps after
//! 2^32 cycles (about 268 s at 16 MHz). Dividing it down would give a
//! microsecond counter that wraps at 2^28, not at 2^32, which breaks the
//! wrapping-subtraction elapsed-time rule. Instead each read accumulates the
//! cycle delta since the previous read into a full-width wrapping `u32`
//! microsecond counter, carrying the sub-microsecond residue forward.
//!
//! The clock must be read at least once per `CYCCNT` period for the
//! accumulation to stay exact; any lock activity does that.
//!
//! ## Yield
//!
//! With a cooperative scheduler, install its yield entry point via
//! [`CortexM4Runtime::with_yield_hook`]. Without one, a yield is a short fixed
//! delay of `YIELD_DELAY_CYCLES`.

use core::cell::Cell;

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::{DCB, DWT, SYST};

use crate::clock::MonotonicClock;
use crate::config::{SYSTEM_CLOCK_HZ, YIELD_DELAY_CYCLES};
use crate::runtime::Runtime;
use crate::sync;

const CYCLES_PER_MICRO: u64 = (SYSTEM_CLOCK_HZ / 1_000_000) as u64;

// ---------------------------------------------------------------------------
// Cycle → microsecond accumulation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClockState {
    /// `CYCCNT` at the previous read.
    last_cycles: u32,
    /// Wrapping microsecond counter.
    micros: u32,
    /// Cycles not yet worth a whole microsecond.
    residue: u32,
}

impl ClockState {
    const ZERO: ClockState = ClockState {
        last_cycles: 0,
        micros: 0,
        residue: 0,
    };

    fn advance(self, cycles: u32) -> Self {
        let total = u64::from(cycles.wrapping_sub(self.last_cycles)) + u64::from(self.residue);
        Self {
            last_cycles: cycles,
            micros: self.micros.wrapping_add((total / CYCLES_PER_MICRO) as u32),
            residue: (total % CYCLES_PER_MICRO) as u32,
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// DWT-backed clock plus yield hook.
///
/// `const`-constructible so it can sit inside a `static`
/// [`MutexRegistry`](crate::MutexRegistry). Call [`enable_cycle_counter`]
/// once at start-up before the first lock attempt.
pub struct CortexM4Runtime {
    clock: critical_section::Mutex<Cell<ClockState>>,
    yield_hook: Option<fn()>,
}

impl CortexM4Runtime {
    /// Runtime whose yield is a fixed `YIELD_DELAY_CYCLES` delay.
    pub const fn new() -> Self {
        Self {
            clock: critical_section::Mutex::new(Cell::new(ClockState::ZERO)),
            yield_hook: None,
        }
    }

    /// Runtime whose yield calls `hook`, e.g. a scheduler's `yield_task`.
    pub const fn with_yield_hook(hook: fn()) -> Self {
        Self {
            clock: critical_section::Mutex::new(Cell::new(ClockState::ZERO)),
            yield_hook: Some(hook),
        }
    }
}

impl Default for CortexM4Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for CortexM4Runtime {
    fn now_micros(&self) -> u32 {
        sync::critical_section(|cs| {
            // Read CYCCNT inside the section so a preempting reader cannot
            // store a newer `last_cycles` between our read and our update.
            let cell = self.clock.borrow(cs);
            let state = cell.get().advance(DWT::cycle_count());
            cell.set(state);
            state.micros
        })
    }
}

impl Runtime for CortexM4Runtime {
    fn yield_now(&self) {
        match self.yield_hook {
            Some(hook) => hook(),
            None => cortex_m::asm::delay(YIELD_DELAY_CYCLES),
        }
    }
}

// ---------------------------------------------------------------------------
// Peripheral setup
// ---------------------------------------------------------------------------

/// Start the DWT cycle counter that backs [`CortexM4Runtime`]'s clock.
pub fn enable_cycle_counter(dcb: &mut DCB, dwt: &mut DWT) {
    dcb.enable_trace();
    dwt.enable_cycle_counter();
}

/// Configure SysTick to fire at `tick_hz` from the processor clock.
pub fn configure_systick(syst: &mut SYST, tick_hz: u32) {
    let reload = SYSTEM_CLOCK_HZ / tick_hz - 1;
    syst.set_reload(reload);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
