//! # irqlock Demo Firmware
//!
//! A main loop and the SysTick handler contend for two resources held in a
//! single static [`MutexRegistry`]:
//!
//! | Resource  | Main loop                          | SysTick handler            |
//! |-----------|------------------------------------|----------------------------|
//! | `COUNTER` | split read-modify-write under lock | same, `try_lock` only       |
//! | `REPORT`  | snapshots counters under lock      | not used                   |
//!
//! ## Expected Behavior
//!
//! 1. **Main loop holds, tick fires**: the handler cannot wait for the main
//!    loop (which only resumes after the handler returns), so it makes a
//!    single attempt, fails, and counts a skip instead of corrupting the
//!    counter.
//! 2. **Main loop idle, tick fires**: the handler takes the lock and bumps
//!    the counter.
//! 3. **Invariant**: `COUNTER == MAIN_INCREMENTS + TICK_INCREMENTS` at every
//!    snapshot taken under the lock.

#![no_std]
#![no_main]

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m_rt::{entry, exception};
use panic_halt as _;

use irqlock::arch::cortex_m4::{self, CortexM4Runtime};
use irqlock::config::TICK_HZ;
use irqlock::MutexRegistry;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

const COUNTER: usize = 0;
const REPORT: usize = 1;

/// Every mutex of the image, owned in one place.
static LOCKS: MutexRegistry<CortexM4Runtime, 2> = MutexRegistry::new(CortexM4Runtime::new());

/// Protected by `COUNTER`. Atomics only so the static is `Sync`; the
/// load/store pairs below are deliberately not atomic as a whole.
static TOTAL: AtomicU32 = AtomicU32::new(0);
static MAIN_INCREMENTS: AtomicU32 = AtomicU32::new(0);
static TICK_INCREMENTS: AtomicU32 = AtomicU32::new(0);
static TICK_SKIPS: AtomicU32 = AtomicU32::new(0);

/// Protected by `REPORT`.
static LAST_GOOD_SNAPSHOT: AtomicU32 = AtomicU32::new(0);
static MISMATCHES: AtomicU32 = AtomicU32::new(0);

fn bump_total() {
    let v = TOTAL.load(Ordering::Relaxed);
    // Widen the race window
    cortex_m::asm::delay(200);
    TOTAL.store(v.wrapping_add(1), Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// SysTick handler
// ---------------------------------------------------------------------------

#[exception]
fn SysTick() {
    let Ok(mut lock) = LOCKS.locker(COUNTER) else {
        return;
    };

    // Spinning here would only burn the timeout: the holder is the code this
    // handler preempted.
    if lock.try_lock() {
        bump_total();
        TICK_INCREMENTS.fetch_add(1, Ordering::Relaxed);
    } else {
        TICK_SKIPS.fetch_add(1, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Firmware entry point. Starts the cycle counter and SysTick, then loops
/// forever.
#[entry]
fn main() -> ! {
    // Take ownership of core peripherals
    let mut cp = cortex_m::Peripherals::take().unwrap();

    cortex_m4::enable_cycle_counter(&mut cp.DCB, &mut cp.DWT);
    cortex_m4::configure_systick(&mut cp.SYST, TICK_HZ);

    loop {
        match LOCKS.locker(COUNTER) {
            Ok(mut lock) => {
                if lock.lock() {
                    bump_total();
                    MAIN_INCREMENTS.fetch_add(1, Ordering::Relaxed);
                }
            }
            Err(_) => continue,
        }

        if let Ok(mut report) = LOCKS.locker(REPORT) {
            if report.lock() {
                // Nest the counter lock so the three values are consistent
                if let Ok(mut counter) = LOCKS.locker(COUNTER) {
                    if counter.lock() {
                        let total = TOTAL.load(Ordering::Relaxed);
                        let expected = MAIN_INCREMENTS
                            .load(Ordering::Relaxed)
                            .wrapping_add(TICK_INCREMENTS.load(Ordering::Relaxed));
                        if total == expected {
                            LAST_GOOD_SNAPSHOT.store(total, Ordering::Relaxed);
                        } else {
                            MISMATCHES.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            }
        }
    }
}
