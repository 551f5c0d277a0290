//! # irqlock Configuration
//!
//! Compile-time defaults for lock acquisition and the Cortex-M4 runtime.
//! Every timeout here can be overridden per mutex or per call.

use fugit::MicrosDurationU32;

/// Default upper bound on how long an acquisition attempt busy-waits.
///
/// Used by [`Mutex::new`](crate::Mutex::new) and
/// [`ScopedLock::lock`](crate::ScopedLock::lock). Short on purpose: the
/// protected regions are expected to be a handful of instructions long.
/// Raise it with [`Mutex::with_timeout`](crate::Mutex::with_timeout) when the
/// holder does real work.
pub const DEFAULT_TIMEOUT: MicrosDurationU32 = MicrosDurationU32::micros(100);

/// Longest accepted acquisition bound: half the microsecond counter period
/// (about 35.8 minutes). Longer timeouts are clamped to this, so the
/// overshoot past the bound stays within one yield and cannot reach the
/// next counter wrap.
pub const MAX_TIMEOUT: MicrosDurationU32 = MicrosDurationU32::micros(i32::MAX as u32);

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
/// The DWT cycle counter runs at this rate.
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// Cycles burned by the fallback yield when no cooperative scheduler hook is
/// installed. About 2 µs at `SYSTEM_CLOCK_HZ`.
pub const YIELD_DELAY_CYCLES: u32 = 32;

/// SysTick frequency of the demo firmware in Hz.
pub const TICK_HZ: u32 = 1000;
