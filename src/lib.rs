//! # irqlock — Interrupt-Masking Lock
//!
//! A timeout-bounded mutex with scope-bound release for single-core,
//! interrupt-driven firmware on cores without compare-and-swap.
//!
//! ## Overview
//!
//! On a single core the only sources of preemption are interrupt handlers.
//! Disabling interrupt delivery around a test-and-set of a flag is therefore
//! enough to make that test-and-set atomic, and it is the only atomicity
//! mechanism available on cores without CAS.
//!
//! - **No blocking**: there is no scheduler to sleep on. A waiter busy-polls,
//!   yielding to cooperative work between polls, for at most a timeout.
//! - **Scope-bound release**: locks are only taken through a [`ScopedLock`],
//!   which gives the lock back when it goes out of scope.
//! - **No force-release**: a handle that never got the lock never clears it.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                  Firmware / ISR code                    │
//! ├────────────────────────────────────────────────────────┤
//! │     MutexRegistry (registry.rs) · ScopedLock (locker.rs)│
//! │     locker() · acquire() · lock() · release() · Drop    │
//! ├────────────────────────────┬───────────────────────────┤
//! │  Mutex (mutex.rs)          │  Runtime (runtime.rs)     │
//! │  ─ held flag               │  ─ MonotonicClock (clock) │
//! │  ─ RawMutex (crate-only)   │  ─ yield_now()            │
//! ├────────────────────────────┴───────────────────────────┤
//! │     Critical sections (sync.rs, critical-section)       │
//! ├────────────────────────────────────────────────────────┤
//! │       Arch runtime (arch/cortex_m4.rs: DWT, SysTick)    │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Memory Model
//!
//! - **No heap**: no `alloc`, pure `core`
//! - **`const` construction**: mutexes, registries and the Cortex-M4 runtime
//!   can live in `static`s shared with interrupt handlers
//! - **Critical sections**: `critical_section::with()` for the lock flag,
//!   provided by `cortex-m`'s single-core implementation on target

#![no_std]

#[cfg(test)]
extern crate std;

pub mod arch;
pub mod clock;
pub mod config;
pub mod error;
pub mod locker;
pub mod mutex;
pub mod registry;
pub mod runtime;
pub mod sync;

#[cfg(test)]
mod testing;

pub use clock::{elapsed_micros, MonotonicClock};
pub use error::{Error, Result};
pub use locker::ScopedLock;
pub use mutex::Mutex;
pub use registry::MutexRegistry;
pub use runtime::Runtime;

pub use fugit::MicrosDurationU32;
