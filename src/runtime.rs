//! # Runtime Hooks
//!
//! What the hosting runtime must provide for a lock to wait: a clock to bound
//! the wait and a yield hook so the wait does not monopolize a cooperative
//! scheduler.

use crate::clock::MonotonicClock;

/// Clock plus cooperative yield, supplied by the hosting runtime.
///
/// Implementations exist for the Cortex-M4 target
/// ([`CortexM4Runtime`](crate::arch::cortex_m4::CortexM4Runtime)); firmware
/// with its own scheduler implements this against that scheduler.
pub trait Runtime: MonotonicClock {
    /// Surrender the processor to other ready cooperative work.
    ///
    /// Must always return, after an unspecified but bounded time. Runtimes
    /// without a scheduler may busy-wait for a short fixed delay instead.
    fn yield_now(&self);
}
