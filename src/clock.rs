//! # Monotonic Clock
//!
//! The lock's notion of time: a free-running microsecond counter that wraps
//! from `u32::MAX` back to zero (about every 71.6 minutes).
//!
//! Elapsed time is the wrapping difference `now - start`. Unsigned modular
//! subtraction yields the true duration across one wrap, so there is no
//! branch on `now <= start`.

use fugit::MicrosDurationU32;

/// A free-running, wrapping, microsecond-resolution counter supplied by the
/// hosting runtime.
pub trait MonotonicClock {
    /// Current counter value in microseconds.
    fn now_micros(&self) -> u32;

    /// Time elapsed since `start`, which must have been read from this clock.
    #[inline]
    fn elapsed_since(&self, start: u32) -> MicrosDurationU32 {
        MicrosDurationU32::micros(elapsed_micros(start, self.now_micros()))
    }
}

/// Microseconds between two readings of a wrapping `u32` counter.
///
/// Correct as long as less than one full counter period separates them.
#[inline]
pub const fn elapsed_micros(start: u32, now: u32) -> u32 {
    now.wrapping_sub(start)
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
