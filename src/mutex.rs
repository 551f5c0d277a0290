//! # Mutex
//!
//! A flag-only mutual exclusion primitive for single-core targets without
//! compare-and-swap. The test-and-set of the `held` flag runs inside a
//! critical section, which makes it atomic with respect to interrupt
//! handlers: no handler can slip in between reading `held == false` and
//! writing `held = true`.
//!
//! ## Acquisition Protocol
//!
//! ```text
//! start = now
//! while elapsed(start) < timeout:
//!     ┌─ critical section ─────────────┐
//!     │ if !held { held = true; ok }   │
//!     └────────────────────────────────┘
//!     if ok: return true
//!     yield
//! return false
//! ```
//!
//! The wait is bounded so that a holder that never releases (preempted and
//! never resumed, or a bug) turns into a reported failure rather than a hang.
//! There is no queueing: whichever waiter re-polls first after a release wins.
//!
//! ## Access
//!
//! `Mutex` itself exposes no way to lock or unlock. Those live on the
//! crate-private [`RawMutex`] capability, which only
//! [`ScopedLock`](crate::ScopedLock) calls, so every successful acquisition
//! is paired with a scope-bound release.

use core::cell::Cell;

use fugit::MicrosDurationU32;

use crate::config::{DEFAULT_TIMEOUT, MAX_TIMEOUT};
use crate::runtime::Runtime;
use crate::sync;

/// Lock state for one protected resource.
///
/// Usually owned by a [`MutexRegistry`](crate::MutexRegistry); can also live
/// in a `static` since construction is `const`.
pub struct Mutex {
    /// True iff some [`ScopedLock`](crate::ScopedLock) currently holds the lock.
    held: critical_section::Mutex<Cell<bool>>,
    /// Bound used by [`ScopedLock::lock`](crate::ScopedLock::lock).
    timeout: MicrosDurationU32,
}

impl Mutex {
    /// An unlocked mutex with [`DEFAULT_TIMEOUT`]. Usable as an array
    /// repeat operand.
    pub const UNLOCKED: Mutex = Mutex::new();

    /// Create an unlocked mutex with [`DEFAULT_TIMEOUT`].
    pub const fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create an unlocked mutex whose default acquisition bound is `timeout`,
    /// clamped to [`MAX_TIMEOUT`].
    pub const fn with_timeout(timeout: MicrosDurationU32) -> Self {
        Self {
            held: critical_section::Mutex::new(Cell::new(false)),
            timeout: clamp_timeout(timeout),
        }
    }

    /// Default acquisition bound for this mutex.
    #[inline]
    pub const fn timeout(&self) -> MicrosDurationU32 {
        self.timeout
    }

    /// Snapshot of the lock state. Stale as soon as it returns; for
    /// diagnostics only.
    pub fn is_locked(&self) -> bool {
        sync::critical_section(|cs| self.held.borrow(cs).get())
    }

    /// One test-and-set attempt.
    #[inline]
    fn test_and_set(&self) -> bool {
        sync::critical_section(|cs| {
            let held = self.held.borrow(cs);
            if held.get() {
                false
            } else {
                held.set(true);
                true
            }
        })
    }
}

/// Bounds at or past half the counter period would let `elapsed` wrap back
/// below the bound before the loop sees it expire.
#[inline]
const fn clamp_timeout(timeout: MicrosDurationU32) -> MicrosDurationU32 {
    if timeout.ticks() > MAX_TIMEOUT.ticks() {
        MAX_TIMEOUT
    } else {
        timeout
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Mutex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Mutex")
            .field("locked", &self.is_locked())
            .field("timeout_us", &self.timeout.ticks())
            .finish()
    }
}

/// Lock and unlock, restricted to the scoped handle.
pub(crate) trait RawMutex {
    /// Busy-wait up to `timeout` (clamped to [`MAX_TIMEOUT`]) for the lock,
    /// yielding between attempts. Returns whether the lock was taken. Never
    /// marks the lock held on failure.
    fn acquire<R: Runtime + ?Sized>(&self, runtime: &R, timeout: MicrosDurationU32) -> bool;

    /// Single attempt, no waiting.
    fn try_once(&self) -> bool;

    /// Clear the flag. Idempotent, and blind to who holds the lock.
    fn release(&self);
}

impl RawMutex for Mutex {
    fn acquire<R: Runtime + ?Sized>(&self, runtime: &R, timeout: MicrosDurationU32) -> bool {
        let timeout = clamp_timeout(timeout);
        let start = runtime.now_micros();
        let mut acquired = false;

        while runtime.elapsed_since(start) < timeout {
            acquired = self.test_and_set();
            if acquired {
                break;
            }
            runtime.yield_now();
        }

        if acquired {
            log::trace!("mutex acquired after {} us", runtime.elapsed_since(start).ticks());
        } else {
            log::debug!("mutex acquisition timed out after {} us", timeout.ticks());
        }
        acquired
    }

    #[inline]
    fn try_once(&self) -> bool {
        self.test_and_set()
    }

    #[inline]
    fn release(&self) {
        sync::critical_section(|cs| self.held.borrow(cs).set(false));
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
