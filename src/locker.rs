//! # Scoped Lock
//!
//! The public face of a [`Mutex`]: a stack-scoped handle that binds to one
//! mutex, takes the lock when the caller asks for it, and gives it back when
//! the scope ends by any path.
//!
//! ```text
//!            new()                 acquire() ok
//!   ──────► NotHeld ─────────────────────────► Held
//!              │  ▲                             │
//!              │  └──────── release() ──────────┤
//!         drop │                                │ drop
//!              ▼                                ▼
//!          (nothing)                      Mutex::release
//! ```
//!
//! The handle remembers whether it holds the lock and only releases on drop
//! when it does. A handle whose acquisition timed out therefore cannot clear
//! a lock that somebody else holds.
//!
//! # Usage
//! ```ignore
//! let mut lock = ScopedLock::new(&mutex, &runtime);
//! if lock.acquire(MicrosDurationU32::micros(100)) {
//!     // protected work
//! }
//! // released here if it was taken
//! ```

use fugit::MicrosDurationU32;

use crate::error::{Error, Result};
use crate::mutex::{Mutex, RawMutex};
use crate::runtime::Runtime;

/// Whether a [`ScopedLock`] currently owns its mutex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldState {
    NotHeld,
    Held,
}

/// Scope-bound handle on a [`Mutex`].
///
/// Binding performs no locking. A `false` from [`acquire`](Self::acquire)
/// means the caller is not protected and must skip the protected work (or
/// retry); nothing stops a caller that ignores it.
#[must_use = "the lock is released as soon as the handle is dropped"]
pub struct ScopedLock<'a, R: Runtime + ?Sized> {
    mutex: &'a Mutex,
    runtime: &'a R,
    state: HoldState,
}

impl<'a, R: Runtime + ?Sized> ScopedLock<'a, R> {
    /// Bind a handle to `mutex`. The lock is not taken.
    pub fn new(mutex: &'a Mutex, runtime: &'a R) -> Self {
        Self {
            mutex,
            runtime,
            state: HoldState::NotHeld,
        }
    }

    /// Try to take the lock, busy-waiting up to `timeout` and yielding to the
    /// runtime between attempts.
    ///
    /// Returns `true` once this handle holds the lock. The mutex is not
    /// reentrant: calling this again while already holding spins for the full
    /// timeout and returns `false`, and the handle keeps the lock it had.
    pub fn acquire(&mut self, timeout: MicrosDurationU32) -> bool {
        let acquired = self.mutex.acquire(self.runtime, timeout);
        if acquired {
            self.state = HoldState::Held;
        }
        acquired
    }

    /// [`acquire`](Self::acquire) with the bound mutex's configured timeout.
    pub fn lock(&mut self) -> bool {
        self.acquire(self.mutex.timeout())
    }

    /// Single test-and-set, no waiting and no yield.
    pub fn try_lock(&mut self) -> bool {
        let acquired = self.mutex.try_once();
        if acquired {
            self.state = HoldState::Held;
        }
        acquired
    }

    /// [`acquire`](Self::acquire), reporting a timeout as
    /// [`Error::TimedOut`].
    pub fn try_acquire(&mut self, timeout: MicrosDurationU32) -> Result<()> {
        if self.acquire(timeout) {
            Ok(())
        } else {
            Err(Error::TimedOut {
                timeout_us: timeout.ticks(),
            })
        }
    }

    /// Give the lock back before the end of the scope. Does nothing when
    /// this handle does not hold it.
    pub fn release(&mut self) {
        if self.state == HoldState::Held {
            self.mutex.release();
            self.state = HoldState::NotHeld;
            log::trace!("scoped lock released");
        }
    }

    /// Whether this handle holds its mutex.
    #[inline]
    pub fn is_held(&self) -> bool {
        self.state == HoldState::Held
    }

    /// The mutex this handle is bound to.
    #[inline]
    pub fn mutex(&self) -> &'a Mutex {
        self.mutex
    }
}

impl<R: Runtime + ?Sized> Drop for ScopedLock<'_, R> {
    #[inline]
    fn drop(&mut self) {
        if self.state == HoldState::Held {
            self.mutex.release();
        }
    }
}

impl<R: Runtime + ?Sized> core::fmt::Debug for ScopedLock<'_, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScopedLock")
            .field("mutex", self.mutex)
            .field("state", &self.state)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MonotonicClock;
    use crate::testing::{ManualRuntime, StdRuntime};
    use core::sync::atomic::{AtomicU32, Ordering};

    const TIMEOUT: MicrosDurationU32 = MicrosDurationU32::micros(100);

    #[test]
    fn test_construct_does_not_lock() {
        let rt = ManualRuntime::new(10);
        let m = Mutex::new();

        let lock = ScopedLock::new(&m, &rt);
        assert!(!lock.is_held());
        assert!(!m.is_locked());
        assert!(core::ptr::eq(lock.mutex(), &m));
    }

    #[test]
    fn test_drop_releases_held_lock() {
        let rt = ManualRuntime::new(10);
        let m = Mutex::new();

        {
            let mut lock = ScopedLock::new(&m, &rt);
            assert!(lock.acquire(TIMEOUT));
            assert!(lock.is_held());
            assert!(m.is_locked());
        }
        assert!(!m.is_locked(), "scope exit must release");
    }

    #[test]
    fn test_drop_without_acquire() {
        let rt = ManualRuntime::new(10);
        let m = Mutex::new();

        {
            let _lock = ScopedLock::new(&m, &rt);
        }
        assert!(!m.is_locked());
    }

    #[test]
    fn test_failed_acquire_does_not_clear_other_holder() {
        let rt = ManualRuntime::new(10);
        let m = Mutex::new();

        let mut holder = ScopedLock::new(&m, &rt);
        assert!(holder.acquire(TIMEOUT));

        {
            let mut loser = ScopedLock::new(&m, &rt);
            assert!(!loser.acquire(TIMEOUT));
            assert!(!loser.is_held());
        }
        assert!(m.is_locked(), "a timed-out handle must not force-release on drop");

        // Nor may an explicit release from the loser's position clear it
        {
            let mut bystander = ScopedLock::new(&m, &rt);
            bystander.release();
        }
        assert!(m.is_locked());
        assert!(holder.is_held());

        drop(holder);
        assert!(!m.is_locked());
    }

    #[test]
    fn test_reacquire_same_handle_is_not_reentrant() {
        let rt = ManualRuntime::new(10);
        let m = Mutex::new();

        let mut lock = ScopedLock::new(&m, &rt);
        assert!(lock.acquire(TIMEOUT));
        assert!(!lock.acquire(TIMEOUT), "second acquire must time out");
        assert!(lock.is_held(), "failed re-acquire keeps the lock already held");
        assert_eq!(rt.yields(), 10);

        drop(lock);
        assert!(!m.is_locked());
    }

    #[test]
    fn test_explicit_release_then_drop() {
        let rt = ManualRuntime::new(10);
        let m = Mutex::new();

        let mut first = ScopedLock::new(&m, &rt);
        assert!(first.lock());
        first.release();
        assert!(!first.is_held());
        assert!(!m.is_locked());

        // Someone else takes it; dropping `first` must leave it alone
        let mut second = ScopedLock::new(&m, &rt);
        assert!(second.try_lock());
        drop(first);
        assert!(m.is_locked());
        assert!(second.is_held());
    }

    #[test]
    fn test_release_twice_is_harmless() {
        let rt = ManualRuntime::new(10);
        let m = Mutex::new();

        let mut lock = ScopedLock::new(&m, &rt);
        assert!(lock.try_lock());
        lock.release();
        lock.release();
        assert!(!m.is_locked());
        assert!(lock.lock(), "handle can take the lock again after releasing");
    }

    #[test]
    fn test_lock_uses_mutex_timeout() {
        let rt = ManualRuntime::new(50);
        let m = Mutex::with_timeout(MicrosDurationU32::micros(1_000));

        let mut holder = ScopedLock::new(&m, &rt);
        assert!(holder.try_lock());

        let mut waiter = ScopedLock::new(&m, &rt);
        assert!(!waiter.lock());
        assert_eq!(rt.now_micros(), 1_000);
        assert_eq!(rt.yields(), 20);
    }

    #[test]
    fn test_try_acquire_reports_timeout() {
        let rt = ManualRuntime::new(10);
        let m = Mutex::new();

        let mut holder = ScopedLock::new(&m, &rt);
        assert_eq!(holder.try_acquire(TIMEOUT), Ok(()));

        let mut waiter = ScopedLock::new(&m, &rt);
        assert_eq!(
            waiter.try_acquire(TIMEOUT),
            Err(Error::TimedOut { timeout_us: 100 })
        );
    }

    #[test]
    fn test_at_most_one_holder_across_threads() {
        const THREADS: usize = 4;
        const ROUNDS: u32 = 200;

        let rt = StdRuntime::new();
        let m = Mutex::with_timeout(MicrosDurationU32::micros(1_000_000));
        let inside = AtomicU32::new(0);
        let total = AtomicU32::new(0);

        std::thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    let mut done = 0;
                    while done < ROUNDS {
                        let mut lock = ScopedLock::new(&m, &rt);
                        if !lock.lock() {
                            continue;
                        }
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0, "two holders");
                        // Split read-modify-write, only safe under the lock
                        let v = total.load(Ordering::Relaxed);
                        std::thread::yield_now();
                        total.store(v + 1, Ordering::Relaxed);
                        inside.fetch_sub(1, Ordering::SeqCst);
                        done += 1;
                    }
                });
            }
        });

        assert_eq!(total.load(Ordering::SeqCst), THREADS as u32 * ROUNDS);
        assert!(!m.is_locked());
    }
}
