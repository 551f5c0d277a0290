//! # Mutex Registry
//!
//! Owns every [`Mutex`] of a firmware image together with the [`Runtime`]
//! they wait on, and hands out [`ScopedLock`]s by resource index. One
//! registry replaces a scatter of top-level mutex globals while keeping
//! exactly one mutex per protected resource.
//!
//! ```ignore
//! const UART: usize = 0;
//! const SENSOR: usize = 1;
//!
//! static LOCKS: MutexRegistry<CortexM4Runtime, 2> =
//!     MutexRegistry::new(CortexM4Runtime::new());
//!
//! let mut lock = LOCKS.locker(UART)?;
//! if lock.lock() {
//!     // ...
//! }
//! ```

use fugit::MicrosDurationU32;

use crate::error::{Error, Result};
use crate::locker::ScopedLock;
use crate::mutex::Mutex;
use crate::runtime::Runtime;

/// `N` mutexes sharing one runtime.
pub struct MutexRegistry<R: Runtime, const N: usize> {
    runtime: R,
    mutexes: [Mutex; N],
}

impl<R: Runtime, const N: usize> MutexRegistry<R, N> {
    /// All mutexes unlocked, with the default timeout.
    pub const fn new(runtime: R) -> Self {
        Self {
            runtime,
            mutexes: [Mutex::UNLOCKED; N],
        }
    }

    /// All mutexes unlocked, each with `timeout` as its default bound.
    pub const fn with_timeout(runtime: R, timeout: MicrosDurationU32) -> Self {
        let mut mutexes = [Mutex::UNLOCKED; N];
        let mut i = 0;
        while i < N {
            mutexes[i] = Mutex::with_timeout(timeout);
            i += 1;
        }
        Self { runtime, mutexes }
    }

    /// Number of registered mutexes.
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// The mutex for resource `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Mutex> {
        self.mutexes.get(index)
    }

    /// A fresh handle bound to the mutex for resource `index`. The lock is
    /// not taken yet.
    pub fn locker(&self, index: usize) -> Result<ScopedLock<'_, R>> {
        match self.mutexes.get(index) {
            Some(mutex) => Ok(ScopedLock::new(mutex, &self.runtime)),
            None => {
                log::debug!("no mutex registered at index {}", index);
                Err(Error::UnknownResource { index, len: N })
            }
        }
    }

    /// The runtime the registry's locks wait on.
    #[inline]
    pub fn runtime(&self) -> &R {
        &self.runtime
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
