//! # irqlock errors
//!
//! The `bool` returned by [`ScopedLock::acquire`](crate::ScopedLock::acquire)
//! is the primary failure signal. The `Result` flavoured entry points report
//! through [`Error`] instead, so callers can use `?`.

use core::fmt;

/// Recoverable failures of lock acquisition and registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The mutex stayed held for the whole timeout. Also what a caller sees
    /// when it already holds the lock itself (the mutex is not reentrant).
    TimedOut {
        /// The bound that expired, in microseconds.
        timeout_us: u32,
    },
    /// No mutex is registered under this index.
    UnknownResource {
        /// Requested index.
        index: usize,
        /// Number of mutexes in the registry.
        len: usize,
    },
}

impl core::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TimedOut { timeout_us } => {
                write!(f, "lock acquisition timed out after {} us", timeout_us)
            }
            Error::UnknownResource { index, len } => {
                write!(f, "no mutex at index {} (registry holds {})", index, len)
            }
        }
    }
}

/// Wraps a value with a possible [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::TimedOut { timeout_us: 100 }.to_string(),
            "lock acquisition timed out after 100 us"
        );
        assert_eq!(
            Error::UnknownResource { index: 3, len: 2 }.to_string(),
            "no mutex at index 3 (registry holds 2)"
        );
    }
}
