//! # Critical Sections
//!
//! Interrupt-safe critical section abstraction. On a Cortex-M target the
//! implementation comes from `cortex-m`'s `critical-section-single-core`
//! feature (PRIMASK save, `cpsid i`, restore). Host test builds link the
//! `critical-section` crate's `std` implementation instead.
//!
//! Sections nest: the restore state captured on entry is what gets written
//! back on exit, so an inner section never re-enables interrupts that an outer
//! section disabled.

pub use critical_section::CriticalSection;

/// Execute a closure within a critical section (interrupts disabled).
///
/// This is the only way the lock flag of a [`Mutex`](crate::Mutex) is read
/// or written. Keep the closure to a few instructions; interrupt latency
/// grows with it.
///
/// # Usage
/// ```ignore
/// sync::critical_section(|cs| {
///     // Access shared state safely
/// });
/// ```
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(CriticalSection<'_>) -> R,
{
    critical_section::with(f)
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
