//! # Architecture Runtimes
//!
//! Hardware-specific [`Runtime`](crate::Runtime) implementations. Currently
//! implements the Cortex-M4 port; other targets add sibling modules.

pub mod cortex_m4;
