//! Mock platform implementation for testing
//!
//! This module provides in-memory implementations of the platform traits
//! so the store can be exercised without hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled (host targets only)

#![cfg(any(test, feature = "mock"))]

mod flash;
mod watchdog;

pub use flash::MockFlash;
pub use watchdog::MockWatchdog;
