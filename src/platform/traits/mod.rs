//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod flash;
pub mod watchdog;

// Re-export trait interfaces
pub use flash::FlashInterface;
pub use watchdog::{IdleWatchdog, WatchdogInterface};
