//! Platform abstraction layer
//!
//! This module provides the hardware contracts the persistence engine is
//! built against: a word-programmable NOR flash driver and a watchdog.
//! All hardware-specific code lives behind these traits.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::FlashError;
pub use traits::{FlashInterface, IdleWatchdog, WatchdogInterface};
