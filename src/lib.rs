#![cfg_attr(not(test), no_std)]

//! nor_eeprom - emulated EEPROM on block-erasable NOR flash
//!
//! This library provides a byte-addressable, persistent key-value store on
//! top of a NOR flash region that can only be erased a page at a time and
//! programmed a half-word at a time. Small mutations are folded into a
//! compact write log so that flash endurance stretches across many updates;
//! the log is replayed into a RAM image on boot and compacted back into a
//! dense snapshot when it fills.

// Platform abstraction layer: flash driver and watchdog contracts, plus
// mock implementations for host tests
pub mod platform;

// The emulated store: layout, log codec, RAM image and persistence engine
pub mod eeprom;

// Logging; #[macro_export] places log_info! and the other level macros
// at the crate root
pub mod logging;

#[cfg(any(test, feature = "mock"))]
extern crate std;

pub use eeprom::{Eeprom, EepromError, WriteOutcome};
pub use platform::{FlashInterface, IdleWatchdog, WatchdogInterface};
