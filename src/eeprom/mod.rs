//! Emulated EEPROM
//!
//! The store keeps a dense snapshot of the logical contents followed by a
//! write log of every change since that snapshot:
//!
//! ```text
//! ┌─ Snapshot ─┬ Write Log ─┐
//! │............│[BYTE][BYTE]│
//! │FFFF....FFFF│[WRD0][WRD1]│
//! │FFFFFFFFFFFF│[WORD][NEXT]│
//! │....FFFFFFFF│[BYTE][WRD0]│
//! ├────────────┼────────────┤
//! └─ SNAPSHOT  │            │
//!    _BASE     ┴─ LOG_BASE  │
//!                  LOG_END ─┘
//! ```
//!
//! Snapshot half-words hold the one's complement of the logical contents,
//! so an erased `0xFFFF` cell reads back as a logical zero and a freshly
//! erased region is a store full of zeros. The log region opens with a
//! 32-bit magic and carries 16-bit entries until the first still-erased
//! `0xFFFF` slot.
//!
//! On boot the snapshot is complemented into a RAM image and the log is
//! replayed over it; reads are then served from RAM alone. A write updates
//! RAM first and persists through the cheapest available path: straight
//! into a still-erased snapshot cell, else as a log entry, else by
//! compacting the whole image into a fresh snapshot when the log is full.

pub mod codec;
pub mod engine;
pub mod image;
pub mod layout;

#[cfg(feature = "dump")]
pub mod dump;

pub use engine::{Eeprom, EepromError, WriteOutcome};
