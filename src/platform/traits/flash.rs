//! Flash interface trait
//!
//! This module defines the NOR flash driver contract the persistence
//! engine orchestrates. The driver exposes erase and half-word program
//! primitives; reads are plain loads from the memory-mapped flash window,
//! abstracted here so tests can back them with a simulator.

use crate::platform::error::FlashError;

/// NOR flash driver interface
///
/// Platform implementations must provide this interface for the region
/// backing the emulated store.
///
/// # Flash Characteristics
///
/// - Flash is organized in pages (the minimum erasable unit)
/// - Erase operations set every byte of a page to 0xFF
/// - Programming can only change bits from 1 to 0 (erase first to reset)
/// - Program granularity is one half-word at an even address
/// - Erase and program operations are blocking and can take 100ms+
///
/// # Safety Invariants
///
/// - Program and erase must be bracketed by [`unlock`]/[`lock`]; the
///   persistence engine owns that bracketing on every path
/// - Only one owner per flash instance (no concurrent access)
/// - Implementations must reject addresses outside the device
///
/// [`unlock`]: FlashInterface::unlock
/// [`lock`]: FlashInterface::lock
pub trait FlashInterface {
    /// Enable program and erase operations.
    fn unlock(&mut self);

    /// Disable program and erase operations.
    ///
    /// Must be called after every unlocked sequence, including on error
    /// paths, so a runaway write cannot touch the device.
    fn lock(&mut self);

    /// Erase one page to all-ones.
    ///
    /// # Arguments
    ///
    /// - `address`: page-aligned flash address
    ///
    /// # Errors
    ///
    /// [`FlashError::WriteProtected`] when locked,
    /// [`FlashError::UnalignedAddress`] off page boundaries,
    /// [`FlashError::InvalidAddress`] outside the device,
    /// [`FlashError::EraseFailed`] when the operation itself fails.
    fn erase_page(&mut self, address: u32) -> Result<(), FlashError>;

    /// Program one half-word.
    ///
    /// Every 0-bit in `value` must correspond to a currently erased (1)
    /// bit in flash; NOR programming cannot set bits.
    ///
    /// # Arguments
    ///
    /// - `address`: half-word-aligned flash address
    /// - `value`: the 16-bit value to program
    ///
    /// # Errors
    ///
    /// [`FlashError::WriteProtected`] when locked,
    /// [`FlashError::UnalignedAddress`] at odd addresses,
    /// [`FlashError::InvalidAddress`] outside the device,
    /// [`FlashError::ProgramFailed`] when the operation itself fails.
    fn program_half_word(&mut self, address: u32, value: u16) -> Result<(), FlashError>;

    /// Read one half-word.
    ///
    /// Equivalent to a memory-mapped load from the flash window; always
    /// allowed, locked or not.
    fn read_half_word(&self, address: u32) -> u16;
}
