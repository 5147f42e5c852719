//! Platform error types
//!
//! This module defines error types for flash driver operations.

use core::fmt;

/// Flash driver errors
///
/// All driver implementations map their HAL-specific statuses to these
/// variants; the persistence engine propagates them unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Erase operation failed
    EraseFailed,
    /// Program operation failed
    ProgramFailed,
    /// Program or erase attempted while the driver is locked
    WriteProtected,
    /// Address is not half-word (program) or page (erase) aligned
    UnalignedAddress,
    /// Address outside the flash device
    InvalidAddress,
}

impl fmt::Display for FlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlashError::EraseFailed => write!(f, "erase failed"),
            FlashError::ProgramFailed => write!(f, "program failed"),
            FlashError::WriteProtected => write!(f, "flash is write-protected"),
            FlashError::UnalignedAddress => write!(f, "unaligned flash address"),
            FlashError::InvalidAddress => write!(f, "address outside flash"),
        }
    }
}
