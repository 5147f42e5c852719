//! Persistence engine for the emulated store
//!
//! The engine owns the flash driver, the watchdog and the RAM image, and
//! decides how every mutation reaches flash:
//!
//! 1. If the RAM image already holds the value, nothing is written.
//! 2. If the snapshot half-word backing the address is still erased, the
//!    complemented value is programmed there directly, spending no log
//!    space. A new value of zero is fully elided: the erased cell already
//!    encodes it.
//! 3. Otherwise a log entry is appended: a one-word byte entry below
//!    address 0x80, a one-word entry for half-word values 0 and 1, or a
//!    two-word entry for everything else.
//! 4. If the entry would not fit, the log is compacted: the region is
//!    erased and the RAM image rewritten as a fresh snapshot. The entry is
//!    not retried afterwards; the new snapshot already carries the value.
//!
//! A write is durable once the final half-word of its encoding has been
//! programmed. Two-word entries store their value complemented, so a power
//! cut between the two programs is recognized on replay (the value slot
//! still reads erased, i.e. complements to zero) and the entry is dropped.

use core::fmt;

use super::codec::{self, LogEntry, BYTE_ENTRY_CEILING, ERASED_WORD};
use super::image::RamImage;
use super::layout::{
    DENSITY_BYTES, LOG_BASE, LOG_END, LOG_MAGIC, LOG_MAGIC_HIGH, LOG_MAGIC_LOW, PAGE_BASE_ADDRESS,
    PAGE_COUNT, PAGE_SIZE, SNAPSHOT_BASE, SNAPSHOT_END, WRITE_LOG_BYTES,
};
use crate::platform::error::FlashError;
use crate::platform::traits::{FlashInterface, WatchdogInterface};

/// Errors surfaced by store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromError {
    /// Address outside the logical store; nothing was changed.
    BadAddress,
    /// Driver status from a failed flash operation. The RAM image has
    /// already been updated, so a retry of the same write is a no-op.
    Flash(FlashError),
}

impl fmt::Display for EepromError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EepromError::BadAddress => write!(f, "address outside the store"),
            EepromError::Flash(e) => write!(f, "flash error: {:?}", e),
        }
    }
}

impl From<FlashError> for EepromError {
    fn from(error: FlashError) -> Self {
        EepromError::Flash(error)
    }
}

/// How a successful write reached persistence.
///
/// Ordered by how much of the machinery was engaged; compound operations
/// report the maximum across their parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteOutcome {
    /// The RAM image already held the value; flash untouched.
    Unchanged,
    /// Programmed into (or already represented by) the snapshot area.
    Snapshot,
    /// Appended to the write log.
    Logged,
    /// The log was full; the whole image was folded into a fresh snapshot.
    Compacted,
}

/// Run `f` with the driver unlocked, restoring the lock on every path.
fn with_unlocked<F: FlashInterface, R>(flash: &mut F, f: impl FnOnce(&mut F) -> R) -> R {
    flash.unlock();
    let result = f(flash);
    flash.lock();
    result
}

/// Fold one constituent of a compound write into its running result.
///
/// Compound operations attempt every constituent even after a failure, so
/// the RAM image always carries the whole value; the first failure is what
/// the caller sees, otherwise the costliest outcome.
fn fold_outcome(
    acc: Result<WriteOutcome, EepromError>,
    next: Result<WriteOutcome, EepromError>,
) -> Result<WriteOutcome, EepromError> {
    match (acc, next) {
        (Ok(a), Ok(b)) => Ok(a.max(b)),
        (Err(e), _) => Err(e),
        (Ok(_), Err(e)) => Err(e),
    }
}

/// The emulated EEPROM.
///
/// Owns the platform handles and the RAM image. Reads never touch flash
/// and cannot fail; out-of-range reads yield the erased-cell pattern
/// (0xFF / 0xFFFF). Writes go through the persistence cascade described in
/// the module docs.
pub struct Eeprom<F: FlashInterface, W: WatchdogInterface> {
    flash: F,
    pub(super) watchdog: W,
    pub(super) image: RamImage,
    /// Flash address of the next free log slot; the half-word there still
    /// reads erased. Only ever advances between compactions.
    empty_slot: u32,
}

impl<F: FlashInterface, W: WatchdogInterface> Eeprom<F, W> {
    /// Bring the store up: load the snapshot, validate the log magic and
    /// replay the log into the RAM image.
    ///
    /// A missing magic means there is no usable persistent state; the
    /// whole region is cleared and the store comes up holding whatever the
    /// snapshot load produced (all zeros on an erased part).
    pub fn init(flash: F, watchdog: W) -> Result<Self, EepromError> {
        let mut eeprom = Self {
            flash,
            watchdog,
            image: RamImage::new(),
            empty_slot: LOG_BASE + 4,
        };
        eeprom.load()?;
        crate::log_info!(
            "eeprom up, write log usage: {}/{} bytes",
            eeprom.log_bytes_used(),
            WRITE_LOG_BYTES
        );
        Ok(eeprom)
    }

    /// Size of the logical store in bytes.
    pub const fn density(&self) -> u16 {
        DENSITY_BYTES
    }

    /// Bytes of the log region consumed since the last compaction,
    /// including the 4-byte magic header.
    pub fn log_bytes_used(&self) -> u32 {
        self.empty_slot - LOG_BASE
    }

    /// The underlying flash driver.
    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Mutable driver access, for diagnostics and fault injection.
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Release the platform handles, e.g. to re-init after a reset.
    pub fn into_parts(self) -> (F, W) {
        (self.flash, self.watchdog)
    }

    /// Read one byte; out-of-range yields 0xFF.
    pub fn read_byte(&self, address: u16) -> u8 {
        if address < DENSITY_BYTES {
            self.image.byte(address)
        } else {
            0xFF
        }
    }

    /// Read one half-word at any alignment; out-of-range yields 0xFFFF.
    pub fn read_word(&self, address: u16) -> u16 {
        if address < DENSITY_BYTES - 1 {
            if address % 2 == 1 {
                self.image.byte(address) as u16 | (self.image.byte(address + 1) as u16) << 8
            } else {
                self.image.word(address)
            }
        } else {
            0xFFFF
        }
    }

    /// Read a 32-bit value, composed of two half-word reads when aligned
    /// or byte+word+byte when not.
    pub fn read_dword(&self, address: u16) -> u32 {
        if address % 2 == 1 {
            self.read_byte(address) as u32
                | (self.read_word(address.wrapping_add(1)) as u32) << 8
                | (self.read_byte(address.wrapping_add(3)) as u32) << 24
        } else {
            self.read_word(address) as u32 | (self.read_word(address.wrapping_add(2)) as u32) << 16
        }
    }

    /// Copy `buf.len()` bytes out of the store starting at `address`.
    ///
    /// A leading single byte is read when `address` is odd, then whole
    /// half-words, then a trailing byte.
    pub fn read_block(&self, buf: &mut [u8], address: u16) {
        let mut src = address;
        let mut i = 0;

        if !buf.is_empty() && src % 2 == 1 {
            buf[i] = self.read_byte(src);
            i += 1;
            src = src.wrapping_add(1);
        }

        while buf.len() - i > 1 {
            let word = self.read_word(src);
            buf[i..i + 2].copy_from_slice(&word.to_le_bytes());
            i += 2;
            src = src.wrapping_add(2);
        }

        if i < buf.len() {
            buf[i] = self.read_byte(src);
        }
    }

    /// Write one byte.
    pub fn write_byte(&mut self, address: u16, value: u8) -> Result<WriteOutcome, EepromError> {
        if address >= DENSITY_BYTES {
            crate::log_debug!("write_byte({:#x}): bad address", address);
            return Err(EepromError::BadAddress);
        }

        if self.image.byte(address) == value {
            return Ok(WriteOutcome::Unchanged);
        }

        // The RAM image is the read authority; keep it in sync first.
        self.image.set_byte(address, value);

        if let Some(outcome) = self.write_direct(address)? {
            return Ok(outcome);
        }
        if address < BYTE_ENTRY_CEILING {
            self.append_byte_entry(address)
        } else {
            self.append_word_entry(address & !1)
        }
    }

    /// Write one half-word.
    ///
    /// An odd `address` splits into two byte writes (low byte first),
    /// which is not atomic under power loss.
    pub fn write_word(&mut self, address: u16, value: u16) -> Result<WriteOutcome, EepromError> {
        if address >= DENSITY_BYTES {
            crate::log_debug!("write_word({:#x}): bad address", address);
            return Err(EepromError::BadAddress);
        }

        if address % 2 == 1 {
            let low = self.write_byte(address, value as u8);
            let high = self.write_byte(address.wrapping_add(1), (value >> 8) as u8);
            return fold_outcome(low, high);
        }

        let old = self.image.word(address);
        if old == value {
            return Ok(WriteOutcome::Unchanged);
        }
        self.image.set_word(address, value);

        if let Some(outcome) = self.write_direct(address)? {
            return Ok(outcome);
        }

        if address < BYTE_ENTRY_CEILING {
            // Byte entries are cheaper below 0x80: log only the bytes that
            // moved, as two independent entries when both did. A power cut
            // between them persists the first byte alone, and a failure on
            // one does not keep the other from being attempted.
            let mut low = Ok(WriteOutcome::Unchanged);
            if old as u8 != value as u8 {
                low = self.append_byte_entry(address);
            }
            let mut high = Ok(WriteOutcome::Unchanged);
            if old >> 8 != value >> 8 {
                high = self.append_byte_entry(address + 1);
            }
            fold_outcome(low, high)
        } else {
            self.append_word_entry(address)
        }
    }

    /// Write a 32-bit value, composed of two half-word writes when aligned
    /// or byte+word+byte when not.
    ///
    /// Every constituent write runs even if an earlier one fails, so the
    /// RAM image always reflects the whole value; the first failure is
    /// reported.
    pub fn write_dword(&mut self, address: u16, value: u32) -> Result<WriteOutcome, EepromError> {
        if address % 2 == 1 {
            let first = self.write_byte(address, value as u8);
            let middle = self.write_word(address.wrapping_add(1), (value >> 8) as u16);
            let last = self.write_byte(address.wrapping_add(3), (value >> 24) as u8);
            fold_outcome(fold_outcome(first, middle), last)
        } else {
            let low = self.write_word(address, value as u16);
            let high = self.write_word(address.wrapping_add(2), (value >> 16) as u16);
            fold_outcome(low, high)
        }
    }

    /// Write `data` into the store starting at `address`.
    ///
    /// A leading single byte is written when `address` is odd, then whole
    /// half-words assembled from the buffer, then a trailing byte. Every
    /// piece is attempted even after a failure; the first error is
    /// reported.
    pub fn write_block(&mut self, data: &[u8], address: u16) -> Result<WriteOutcome, EepromError> {
        let mut dst = address;
        let mut i = 0;
        let mut result = Ok(WriteOutcome::Unchanged);

        if !data.is_empty() && dst % 2 == 1 {
            result = fold_outcome(result, self.write_byte(dst, data[i]));
            i += 1;
            dst = dst.wrapping_add(1);
        }

        while data.len() - i > 1 {
            let word = u16::from_le_bytes([data[i], data[i + 1]]);
            result = fold_outcome(result, self.write_word(dst, word));
            i += 2;
            dst = dst.wrapping_add(2);
        }

        if i < data.len() {
            result = fold_outcome(result, self.write_byte(dst, data[i]));
        }

        result
    }

    /// Same as [`write_byte`]; the store already skips unchanged values.
    ///
    /// [`write_byte`]: Eeprom::write_byte
    pub fn update_byte(&mut self, address: u16, value: u8) -> Result<WriteOutcome, EepromError> {
        self.write_byte(address, value)
    }

    /// Same as [`write_word`].
    ///
    /// [`write_word`]: Eeprom::write_word
    pub fn update_word(&mut self, address: u16, value: u16) -> Result<WriteOutcome, EepromError> {
        self.write_word(address, value)
    }

    /// Same as [`write_dword`].
    ///
    /// [`write_dword`]: Eeprom::write_dword
    pub fn update_dword(&mut self, address: u16, value: u32) -> Result<WriteOutcome, EepromError> {
        self.write_dword(address, value)
    }

    /// Same as [`write_block`].
    ///
    /// [`write_block`]: Eeprom::write_block
    pub fn update_block(&mut self, data: &[u8], address: u16) -> Result<WriteOutcome, EepromError> {
        self.write_block(data, address)
    }

    /// Wipe the persistent region and reload the now-empty store.
    pub fn erase(&mut self) -> Result<(), EepromError> {
        crate::log_info!("erasing eeprom");
        self.clear()?;
        self.load()
    }

    /// Rebuild the RAM image from flash: snapshot first, then the log.
    fn load(&mut self) -> Result<(), EepromError> {
        // Snapshot words are stored complemented; an erased 0xFFFF cell is
        // a logical zero.
        let mut offset = SNAPSHOT_BASE;
        let mut address: u16 = 0;
        while offset < SNAPSHOT_END {
            self.image.set_word(address, !self.flash.read_half_word(offset));
            offset += 2;
            address += 2;
        }

        let magic = (self.flash.read_half_word(LOG_BASE + 2) as u32) << 16
            | self.flash.read_half_word(LOG_BASE) as u32;
        if magic != LOG_MAGIC {
            crate::log_warn!("log magic missing, clearing persistent region");
            self.clear()?;
        }

        self.replay();
        Ok(())
    }

    /// Apply every committed log entry to the RAM image and find the
    /// first free slot.
    fn replay(&mut self) {
        let mut slot = LOG_BASE + 4;
        while slot < LOG_END {
            self.watchdog.update();

            match LogEntry::decode(self.flash.read_half_word(slot)) {
                LogEntry::Terminator => break,
                LogEntry::Byte { address, value } => {
                    if address < DENSITY_BYTES {
                        crate::log_trace!("replay byte {:#x} = {:#x}", address, value);
                        self.image.set_byte(address, value);
                    } else {
                        crate::log_debug!("dropping log entry for {:#x}", address);
                    }
                }
                LogEntry::Word { address, value } => {
                    if address < DENSITY_BYTES {
                        crate::log_trace!("replay word {:#x} = {:#x}", address, value);
                        self.image.set_word(address, value);
                    } else {
                        crate::log_debug!("dropping log entry for {:#x}", address);
                    }
                }
                LogEntry::WordNext { address } => {
                    slot += 2;
                    if slot >= LOG_END {
                        break;
                    }
                    let value = !self.flash.read_half_word(slot);
                    if value == 0 {
                        // Torn entry: power was lost before the value word.
                        crate::log_debug!("skipping torn log entry at {:#x}", slot);
                    } else if address < DENSITY_BYTES {
                        crate::log_trace!("replay word {:#x} = {:#x}", address, value);
                        self.image.set_word(address, value);
                    } else {
                        crate::log_debug!("dropping log entry for {:#x}", address);
                    }
                }
                LogEntry::Reserved => {
                    crate::log_debug!("reserved log encoding at {:#x}", slot);
                }
            }

            slot += 2;
        }

        self.empty_slot = slot.min(LOG_END);
    }

    /// Snapshot fast path: if the backing half-word is still erased the
    /// complemented value goes straight into the snapshot. A new value of
    /// zero is elided entirely; programming 0xFFFF would only burn the
    /// cell.
    ///
    /// Returns `None` when the cell is occupied and the write must go to
    /// the log.
    fn write_direct(&mut self, address: u16) -> Result<Option<WriteOutcome>, EepromError> {
        let slot = SNAPSHOT_BASE + (address & !1) as u32;
        if self.flash.read_half_word(slot) != ERASED_WORD {
            return Ok(None);
        }

        let value = !self.image.word(address & !1);
        if value == ERASED_WORD {
            return Ok(Some(WriteOutcome::Snapshot));
        }

        crate::log_trace!("direct snapshot write {:#x} = {:#x}", slot, value);
        with_unlocked(&mut self.flash, |flash| flash.program_half_word(slot, value))?;
        Ok(Some(WriteOutcome::Snapshot))
    }

    /// Append a one-word byte entry for `address`, compacting instead if
    /// the log is full.
    fn append_byte_entry(&mut self, address: u16) -> Result<WriteOutcome, EepromError> {
        if self.empty_slot + 2 > LOG_END {
            self.compact()?;
            return Ok(WriteOutcome::Compacted);
        }

        let entry = codec::encode_byte(address, self.image.byte(address));
        let slot = self.empty_slot;
        self.empty_slot += 2;

        crate::log_trace!("log byte entry {:#x} @ {:#x}", entry, slot);
        with_unlocked(&mut self.flash, |flash| flash.program_half_word(slot, entry))?;
        Ok(WriteOutcome::Logged)
    }

    /// Append a word entry for the even `address`, compacting instead if
    /// the log is full.
    fn append_word_entry(&mut self, address: u16) -> Result<WriteOutcome, EepromError> {
        let value = self.image.word(address);

        // 0 and 1 pack into the primary word; everything else carries a
        // complemented value word behind it.
        let (primary, entry_size) = if value <= 1 {
            (codec::encode_word_01(address, value), 2)
        } else {
            (codec::encode_word_next(address), 4)
        };

        if self.empty_slot + entry_size > LOG_END {
            self.compact()?;
            return Ok(WriteOutcome::Compacted);
        }

        let slot = self.empty_slot;
        self.empty_slot += entry_size;

        crate::log_trace!("log word entry {:#x} @ {:#x}", primary, slot);
        with_unlocked(&mut self.flash, |flash| {
            flash.program_half_word(slot, primary)?;
            if entry_size == 4 {
                flash.program_half_word(slot + 2, codec::complement_value(value))?;
            }
            Ok::<(), FlashError>(())
        })
        .map_err(EepromError::from)?;
        Ok(WriteOutcome::Logged)
    }

    /// Fold the RAM image into a fresh snapshot, emptying the log.
    ///
    /// Destructive-then-rebuild: the region is erased first, so until the
    /// rebuild finishes the RAM image is the only copy. A power cut inside
    /// this window loses the persistent state. Kept rare by sizing the
    /// write log.
    fn compact(&mut self) -> Result<(), EepromError> {
        crate::log_info!("write log full, compacting");
        self.clear()?;

        let image = &self.image;
        let watchdog = &mut self.watchdog;
        let result = with_unlocked(&mut self.flash, |flash| {
            let mut result = Ok(());
            let mut slot = SNAPSHOT_BASE;
            // Zero words stay unprogrammed: an erased cell already decodes
            // to zero through the complement.
            for &word in image.words() {
                watchdog.update();
                if word != 0 {
                    if let Err(e) = flash.program_half_word(slot, !word) {
                        result = Err(e);
                    }
                }
                slot += 2;
            }
            result
        });

        if let Err(e) = result {
            crate::log_error!("snapshot rebuild failed: {:?}", e);
            return Err(e.into());
        }
        Ok(())
    }

    /// Erase every page of the region and restamp the log magic.
    ///
    /// Does not touch the RAM image; callers that want an empty logical
    /// store reload afterwards.
    fn clear(&mut self) -> Result<(), EepromError> {
        let watchdog = &mut self.watchdog;
        let result = with_unlocked(&mut self.flash, |flash| {
            for page in 0..PAGE_COUNT {
                watchdog.update();
                flash.erase_page(PAGE_BASE_ADDRESS + page * PAGE_SIZE)?;
            }
            flash.program_half_word(LOG_BASE, LOG_MAGIC_LOW)?;
            flash.program_half_word(LOG_BASE + 2, LOG_MAGIC_HIGH)
        });

        self.empty_slot = LOG_BASE + 4;
        result.map_err(EepromError::from)
    }
}
