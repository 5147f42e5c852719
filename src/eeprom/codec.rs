//! Write-log entry codec
//!
//! A log entry is one 16-bit primary word, optionally followed by a
//! complemented 16-bit value word. The primary word ranges are:
//!
//! ```text
//! 0x0000 ... 0x7FFF  Byte entry;    address = word >> 8, value = word & 0xFF
//! 0x8000 ... 0x9FFF  Word 0 entry;  address = (word & 0x1FFF) << 1, value 0
//! 0xA000 ... 0xBFFF  Word 1 entry;  address = (word & 0x1FFF) << 1, value 1
//! 0xC000 ... 0xDFFF  Reserved
//! 0xE000 ... 0xFFBF  Word-next;     address = ((word & 0x1FFF) << 1) + 0x80,
//!                                   value = !next_word
//! 0xFFC0 ... 0xFFFE  Reserved tail (decodes through the word-next arm to an
//!                                   out-of-range address; replay drops it)
//! 0xFFFF             Terminator (slot still erased)
//! ```
//!
//! Byte entries give the first 128 bytes of the store one-word mutations,
//! which suits header-heavy formats where small fields churn. Half-word
//! values of 0 and 1 also pack into a single word at any even address; the
//! word-next address space is biased by 0x80 to hand those first 128 bytes
//! to the byte encoding.
//!
//! The value word of a word-next entry is stored complemented: a power
//! cut between its two programs leaves the value slot erased, which reads
//! back as a zero value, and replay recognizes that as a torn entry.

/// Value of an erased flash half-word; also the log terminator.
pub const ERASED_WORD: u16 = 0xFFFF;

/// Addresses below this encode as single-word byte entries.
pub const BYTE_ENTRY_CEILING: u16 = 0x80;

/// Set on every non-byte primary word.
const WORD_FLAG: u16 = 0x8000;
/// Both value bits set: the value follows in the next slot.
const VALUE_NEXT: u16 = 0x6000;
/// Reserved encoding bit.
const VALUE_RESERVED: u16 = 0x4000;
/// Inline value bit for word 0/1 entries.
const VALUE_ONE: u16 = 0x2000;
/// Address payload of a word-form primary.
const ADDRESS_MASK: u16 = 0x1FFF;

/// Decoded view of a primary log word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEntry {
    /// End of log: the slot is still erased.
    Terminator,
    /// One-word entry carrying a byte for an address below 0x80.
    Byte { address: u16, value: u8 },
    /// One-word entry carrying a 0 or 1 half-word at an even address.
    Word { address: u16, value: u16 },
    /// Two-word entry: the complemented half-word value follows.
    WordNext { address: u16 },
    /// Reserved encoding, skipped on replay.
    Reserved,
}

impl LogEntry {
    /// Classify a primary word read from the log.
    pub fn decode(raw: u16) -> Self {
        if raw == ERASED_WORD {
            return LogEntry::Terminator;
        }
        if raw & WORD_FLAG == 0 {
            return LogEntry::Byte {
                address: raw >> 8,
                value: raw as u8,
            };
        }
        if raw & VALUE_NEXT == VALUE_NEXT {
            // The 0xFFC0..=0xFFFE tail lands here too; its decoded address
            // is past anything a store can hold, so replay discards it
            // after consuming the value slot.
            return LogEntry::WordNext {
                address: ((raw & ADDRESS_MASK) << 1) + BYTE_ENTRY_CEILING,
            };
        }
        if raw & VALUE_RESERVED != 0 {
            return LogEntry::Reserved;
        }
        LogEntry::Word {
            address: (raw & ADDRESS_MASK) << 1,
            value: (raw & VALUE_ONE) >> 13,
        }
    }
}

/// Pack a byte mutation at an address below 0x80 into one word.
pub fn encode_byte(address: u16, value: u8) -> u16 {
    debug_assert!(address < BYTE_ENTRY_CEILING);
    (address << 8) | value as u16
}

/// Pack a 0 or 1 half-word at an even address into one word.
pub fn encode_word_01(address: u16, value: u16) -> u16 {
    debug_assert!(value <= 1 && address % 2 == 0);
    WORD_FLAG | (value << 13) | (address >> 1)
}

/// Primary word of a two-word entry; [`complement_value`] gives the second.
pub fn encode_word_next(address: u16) -> u16 {
    debug_assert!(address >= BYTE_ENTRY_CEILING && address % 2 == 0);
    WORD_FLAG | VALUE_NEXT | ((address - BYTE_ENTRY_CEILING) >> 1)
}

/// Value word of a two-word entry.
pub fn complement_value(value: u16) -> u16 {
    !value
}
