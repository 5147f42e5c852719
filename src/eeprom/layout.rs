//! Flash geometry of the emulated store
//!
//! One contiguous run of erase pages is split into the snapshot area and
//! the write log. The constants here are the board-tuning knobs; the
//! derived addresses below them are what the engine actually works with.

/// Smallest erasable flash unit in bytes.
pub const PAGE_SIZE: u32 = 4096;

/// Pages given to the store (snapshot + write log).
pub const PAGE_COUNT: u32 = 1;

/// First byte of the persistent region.
pub const PAGE_BASE_ADDRESS: u32 = 0x0004_0000;

/// Total flash on the part, in KiB; bounds the region budget.
pub const MCU_FLASH_SIZE: u32 = 4096;

/// Size of the logical store in bytes.
///
/// Defaults to half the allocated space, leaving the rest as write log.
/// The larger the log, the less often the snapshot must be rewritten.
pub const DENSITY_BYTES: u16 = (PAGE_COUNT * PAGE_SIZE / 2) as u16;

/// Size of the write log in bytes.
pub const WRITE_LOG_BYTES: u32 = PAGE_COUNT * PAGE_SIZE - DENSITY_BYTES as u32;

/// Half-words in the RAM image.
pub const DENSITY_WORDS: usize = DENSITY_BYTES as usize / 2;

/// Start of the snapshot area.
pub const SNAPSHOT_BASE: u32 = PAGE_BASE_ADDRESS;

/// End of the snapshot area, start of the write log.
pub const SNAPSHOT_END: u32 = SNAPSHOT_BASE + DENSITY_BYTES as u32;

/// Start of the write log (the magic lives in its first two slots).
pub const LOG_BASE: u32 = SNAPSHOT_END;

/// End of the write log.
pub const LOG_END: u32 = LOG_BASE + WRITE_LOG_BYTES;

/// Magic marking an initialized log region.
pub const LOG_MAGIC: u32 = 0x2040_0FEE;

/// Magic halves as committed to flash, low half at [`LOG_BASE`].
pub const LOG_MAGIC_LOW: u16 = LOG_MAGIC as u16;

/// Magic halves as committed to flash, high half at [`LOG_BASE`] + 2.
pub const LOG_MAGIC_HIGH: u16 = (LOG_MAGIC >> 16) as u16;

/// Highest logical address any log encoding can carry (`0x1FFF << 1`).
pub const ADDRESS_CEILING: u32 = 0x4000;

const _: () = assert!(DENSITY_BYTES % 2 == 0, "store density must be even");
const _: () = assert!(
    DENSITY_BYTES as u32 <= ADDRESS_CEILING,
    "store density exceeds what the log encodings can address"
);
const _: () = assert!(
    DENSITY_BYTES as u32 + WRITE_LOG_BYTES <= PAGE_COUNT * PAGE_SIZE,
    "snapshot and write log exceed the allocated pages"
);
const _: () = assert!(WRITE_LOG_BYTES % 2 == 0, "write log size must be even");
const _: () = assert!(
    PAGE_COUNT * PAGE_SIZE <= MCU_FLASH_SIZE * 1024,
    "persistent region exceeds the part's flash"
);
