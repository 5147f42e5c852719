//! Store logging
//!
//! Every record the store emits goes through the level macros below, which
//! pick a sink at compile time: with the `defmt` feature a record reaches
//! the defmt transport, in host test builds it falls back to standard
//! output, and in any other build it compiles away entirely. Callers log
//! unconditionally and let the build decide whether anything is kept.

/// Route one record to whichever sink this build carries.
///
/// Not part of the public API; use the level macros below.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_record {
    (error, $tag:literal, $($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);

        #[cfg(all(test, not(feature = "defmt")))]
        eprintln!(concat!($tag, " {}"), format!($($arg)*));
    };
    ($level:ident, $tag:literal, $($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        ::defmt::$level!($($arg)*);

        #[cfg(all(test, not(feature = "defmt")))]
        println!(concat!($tag, " {}"), format!($($arg)*));
    };
}

/// Store lifecycle events: init, erase, compaction.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::__log_record!(info, "eeprom info:", $($arg)*);
    };
}

/// Recoverable surprises, e.g. a missing log magic.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::__log_record!(warn, "eeprom warn:", $($arg)*);
    };
}

/// Driver failures the store could not hide from the caller.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::__log_record!(error, "eeprom error:", $($arg)*);
    };
}

/// Dropped, torn or out-of-range log entries and rejected addresses.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::__log_record!(debug, "eeprom debug:", $($arg)*);
    };
}

/// Per-operation detail: the write cascade and replayed entries.
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::__log_record!(trace, "eeprom trace:", $($arg)*);
    };
}
