//! Human-readable dump of the RAM image
//!
//! Debug aid, gated behind the `dump` feature. Rows are assembled into a
//! fixed-capacity buffer before being emitted so line-oriented sinks
//! receive whole rows.

use core::fmt::{self, Write};

use heapless::String;

use super::engine::Eeprom;
use super::layout::DENSITY_BYTES;
use crate::platform::traits::{FlashInterface, WatchdogInterface};

/// Bytes shown per row.
const ROW_BYTES: u16 = 16;

impl<F: FlashInterface, W: WatchdogInterface> Eeprom<F, W> {
    /// Write a hex dump of the RAM image, 16 bytes per row.
    ///
    /// Runs of all-zero rows collapse to a single `*` after the first;
    /// the final row always prints. The watchdog is fed while walking.
    pub fn dump<Out: fmt::Write>(&mut self, out: &mut Out) -> fmt::Result {
        let mut empty_rows = 0u32;
        let mut address: u16 = 0;

        while address < DENSITY_BYTES {
            self.watchdog.update();

            if address >= DENSITY_BYTES.saturating_sub(ROW_BYTES) {
                // Make sure the last row is displayed.
                empty_rows = 0;
            }
            empty_rows += 1;

            let row_end = (address + ROW_BYTES).min(DENSITY_BYTES);
            for a in address..row_end {
                if self.image.byte(a) != 0 {
                    empty_rows = 0;
                    break;
                }
            }

            if empty_rows > 1 {
                // Only mark the first repeated empty row.
                if empty_rows == 2 {
                    out.write_str("*\n")?;
                }
                address = row_end;
                continue;
            }

            let mut row: String<64> = String::new();
            write!(row, "{:04x}", address)?;
            for a in address..row_end {
                if a % 8 == 0 {
                    row.push(' ').map_err(|_| fmt::Error)?;
                }
                write!(row, " {:02x}", self.image.byte(a))?;
            }
            out.write_str(&row)?;
            out.write_char('\n')?;

            address = row_end;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockFlash, MockWatchdog};
    use std::string::String as StdString;

    fn fresh() -> Eeprom<MockFlash, MockWatchdog> {
        Eeprom::init(MockFlash::new(), MockWatchdog::new()).unwrap()
    }

    #[test]
    fn test_empty_image_collapses_to_marker_and_last_row() {
        let mut eeprom = fresh();
        let mut out = StdString::new();
        eeprom.dump(&mut out).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        // First row, one collapse marker, final row.
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("0000"));
        assert_eq!(lines[1], "*");
        assert!(lines[2].starts_with(&format!("{:04x}", DENSITY_BYTES - 16)));
    }

    #[test]
    fn test_written_rows_are_printed() {
        let mut eeprom = fresh();
        eeprom.write_byte(0x20, 0xAB).unwrap();

        let mut out = StdString::new();
        eeprom.dump(&mut out).unwrap();

        let row = out
            .lines()
            .find(|l| l.starts_with("0020"))
            .expect("row with data missing");
        assert!(row.contains("ab"));
        // Mid-row gap after eight bytes.
        assert!(row.contains("  "));
    }
}
