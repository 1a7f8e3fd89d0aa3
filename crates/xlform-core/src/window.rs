//! 1-based window arithmetic shared by backends

use crate::cell::{CellAddress, CellRange};
use crate::error::{Error, Result};

/// A rectangle of a sheet seen through 1-based local coordinates.
///
/// Local `(1, 1)` is the top-left corner of the underlying range, so a
/// window over `B2:C3` maps `(1, 1)` to `B2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeWindow {
    range: CellRange,
}

impl RangeWindow {
    pub fn new(range: CellRange) -> Self {
        Self { range }
    }

    /// The underlying sheet range
    pub fn range(&self) -> CellRange {
        self.range
    }

    pub fn rows_count(&self) -> u32 {
        self.range.row_count()
    }

    pub fn columns_count(&self) -> u32 {
        self.range.col_count()
    }

    /// Translate a local position to a sheet address
    pub fn locate(&self, row: u32, column: u32) -> Result<CellAddress> {
        if row < 1 || row > self.rows_count() || column < 1 || column > self.columns_count() {
            return Err(Error::argument(format!(
                "Cell ({}, {}) outside range {} ({}x{})",
                row,
                column,
                self.range,
                self.rows_count(),
                self.columns_count()
            )));
        }

        Ok(CellAddress::new(
            self.range.start.row + row - 1,
            self.range.start.col + column - 1,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_locate_keeps_offset() {
        let window = RangeWindow::new(CellRange::parse("B2:C3").unwrap());
        assert_eq!(window.rows_count(), 2);
        assert_eq!(window.columns_count(), 2);
        assert_eq!(window.locate(1, 1).unwrap().to_a1_string(), "B2");
        assert_eq!(window.locate(2, 2).unwrap().to_a1_string(), "C3");
    }

    #[test]
    fn test_locate_out_of_bounds() {
        let window = RangeWindow::new(CellRange::parse("B2:C3").unwrap());
        for (row, column) in [(0, 1), (1, 0), (3, 1), (1, 3)] {
            let err = window.locate(row, column).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Argument);
        }
    }
}
