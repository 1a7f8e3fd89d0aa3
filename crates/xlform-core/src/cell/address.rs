//! Cell address and range types
//!
//! Rows and columns are 1-based throughout, matching the A1 notation they
//! are parsed from.

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "$B$2")
///
/// The optional `$` prefix marks a reference as absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Row number (1-based)
    pub row: u32,
    /// Column number (1-based, A=1, B=2, ..., XFD=16384)
    pub col: u32,
    /// Whether the row reference is absolute ($)
    pub row_absolute: bool,
    /// Whether the column reference is absolute ($)
    pub col_absolute: bool,
}

impl CellAddress {
    /// Create a new cell address with relative references
    pub fn new(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Create a new cell address with specified absolute/relative flags
    pub fn with_absolute(row: u32, col: u32, row_absolute: bool, col_absolute: bool) -> Self {
        Self {
            row,
            col,
            row_absolute,
            col_absolute,
        }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use xlform_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!(addr.row, 1);
    /// assert_eq!(addr.col, 1);
    ///
    /// let addr = CellAddress::parse("$B$2").unwrap();
    /// assert_eq!(addr.row, 2);
    /// assert_eq!(addr.col, 2);
    /// assert!(addr.row_absolute);
    /// assert!(addr.col_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::argument("Invalid cell address: empty address"));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        let col_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }

        if pos == col_start {
            return Err(Error::argument(format!(
                "Invalid cell address: no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[col_start..pos])?;

        let row_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let row = Self::parse_row_number(&s[pos..], s)?;

        Ok(Self {
            row,
            col,
            row_absolute,
            col_absolute,
        })
    }

    fn parse_row_number(digits: &str, whole: &str) -> Result<u32> {
        if digits.is_empty() {
            return Err(Error::argument(format!(
                "Invalid cell address: no row number in '{}'",
                whole
            )));
        }

        let row: u32 = digits.parse().map_err(|_| {
            Error::argument(format!("Invalid cell address: bad row number in '{}'", whole))
        })?;

        if row == 0 {
            return Err(Error::argument(format!(
                "Invalid cell address: row number must be >= 1 in '{}'",
                whole
            )));
        }
        if row > MAX_ROWS {
            return Err(Error::argument(format!(
                "Row {} out of bounds (max: {})",
                row, MAX_ROWS
            )));
        }

        Ok(row)
    }

    /// Convert a column number to letters (1 = A, 26 = Z, 27 = AA, etc.)
    pub fn column_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to a column number (A = 1, Z = 26, AA = 27, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::argument("Invalid cell address: empty column letters"));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::argument(format!(
                    "Invalid cell address: invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            if col > MAX_COLS {
                return Err(Error::argument(format!(
                    "Column '{}' out of bounds (max: XFD)",
                    letters
                )));
            }
        }

        Ok(col)
    }

    /// Format as A1-style string, honoring the absolute markers
    pub fn to_a1_string(&self) -> String {
        self.format(self.col_absolute, self.row_absolute)
    }

    /// Format as A1-style string with explicit absolute markers
    pub fn format(&self, col_absolute: bool, row_absolute: bool) -> String {
        let mut result = String::new();

        if col_absolute {
            result.push('$');
        }
        result.push_str(&Self::column_to_letters(self.col));

        if row_absolute {
            result.push('$');
        }
        result.push_str(&self.row.to_string());

        result
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangle of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range, normalized so `start` is the top-left corner
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        let (start_row, end_row) = if start.row <= end.row {
            (start.row, end.row)
        } else {
            (end.row, start.row)
        };

        let (start_col, end_col) = if start.col <= end.col {
            (start.col, end.col)
        } else {
            (end.col, start.col)
        };

        Self {
            start: CellAddress::new(start_row, start_col),
            end: CellAddress::new(end_row, end_col),
        }
    }

    /// Create a range from 1-based row/column numbers
    pub fn from_indices(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self::new(addr, addr)
    }

    /// Parse a range from A1:B10 notation (cell corners only)
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(colon_pos) = s.find(':') {
            let start = CellAddress::parse(&s[..colon_pos])?;
            let end = CellAddress::parse(&s[colon_pos + 1..])?;
            Ok(Self::new(start, end))
        } else {
            let addr = CellAddress::parse(s)?;
            Ok(Self::single(addr))
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A parsed range expression.
///
/// One grammar covers four shapes: a single cell (`"A1"`), a rectangle
/// (`"A1:C3"`), whole columns (`"A:A"`, `"B:D"`) and whole rows (`"1:1"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeRef {
    /// A single cell or a bounded rectangle
    Cells(CellRange),
    /// Whole columns, first..=last (1-based)
    Columns { first: u32, last: u32 },
    /// Whole rows, first..=last (1-based)
    Rows { first: u32, last: u32 },
}

/// One side of a `:` in a range expression
enum Bound {
    Column(u32),
    Row(u32),
    Cell(CellAddress),
}

impl Bound {
    fn parse(part: &str, whole: &str) -> Result<Self> {
        let bare: String = part.trim().chars().filter(|c| *c != '$').collect();
        if bare.is_empty() {
            return Err(Error::argument(format!("Invalid range: '{}'", whole)));
        }
        if bare.chars().all(|c| c.is_ascii_alphabetic()) {
            return Ok(Bound::Column(CellAddress::letters_to_column(&bare)?));
        }
        if bare.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Bound::Row(CellAddress::parse_row_number(&bare, whole)?));
        }
        Ok(Bound::Cell(CellAddress::parse(part)?))
    }
}

impl RangeRef {
    /// Parse a range expression
    ///
    /// # Examples
    /// ```
    /// use xlform_core::RangeRef;
    ///
    /// assert!(matches!(RangeRef::parse("A1").unwrap(), RangeRef::Cells(_)));
    /// assert!(matches!(RangeRef::parse("A:B").unwrap(), RangeRef::Columns { first: 1, last: 2 }));
    /// assert!(matches!(RangeRef::parse("3:3").unwrap(), RangeRef::Rows { first: 3, last: 3 }));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some((left, right)) = s.split_once(':') else {
            return Ok(RangeRef::Cells(CellRange::single(CellAddress::parse(s)?)));
        };

        match (Bound::parse(left, s)?, Bound::parse(right, s)?) {
            (Bound::Cell(start), Bound::Cell(end)) => Ok(RangeRef::Cells(CellRange::new(start, end))),
            (Bound::Column(a), Bound::Column(b)) => Ok(RangeRef::Columns {
                first: a.min(b),
                last: a.max(b),
            }),
            (Bound::Row(a), Bound::Row(b)) => Ok(RangeRef::Rows {
                first: a.min(b),
                last: a.max(b),
            }),
            _ => Err(Error::argument(format!(
                "Invalid range: mixed bounds in '{}'",
                s
            ))),
        }
    }

    /// Resolve to a bounded rectangle.
    ///
    /// Whole columns span rows `1..=max_row` and whole rows span columns
    /// `1..=max_col`, where the maxima describe the used area of the sheet
    /// (each clamped to at least 1).
    pub fn resolve(&self, max_row: u32, max_col: u32) -> CellRange {
        match *self {
            RangeRef::Cells(range) => range,
            RangeRef::Columns { first, last } => {
                CellRange::from_indices(1, first, max_row.max(1), last)
            }
            RangeRef::Rows { first, last } => {
                CellRange::from_indices(first, 1, last, max_col.max(1))
            }
        }
    }
}

impl FromStr for RangeRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(CellAddress::column_to_letters(1), "A");
        assert_eq!(CellAddress::column_to_letters(2), "B");
        assert_eq!(CellAddress::column_to_letters(26), "Z");
        assert_eq!(CellAddress::column_to_letters(27), "AA");
        assert_eq!(CellAddress::column_to_letters(702), "ZZ");
        assert_eq!(CellAddress::column_to_letters(703), "AAA");
        assert_eq!(CellAddress::column_to_letters(16384), "XFD");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A").unwrap(), 1);
        assert_eq!(CellAddress::letters_to_column("Z").unwrap(), 26);
        assert_eq!(CellAddress::letters_to_column("AA").unwrap(), 27);
        assert_eq!(CellAddress::letters_to_column("XFD").unwrap(), 16384);

        // Case insensitive
        assert_eq!(CellAddress::letters_to_column("aa").unwrap(), 27);
        assert!(CellAddress::letters_to_column("XFE").is_err());
    }

    #[test]
    fn test_cell_address_parse() {
        let addr = CellAddress::parse("B2").unwrap();
        assert_eq!((addr.row, addr.col), (2, 2));
        assert!(!addr.row_absolute);
        assert!(!addr.col_absolute);

        let addr = CellAddress::parse("$A1").unwrap();
        assert!(addr.col_absolute);
        assert!(!addr.row_absolute);

        let addr = CellAddress::parse("A$1").unwrap();
        assert!(!addr.col_absolute);
        assert!(addr.row_absolute);

        let addr = CellAddress::parse("XFD1048576").unwrap();
        assert_eq!((addr.row, addr.col), (1_048_576, 16_384));
    }

    #[test]
    fn test_cell_address_parse_errors() {
        for bad in ["", "A", "1", "A0", "A1048577", "XFE1", "A1B"] {
            let err = CellAddress::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Argument, "{}", bad);
        }
    }

    #[test]
    fn test_cell_address_format() {
        let addr = CellAddress::new(1, 1);
        assert_eq!(addr.format(true, true), "$A$1");
        assert_eq!(addr.format(false, true), "A$1");
        assert_eq!(addr.format(true, false), "$A1");
        assert_eq!(addr.format(false, false), "A1");
        assert_eq!(CellAddress::new(100, 3).to_string(), "C100");
    }

    #[test]
    fn test_cell_range_parse() {
        let range = CellRange::parse("C3:A1").unwrap();
        assert_eq!(range.start, CellAddress::new(1, 1));
        assert_eq!(range.end, CellAddress::new(3, 3));
        assert_eq!(range.row_count(), 3);
        assert_eq!(range.col_count(), 3);
        assert!(range.contains(&CellAddress::new(2, 2)));
        assert!(!range.contains(&CellAddress::new(4, 1)));
    }

    #[test]
    fn test_range_ref_shapes() {
        assert_eq!(
            RangeRef::parse("B2:C3").unwrap(),
            RangeRef::Cells(CellRange::from_indices(2, 2, 3, 3))
        );
        assert_eq!(
            RangeRef::parse("$C:$A").unwrap(),
            RangeRef::Columns { first: 1, last: 3 }
        );
        assert_eq!(
            RangeRef::parse("2:1").unwrap(),
            RangeRef::Rows { first: 1, last: 2 }
        );
        assert!(RangeRef::parse("A:1").is_err());
        assert!(RangeRef::parse("A1:").is_err());
        assert!(RangeRef::parse("0:1").is_err());
    }

    #[test]
    fn test_range_ref_resolve() {
        let columns = RangeRef::parse("A:A").unwrap().resolve(3, 2);
        assert_eq!((columns.row_count(), columns.col_count()), (3, 1));

        let rows = RangeRef::parse("1:1").unwrap().resolve(3, 2);
        assert_eq!((rows.row_count(), rows.col_count()), (1, 2));

        // Empty sheets still resolve to one row / one column
        let rows = RangeRef::parse("2:2").unwrap().resolve(0, 0);
        assert_eq!(rows.to_a1_string(), "A2");
    }
}
