//! Spreadsheet capability traits
//!
//! A backend exposes an open document through [`Book`], its worksheets
//! through [`Sheet`], rectangular windows through [`Range`] and single
//! locations through [`Cell`]. Handles are cheap views over shared state:
//! they take `&self` and mutate through the backend's own interior
//! mutability, and are meant for one logical owner at a time.
//!
//! Capabilities a backend may omit have provided implementations that
//! return [`Error::NotImplemented`].

use std::path::Path;
use std::rc::Rc;

use crate::cell::{CellAddress, CellValue};
use crate::error::{Error, Result};

/// Shared handle to an open book
pub type BookRef = Rc<dyn Book>;

/// A single addressable spreadsheet location
pub trait Cell {
    /// Raw stored content, typed; formula text is `Text` with its leading `=`
    fn formula(&self) -> Result<CellValue>;

    /// Typed content.
    ///
    /// Fails with [`Error::NotImplemented`] when the content is a formula
    /// the backend cannot evaluate.
    fn value(&self) -> Result<CellValue>;

    /// Number format code (e.g. `"General"`, `"0.00"`)
    fn number_format(&self) -> Result<String> {
        Err(Error::not_implemented("number_format"))
    }

    /// Display text as the spreadsheet would render it
    fn text(&self) -> Result<String> {
        Err(Error::not_implemented("text"))
    }

    /// Row number (1-based)
    fn row(&self) -> u32;

    /// Column number (1-based)
    fn column(&self) -> u32;

    /// A1-style address with independently toggled absolute markers
    fn address(&self, column_absolute: bool, row_absolute: bool) -> String {
        CellAddress::new(self.row(), self.column()).format(column_absolute, row_absolute)
    }

    /// Overwrite the cell content
    fn set_value(&self, value: CellValue) -> Result<()>;
}

/// A fixed-size rectangular window of cells, indexed from (1, 1)
pub trait Range {
    fn rows_count(&self) -> u32;

    fn columns_count(&self) -> u32;

    /// Get the cell at a 1-based position inside the window.
    ///
    /// Positions outside the window fail with [`Error::Argument`].
    fn cell(&self, row: u32, column: u32) -> Result<Box<dyn Cell>>;
}

/// A named worksheet
pub trait Sheet {
    fn name(&self) -> String;

    /// Resolve a range expression: `"A1"`, `"A1:C3"`, `"A:A"` or `"1:1"`
    fn range(&self, expr: &str) -> Result<Box<dyn Range>>;

    /// Get the cell at a 1-based sheet position
    fn cell(&self, row: u32, column: u32) -> Result<Box<dyn Cell>>;

    fn protect(&self) -> Result<()> {
        Err(Error::not_implemented("protect"))
    }

    fn unprotect(&self) -> Result<()> {
        Err(Error::not_implemented("unprotect"))
    }

    /// Recalculate formulas
    fn calculate(&self) -> Result<()> {
        Err(Error::not_implemented("calculate"))
    }
}

/// An open spreadsheet document
pub trait Book {
    /// Persist the book to `path`
    fn save(&self, path: &Path) -> Result<()>;

    /// Close the book; later writes fail
    fn close(&self) -> Result<()>;

    /// All sheets in document order (the first one is the default)
    fn sheets(&self) -> Vec<Box<dyn Sheet>>;

    /// Find a sheet by exact name
    fn sheet(&self, name: &str) -> Option<Box<dyn Sheet>> {
        self.sheets().into_iter().find(|sheet| sheet.name() == name)
    }

    /// Append a new empty sheet
    fn add_sheet(&self, name: &str) -> Result<Box<dyn Sheet>>;
}

/// Creates and opens books
pub trait Engine {
    fn new_book(&self) -> Result<BookRef>;

    fn open_book(&self, path: &Path) -> Result<BookRef>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    struct FixedCell {
        row: u32,
        column: u32,
    }

    impl Cell for FixedCell {
        fn formula(&self) -> Result<CellValue> {
            Ok(CellValue::Int(7))
        }

        fn value(&self) -> Result<CellValue> {
            Ok(CellValue::Int(7))
        }

        fn row(&self) -> u32 {
            self.row
        }

        fn column(&self) -> u32 {
            self.column
        }

        fn set_value(&self, _value: CellValue) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_provided_address() {
        let cell = FixedCell { row: 3, column: 28 };
        assert_eq!(cell.address(true, true), "$AB$3");
        assert_eq!(cell.address(false, true), "AB$3");
        assert_eq!(cell.address(true, false), "$AB3");
        assert_eq!(cell.address(false, false), "AB3");
    }

    #[test]
    fn test_optional_capabilities_default_to_not_implemented() {
        let cell = FixedCell { row: 1, column: 1 };
        assert_eq!(cell.number_format().unwrap_err().kind(), ErrorKind::NotImplemented);
        assert_eq!(cell.text().unwrap_err().kind(), ErrorKind::NotImplemented);
    }
}
