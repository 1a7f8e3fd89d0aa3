//! # xlform-core
//!
//! The spreadsheet capability contract that every xlform backend implements.
//!
//! This crate provides:
//! - [`CellValue`] - The closed set of typed cell values (text, float, integer, date-time)
//! - [`CellAddress`], [`CellRange`] and [`RangeRef`] - A1 addressing and range expressions
//! - [`Cell`], [`Range`], [`Sheet`], [`Book`], [`Engine`] - The backend capability traits
//! - [`RangeWindow`] - 1-based window arithmetic shared by backends
//! - [`Error`] - The error taxonomy used across the workspace
//!
//! ## Example
//!
//! ```rust
//! use xlform_core::{CellRange, RangeRef};
//!
//! let range = CellRange::parse("B2:C3").unwrap();
//! assert_eq!(range.row_count(), 2);
//! assert_eq!(range.start.to_a1_string(), "B2");
//!
//! let columns = RangeRef::parse("A:C").unwrap();
//! assert_eq!(columns.resolve(10, 1).row_count(), 10);
//! ```

pub mod cell;
pub mod engine;
pub mod error;
pub mod window;

// Re-exports for convenience
pub use cell::{CellAddress, CellRange, CellValue, RangeRef};
pub use engine::{Book, BookRef, Cell, Engine, Range, Sheet};
pub use error::{Error, ErrorKind, Result};
pub use window::RangeWindow;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
