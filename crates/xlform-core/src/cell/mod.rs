//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The typed value read from or written to a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangle of cells (e.g., "A1:B10")
//! - [`RangeRef`] - A parsed range expression, including whole rows and columns

mod address;
mod value;

pub use address::{CellAddress, CellRange, RangeRef};
pub use value::CellValue;
