//! # xlform-xlsx
//!
//! XLSX (Office Open XML) backend for xlform.
//!
//! [`XlsxEngine`] implements the [`xlform_core::Engine`] contract over an
//! in-memory [`Workbook`] that is loaded from and saved to `.xlsx` files.
//!
//! ```rust
//! use xlform_core::{CellValue, Engine};
//! use xlform_xlsx::XlsxEngine;
//!
//! let book = XlsxEngine::new().new_book().unwrap();
//! let sheet = &book.sheets()[0];
//! assert_eq!(sheet.name(), "Sheet1");
//!
//! sheet.cell(1, 1).unwrap().set_value(CellValue::Int(42)).unwrap();
//! let range = sheet.range("A1").unwrap();
//! assert_eq!(range.cell(1, 1).unwrap().value().unwrap(), CellValue::Int(42));
//! ```

pub mod engine;
pub mod error;
pub mod number_format;
pub mod options;
pub mod reader;
pub mod workbook;
pub mod writer;

pub use engine::{XlsxBook, XlsxCell, XlsxEngine, XlsxRange, XlsxSheet};
pub use error::{XlsxError, XlsxResult};
pub use options::XlsxOptions;
pub use reader::XlsxReader;
pub use workbook::{CellContent, StoredCell, Workbook, Worksheet};
pub use writer::XlsxWriter;
