//! # xlform
//!
//! Map nested form documents to and from spreadsheet cell ranges.
//!
//! A [`FormFactory`] holds named schemas. Each schema lists form items, and
//! each item binds one field of the document to one range of a sheet:
//!
//! - [`FormItemCell`] binds a single cell
//! - [`FormItemKeyValueCells`] binds the value cell of a `header | value` pair
//! - [`FormItemTable`] binds a table, optionally folding multi-row headers
//!   into nested maps
//!
//! Binding a schema to a book gives a [`Form`]; `get_form_doc` reads every
//! item into `{item: {"_meta": ..., "result": ...}}` and `set_form_doc`
//! writes results back.
//!
//! ## Example
//!
//! ```rust
//! use xlform::prelude::*;
//!
//! let book = XlsxEngine::new().new_book().unwrap();
//! let sheet = book.sheet("Sheet1").unwrap();
//! sheet.cell(1, 1).unwrap().set_value("name".into()).unwrap();
//! sheet.cell(1, 2).unwrap().set_value("Ada".into()).unwrap();
//!
//! let mut factory = FormFactory::new();
//! factory.register_form(
//!     "person",
//!     FormSchema::new().with_item(
//!         "name",
//!         FormItemSpec::key_value_cells("Sheet1", "A1:B1", "name"),
//!     ),
//! );
//!
//! let form = factory.new_form("person", &book).unwrap();
//! let doc = form.get_form_doc().unwrap();
//! assert_eq!(doc["name"].get("result"), Some(&Value::text("Ada")));
//! ```

pub mod dump;
pub mod factory;
pub mod form;
pub mod form_item;
pub mod item_doc;
pub mod prelude;
pub mod schema;
pub mod value;

pub use dump::cell_dump;
pub use factory::FormFactory;
pub use form::Form;
pub use form_item::{FormItem, FormItemCell, FormItemKeyValueCells, FormItemTable};
pub use item_doc::{ItemDoc, META_KEY, RESULT_KEY};
pub use schema::{CellArgs, FormItemSpec, FormSchema, KeyValueCellsArgs, TableArgs};
pub use value::{ensure_parents, lookup_path, HeaderPath, Map, Value};

// Re-export core types
pub use xlform_core::{
    Book, BookRef, Cell, CellAddress, CellRange, CellValue, Engine, Error, ErrorKind, Range,
    RangeRef, Result, Sheet,
};

#[cfg(feature = "xlsx")]
pub use xlform_xlsx::{XlsxEngine, XlsxOptions};
