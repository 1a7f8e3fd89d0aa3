//! Prelude module - common imports for xlform users
//!
//! ```rust
//! use xlform::prelude::*;
//! ```

pub use crate::{
    // Spreadsheet capabilities
    Book,
    BookRef,
    Cell,
    CellValue,
    Engine,
    // Error types
    Error,
    ErrorKind,
    // Form types
    Form,
    FormFactory,
    FormItem,
    FormItemCell,
    FormItemKeyValueCells,
    FormItemSpec,
    FormItemTable,
    FormSchema,
    ItemDoc,
    Map,
    Range,
    Result,
    Sheet,
    Value,
};

#[cfg(feature = "xlsx")]
pub use crate::{XlsxEngine, XlsxOptions};
