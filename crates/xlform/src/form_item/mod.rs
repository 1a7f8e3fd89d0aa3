//! Form items: typed bindings between one document field and one range
//!
//! Every variant runs the same lifecycle. Reading validates the book,
//! reads, then validates the produced document. Writing validates the
//! incoming document and the book, writes, then validates the book again.
//! A write that fails the final check leaves the book modified.

mod cell;
mod key_value;
mod table;

pub use cell::FormItemCell;
pub use key_value::FormItemKeyValueCells;
pub use table::FormItemTable;

use xlform_core::{BookRef, Cell, CellValue, Error, ErrorKind, Range, Result};

use crate::item_doc::ItemDoc;
use crate::schema::FormItemSpec;

/// The per-variant steps of the item lifecycle
pub(crate) trait ItemBinding {
    /// Check the live book still has the shape this item expects
    fn validate_book(&self) -> Result<()>;

    /// Check a document fits this item
    fn validate_item_doc(&self, doc: &ItemDoc) -> Result<()>;

    fn read(&self) -> Result<ItemDoc>;

    fn write(&self, doc: &ItemDoc) -> Result<()>;
}

/// Where an item lives: a book, a sheet name and a range expression
#[derive(Clone)]
pub(crate) struct RangeBinding {
    book: BookRef,
    sheet_name: String,
    range_arg: String,
}

impl RangeBinding {
    pub(crate) fn new(book: &BookRef, sheet_name: &str, range_arg: &str) -> Self {
        Self {
            book: BookRef::clone(book),
            sheet_name: sheet_name.to_string(),
            range_arg: range_arg.to_string(),
        }
    }

    /// Resolve the range against the live book
    pub(crate) fn range(&self) -> Result<Box<dyn Range>> {
        let sheet = self.book.sheet(&self.sheet_name).ok_or_else(|| {
            Error::argument(format!("sheet '{}' not found", self.sheet_name))
        })?;
        sheet.range(&self.range_arg)
    }

    pub(crate) fn describe(&self) -> String {
        format!("{}!{}", self.sheet_name, self.range_arg)
    }
}

impl std::fmt::Debug for RangeBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeBinding")
            .field("sheet_name", &self.sheet_name)
            .field("range_arg", &self.range_arg)
            .finish()
    }
}

/// Compare cell values the way a spreadsheet user would: integers and
/// floats compare by numeric value
pub(crate) fn same_value(a: &CellValue, b: &CellValue) -> bool {
    match (a, b) {
        (CellValue::Int(i), CellValue::Float(f)) | (CellValue::Float(f), CellValue::Int(i)) => {
            *i as f64 == *f
        }
        _ => a == b,
    }
}

/// Read a header cell; a never-written cell reads as `None`
pub(crate) fn header_cell_value(cell: &dyn Cell) -> Result<Option<CellValue>> {
    match cell.value() {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == ErrorKind::Internal => Ok(None),
        Err(e) => Err(e),
    }
}

/// A bound form item
#[derive(Debug)]
pub enum FormItem {
    Cell(FormItemCell),
    KeyValueCells(FormItemKeyValueCells),
    Table(FormItemTable),
}

impl FormItem {
    /// Build the item a spec describes, bound to `book`
    pub fn build(book: &BookRef, spec: &FormItemSpec) -> Result<Self> {
        match spec {
            FormItemSpec::Cell(args) => {
                FormItemCell::new(book, &args.sheet_name, &args.range_arg).map(FormItem::Cell)
            }
            FormItemSpec::KeyValueCells(args) => FormItemKeyValueCells::new(
                book,
                &args.sheet_name,
                &args.range_arg,
                args.header_value.clone(),
            )
            .map(FormItem::KeyValueCells),
            FormItemSpec::Table(args) => FormItemTable::new(
                book,
                &args.sheet_name,
                &args.range_arg,
                args.header_rows_count,
                args.header_path_list.clone(),
            )
            .map(FormItem::Table),
        }
    }

    fn binding(&self) -> &dyn ItemBinding {
        match self {
            FormItem::Cell(item) => item,
            FormItem::KeyValueCells(item) => item,
            FormItem::Table(item) => item,
        }
    }

    /// Read the item's range into a document
    pub fn get_item_doc(&self) -> Result<ItemDoc> {
        let item = self.binding();
        let read = || -> Result<ItemDoc> {
            item.validate_book()?;
            let doc = item.read()?;
            item.validate_item_doc(&doc)?;
            Ok(doc)
        };
        read().map_err(Error::into_argument)
    }

    /// Write a document back into the item's range
    pub fn set_item_doc(&self, doc: &ItemDoc) -> Result<()> {
        let item = self.binding();
        let write = || -> Result<()> {
            item.validate_item_doc(doc)?;
            item.validate_book()?;
            item.write(doc)?;
            item.validate_book()
        };
        write().map_err(Error::into_argument)
    }
}

impl From<FormItemCell> for FormItem {
    fn from(item: FormItemCell) -> Self {
        FormItem::Cell(item)
    }
}

impl From<FormItemKeyValueCells> for FormItem {
    fn from(item: FormItemKeyValueCells) -> Self {
        FormItem::KeyValueCells(item)
    }
}

impl From<FormItemTable> for FormItem {
    fn from(item: FormItemTable) -> Self {
        FormItem::Table(item)
    }
}
