use xlform_core::{BookRef, CellValue, Error, Result};

use super::{ItemBinding, RangeBinding};
use crate::dump::cell_dump;
use crate::item_doc::ItemDoc;

/// A single cell; the document result is the cell value
#[derive(Debug)]
pub struct FormItemCell {
    binding: RangeBinding,
}

impl FormItemCell {
    /// Bind a 1x1 range; any other shape is an argument error
    pub fn new(book: &BookRef, sheet_name: &str, range_arg: &str) -> Result<Self> {
        let item = Self {
            binding: RangeBinding::new(book, sheet_name, range_arg),
        };
        item.validate_book().map_err(Error::into_argument)?;
        Ok(item)
    }
}

impl ItemBinding for FormItemCell {
    fn validate_book(&self) -> Result<()> {
        let range = self.binding.range()?;
        if range.rows_count() != 1 || range.columns_count() != 1 {
            return Err(Error::validation(format!(
                "{} must be a single cell, got {}x{}",
                self.binding.describe(),
                range.rows_count(),
                range.columns_count()
            )));
        }
        Ok(())
    }

    fn validate_item_doc(&self, _doc: &ItemDoc) -> Result<()> {
        Ok(())
    }

    fn read(&self) -> Result<ItemDoc> {
        let cell = self.binding.range()?.cell(1, 1)?;
        ItemDoc::with_meta(cell.value()?, cell_dump(cell.as_ref())?)
    }

    fn write(&self, doc: &ItemDoc) -> Result<()> {
        let value = CellValue::try_from(doc.result())?;
        self.binding.range()?.cell(1, 1)?.set_value(value)
    }
}
