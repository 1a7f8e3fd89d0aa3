use xlform_core::{BookRef, CellValue, Error, Result};

use super::{header_cell_value, same_value, ItemBinding, RangeBinding};
use crate::dump::cell_dump;
use crate::item_doc::ItemDoc;

/// A header cell and a value cell side by side.
///
/// The left cell must hold `header_value`; the document result is the
/// right cell's value.
#[derive(Debug)]
pub struct FormItemKeyValueCells {
    binding: RangeBinding,
    header_value: CellValue,
}

impl FormItemKeyValueCells {
    pub fn new(
        book: &BookRef,
        sheet_name: &str,
        range_arg: &str,
        header_value: CellValue,
    ) -> Result<Self> {
        let item = Self {
            binding: RangeBinding::new(book, sheet_name, range_arg),
            header_value,
        };
        item.validate_book().map_err(Error::into_argument)?;
        Ok(item)
    }

    pub fn header_value(&self) -> &CellValue {
        &self.header_value
    }
}

impl ItemBinding for FormItemKeyValueCells {
    fn validate_book(&self) -> Result<()> {
        let range = self.binding.range()?;
        if range.rows_count() != 1 || range.columns_count() != 2 {
            return Err(Error::validation(format!(
                "{} must be 1x2, got {}x{}",
                self.binding.describe(),
                range.rows_count(),
                range.columns_count()
            )));
        }

        match header_cell_value(range.cell(1, 1)?.as_ref())? {
            Some(header) if same_value(&header, &self.header_value) => Ok(()),
            Some(header) => Err(Error::validation(format!(
                "{}: header is {}, expected {}",
                self.binding.describe(),
                header,
                self.header_value
            ))),
            None => Err(Error::validation(format!(
                "{}: header is empty, expected {}",
                self.binding.describe(),
                self.header_value
            ))),
        }
    }

    fn validate_item_doc(&self, _doc: &ItemDoc) -> Result<()> {
        Ok(())
    }

    fn read(&self) -> Result<ItemDoc> {
        let cell = self.binding.range()?.cell(1, 2)?;
        ItemDoc::with_meta(cell.value()?, cell_dump(cell.as_ref())?)
    }

    fn write(&self, doc: &ItemDoc) -> Result<()> {
        let value = CellValue::try_from(doc.result())?;
        self.binding.range()?.cell(1, 2)?.set_value(value)
    }
}
