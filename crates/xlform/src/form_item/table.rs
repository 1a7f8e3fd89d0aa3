use xlform_core::{BookRef, CellValue, Error, Range, Result};

use super::{header_cell_value, same_value, ItemBinding, RangeBinding};
use crate::dump::cell_dump;
use crate::item_doc::ItemDoc;
use crate::value::{ensure_parents, lookup_path, HeaderPath, Map, Value};

/// A rectangle whose first `header_rows_count` rows are headers.
///
/// Without header rows the result is a list of rows, each a list of cell
/// values. With header rows every data row becomes a map; each column's
/// value is stored under its header path, so columns sharing a path prefix
/// share the intermediate maps:
///
/// ```text
/// | head1  | head1  | head2  |
/// | head11 | head12 | head21 |   -> {"head1": {"head11": 1, "head12": 2},
/// | 1      | 2      | 3      |       "head2": {"head21": 3}}
/// ```
#[derive(Debug)]
pub struct FormItemTable {
    binding: RangeBinding,
    header_rows_count: u32,
    header_paths: Vec<HeaderPath>,
}

impl FormItemTable {
    /// Bind a table.
    ///
    /// A negative `header_rows_count` is an argument error. With header
    /// rows, `header_path_list` must hold one path per column, each exactly
    /// `header_rows_count` keys long, matching the header cells of the live
    /// book.
    pub fn new(
        book: &BookRef,
        sheet_name: &str,
        range_arg: &str,
        header_rows_count: i64,
        header_path_list: Option<Vec<Vec<String>>>,
    ) -> Result<Self> {
        if header_rows_count < 0 {
            return Err(Error::argument(format!(
                "header_rows_count must be >= 0, got {}",
                header_rows_count
            )));
        }
        let header_rows_count = u32::try_from(header_rows_count).map_err(|_| {
            Error::argument(format!(
                "header_rows_count {} is out of range",
                header_rows_count
            ))
        })?;

        let header_paths = if header_rows_count == 0 {
            Vec::new()
        } else {
            let list = header_path_list.ok_or_else(|| {
                Error::argument("header_path_list is required when there are header rows")
            })?;
            list.into_iter()
                .map(|keys| {
                    if keys.len() != header_rows_count as usize {
                        return Err(Error::argument(format!(
                            "header path {:?} has {} keys, expected {}",
                            keys,
                            keys.len(),
                            header_rows_count
                        )));
                    }
                    HeaderPath::new(keys)
                })
                .collect::<Result<Vec<_>>>()?
        };

        let item = Self {
            binding: RangeBinding::new(book, sheet_name, range_arg),
            header_rows_count,
            header_paths,
        };
        if header_rows_count > 0 {
            item.validate_book().map_err(Error::into_argument)?;
        }
        Ok(item)
    }

    pub fn header_rows_count(&self) -> u32 {
        self.header_rows_count
    }

    pub fn header_paths(&self) -> &[HeaderPath] {
        &self.header_paths
    }

    fn validate_headers(&self, range: &dyn Range) -> Result<()> {
        if self.header_paths.len() != range.columns_count() as usize {
            return Err(Error::argument(format!(
                "{}: {} header paths for {} columns",
                self.binding.describe(),
                self.header_paths.len(),
                range.columns_count()
            )));
        }

        for (col, path) in (1..).zip(&self.header_paths) {
            for (row, key) in (1..).zip(path.keys()) {
                let cell = range.cell(row, col)?;
                let found = match header_cell_value(cell.as_ref())? {
                    Some(header) if same_value(&header, &CellValue::text(key.as_str())) => {
                        continue
                    }
                    Some(header) => header.to_string(),
                    None => "empty".to_string(),
                };
                return Err(Error::validation(format!(
                    "{}: header at {} is {}, expected {}",
                    self.binding.describe(),
                    cell.address(false, false),
                    found,
                    key
                )));
            }
        }
        Ok(())
    }

    fn validate_row(&self, range: &dyn Range, index: usize, row: &Value) -> Result<()> {
        match row {
            Value::List(cells) => {
                if cells.len() != range.columns_count() as usize {
                    return Err(Error::validation(format!(
                        "row {} has {} values, expected {}",
                        index,
                        cells.len(),
                        range.columns_count()
                    )));
                }
                Ok(())
            }
            Value::Map(map) => {
                if self.header_paths.is_empty() {
                    return Err(Error::validation(format!(
                        "row {} is a map but the table has no header rows",
                        index
                    )));
                }
                for path in &self.header_paths {
                    lookup_path(map, path)?;
                }
                Ok(())
            }
            other => Err(Error::validation(format!(
                "row {} is a {}, expected a list or a map",
                index,
                other.type_name()
            ))),
        }
    }

    fn read_rows(&self, range: &dyn Range, meta: &mut Map) -> Result<Vec<Value>> {
        let mut rows = Vec::new();
        for row in (self.header_rows_count + 1)..=range.rows_count() {
            let mut cells = Vec::new();
            for col in 1..=range.columns_count() {
                let cell = range.cell(row, col)?;
                meta.extend(cell_dump(cell.as_ref())?);
                cells.push(Value::from(cell.value()?));
            }
            rows.push(Value::List(cells));
        }
        Ok(rows)
    }

    fn read_row_maps(&self, range: &dyn Range, meta: &mut Map) -> Result<Vec<Value>> {
        let mut rows = Vec::new();
        for row in (self.header_rows_count + 1)..=range.rows_count() {
            let mut row_map = Map::new();
            for (col, path) in (1..).zip(&self.header_paths) {
                let cell = range.cell(row, col)?;
                meta.extend(cell_dump(cell.as_ref())?);
                ensure_parents(&mut row_map, path)?
                    .insert(path.leaf().to_string(), Value::from(cell.value()?));
            }
            rows.push(Value::Map(row_map));
        }
        Ok(rows)
    }
}

impl ItemBinding for FormItemTable {
    fn validate_book(&self) -> Result<()> {
        let range = self.binding.range()?;
        if range.rows_count() <= self.header_rows_count {
            return Err(Error::validation(format!(
                "{} has {} rows, needs more than {} header rows",
                self.binding.describe(),
                range.rows_count(),
                self.header_rows_count
            )));
        }
        if self.header_rows_count > 0 {
            self.validate_headers(range.as_ref())?;
        }
        Ok(())
    }

    fn validate_item_doc(&self, doc: &ItemDoc) -> Result<()> {
        let range = self.binding.range()?;
        let rows = doc.result_ref().as_list().ok_or_else(|| {
            Error::validation(format!(
                "table result must be a list, got a {}",
                doc.result_ref().type_name()
            ))
        })?;

        let data_rows = range.rows_count().saturating_sub(self.header_rows_count) as usize;
        if rows.len() != data_rows {
            return Err(Error::validation(format!(
                "table result has {} rows, expected {}",
                rows.len(),
                data_rows
            )));
        }

        for (index, row) in rows.iter().enumerate() {
            self.validate_row(range.as_ref(), index, row)?;
        }
        Ok(())
    }

    fn read(&self) -> Result<ItemDoc> {
        let range = self.binding.range()?;
        let mut meta = Map::new();
        let rows = if self.header_rows_count == 0 {
            self.read_rows(range.as_ref(), &mut meta)?
        } else {
            self.read_row_maps(range.as_ref(), &mut meta)?
        };
        ItemDoc::with_meta(Value::List(rows), meta)
    }

    fn write(&self, doc: &ItemDoc) -> Result<()> {
        let range = self.binding.range()?;
        let rows = doc
            .result_ref()
            .as_list()
            .ok_or_else(|| Error::argument("table result must be a list"))?;

        let data_rows = range.rows_count().saturating_sub(self.header_rows_count);
        if rows.len() as u32 != data_rows {
            return Err(Error::argument(format!(
                "table result has {} rows, expected {}",
                rows.len(),
                data_rows
            )));
        }
        let mut lists = Vec::with_capacity(rows.len());
        for row in rows {
            match row {
                Value::List(cells) if cells.len() as u32 == range.columns_count() => {
                    lists.push(cells)
                }
                Value::Map(_) => {
                    return Err(Error::not_implemented("writing table rows given as maps"))
                }
                _ => {
                    return Err(Error::argument(format!(
                        "table rows must be lists of {} values",
                        range.columns_count()
                    )))
                }
            }
        }

        for (row, cells) in (self.header_rows_count + 1..).zip(lists) {
            for (col, value) in (1..).zip(cells) {
                let value = CellValue::try_from(value.clone())?;
                range.cell(row, col)?.set_value(value)?;
            }
        }
        Ok(())
    }
}
