//! In-memory workbook model

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use xlform_core::{CellValue, Error, Result, MAX_SHEET_NAME_LEN};

use crate::number_format;

/// Stored content of a cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellContent {
    /// Never written
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    /// Formula text including the leading `=`
    Formula(String),
}

impl From<CellValue> for CellContent {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Text(s) if s.starts_with('=') => CellContent::Formula(s),
            CellValue::Text(s) => CellContent::Text(s),
            CellValue::Int(i) => CellContent::Int(i),
            CellValue::Float(f) => CellContent::Float(f),
            CellValue::DateTime(dt) => CellContent::DateTime(dt),
        }
    }
}

/// A cell as held by a [`Worksheet`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredCell {
    pub content: CellContent,
    /// Number format code; `None` means General
    pub number_format: Option<String>,
}

impl StoredCell {
    /// The effective number format code
    pub fn format_code(&self) -> &str {
        self.number_format.as_deref().unwrap_or(number_format::GENERAL)
    }
}

/// A worksheet: sparse row-major cell storage plus a protection flag
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<(u32, u32), StoredCell>,
    protected: bool,
}

impl Worksheet {
    /// Create an empty worksheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            protected: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a stored cell at 1-based coordinates
    pub fn cell_at(&self, row: u32, col: u32) -> Option<&StoredCell> {
        self.cells.get(&(row, col))
    }

    /// Get a stored cell for writing, creating it if needed
    pub fn cell_at_mut(&mut self, row: u32, col: u32) -> &mut StoredCell {
        self.cells.entry((row, col)).or_default()
    }

    /// Store a value.
    ///
    /// Text starting with `=` becomes a formula. A date-time written to a
    /// General-formatted cell switches the cell to a date-time format.
    pub fn set_value_at(&mut self, row: u32, col: u32, value: CellValue) {
        let cell = self.cell_at_mut(row, col);
        if matches!(value, CellValue::DateTime(_)) && number_format::is_general(cell.format_code())
        {
            cell.number_format = Some(number_format::DEFAULT_DATETIME_FORMAT.to_string());
        }
        cell.content = value.into();
    }

    /// Set the number format code of a cell
    pub fn set_number_format_at<S: Into<String>>(&mut self, row: u32, col: u32, code: S) {
        let code = code.into();
        let cell = self.cell_at_mut(row, col);
        cell.number_format = if number_format::is_general(&code) {
            None
        } else {
            Some(code)
        };
    }

    /// Iterate over stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, &StoredCell)> {
        self.cells.iter().map(|(&(row, col), cell)| (row, col, cell))
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Highest used row and column, `(0, 0)` for an empty sheet
    pub fn used_bounds(&self) -> (u32, u32) {
        self.cells
            .keys()
            .fold((0, 0), |(max_row, max_col), &(row, col)| {
                (max_row.max(row), max_col.max(col))
            })
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
    }
}

/// A workbook: an ordered list of worksheets
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create a workbook with no worksheets
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a workbook with one worksheet
    pub fn with_sheet(name: &str) -> Result<Self> {
        let mut workbook = Self::empty();
        workbook.add_worksheet_with_name(name)?;
        Ok(workbook)
    }

    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Get the index of a worksheet by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets.iter().position(|ws| ws.name() == name)
    }

    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Append a worksheet, returning its index
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name)?;

        let index = self.worksheets.len();
        self.worksheets.push(Worksheet::new(name));
        Ok(index)
    }

    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::argument("Sheet name cannot be empty"));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::argument(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(Error::argument(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }

        // Duplicates are case-insensitive
        let name_lower = name.to_lowercase();
        if self
            .worksheets
            .iter()
            .any(|ws| ws.name().to_lowercase() == name_lower)
        {
            return Err(Error::argument(format!(
                "Sheet name '{}' already exists",
                name
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use xlform_core::ErrorKind;

    #[test]
    fn test_sheet_name_validation() {
        let mut wb = Workbook::with_sheet("Data").unwrap();
        assert_eq!(wb.add_worksheet_with_name("Other").unwrap(), 1);

        for bad in ["", "data", "a:b", "a/b", "[x]", "this name is far too long for a sheet"] {
            let err = wb.add_worksheet_with_name(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Argument, "{}", bad);
        }
        assert_eq!(wb.sheet_count(), 2);
        assert_eq!(wb.sheet_index("Other"), Some(1));
    }

    #[test]
    fn test_formula_text_is_stored_as_formula() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_value_at(1, 1, CellValue::text("=1+1"));
        ws.set_value_at(1, 2, CellValue::text("plain"));
        assert_eq!(
            ws.cell_at(1, 1).unwrap().content,
            CellContent::Formula("=1+1".into())
        );
        assert_eq!(
            ws.cell_at(1, 2).unwrap().content,
            CellContent::Text("plain".into())
        );
    }

    #[test]
    fn test_datetime_gets_date_format() {
        let dt = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let mut ws = Worksheet::new("Sheet1");
        ws.set_value_at(2, 2, CellValue::DateTime(dt));
        assert_eq!(ws.cell_at(2, 2).unwrap().format_code(), "yyyy-mm-dd h:mm:ss");

        // An explicit format is kept
        ws.set_number_format_at(3, 1, "d-mmm-yy");
        ws.set_value_at(3, 1, CellValue::DateTime(dt));
        assert_eq!(ws.cell_at(3, 1).unwrap().format_code(), "d-mmm-yy");
    }

    #[test]
    fn test_used_bounds_and_order() {
        let mut ws = Worksheet::new("Sheet1");
        assert_eq!(ws.used_bounds(), (0, 0));

        ws.set_value_at(3, 1, CellValue::Int(3));
        ws.set_value_at(1, 2, CellValue::Int(1));
        ws.set_value_at(1, 1, CellValue::Int(0));
        assert_eq!(ws.used_bounds(), (3, 2));

        let order: Vec<(u32, u32)> = ws.iter_cells().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(order, vec![(1, 1), (1, 2), (3, 1)]);
    }
}
