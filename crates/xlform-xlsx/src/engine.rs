//! [`xlform_core`] capability traits over the xlsx workbook model

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use log::debug;
use xlform_core::{
    Book, BookRef, Cell, CellRange, CellValue, Engine, Error, RangeRef, RangeWindow, Range,
    Result, Sheet, MAX_COLS, MAX_ROWS,
};

use crate::number_format;
use crate::options::XlsxOptions;
use crate::reader::XlsxReader;
use crate::workbook::{CellContent, StoredCell, Workbook, Worksheet};
use crate::writer::XlsxWriter;

const DISPLAY_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug)]
struct BookState {
    workbook: Workbook,
    closed: bool,
}

type SharedState = Rc<RefCell<BookState>>;

fn sheet_ref<T>(state: &SharedState, index: usize, f: impl FnOnce(&Worksheet) -> T) -> Result<T> {
    let state = state.borrow();
    let sheet = state
        .workbook
        .worksheet(index)
        .ok_or_else(|| Error::internal(format!("sheet index {} out of bounds", index)))?;
    Ok(f(sheet))
}

fn sheet_mut<T>(
    state: &SharedState,
    index: usize,
    f: impl FnOnce(&mut Worksheet) -> T,
) -> Result<T> {
    let mut state = state.borrow_mut();
    if state.closed {
        return Err(Error::argument("book is closed"));
    }
    let sheet = state
        .workbook
        .worksheet_mut(index)
        .ok_or_else(|| Error::internal(format!("sheet index {} out of bounds", index)))?;
    Ok(f(sheet))
}

/// Engine backed by the in-memory xlsx workbook model
#[derive(Debug, Clone, Default)]
pub struct XlsxEngine {
    options: XlsxOptions,
}

impl XlsxEngine {
    /// Create an engine with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom options
    pub fn with_options(options: XlsxOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &XlsxOptions {
        &self.options
    }
}

impl Engine for XlsxEngine {
    fn new_book(&self) -> Result<BookRef> {
        let workbook = Workbook::with_sheet(&self.options.default_sheet_name)?;
        Ok(Rc::new(XlsxBook::new(workbook)))
    }

    fn open_book(&self, path: &Path) -> Result<BookRef> {
        let workbook = XlsxReader::read_file(path)?;
        debug!(
            "opened {} ({} sheets)",
            path.display(),
            workbook.sheet_count()
        );
        Ok(Rc::new(XlsxBook::new(workbook)))
    }
}

/// An open xlsx book
#[derive(Debug, Clone)]
pub struct XlsxBook {
    state: SharedState,
}

impl XlsxBook {
    /// Wrap a workbook
    pub fn new(workbook: Workbook) -> Self {
        Self {
            state: Rc::new(RefCell::new(BookState {
                workbook,
                closed: false,
            })),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// A copy of the current workbook contents
    pub fn snapshot(&self) -> Workbook {
        self.state.borrow().workbook.clone()
    }

    fn sheet_handle(&self, index: usize, name: &str) -> XlsxSheet {
        XlsxSheet {
            state: Rc::clone(&self.state),
            index,
            name: name.to_string(),
        }
    }
}

impl Book for XlsxBook {
    fn save(&self, path: &Path) -> Result<()> {
        let state = self.state.borrow();
        if state.closed {
            return Err(Error::argument("cannot save a closed book"));
        }
        XlsxWriter::write_file(&state.workbook, path)?;
        debug!(
            "saved {} ({} sheets)",
            path.display(),
            state.workbook.sheet_count()
        );
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.state.borrow_mut().closed = true;
        Ok(())
    }

    fn sheets(&self) -> Vec<Box<dyn Sheet>> {
        let state = self.state.borrow();
        state
            .workbook
            .worksheets()
            .enumerate()
            .map(|(index, ws)| Box::new(self.sheet_handle(index, ws.name())) as Box<dyn Sheet>)
            .collect()
    }

    fn add_sheet(&self, name: &str) -> Result<Box<dyn Sheet>> {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Err(Error::argument("cannot add a sheet to a closed book"));
        }
        let index = state.workbook.add_worksheet_with_name(name)?;
        drop(state);
        Ok(Box::new(self.sheet_handle(index, name)))
    }
}

/// A worksheet of an [`XlsxBook`]
#[derive(Debug, Clone)]
pub struct XlsxSheet {
    state: SharedState,
    index: usize,
    name: String,
}

impl XlsxSheet {
    pub fn is_protected(&self) -> Result<bool> {
        sheet_ref(&self.state, self.index, |ws| ws.is_protected())
    }

    fn cell_handle(&self, row: u32, column: u32) -> XlsxCell {
        XlsxCell {
            state: Rc::clone(&self.state),
            sheet: self.index,
            row,
            column,
        }
    }
}

impl Sheet for XlsxSheet {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn range(&self, expr: &str) -> Result<Box<dyn Range>> {
        let range_ref = RangeRef::parse(expr)?;
        let (max_row, max_col) = sheet_ref(&self.state, self.index, |ws| ws.used_bounds())?;
        Ok(Box::new(XlsxRange {
            sheet: self.clone(),
            window: RangeWindow::new(range_ref.resolve(max_row, max_col)),
        }))
    }

    fn cell(&self, row: u32, column: u32) -> Result<Box<dyn Cell>> {
        if row < 1 || row > MAX_ROWS || column < 1 || column > MAX_COLS {
            return Err(Error::argument(format!(
                "Cell ({}, {}) outside the sheet",
                row, column
            )));
        }
        Ok(Box::new(self.cell_handle(row, column)))
    }

    fn protect(&self) -> Result<()> {
        sheet_mut(&self.state, self.index, |ws| ws.set_protected(true))
    }

    fn unprotect(&self) -> Result<()> {
        sheet_mut(&self.state, self.index, |ws| ws.set_protected(false))
    }
}

/// A rectangular window over an [`XlsxSheet`]
#[derive(Debug, Clone)]
pub struct XlsxRange {
    sheet: XlsxSheet,
    window: RangeWindow,
}

impl XlsxRange {
    /// The sheet range this window covers
    pub fn bounds(&self) -> CellRange {
        self.window.range()
    }
}

impl Range for XlsxRange {
    fn rows_count(&self) -> u32 {
        self.window.rows_count()
    }

    fn columns_count(&self) -> u32 {
        self.window.columns_count()
    }

    fn cell(&self, row: u32, column: u32) -> Result<Box<dyn Cell>> {
        let addr = self.window.locate(row, column)?;
        Ok(Box::new(self.sheet.cell_handle(addr.row, addr.col)))
    }
}

/// A single cell of an [`XlsxSheet`]
#[derive(Debug, Clone)]
pub struct XlsxCell {
    state: SharedState,
    sheet: usize,
    row: u32,
    column: u32,
}

impl XlsxCell {
    fn stored(&self) -> Result<StoredCell> {
        sheet_ref(&self.state, self.sheet, |ws| {
            ws.cell_at(self.row, self.column).cloned().unwrap_or_default()
        })
    }

    fn empty_error(&self) -> Error {
        Error::internal(format!(
            "cell {} has no value",
            self.address(false, false)
        ))
    }
}

impl Cell for XlsxCell {
    fn formula(&self) -> Result<CellValue> {
        match self.stored()?.content {
            CellContent::Empty => Err(self.empty_error()),
            CellContent::Text(s) | CellContent::Formula(s) => Ok(CellValue::Text(s)),
            CellContent::Int(i) => Ok(CellValue::Int(i)),
            CellContent::Float(f) => Ok(CellValue::Float(f)),
            CellContent::DateTime(dt) => Ok(CellValue::DateTime(dt)),
        }
    }

    fn value(&self) -> Result<CellValue> {
        match self.stored()?.content {
            CellContent::Empty => Err(self.empty_error()),
            CellContent::Formula(f) => Err(Error::not_implemented(format!(
                "formula evaluation ({})",
                f
            ))),
            CellContent::Text(s) => Ok(CellValue::Text(s)),
            CellContent::Int(i) => Ok(CellValue::Int(i)),
            CellContent::Float(f) => Ok(CellValue::Float(f)),
            CellContent::DateTime(dt) => Ok(CellValue::DateTime(dt)),
        }
    }

    fn number_format(&self) -> Result<String> {
        Ok(self.stored()?.format_code().to_string())
    }

    fn text(&self) -> Result<String> {
        let stored = self.stored()?;
        let code = stored.format_code().to_string();
        let general = number_format::is_general(&code);
        match stored.content {
            CellContent::Empty => Ok(String::new()),
            CellContent::Formula(_) => Err(Error::not_implemented("text of formula cells")),
            CellContent::DateTime(dt) => Ok(dt.format(DISPLAY_DATETIME).to_string()),
            CellContent::Text(s) if general || code == "@" => Ok(s),
            CellContent::Int(i) if general => Ok(i.to_string()),
            CellContent::Float(f) if general => Ok(f.to_string()),
            _ => Err(Error::not_implemented(format!(
                "rendering number format '{}'",
                code
            ))),
        }
    }

    fn row(&self) -> u32 {
        self.row
    }

    fn column(&self) -> u32 {
        self.column
    }

    fn set_value(&self, value: CellValue) -> Result<()> {
        sheet_mut(&self.state, self.sheet, |ws| {
            ws.set_value_at(self.row, self.column, value)
        })
    }
}
