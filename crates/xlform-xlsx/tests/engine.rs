//! Capability contract tests for the xlsx engine (save -> open -> inspect)

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use xlform_core::{Book, BookRef, Cell, CellValue, Engine, ErrorKind, Range, Sheet};
use xlform_xlsx::{Workbook, XlsxEngine, XlsxReader, XlsxWriter};

/// Write a one-sheet book named "Sheet" holding `rows` from A1
fn book_path(dir: &TempDir, rows: &[Vec<CellValue>]) -> PathBuf {
    let mut wb = Workbook::with_sheet("Sheet").unwrap();
    let ws = wb.worksheet_mut(0).unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            ws.set_value_at(r as u32 + 1, c as u32 + 1, value.clone());
        }
    }
    let path = dir.path().join("book.xlsx");
    XlsxWriter::write_file(&wb, &path).unwrap();
    path
}

fn a1_zero_book(dir: &TempDir) -> PathBuf {
    book_path(dir, &[vec![CellValue::Int(0)]])
}

fn grid(rows: &[&[i64]]) -> Vec<Vec<CellValue>> {
    rows.iter()
        .map(|row| row.iter().map(|v| CellValue::Int(*v)).collect())
        .collect()
}

fn open(path: &Path) -> BookRef {
    XlsxEngine::new().open_book(path).unwrap()
}

/// A new book has exactly one sheet, named like Excel names it
#[test]
fn test_new_book_has_only_sheet1() {
    let book = XlsxEngine::new().new_book().unwrap();
    let sheets = book.sheets();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].name(), "Sheet1");
}

/// Opening keeps the stored sheet names
#[test]
fn test_open_book() {
    let dir = TempDir::new().unwrap();
    let book = open(&a1_zero_book(&dir));
    let sheets = book.sheets();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].name(), "Sheet");
}

/// Opening something that is not an xlsx file is a backend failure
#[test]
fn test_open_book_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("not-a-book.xlsx");
    std::fs::write(&path, b"plain text").unwrap();

    let err = XlsxEngine::new().open_book(&path).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Backend);
}

/// Saving writes a file that reads back with the same content
#[test]
fn test_book_save() {
    let dir = TempDir::new().unwrap();
    let book = open(&a1_zero_book(&dir));
    let path2 = dir.path().join("saved.xlsx");
    book.save(&path2).unwrap();

    assert!(path2.exists());
    let wb = XlsxReader::read_file(&path2).unwrap();
    assert_eq!(
        wb.worksheet(0).unwrap().cell_at(1, 1).unwrap().content,
        xlform_xlsx::CellContent::Int(0)
    );
}

/// Closing succeeds and blocks later saves
#[test]
fn test_book_close() {
    let dir = TempDir::new().unwrap();
    let book = open(&a1_zero_book(&dir));
    book.close().unwrap();

    let err = book.save(&dir.path().join("closed.xlsx")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);
}

/// Sheets come back in document order
#[test]
fn test_book_sheets_order() {
    let dir = TempDir::new().unwrap();
    let book = open(&a1_zero_book(&dir));
    book.add_sheet("Sheet2").unwrap();
    let path2 = dir.path().join("two.xlsx");
    book.save(&path2).unwrap();

    let reopened = open(&path2);
    let names: Vec<String> = reopened.sheets().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["Sheet".to_string(), "Sheet2".to_string()]);
    assert!(reopened.sheet("Sheet2").is_some());
}

/// Duplicate sheet names are rejected case-insensitively
#[test]
fn test_book_add_sheet_duplicate() {
    let book = XlsxEngine::new().new_book().unwrap();
    let err = book.add_sheet("SHEET1").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Argument);
}

/// The four range expression shapes
#[test]
fn test_sheet_range_shapes() {
    let dir = TempDir::new().unwrap();
    let book = open(&book_path(&dir, &grid(&[&[11, 12], &[21, 22], &[31, 32]])));
    let sheet = &book.sheets()[0];

    let cases = [("A1:B3", 3, 2), ("A:A", 3, 1), ("1:1", 1, 2), ("B1", 1, 1), ("A1:C2", 2, 3)];
    for (expr, rows, columns) in cases {
        let r = sheet.range(expr).unwrap();
        assert_eq!((r.rows_count(), r.columns_count()), (rows, columns), "{}", expr);
    }

    let err = sheet.range("A1:").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Argument);
}

/// Range (1, 1) is the top-left of the referenced region
#[test]
fn test_range_cell_offset() {
    let dir = TempDir::new().unwrap();
    let book = open(&book_path(
        &dir,
        &grid(&[&[11, 12, 13], &[21, 22, 23], &[31, 32, 33]]),
    ));
    let sheet = &book.sheets()[0];

    let origin = sheet.range("A1:C2").unwrap().cell(1, 1).unwrap();
    assert_eq!(origin.value().unwrap(), CellValue::Int(11));

    let r = sheet.range("B2:C3").unwrap();
    let c = r.cell(1, 1).unwrap();
    assert_eq!(c.value().unwrap(), CellValue::Int(22));
    assert_eq!(c.address(false, false), "B2");

    r.cell(2, 1).unwrap();
    let err = r.cell(3, 1).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Argument);
}

/// Formula text is kept raw and cannot be evaluated
#[test]
fn test_cell_formula() {
    let dir = TempDir::new().unwrap();
    let book = open(&book_path(&dir, &[vec![CellValue::text("=1+1")]]));
    let c = book.sheets()[0].cell(1, 1).unwrap();

    assert_eq!(c.formula().unwrap(), CellValue::text("=1+1"));
    assert_eq!(c.value().unwrap_err().kind(), ErrorKind::NotImplemented);
    assert_eq!(c.text().unwrap_err().kind(), ErrorKind::NotImplemented);
}

/// Values keep their type through a file round trip
#[test]
fn test_cell_value_types() {
    let dt = NaiveDate::from_ymd_opt(2023, 7, 14)
        .unwrap()
        .and_hms_opt(9, 15, 30)
        .unwrap();
    let dir = TempDir::new().unwrap();
    let book = open(&book_path(
        &dir,
        &[vec![
            CellValue::Int(1),
            CellValue::Float(1.5),
            CellValue::text("a"),
            CellValue::DateTime(dt),
        ]],
    ));
    let sheet = &book.sheets()[0];

    let values: Vec<CellValue> = (1..=4)
        .map(|col| sheet.cell(1, col).unwrap().value().unwrap())
        .collect();
    assert_eq!(
        values,
        vec![
            CellValue::Int(1),
            CellValue::Float(1.5),
            CellValue::text("a"),
            CellValue::DateTime(dt),
        ]
    );
    assert_eq!(sheet.cell(1, 1).unwrap().formula().unwrap(), CellValue::Int(1));
    assert_eq!(sheet.cell(1, 2).unwrap().formula().unwrap(), CellValue::Float(1.5));
    assert_eq!(sheet.cell(1, 3).unwrap().formula().unwrap(), CellValue::text("a"));
    assert_eq!(
        sheet.cell(1, 4).unwrap().formula().unwrap(),
        CellValue::DateTime(dt)
    );
    assert_eq!(
        sheet.cell(1, 4).unwrap().number_format().unwrap(),
        "yyyy-mm-dd h:mm:ss"
    );
    assert_eq!(sheet.cell(1, 4).unwrap().text().unwrap(), "2023-07-14 09:15:30");
}

/// Number format and display text of a General cell
#[test]
fn test_cell_number_format_and_text() {
    let dir = TempDir::new().unwrap();
    let book = open(&a1_zero_book(&dir));
    let c = book.sheets()[0].cell(1, 1).unwrap();

    assert_eq!(c.number_format().unwrap(), "General");
    assert_eq!(c.text().unwrap(), "0");
}

/// Coordinates and addresses
#[test]
fn test_cell_position_and_address() {
    let dir = TempDir::new().unwrap();
    let book = open(&a1_zero_book(&dir));
    let sheet = &book.sheets()[0];

    let c = sheet.cell(2, 3).unwrap();
    assert_eq!((c.row(), c.column()), (2, 3));

    let c = sheet.cell(1, 1).unwrap();
    assert_eq!(c.address(true, true), "$A$1");
    assert_eq!(c.address(false, false), "A1");

    assert_eq!(sheet.cell(0, 1).err().unwrap().kind(), ErrorKind::Argument);
}

/// set_value is visible immediately and after saving
#[test]
fn test_cell_set_value() {
    let dir = TempDir::new().unwrap();
    let book = open(&a1_zero_book(&dir));
    let c = book.sheets()[0].cell(1, 1).unwrap();
    c.set_value(CellValue::Int(1)).unwrap();
    assert_eq!(c.value().unwrap(), CellValue::Int(1));

    let path2 = dir.path().join("set.xlsx");
    book.save(&path2).unwrap();
    let reopened = open(&path2);
    assert_eq!(
        reopened.sheets()[0].cell(1, 1).unwrap().value().unwrap(),
        CellValue::Int(1)
    );
}

/// Protection is persisted; calculation is not available
#[test]
fn test_sheet_protect_unprotect() {
    let dir = TempDir::new().unwrap();
    let book = open(&a1_zero_book(&dir));
    let sheet = book.sheets().remove(0);
    sheet.protect().unwrap();

    let protected_path = dir.path().join("protected.xlsx");
    book.save(&protected_path).unwrap();
    let wb = XlsxReader::read_file(&protected_path).unwrap();
    assert!(wb.worksheet(0).unwrap().is_protected());

    sheet.unprotect().unwrap();
    let unprotected_path = dir.path().join("unprotected.xlsx");
    book.save(&unprotected_path).unwrap();
    let wb = XlsxReader::read_file(&unprotected_path).unwrap();
    assert!(!wb.worksheet(0).unwrap().is_protected());

    assert_eq!(sheet.calculate().unwrap_err().kind(), ErrorKind::NotImplemented);
}
