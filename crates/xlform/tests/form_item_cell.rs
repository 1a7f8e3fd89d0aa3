//! Single-cell form items against xlsx books

use pretty_assertions::assert_eq;
use serde_json::json;
use xlform::prelude::*;

fn book_with_a1(value: CellValue) -> BookRef {
    let book = XlsxEngine::new().new_book().unwrap();
    book.sheets()[0].cell(1, 1).unwrap().set_value(value).unwrap();
    book
}

fn factory(range_arg: &str) -> FormFactory {
    let mut factory = FormFactory::new();
    factory
        .register_form_json(
            "form1",
            &json!({
                "item1": {
                    "cls": "FormItemCell",
                    "kwargs": {"sheet_name": "Sheet1", "range_arg": range_arg}
                }
            }),
        )
        .unwrap();
    factory
}

/// The result is the cell value and `_meta` holds its dump
#[test]
fn test_get_form_doc() {
    let book = book_with_a1(CellValue::Int(10));
    let form = factory("A1").new_form("form1", &book).unwrap();
    let doc = form.get_form_doc().unwrap();

    assert_eq!(form.item_names(), vec!["item1"]);
    let item = doc["item1"].as_map().unwrap();
    assert_eq!(item["result"], Value::Int(10));

    let dump = item["_meta"].get("A1").unwrap();
    assert_eq!(dump.get("value"), Some(&Value::Int(10)));
    assert_eq!(dump.get("formula"), Some(&Value::Int(10)));
    assert_eq!(dump.get("number_format"), Some(&Value::text("General")));
}

/// Writing a changed result updates the bound cell
#[test]
fn test_set_form_doc() {
    let book = book_with_a1(CellValue::Int(10));
    let form = factory("A1").new_form("form1", &book).unwrap();

    let mut doc = form.get_form_doc().unwrap();
    doc["item1"].as_map_mut().unwrap()["result"] = Value::Int(20);
    form.set_form_doc(&doc).unwrap();

    let value = book.sheets()[0].cell(1, 1).unwrap().value().unwrap();
    assert_eq!(value, CellValue::Int(20));
}

/// Text beginning with "=" is stored as a formula
#[test]
fn test_set_formula_text() {
    let book = book_with_a1(CellValue::Int(10));
    let item = FormItemCell::new(&book, "Sheet1", "A1").unwrap();
    let item = FormItem::from(item);

    item.set_item_doc(&ItemDoc::new("=1+1")).unwrap();
    let cell = book.sheets()[0].cell(1, 1).unwrap();
    assert_eq!(cell.formula().unwrap(), CellValue::text("=1+1"));
    assert_eq!(cell.value().unwrap_err().kind(), ErrorKind::NotImplemented);
}

/// Results with no cell representation are rejected
#[test]
fn test_set_unrepresentable_result() {
    let book = book_with_a1(CellValue::Int(10));
    let item = FormItem::from(FormItemCell::new(&book, "Sheet1", "A1").unwrap());

    let err = item
        .set_item_doc(&ItemDoc::new(Value::List(vec![Value::Int(1)])))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);
}

/// Only a 1x1 range on an existing sheet can be bound
#[test]
fn test_new_form_bad_range() {
    let book = book_with_a1(CellValue::Int(10));

    let err = factory("A1:B1").new_form("form1", &book).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);

    let err = FormItemCell::new(&book, "Missing", "A1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);
}
