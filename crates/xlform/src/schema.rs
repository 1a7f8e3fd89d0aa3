//! Declarative form schemas
//!
//! A schema maps item names to [`FormItemSpec`]s. Specs can be built in
//! code or parsed from the JSON shape
//! `{"<item>": {"cls": "FormItemCell", "kwargs": {...}}}`.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use xlform_core::{CellValue, Error, Result};

use crate::value::Value;

const CLS_KEY: &str = "cls";
const KWARGS_KEY: &str = "kwargs";

/// Arguments of a single-cell item
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellArgs {
    pub sheet_name: String,
    pub range_arg: String,
}

/// Arguments of a header/value pair item
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyValueCellsArgs {
    pub sheet_name: String,
    pub range_arg: String,
    #[serde(deserialize_with = "deserialize_cell_value")]
    pub header_value: CellValue,
}

/// Arguments of a table item
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableArgs {
    pub sheet_name: String,
    pub range_arg: String,
    #[serde(default)]
    pub header_rows_count: i64,
    #[serde(default)]
    pub header_path_list: Option<Vec<Vec<String>>>,
}

fn deserialize_cell_value<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<CellValue, D::Error> {
    let value = Value::deserialize(deserializer)?;
    CellValue::try_from(value).map_err(serde::de::Error::custom)
}

/// Which form item to build, with its constructor arguments
#[derive(Debug, Clone, PartialEq)]
pub enum FormItemSpec {
    Cell(CellArgs),
    KeyValueCells(KeyValueCellsArgs),
    Table(TableArgs),
}

impl FormItemSpec {
    pub fn cell<S: Into<String>, R: Into<String>>(sheet_name: S, range_arg: R) -> Self {
        FormItemSpec::Cell(CellArgs {
            sheet_name: sheet_name.into(),
            range_arg: range_arg.into(),
        })
    }

    pub fn key_value_cells<S, R, V>(sheet_name: S, range_arg: R, header_value: V) -> Self
    where
        S: Into<String>,
        R: Into<String>,
        V: Into<CellValue>,
    {
        FormItemSpec::KeyValueCells(KeyValueCellsArgs {
            sheet_name: sheet_name.into(),
            range_arg: range_arg.into(),
            header_value: header_value.into(),
        })
    }

    pub fn table<S: Into<String>, R: Into<String>>(
        sheet_name: S,
        range_arg: R,
        header_rows_count: i64,
        header_path_list: Option<Vec<Vec<String>>>,
    ) -> Self {
        FormItemSpec::Table(TableArgs {
            sheet_name: sheet_name.into(),
            range_arg: range_arg.into(),
            header_rows_count,
            header_path_list,
        })
    }

    /// The `cls` tag of this variant
    pub fn cls(&self) -> &'static str {
        match self {
            FormItemSpec::Cell(_) => "FormItemCell",
            FormItemSpec::KeyValueCells(_) => "FormItemKeyValueCells",
            FormItemSpec::Table(_) => "FormItemTable",
        }
    }

    /// Parse `{"cls": <tag>, "kwargs": {...}}`.
    ///
    /// `cls` is required and `kwargs` defaults to an empty object; any other
    /// key is an argument error naming it.
    pub fn from_json(spec: &serde_json::Value) -> Result<Self> {
        let object = spec
            .as_object()
            .ok_or_else(|| Error::argument("an item spec must be an object"))?;

        let unknown: Vec<&str> = object
            .keys()
            .map(String::as_str)
            .filter(|key| *key != CLS_KEY && *key != KWARGS_KEY)
            .collect();
        if !unknown.is_empty() {
            return Err(Error::argument(format!(
                "Unknown keys: {}",
                unknown.join(", ")
            )));
        }

        let cls = object
            .get(CLS_KEY)
            .ok_or_else(|| Error::argument("missing key 'cls'"))?
            .as_str()
            .ok_or_else(|| Error::argument("'cls' must be a string"))?;
        let kwargs = object
            .get(KWARGS_KEY)
            .cloned()
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

        match cls {
            "FormItemCell" | "cell" => parse_kwargs(cls, kwargs).map(FormItemSpec::Cell),
            "FormItemKeyValueCells" | "key_value_cells" => {
                parse_kwargs(cls, kwargs).map(FormItemSpec::KeyValueCells)
            }
            "FormItemTable" | "table" => parse_kwargs(cls, kwargs).map(FormItemSpec::Table),
            other => Err(Error::argument(format!("unknown cls '{}'", other))),
        }
    }
}

fn parse_kwargs<T: for<'de> Deserialize<'de>>(cls: &str, kwargs: serde_json::Value) -> Result<T> {
    serde_json::from_value(kwargs)
        .map_err(|e| Error::argument(format!("invalid kwargs for {}: {}", cls, e)))
}

/// Item specs of one form, in item order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSchema {
    items: IndexMap<String, FormItemSpec>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item (builder style)
    pub fn with_item<S: Into<String>>(mut self, name: S, spec: FormItemSpec) -> Self {
        self.insert(name, spec);
        self
    }

    /// Add or replace an item, keeping its original position
    pub fn insert<S: Into<String>>(&mut self, name: S, spec: FormItemSpec) {
        self.items.insert(name.into(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&FormItemSpec> {
        self.items.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormItemSpec)> {
        self.items.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Parse `{"<item>": {"cls": ..., "kwargs": ...}, ...}`
    pub fn from_json(schema: &serde_json::Value) -> Result<Self> {
        let object = schema
            .as_object()
            .ok_or_else(|| Error::argument("a form schema must be an object"))?;

        let mut items = IndexMap::with_capacity(object.len());
        for (name, spec) in object {
            let spec = FormItemSpec::from_json(spec).map_err(|e| match e {
                Error::Argument(msg) => Error::argument(format!("item '{}': {}", name, msg)),
                other => other,
            })?;
            items.insert(name.clone(), spec);
        }
        Ok(Self { items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use xlform_core::ErrorKind;

    #[test]
    fn test_parse_each_cls() {
        let spec = FormItemSpec::from_json(&json!({
            "cls": "FormItemCell",
            "kwargs": {"sheet_name": "Sheet1", "range_arg": "A1"}
        }))
        .unwrap();
        assert_eq!(spec, FormItemSpec::cell("Sheet1", "A1"));

        let spec = FormItemSpec::from_json(&json!({
            "cls": "key_value_cells",
            "kwargs": {"sheet_name": "Sheet1", "range_arg": "A1:B1", "header_value": "name"}
        }))
        .unwrap();
        assert_eq!(spec, FormItemSpec::key_value_cells("Sheet1", "A1:B1", "name"));
        assert_eq!(spec.cls(), "FormItemKeyValueCells");

        let spec = FormItemSpec::from_json(&json!({
            "cls": "FormItemTable",
            "kwargs": {
                "sheet_name": "Sheet1",
                "range_arg": "A1:B3",
                "header_rows_count": 1,
                "header_path_list": [["a"], ["b"]]
            }
        }))
        .unwrap();
        assert_eq!(
            spec,
            FormItemSpec::table(
                "Sheet1",
                "A1:B3",
                1,
                Some(vec![vec!["a".to_string()], vec!["b".to_string()]])
            )
        );
    }

    #[test]
    fn test_table_defaults() {
        let spec = FormItemSpec::from_json(&json!({
            "cls": "table",
            "kwargs": {"sheet_name": "Sheet1", "range_arg": "A1:C3"}
        }))
        .unwrap();
        assert_eq!(spec, FormItemSpec::table("Sheet1", "A1:C3", 0, None));
    }

    #[test]
    fn test_spec_errors() {
        let cases = [
            json!({"cls": "FormItemCell", "kwargs": {}, "extra": 1}),
            json!({"kwargs": {"sheet_name": "Sheet1", "range_arg": "A1"}}),
            json!({"cls": "FormItemChart", "kwargs": {}}),
            json!({"cls": "FormItemCell"}),
            json!({"cls": "FormItemCell", "kwargs": {"sheet_name": "S", "range_arg": "A1", "x": 1}}),
            json!({"cls": "FormItemKeyValueCells", "kwargs": {"sheet_name": "S", "range_arg": "A1:B1", "header_value": null}}),
            json!(["cls"]),
        ];
        for case in cases {
            let err = FormItemSpec::from_json(&case).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Argument, "{}", case);
        }

        let err = FormItemSpec::from_json(&json!({"cls": "cell", "extra": 1})).unwrap_err();
        assert!(err.to_string().contains("extra"));
    }

    #[test]
    fn test_schema_keeps_item_order() {
        let schema = FormSchema::from_json(&json!({
            "zeta": {"cls": "cell", "kwargs": {"sheet_name": "S", "range_arg": "A1"}},
            "alpha": {"cls": "cell", "kwargs": {"sheet_name": "S", "range_arg": "B1"}}
        }))
        .unwrap();
        let names: Vec<&str> = schema.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);

        let err = FormSchema::from_json(&json!({"bad": {"cls": "cell", "oops": 1}})).unwrap_err();
        assert!(err.to_string().contains("item 'bad'"));
    }
}
