//! Document value tree
//!
//! Form documents are JSON-like trees of [`Value`]. Maps keep insertion
//! order so documents come out in schema and header order.

use std::fmt;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use xlform_core::{CellValue, Error, Result};

/// An insertion-ordered map of document values
pub type Map = IndexMap<String, Value>;

const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";

/// A node of a form document
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key of a map value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::Value::from(self.clone()))
    }
}

impl From<CellValue> for Value {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Text(s) => Value::Text(s),
            CellValue::Float(f) => Value::Float(f),
            CellValue::Int(i) => Value::Int(i),
            CellValue::DateTime(dt) => Value::DateTime(dt),
        }
    }
}

impl TryFrom<Value> for CellValue {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(CellValue::Text(s)),
            Value::Float(f) => Ok(CellValue::Float(f)),
            Value::Int(i) => Ok(CellValue::Int(i)),
            Value::DateTime(dt) => Ok(CellValue::DateTime(dt)),
            other => Err(Error::argument(format!(
                "a {} cannot be stored in a cell",
                other.type_name()
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    /// Date-times become ISO-8601 text; non-finite floats become null
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s),
            Value::DateTime(dt) => serde_json::Value::String(dt.format(ISO_DATETIME).to_string()),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, serde_json::Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::DateTime(dt) => serializer.serialize_str(&dt.format(ISO_DATETIME).to_string()),
            Value::List(items) => serializer.collect_seq(items),
            Value::Map(map) => serializer.collect_map(map),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

/// Where a table column's values nest in a row map.
///
/// Always holds at least one key: the leading keys name intermediate maps,
/// the last one names the leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderPath {
    keys: Vec<String>,
}

impl HeaderPath {
    pub fn new<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(Error::argument("a header path needs at least one key"));
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys of the intermediate maps
    pub fn parents(&self) -> &[String] {
        &self.keys[..self.keys.len().saturating_sub(1)]
    }

    /// Key of the leaf value
    pub fn leaf(&self) -> &str {
        self.keys.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for HeaderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.keys.join(", "))
    }
}

/// Walk `path`'s parent keys from `root`, creating missing intermediate maps.
///
/// Returns the map the leaf belongs in. Meeting a non-map value on the way
/// is an internal error.
pub fn ensure_parents<'a>(root: &'a mut Map, path: &HeaderPath) -> Result<&'a mut Map> {
    let mut current = root;
    for key in path.parents() {
        let entry = current
            .entry(key.clone())
            .or_insert_with(|| Value::Map(Map::new()));
        current = match entry {
            Value::Map(map) => map,
            other => {
                return Err(Error::internal(format!(
                    "header path {} crosses a {} at '{}'",
                    path,
                    other.type_name(),
                    key
                )))
            }
        };
    }
    Ok(current)
}

/// Follow `path` through existing maps and return the leaf value.
///
/// A missing key or a non-map intermediate is a validation error. The
/// leaf's own type is not checked.
pub fn lookup_path<'a>(root: &'a Map, path: &HeaderPath) -> Result<&'a Value> {
    let mut current = root;
    for key in path.parents() {
        current = match current.get(key) {
            Some(Value::Map(map)) => map,
            Some(other) => {
                return Err(Error::validation(format!(
                    "header path {}: '{}' is a {}, not a map",
                    path,
                    key,
                    other.type_name()
                )))
            }
            None => {
                return Err(Error::validation(format!(
                    "header path {}: key '{}' is missing",
                    path, key
                )))
            }
        };
    }
    current.get(path.leaf()).ok_or_else(|| {
        Error::validation(format!(
            "header path {}: key '{}' is missing",
            path,
            path.leaf()
        ))
    })
}
