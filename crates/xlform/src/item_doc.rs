//! The value object exchanged by form items

use xlform_core::{Error, Result};

use crate::value::{Map, Value};

/// Key of the diagnostic metadata in a rendered item document
pub const META_KEY: &str = "_meta";

/// Key of the payload in a rendered item document
pub const RESULT_KEY: &str = "result";

/// A converted payload (`result`) with read-only diagnostics (`meta`).
///
/// Accessors hand out copies; nothing returned by an `ItemDoc` aliases its
/// stored state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemDoc {
    result: Value,
    meta: Map,
}

impl ItemDoc {
    /// Create a document with empty metadata
    pub fn new<V: Into<Value>>(result: V) -> Self {
        Self {
            result: result.into(),
            meta: Map::new(),
        }
    }

    /// Create a document with metadata.
    ///
    /// `meta` must be a map; null stands for empty metadata.
    pub fn with_meta<V: Into<Value>, M: Into<Value>>(result: V, meta: M) -> Result<Self> {
        let meta = match meta.into() {
            Value::Map(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(Error::argument(format!(
                    "meta must be a map, got a {}",
                    other.type_name()
                )))
            }
        };
        Ok(Self {
            result: result.into(),
            meta,
        })
    }

    /// Rebuild a document from its rendered form.
    ///
    /// The `result` key is required. A `_meta` that is not a map is ignored.
    pub fn from_map(map: &Map) -> Result<Self> {
        let result = map
            .get(RESULT_KEY)
            .cloned()
            .ok_or_else(|| Error::argument("item document has no 'result' key"))?;
        let meta = map
            .get(META_KEY)
            .and_then(Value::as_map)
            .cloned()
            .unwrap_or_default();
        Ok(Self { result, meta })
    }

    /// A copy of the payload
    pub fn result(&self) -> Value {
        self.result.clone()
    }

    /// A copy of the metadata
    pub fn meta(&self) -> Map {
        self.meta.clone()
    }

    /// Render as `{"_meta": meta, "result": result}`
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        map.insert(META_KEY.to_string(), Value::Map(self.meta.clone()));
        map.insert(RESULT_KEY.to_string(), self.result.clone());
        map
    }

    pub(crate) fn result_ref(&self) -> &Value {
        &self.result
    }
}
