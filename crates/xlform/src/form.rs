//! Named collections of form items

use indexmap::IndexMap;
use log::debug;
use xlform_core::{Error, Result};

use crate::form_item::FormItem;
use crate::item_doc::{ItemDoc, RESULT_KEY};
use crate::value::{Map, Value};

/// An ordered set of named form items over one book
#[derive(Debug, Default)]
pub struct Form {
    items: IndexMap<String, FormItem>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, replacing any item of the same name in place
    pub fn add_form_item<S: Into<String>>(&mut self, name: S, item: FormItem) {
        self.items.insert(name.into(), item);
    }

    pub fn get(&self, name: &str) -> Option<&FormItem> {
        self.items.get(name)
    }

    /// Item names in insertion order
    pub fn item_names(&self) -> Vec<&str> {
        self.items.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read every item into `{name: {"_meta", "result"}}`.
    ///
    /// The first failing item aborts the whole read.
    pub fn get_form_doc(&self) -> Result<Map> {
        let mut doc = Map::new();
        for (name, item) in &self.items {
            doc.insert(name.clone(), Value::Map(item.get_item_doc()?.to_map()));
        }
        Ok(doc)
    }

    /// Write the items named in `doc`.
    ///
    /// Every key must name an item and map to an object with a `result`;
    /// this is checked for all keys before anything is written. Items
    /// missing from `doc` are left untouched.
    pub fn set_form_doc(&self, doc: &Map) -> Result<()> {
        let mut writes = Vec::with_capacity(doc.len());
        for (name, entry) in doc {
            let item = self
                .items
                .get(name)
                .ok_or_else(|| Error::argument(format!("unknown form item '{}'", name)))?;
            let entry = entry.as_map().ok_or_else(|| {
                Error::argument(format!(
                    "form item '{}' must map to an object, got a {}",
                    name,
                    entry.type_name()
                ))
            })?;
            if !entry.contains_key(RESULT_KEY) {
                return Err(Error::argument(format!(
                    "form item '{}' has no '{}' key",
                    name, RESULT_KEY
                )));
            }
            writes.push((name, item, ItemDoc::from_map(entry)?));
        }

        for (name, item, item_doc) in writes {
            item.set_item_doc(&item_doc)?;
            debug!("wrote form item '{}'", name);
        }
        Ok(())
    }
}
