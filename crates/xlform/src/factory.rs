//! Registry of named form schemas

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use xlform_core::{BookRef, Error, Result};

use crate::form::Form;
use crate::form_item::FormItem;
use crate::schema::FormSchema;

/// Registers form schemas once and binds them to books many times.
///
/// ```rust
/// use xlform::prelude::*;
///
/// let mut factory = FormFactory::new();
/// factory.register_form(
///     "person",
///     FormSchema::new().with_item("name", FormItemSpec::cell("Sheet1", "B1")),
/// );
///
/// let book = XlsxEngine::new().new_book().unwrap();
/// let form = factory.new_form("person", &book).unwrap();
/// assert_eq!(form.item_names(), vec!["name"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormFactory {
    forms: IndexMap<String, FormSchema>,
}

impl FormFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema, replacing any schema already under `name`
    pub fn register_form<S: Into<String>>(&mut self, name: S, schema: FormSchema) {
        self.forms.insert(name.into(), schema);
    }

    /// Register a schema given in its JSON form
    pub fn register_form_json<S: Into<String>>(
        &mut self,
        name: S,
        schema: &serde_json::Value,
    ) -> Result<()> {
        let schema = FormSchema::from_json(schema)?;
        self.register_form(name, schema);
        Ok(())
    }

    /// Register every form of a `{"<form>": <schema>, ...}` document.
    ///
    /// Nothing is registered if any schema is invalid.
    pub fn load_json<R: Read>(&mut self, reader: R) -> Result<()> {
        let document: serde_json::Value = serde_json::from_reader(reader)
            .map_err(|e| Error::argument(format!("invalid form document: {}", e)))?;
        let forms = document
            .as_object()
            .ok_or_else(|| Error::argument("a form document must be an object"))?;

        let mut parsed = Vec::with_capacity(forms.len());
        for (name, schema) in forms {
            let schema = FormSchema::from_json(schema).map_err(|e| match e {
                Error::Argument(msg) => Error::argument(format!("form '{}': {}", name, msg)),
                other => other,
            })?;
            parsed.push((name.clone(), schema));
        }
        for (name, schema) in parsed {
            self.register_form(name, schema);
        }
        Ok(())
    }

    /// [`load_json`](Self::load_json) from a file
    pub fn load_json_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = File::open(path.as_ref())?;
        self.load_json(BufReader::new(file))
    }

    /// Bind the schema registered under `name` to `book`.
    ///
    /// Items are built in schema order. The first item that does not fit
    /// the book aborts the call.
    pub fn new_form(&self, name: &str, book: &BookRef) -> Result<Form> {
        let schema = self
            .forms
            .get(name)
            .ok_or_else(|| Error::argument(format!("form '{}' is not registered", name)))?;

        let mut form = Form::new();
        for (item_name, spec) in schema.iter() {
            form.add_form_item(item_name, FormItem::build(book, spec)?);
        }
        debug!("instantiated form '{}' with {} items", name, form.len());
        Ok(form)
    }

    pub fn schema(&self, name: &str) -> Option<&FormSchema> {
        self.forms.get(name)
    }

    /// Registered form names in registration order
    pub fn form_names(&self) -> Vec<&str> {
        self.forms.keys().map(String::as_str).collect()
    }
}
