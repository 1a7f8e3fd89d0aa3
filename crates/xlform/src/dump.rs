//! Best-effort cell diagnostics

use log::trace;
use xlform_core::{Cell, Result};

use crate::value::{Map, Value};

fn collect(fields: &mut Map, cell: &dyn Cell, name: &str, field: Result<Value>) -> Result<()> {
    match field {
        Ok(value) => {
            fields.insert(name.to_string(), value);
            Ok(())
        }
        Err(e) if e.is_not_implemented() => {
            trace!("{}: skipping {} ({})", cell.address(false, false), name, e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Dump what a cell knows about itself.
///
/// Returns `{"<A1 address>": {"formula", "value", "number_format", "text"}}`.
/// A field whose capability the backend lacks is left out; any other
/// failure propagates.
pub fn cell_dump(cell: &dyn Cell) -> Result<Map> {
    let mut fields = Map::new();
    collect(&mut fields, cell, "formula", cell.formula().map(Value::from))?;
    collect(&mut fields, cell, "value", cell.value().map(Value::from))?;
    collect(&mut fields, cell, "number_format", cell.number_format().map(Value::Text))?;
    collect(&mut fields, cell, "text", cell.text().map(Value::Text))?;

    let mut dump = Map::new();
    dump.insert(cell.address(false, false), Value::Map(fields));
    Ok(dump)
}
