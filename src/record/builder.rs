// In: src/record/builder.rs

//! Assembles `TypedVector` columns into a `Table`, either from a collection of
//! host records or from a foreign generic list.

use crate::attributes;
use crate::error::BridgeError;
use crate::record::{ColumnSchema, Record, Table};
use crate::types::{ForeignValue, HostType, HostValue};
use crate::vector::TypedVector;

/// Allocates a column, treating an unsupported type as "skip this column".
fn allocate_column(
    name: &str,
    host_type: &HostType,
    size: usize,
) -> Result<Option<TypedVector>, BridgeError> {
    match TypedVector::create(name, host_type, size) {
        Ok(vector) => Ok(Some(vector)),
        Err(e) if e.is_recoverable() => {
            log::debug!("Skipping column '{}': {}", name, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Builds tables against a fixed column schema.
pub struct TableBuilder {
    schema: ColumnSchema,
}

impl TableBuilder {
    pub fn new(schema: ColumnSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Reads every record once, appending each schema property (and each
    /// marked-up row entry) to its column. Missing values become NA.
    pub fn build<R: Record>(&self, name: &str, records: &[R]) -> Result<Table, BridgeError> {
        let first = records.first().ok_or_else(|| {
            BridgeError::RecordSchemaError(format!("Cannot build table '{}' from no records", name))
        })?;
        let size = records.len();

        // --- 1. Reflective columns ---
        let mut columns = Vec::with_capacity(self.schema.len());
        for spec in self.schema.columns() {
            if let Some(vector) = allocate_column(&spec.name, &spec.host_type, size)? {
                columns.push(vector);
            }
        }

        for record in records {
            for column in columns.iter_mut() {
                let value = record.property(column.name()).unwrap_or(HostValue::Null);
                column.add_value(value)?;
            }
        }

        // --- 2. Marked-up row columns, described by the first record ---
        if let Some(marked_up) = first.marked_up_row() {
            let mut extra = Vec::with_capacity(marked_up.columns().len());
            for (column_name, host_type) in marked_up.columns() {
                if let Some(vector) = allocate_column(column_name, host_type, size)? {
                    extra.push(vector);
                }
            }

            for record in records {
                let row = record.marked_up_row();
                for column in extra.iter_mut() {
                    let value = row
                        .and_then(|r| r.get(column.name()))
                        .cloned()
                        .unwrap_or(HostValue::Null);
                    column.add_value(value)?;
                }
            }
            columns.extend(extra);
        }

        if columns.is_empty() {
            return Err(BridgeError::RecordSchemaError(format!(
                "Table '{}' has no convertible columns",
                name
            )));
        }

        log::debug!(
            "Built table '{}' with {} columns over {} records",
            name,
            columns.len(),
            size
        );
        Table::try_new(name, None, columns)
    }

    /// Decomposes a foreign generic list into one column per element.
    ///
    /// Element names come from the list's `names`; a missing or empty name
    /// becomes the element's 1-based position.
    pub fn from_foreign_list(name: &str, list: &ForeignValue) -> Result<Table, BridgeError> {
        let elements = match list {
            ForeignValue::List(v) => &v.values,
            other => {
                return Err(BridgeError::UnsupportedType(format!(
                    "Expected a list, found {}",
                    attributes::get_class_label(other)
                )))
            }
        };
        let names = attributes::get_names(list)?.unwrap_or_default();

        let columns = elements
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let column_name = match names.get(i) {
                    Some(n) if !n.is_empty() => n.clone(),
                    _ => (i + 1).to_string(),
                };
                TypedVector::from_foreign_vector(&column_name, element)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Table::try_new(name, None, columns)
    }
}
