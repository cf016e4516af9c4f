// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the conversion facade of the rbridge library. Callers hand it
// host records or foreign values and get tables back; the lower layers
// (`vector`, `matrix`, `record`) stay free of dispatch logic.
//
// Data Flow (Host -> Interpreter):
//
//   1. [table_from_collection]   -> Receives `&[R: Record]` and a boundary type
//         |
//         `-> a. `RecordIntrospector` reads the column schema off the first record
//         |
//         `-> b. `TableBuilder` fills one `TypedVector` per column
//
//   2. [Table::to_foreign_list / to_data_frame] -> `ForeignValue` for `EvalSession::assign`
//
//
// Data Flow (Interpreter -> Host):
//
//   1. [EvalSession::eval_try]   -> Returns a `ForeignValue`
//         |
//         `-> table_from_foreign_value dispatches by shape:
//               matrix      -> `MatrixAdapter::to_table`
//               list/df     -> `TableBuilder::from_foreign_list` (+ row.names)
//               vector      -> single `TypedVector` (names become row labels)
//
//   2. [arrow_impl] (optional)   -> `Table` <-> Arrow `RecordBatch`
//
// ====================================================================================
pub mod arrow_impl;

pub use arrow_impl::{table_from_record_batch, table_to_record_batch};

use crate::attributes;
use crate::error::BridgeError;
use crate::matrix::MatrixAdapter;
use crate::record::{Record, RecordIntrospector, Table, TableBuilder};
use crate::types::ForeignValue;
use crate::vector::{TypedVector, VectorData};

/// Name of the row-label column restored from a data frame's `row.names`.
pub const ROW_NAMES_COLUMN: &str = "row.names";

/// Converts a collection of host records into a table.
///
/// The schema is read from the first record; accessors declared by
/// `boundary_type` or its ancestors are left out.
pub fn table_from_collection<R: Record>(
    records: &[R],
    boundary_type: &str,
) -> Result<Table, BridgeError> {
    let sample = records.first().ok_or_else(|| {
        BridgeError::RecordSchemaError("Cannot convert an empty collection".to_string())
    })?;
    let schema = RecordIntrospector::introspect(sample, boundary_type)?;
    let name = sample.lineage().first().copied().unwrap_or("");
    TableBuilder::new(schema).build(name, records)
}

/// Converts a foreign value into a table, dispatching by shape.
pub fn table_from_foreign_value(value: &ForeignValue) -> Result<Table, BridgeError> {
    table_from_named_foreign_value(None, value)
}

/// As [`table_from_foreign_value`], naming the resulting table.
pub fn table_from_named_foreign_value(
    name: Option<&str>,
    value: &ForeignValue,
) -> Result<Table, BridgeError> {
    if MatrixAdapter::is_matrix(value) {
        log::debug!("Converting foreign value as a matrix");
        return MatrixAdapter::new(name, value)?.to_table();
    }

    let table_name = name.unwrap_or("");
    match value {
        ForeignValue::List(_) if value.inherits("data.frame") => {
            data_frame_to_table(table_name, value)
        }
        ForeignValue::List(_) => TableBuilder::from_foreign_list(table_name, value),
        _ => vector_to_table(table_name, value),
    }
}

/// A data frame's columns, with string `row.names` as the row-label column.
fn data_frame_to_table(name: &str, value: &ForeignValue) -> Result<Table, BridgeError> {
    let (_, _, columns) = TableBuilder::from_foreign_list(name, value)?.into_parts();

    let row_labels = match value.attribute("row.names") {
        Some(ForeignValue::Str(v)) => {
            let labels: Vec<String> = v
                .values
                .iter()
                .map(|s| s.clone().unwrap_or_default())
                .collect();
            Some(Table::label_column(ROW_NAMES_COLUMN, &labels)?)
        }
        // Integer row names are either compact or 1..n; neither is a label.
        _ => None,
    };

    Table::try_new(name, row_labels, columns)
}

/// A single vector as a one-column table; its element names, if any, become
/// the row-label column.
fn vector_to_table(name: &str, value: &ForeignValue) -> Result<Table, BridgeError> {
    let vector = TypedVector::from_foreign_vector("Value", value)?;
    let row_labels = match vector.names() {
        Some(names) => Some(TypedVector::from_parts(
            "Name",
            VectorData::Utf8(names.iter().cloned().map(Some).collect()),
            None,
        )?),
        None => None,
    };

    let column = TypedVector::from_parts("Value", vector.into_data(), None)?;
    log::debug!(
        "Converted {} to a one-column table",
        attributes::get_class_label(value)
    );
    Table::try_new(name, row_labels, vec![column])
}

#[cfg(test)]
mod tests;
