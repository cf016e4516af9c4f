// In: src/bridge/arrow_impl.rs

//! Table <-> Arrow `RecordBatch` interchange.
//!
//! NA cells become Arrow nulls and Arrow nulls become the column type's NA.
//! A row-label column is exported as the first field and its name recorded in
//! the schema metadata, so that importing the batch restores it.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanBuilder, Float64Builder, Int32Builder, StringBuilder,
    UInt8Builder,
};
use arrow::datatypes::{
    DataType, Field, Float32Type, Float64Type, Int32Type, Int64Type, Schema, UInt8Type,
};
use arrow::record_batch::RecordBatch;
use num_traits::ToPrimitive;

use crate::error::BridgeError;
use crate::record::Table;
use crate::types::{is_na_real, na_real, CanonicalType, NA_INTEGER, NA_LOGICAL};
use crate::vector::{TypedVector, VectorData};

/// Schema metadata key naming the row-label column.
pub const ROW_LABELS_METADATA_KEY: &str = "rbridge.row_labels";

//==================================================================================
// I. Export
//==================================================================================

/// Converts one column to an Arrow array.
fn vector_to_array(vector: &TypedVector) -> Result<ArrayRef, BridgeError> {
    match vector.data() {
        VectorData::Float64(values) => {
            let mut builder = Float64Builder::with_capacity(values.len());
            for &v in values {
                if is_na_real(v) {
                    builder.append_null();
                } else {
                    builder.append_value(v);
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        VectorData::Int32(values) => {
            let mut builder = Int32Builder::with_capacity(values.len());
            for &v in values {
                if v == NA_INTEGER {
                    builder.append_null();
                } else {
                    builder.append_value(v);
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        VectorData::Logical(values) => {
            let mut builder = BooleanBuilder::with_capacity(values.len());
            for &v in values {
                if v == NA_LOGICAL {
                    builder.append_null();
                } else {
                    builder.append_value(v != 0);
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        VectorData::Utf8(values) => {
            let mut builder = StringBuilder::new();
            for v in values {
                builder.append_option(v.as_deref());
            }
            Ok(Arc::new(builder.finish()))
        }
        VectorData::Raw(values) => {
            let mut builder = UInt8Builder::with_capacity(values.len());
            builder.append_slice(values);
            Ok(Arc::new(builder.finish()))
        }
        VectorData::Nested(_) => Err(BridgeError::UnsupportedType(format!(
            "Nested column '{}' has no Arrow equivalent",
            vector.name()
        ))),
    }
}

/// Converts a table into a `RecordBatch`, row-label column first.
pub fn table_to_record_batch(table: &Table) -> Result<RecordBatch, BridgeError> {
    let mut fields = Vec::with_capacity(table.num_columns() + 1);
    let mut arrays = Vec::with_capacity(table.num_columns() + 1);

    for vector in table.row_labels().into_iter().chain(table.columns().iter()) {
        let data_type = vector.canonical_type().to_arrow_type()?;
        fields.push(Field::new(vector.name(), data_type, true));
        arrays.push(vector_to_array(vector)?);
    }

    let mut metadata = HashMap::new();
    if let Some(labels) = table.row_labels() {
        metadata.insert(
            ROW_LABELS_METADATA_KEY.to_string(),
            labels.name().to_string(),
        );
    }

    let schema = Arc::new(Schema::new_with_metadata(fields, metadata));
    Ok(RecordBatch::try_new(schema, arrays)?)
}

//==================================================================================
// II. Import
//==================================================================================

/// Converts one Arrow array to a column. `Ok(None)` means the array's type
/// has no canonical mapping and the column is skipped.
fn array_to_vector(name: &str, array: &dyn Array) -> Result<Option<TypedVector>, BridgeError> {
    let canonical_type = match CanonicalType::from_arrow_type(array.data_type()) {
        Ok(t) => t,
        Err(e) if e.is_recoverable() => {
            log::debug!("Skipping Arrow column '{}': {}", name, e);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let mismatch = || {
        BridgeError::InternalError(format!(
            "Arrow column '{}' does not match its declared type {}",
            name,
            array.data_type()
        ))
    };

    let data = match array.data_type() {
        DataType::Float64 => {
            let a = array.as_primitive_opt::<Float64Type>().ok_or_else(mismatch)?;
            VectorData::Float64(a.iter().map(|v| v.unwrap_or_else(na_real)).collect())
        }
        DataType::Float32 => {
            let a = array.as_primitive_opt::<Float32Type>().ok_or_else(mismatch)?;
            VectorData::Float64(
                a.iter()
                    .map(|v| v.map(f64::from).unwrap_or_else(na_real))
                    .collect(),
            )
        }
        DataType::Int32 => {
            let a = array.as_primitive_opt::<Int32Type>().ok_or_else(mismatch)?;
            VectorData::Int32(a.iter().map(|v| v.unwrap_or(NA_INTEGER)).collect())
        }
        DataType::Int64 => {
            let a = array.as_primitive_opt::<Int64Type>().ok_or_else(mismatch)?;
            let mut overflowed = 0usize;
            let values = a
                .iter()
                .map(|v| match v.map(|x| x.to_i32()) {
                    Some(Some(x)) if x != NA_INTEGER => x,
                    Some(_) => {
                        overflowed += 1;
                        NA_INTEGER
                    }
                    None => NA_INTEGER,
                })
                .collect();
            if overflowed > 0 {
                log::warn!(
                    "{} values in Int64 column '{}' do not fit in 32 bits; stored as NA",
                    overflowed,
                    name
                );
            }
            VectorData::Int32(values)
        }
        DataType::Boolean => {
            let a = array.as_boolean_opt().ok_or_else(mismatch)?;
            VectorData::Logical(
                a.iter()
                    .map(|v| match v {
                        Some(true) => 1,
                        Some(false) => 0,
                        None => NA_LOGICAL,
                    })
                    .collect(),
            )
        }
        DataType::Utf8 => {
            let a = array.as_string_opt::<i32>().ok_or_else(mismatch)?;
            VectorData::Utf8(a.iter().map(|v| v.map(str::to_string)).collect())
        }
        DataType::UInt8 => {
            if array.null_count() > 0 {
                return Err(BridgeError::FormatError(format!(
                    "Raw column '{}' contains nulls",
                    name
                )));
            }
            let a = array.as_primitive_opt::<UInt8Type>().ok_or_else(mismatch)?;
            VectorData::Raw(a.values().to_vec())
        }
        _ => return Err(mismatch()),
    };

    debug_assert_eq!(data.canonical_type(), canonical_type);
    TypedVector::from_parts(name, data, None).map(Some)
}

/// Converts a `RecordBatch` into a table. Columns of unsupported Arrow types
/// are skipped; the column named by the row-label metadata becomes the
/// table's row labels.
pub fn table_from_record_batch(name: &str, batch: &RecordBatch) -> Result<Table, BridgeError> {
    let schema = batch.schema();
    let label_name = schema.metadata().get(ROW_LABELS_METADATA_KEY);

    let mut row_labels = None;
    let mut columns = Vec::with_capacity(batch.num_columns());
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        let Some(vector) = array_to_vector(field.name(), array.as_ref())? else {
            continue;
        };
        if row_labels.is_none() && label_name == Some(field.name()) {
            row_labels = Some(vector);
        } else {
            columns.push(vector);
        }
    }

    Table::try_new(name, row_labels, columns)
}
