//! The row-streaming contract shared by matrices, vectors and tables.
//!
//! A `RowSource` is opened, read row by row until it signals the end, and
//! closed. Cursors are plain indexes; reopening restarts from the first row.

use std::fmt;

use crate::types::{is_na_real, CanonicalType, ForeignValue, NA_INTEGER, NA_LOGICAL};

/// One cell of a streamed row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Float64(f64),
    Int32(i32),
    /// A logical byte, possibly [`NA_LOGICAL`].
    Logical(i8),
    Utf8(Option<String>),
    Raw(u8),
    Nested(ForeignValue),
}

impl CellValue {
    pub fn canonical_type(&self) -> CanonicalType {
        match self {
            CellValue::Float64(_) => CanonicalType::Float64,
            CellValue::Int32(_) => CanonicalType::Int32,
            CellValue::Logical(_) => CanonicalType::Logical,
            CellValue::Utf8(_) => CanonicalType::Utf8,
            CellValue::Raw(_) => CanonicalType::Raw,
            CellValue::Nested(_) => CanonicalType::Nested,
        }
    }

    /// `true` if the cell holds its type's NA encoding.
    pub fn is_na(&self) -> bool {
        match self {
            CellValue::Float64(v) => is_na_real(*v),
            CellValue::Int32(v) => *v == NA_INTEGER,
            CellValue::Logical(v) => *v == NA_LOGICAL,
            CellValue::Utf8(v) => v.is_none(),
            CellValue::Raw(_) => false,
            CellValue::Nested(v) => v.is_null(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_na() {
            return f.write_str("NA");
        }
        match self {
            CellValue::Float64(v) => write!(f, "{}", v),
            CellValue::Int32(v) => write!(f, "{}", v),
            CellValue::Logical(v) => f.write_str(if *v != 0 { "TRUE" } else { "FALSE" }),
            CellValue::Utf8(v) => f.write_str(v.as_deref().unwrap_or("NA")),
            CellValue::Raw(v) => write!(f, "{:02x}", v),
            CellValue::Nested(v) => write!(f, "<{} of length {}>", v.kind(), v.len()),
        }
    }
}

/// A table-shaped value that can be streamed one row at a time.
pub trait RowSource {
    /// The source's display name.
    fn name(&self) -> &str;

    fn column_names(&self) -> Vec<String>;

    fn column_types(&self) -> Vec<CanonicalType>;

    /// Resets the cursor to the first row.
    fn open(&mut self);

    /// The next row, or `None` once every row has been read.
    fn read_row(&mut self) -> Option<Vec<CellValue>>;

    fn close(&mut self) {}
}

/// Drains a source from the start. Convenience for tests and small tables.
pub fn collect_rows(source: &mut dyn RowSource) -> Vec<Vec<CellValue>> {
    source.open();
    let mut rows = Vec::new();
    while let Some(row) = source.read_row() {
        rows.push(row);
    }
    source.close();
    rows
}
