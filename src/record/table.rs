// In: src/record/table.rs

//! An ordered set of equal-length columns, optionally led by a row-label
//! column.

use crate::error::BridgeError;
use crate::narrow::{narrow_labels, NarrowedLabels};
use crate::rows::{CellValue, RowSource};
use crate::types::{CanonicalType, ForeignValue, ForeignVector, NA_INTEGER};
use crate::vector::{TypedVector, VectorData};

#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    row_labels: Option<TypedVector>,
    columns: Vec<TypedVector>,
    cursor: usize,
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.row_labels == other.row_labels
            && self.columns == other.columns
    }
}

impl Table {
    /// Assembles a table, checking that every column (labels included) has
    /// the same length.
    pub fn try_new(
        name: &str,
        row_labels: Option<TypedVector>,
        columns: Vec<TypedVector>,
    ) -> Result<Self, BridgeError> {
        let expected = row_labels
            .as_ref()
            .or_else(|| columns.first())
            .map(TypedVector::len)
            .unwrap_or(0);

        for column in row_labels.iter().chain(columns.iter()) {
            if column.len() != expected {
                return Err(BridgeError::FormatError(format!(
                    "Column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    expected
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            row_labels,
            columns,
            cursor: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_labels(&self) -> Option<&TypedVector> {
        self.row_labels.as_ref()
    }

    pub fn columns(&self) -> &[TypedVector] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&TypedVector> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn num_rows(&self) -> usize {
        self.row_labels
            .as_ref()
            .or_else(|| self.columns.first())
            .map(TypedVector::len)
            .unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn into_parts(self) -> (String, Option<TypedVector>, Vec<TypedVector>) {
        (self.name, self.row_labels, self.columns)
    }

    /// A named generic list with one element per column. The row-label
    /// column, when present, comes first.
    pub fn to_foreign_list(&self) -> Result<ForeignValue, BridgeError> {
        let elements = self
            .row_labels
            .iter()
            .chain(self.columns.iter())
            .map(|c| Ok((c.name().to_string(), c.to_foreign_vector()?)))
            .collect::<Result<Vec<_>, BridgeError>>()?;
        Ok(ForeignValue::named_list(elements))
    }

    /// A data frame: one list element per column, class `data.frame`, and
    /// `row.names` taken from the row-label column or, without one, in the
    /// compact `c(NA, -n)` form.
    pub fn to_data_frame(&self) -> Result<ForeignValue, BridgeError> {
        let elements = self
            .columns
            .iter()
            .map(|c| Ok((c.name().to_string(), c.to_foreign_vector()?)))
            .collect::<Result<Vec<_>, BridgeError>>()?;

        let row_names = match &self.row_labels {
            Some(labels) => {
                let text: Vec<Option<String>> = (0..labels.len())
                    .map(|i| labels.value(i).map(|cell| cell.to_string()))
                    .collect();
                ForeignValue::Str(ForeignVector::new(text))
            }
            None => {
                let n = i32::try_from(self.num_rows()).map_err(|_| {
                    BridgeError::UnsupportedType(format!(
                        "Table '{}' has too many rows for a data frame",
                        self.name
                    ))
                })?;
                ForeignValue::integers(vec![NA_INTEGER, -n])
            }
        };

        Ok(ForeignValue::named_list(elements)
            .with_attribute("class", ForeignValue::string("data.frame"))
            .with_attribute("row.names", row_names))
    }

    /// The row-label column built from text labels, narrowed to integers
    /// when every label parses as one.
    pub fn label_column(name: &str, labels: &[String]) -> Result<TypedVector, BridgeError> {
        let data = match narrow_labels(labels) {
            NarrowedLabels::Int32(v) => VectorData::Int32(v),
            NarrowedLabels::Utf8(v) => {
                VectorData::Utf8(v.into_iter().map(Some).collect())
            }
        };
        TypedVector::from_parts(name, data, None)
    }
}

impl RowSource for Table {
    fn name(&self) -> &str {
        &self.name
    }

    fn column_names(&self) -> Vec<String> {
        self.row_labels
            .iter()
            .chain(self.columns.iter())
            .map(|c| c.name().to_string())
            .collect()
    }

    fn column_types(&self) -> Vec<CanonicalType> {
        self.row_labels
            .iter()
            .chain(self.columns.iter())
            .map(TypedVector::canonical_type)
            .collect()
    }

    fn open(&mut self) {
        self.cursor = 0;
    }

    fn read_row(&mut self) -> Option<Vec<CellValue>> {
        if self.cursor >= self.num_rows() {
            return None;
        }
        let row = self
            .row_labels
            .iter()
            .chain(self.columns.iter())
            .map(|c| c.value(self.cursor))
            .collect::<Option<Vec<_>>>()?;
        self.cursor += 1;
        Some(row)
    }
}
