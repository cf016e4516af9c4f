// In: src/matrix.rs

//! Streams a two-dimensional numeric or logical foreign value as a table.
//!
//! The foreign payload is column-major; it is shaped into an
//! `ndarray::Array2<f64>` once at construction and read row by row afterwards.

use ndarray::{Array2, ShapeBuilder};

use crate::attributes;
use crate::error::BridgeError;
use crate::narrow::{narrow_labels, NarrowedLabels};
use crate::record::Table;
use crate::rows::{CellValue, RowSource};
use crate::types::{na_real, CanonicalType, ForeignValue, NA_INTEGER, NA_LOGICAL};
use crate::vector::{TypedVector, VectorData};

/// A foreign matrix viewed as a row-streamable table.
#[derive(Debug, Clone)]
pub struct MatrixAdapter {
    name: String,
    axis_label: String,
    row_labels: Option<NarrowedLabels>,
    column_labels: Vec<String>,
    values: Array2<f64>,
    cursor: usize,
}

impl MatrixAdapter {
    /// `true` if `value` is numeric or logical with exactly two dimensions.
    pub fn is_matrix(value: &ForeignValue) -> bool {
        let numeric = matches!(
            value,
            ForeignValue::Double(_) | ForeignValue::Integer(_) | ForeignValue::Logical(_)
        );
        numeric && matches!(attributes::dimensions(value), Ok(2))
    }

    /// Builds the adapter. `name` defaults to the axis label.
    pub fn new(name: Option<&str>, value: &ForeignValue) -> Result<Self, BridgeError> {
        if !Self::is_matrix(value) {
            return Err(BridgeError::NotAMatrix(attributes::get_class_label(value)));
        }

        let (nrows, ncols) = match attributes::dim(value)?.as_deref() {
            Some(&[r, c]) => (r, c),
            _ => return Err(BridgeError::NotAMatrix(attributes::get_class_label(value))),
        };

        let data: Vec<f64> = match value {
            ForeignValue::Double(v) => v.values.clone(),
            ForeignValue::Integer(v) => v
                .values
                .iter()
                .map(|&x| if x == NA_INTEGER { na_real() } else { f64::from(x) })
                .collect(),
            ForeignValue::Logical(v) => v
                .values
                .iter()
                .map(|&x| if x == NA_LOGICAL { na_real() } else { f64::from(x) })
                .collect(),
            _ => return Err(BridgeError::NotAMatrix(attributes::get_class_label(value))),
        };
        let values = Array2::from_shape_vec((nrows, ncols).f(), data)?;

        let (row_names, col_names) = match attributes::get_dimnames(value)? {
            Some(mut axes) if axes.len() == 2 => {
                let cols = axes.pop().flatten();
                let rows = axes.pop().flatten();
                (rows, cols)
            }
            Some(axes) => {
                return Err(BridgeError::FormatError(format!(
                    "Matrix dimnames has {} axes, expected 2",
                    axes.len()
                )))
            }
            None => (None, None),
        };

        let row_labels = match row_names {
            Some(labels) => {
                if labels.len() != nrows {
                    return Err(BridgeError::InternalError(format!(
                        "{} row labels for {} matrix rows",
                        labels.len(),
                        nrows
                    )));
                }
                Some(narrow_labels(&labels))
            }
            None => None,
        };
        let column_labels =
            col_names.unwrap_or_else(|| (1..=ncols).map(|i| i.to_string()).collect());
        if column_labels.len() != ncols {
            return Err(BridgeError::FormatError(format!(
                "{} column labels for {} matrix columns",
                column_labels.len(),
                ncols
            )));
        }

        let axis_label = Self::axis_label(value)?;
        let name = name.map(str::to_string).unwrap_or_else(|| axis_label.clone());

        log::debug!(
            "Matrix '{}': {}x{}, row labels {:?}",
            name,
            nrows,
            ncols,
            row_labels.as_ref().map(NarrowedLabels::canonical_type)
        );

        Ok(Self {
            name,
            axis_label,
            row_labels,
            column_labels,
            values,
            cursor: 0,
        })
    }

    /// "Row/Column" from the dimnames' own names when both are set, else
    /// whichever one is.
    fn axis_label(value: &ForeignValue) -> Result<String, BridgeError> {
        let names = attributes::get_dimnames_names(value)?.unwrap_or_default();
        let row = names.first().map(String::as_str).unwrap_or("");
        let col = names.get(1).map(String::as_str).unwrap_or("");
        Ok(match (row.is_empty(), col.is_empty()) {
            (false, false) => format!("{}/{}", row, col),
            (false, true) => row.to_string(),
            _ => col.to_string(),
        })
    }

    pub fn num_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn row_labels(&self) -> Option<&NarrowedLabels> {
        self.row_labels.as_ref()
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn axis_label_text(&self) -> &str {
        &self.axis_label
    }

    fn row_label_cell(&self, row: usize) -> Option<CellValue> {
        match self.row_labels.as_ref()? {
            NarrowedLabels::Int32(v) => v.get(row).map(|&i| CellValue::Int32(i)),
            NarrowedLabels::Utf8(v) => v.get(row).map(|s| CellValue::Utf8(Some(s.clone()))),
        }
    }

    /// Materializes the matrix as a table: the row labels (if any) as the
    /// label column, then one Float64 column per matrix column.
    pub fn to_table(&self) -> Result<Table, BridgeError> {
        let columns = self
            .column_labels
            .iter()
            .zip(self.values.columns())
            .map(|(label, column)| {
                TypedVector::from_parts(label, VectorData::Float64(column.to_vec()), None)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let label_column = match &self.row_labels {
            Some(labels) => {
                let data = match labels {
                    NarrowedLabels::Int32(v) => VectorData::Int32(v.clone()),
                    NarrowedLabels::Utf8(v) => {
                        VectorData::Utf8(v.iter().cloned().map(Some).collect())
                    }
                };
                Some(TypedVector::from_parts(&self.axis_label, data, None)?)
            }
            None => None,
        };

        Table::try_new(&self.name, label_column, columns)
    }
}

impl RowSource for MatrixAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.num_cols() + 1);
        if self.row_labels.is_some() {
            names.push(self.axis_label.clone());
        }
        names.extend(self.column_labels.iter().cloned());
        names
    }

    fn column_types(&self) -> Vec<CanonicalType> {
        let mut types = Vec::with_capacity(self.num_cols() + 1);
        if let Some(labels) = &self.row_labels {
            types.push(labels.canonical_type());
        }
        types.extend(std::iter::repeat(CanonicalType::Float64).take(self.num_cols()));
        types
    }

    fn open(&mut self) {
        self.cursor = 0;
    }

    fn read_row(&mut self) -> Option<Vec<CellValue>> {
        if self.cursor >= self.num_rows() {
            return None;
        }
        let mut row = Vec::with_capacity(self.num_cols() + 1);
        if let Some(label) = self.row_label_cell(self.cursor) {
            row.push(label);
        }
        row.extend(self.values.row(self.cursor).iter().map(|&v| CellValue::Float64(v)));
        self.cursor += 1;
        Some(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::collect_rows;
    use crate::types::is_na_real;

    fn dimnames(rows: ForeignValue, cols: ForeignValue, axis_names: [&str; 2]) -> ForeignValue {
        ForeignValue::named_list(vec![
            (axis_names[0].to_string(), rows),
            (axis_names[1].to_string(), cols),
        ])
    }

    /// `matrix(c(1, 3, 2, 4), 2, 2, dimnames = list(c("r1","r2"), c("c1","c2")))`
    fn two_by_two() -> ForeignValue {
        ForeignValue::doubles(vec![1.0, 3.0, 2.0, 4.0])
            .with_attribute("dim", ForeignValue::integers(vec![2, 2]))
            .with_attribute(
                "dimnames",
                dimnames(
                    ForeignValue::strings(vec!["r1", "r2"]),
                    ForeignValue::strings(vec!["c1", "c2"]),
                    ["", ""],
                ),
            )
    }

    #[test]
    fn test_two_by_two_streams_labeled_rows() {
        // 1. Arrange
        let mut adapter = MatrixAdapter::new(Some("m"), &two_by_two()).unwrap();

        // 2. Act
        adapter.open();
        let first = adapter.read_row();
        let second = adapter.read_row();
        let end = adapter.read_row();
        adapter.close();

        // 3. Assert
        assert_eq!(
            first,
            Some(vec![
                CellValue::Utf8(Some("r1".into())),
                CellValue::Float64(1.0),
                CellValue::Float64(2.0)
            ])
        );
        assert_eq!(
            second,
            Some(vec![
                CellValue::Utf8(Some("r2".into())),
                CellValue::Float64(3.0),
                CellValue::Float64(4.0)
            ])
        );
        assert_eq!(end, None);
        assert_eq!(adapter.column_names(), vec!["", "c1", "c2"]);
    }

    #[test]
    fn test_integer_row_labels_are_narrowed() {
        let value = ForeignValue::integers(vec![1, 2, 3, 4, 5, 6])
            .with_attribute("dim", ForeignValue::integers(vec![3, 2]))
            .with_attribute(
                "dimnames",
                dimnames(
                    ForeignValue::strings(vec!["1", "2", "3"]),
                    ForeignValue::Null,
                    ["Year", "Category"],
                ),
            );

        let mut adapter = MatrixAdapter::new(None, &value).unwrap();

        assert_eq!(adapter.name(), "Year/Category");
        assert_eq!(adapter.row_labels(), Some(&NarrowedLabels::Int32(vec![1, 2, 3])));
        assert_eq!(adapter.column_labels(), &["1".to_string(), "2".to_string()]);
        assert_eq!(
            adapter.column_types(),
            vec![CanonicalType::Int32, CanonicalType::Float64, CanonicalType::Float64]
        );
        let rows = collect_rows(&mut adapter);
        assert_eq!(
            rows[2],
            vec![CellValue::Int32(3), CellValue::Float64(3.0), CellValue::Float64(6.0)]
        );
    }

    #[test]
    fn test_without_row_labels_rows_have_no_label_element() {
        let value = ForeignValue::logicals(vec![Some(true), None])
            .with_attribute("dim", ForeignValue::integers(vec![1, 2]));

        let mut adapter = MatrixAdapter::new(Some("flags"), &value).unwrap();
        let rows = collect_rows(&mut adapter);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0][0], CellValue::Float64(1.0));
        match rows[0][1] {
            CellValue::Float64(v) => assert!(is_na_real(v)),
            ref other => panic!("unexpected cell {:?}", other),
        }
    }

    #[test]
    fn test_non_matrix_is_rejected() {
        let vector = ForeignValue::doubles(vec![1.0, 2.0]);
        let text = ForeignValue::strings(vec!["a", "b"])
            .with_attribute("dim", ForeignValue::integers(vec![1, 2]));

        assert!(matches!(
            MatrixAdapter::new(None, &vector),
            Err(BridgeError::NotAMatrix(_))
        ));
        match MatrixAdapter::new(None, &text) {
            Err(BridgeError::NotAMatrix(class)) => assert_eq!(class, "character"),
            other => panic!("expected NotAMatrix, got {:?}", other),
        }
    }

    #[test]
    fn test_to_table_has_label_column() {
        let adapter = MatrixAdapter::new(Some("m"), &two_by_two()).unwrap();
        let table = adapter.to_table().unwrap();

        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.columns().len(), 2);
        assert!(table.row_labels().is_some());
        assert_eq!(
            table.columns()[1].data(),
            &VectorData::Float64(vec![2.0, 4.0])
        );
    }
}
