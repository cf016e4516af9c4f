// In: src/vector/typed_vector.rs

//! The canonical single-column container.
//!
//! A `TypedVector` is built either from host values (`create` + `add_value`,
//! the host-to-interpreter direction) or from a foreign vector
//! (`from_foreign_vector`, the interpreter-to-host direction). Either way the
//! backing store is one homogeneous `VectorData` sequence.

use crate::attributes;
use crate::error::BridgeError;
use crate::rows::{CellValue, RowSource};
use crate::types::{
    na_real, narrow_int64, CanonicalType, ForeignValue, ForeignVector, HostType, HostValue,
    NA_INTEGER, NA_LOGICAL,
};

//==================================================================================
// I. Backing Store
//==================================================================================

/// The homogeneous backing sequence of a `TypedVector`. The variant is the
/// vector's canonical type.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorData {
    Float64(Vec<f64>),
    Int32(Vec<i32>),
    Logical(Vec<i8>),
    Utf8(Vec<Option<String>>),
    Raw(Vec<u8>),
    Nested(Vec<ForeignValue>),
}

impl VectorData {
    /// An empty sequence of the given type with room for `capacity` elements.
    pub fn with_capacity(canonical_type: CanonicalType, capacity: usize) -> Self {
        match canonical_type {
            CanonicalType::Float64 => VectorData::Float64(Vec::with_capacity(capacity)),
            CanonicalType::Int32 => VectorData::Int32(Vec::with_capacity(capacity)),
            CanonicalType::Logical => VectorData::Logical(Vec::with_capacity(capacity)),
            CanonicalType::Utf8 => VectorData::Utf8(Vec::with_capacity(capacity)),
            CanonicalType::Raw => VectorData::Raw(Vec::with_capacity(capacity)),
            CanonicalType::Nested => VectorData::Nested(Vec::with_capacity(capacity)),
        }
    }

    pub fn canonical_type(&self) -> CanonicalType {
        match self {
            VectorData::Float64(_) => CanonicalType::Float64,
            VectorData::Int32(_) => CanonicalType::Int32,
            VectorData::Logical(_) => CanonicalType::Logical,
            VectorData::Utf8(_) => CanonicalType::Utf8,
            VectorData::Raw(_) => CanonicalType::Raw,
            VectorData::Nested(_) => CanonicalType::Nested,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VectorData::Float64(v) => v.len(),
            VectorData::Int32(v) => v.len(),
            VectorData::Logical(v) => v.len(),
            VectorData::Utf8(v) => v.len(),
            VectorData::Raw(v) => v.len(),
            VectorData::Nested(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at `index` as a cell.
    pub fn get(&self, index: usize) -> Option<CellValue> {
        match self {
            VectorData::Float64(v) => v.get(index).map(|&x| CellValue::Float64(x)),
            VectorData::Int32(v) => v.get(index).map(|&x| CellValue::Int32(x)),
            VectorData::Logical(v) => v.get(index).map(|&x| CellValue::Logical(x)),
            VectorData::Utf8(v) => v.get(index).map(|x| CellValue::Utf8(x.clone())),
            VectorData::Raw(v) => v.get(index).map(|&x| CellValue::Raw(x)),
            VectorData::Nested(v) => v.get(index).map(|x| CellValue::Nested(x.clone())),
        }
    }

    /// Appends the type's NA. Raw bytes have no NA encoding.
    pub fn push_na(&mut self) -> Result<(), BridgeError> {
        match self {
            VectorData::Float64(v) => v.push(na_real()),
            VectorData::Int32(v) => v.push(NA_INTEGER),
            VectorData::Logical(v) => v.push(NA_LOGICAL),
            VectorData::Utf8(v) => v.push(None),
            VectorData::Nested(v) => v.push(ForeignValue::Null),
            VectorData::Raw(_) => {
                return Err(BridgeError::UnsupportedType(
                    "Raw vectors have no NA value".to_string(),
                ))
            }
        }
        Ok(())
    }

    /// Appends a cell of the same type.
    pub fn push_cell(&mut self, cell: CellValue) -> Result<(), BridgeError> {
        match (self, cell) {
            (VectorData::Float64(v), CellValue::Float64(x)) => v.push(x),
            (VectorData::Int32(v), CellValue::Int32(x)) => v.push(x),
            (VectorData::Logical(v), CellValue::Logical(x)) => v.push(x),
            (VectorData::Utf8(v), CellValue::Utf8(x)) => v.push(x),
            (VectorData::Raw(v), CellValue::Raw(x)) => v.push(x),
            (VectorData::Nested(v), CellValue::Nested(x)) => v.push(x),
            (data, cell) => {
                return Err(BridgeError::UnsupportedType(format!(
                    "Cannot append a {} cell to a {} vector",
                    cell.canonical_type(),
                    data.canonical_type()
                )))
            }
        }
        Ok(())
    }
}

//==================================================================================
// II. TypedVector
//==================================================================================

/// A named, homogeneous column with optional per-element names.
#[derive(Debug, Clone)]
pub struct TypedVector {
    name: String,
    data: VectorData,
    names: Option<Vec<String>>,
    cursor: usize,
}

// The streaming cursor is not part of the value.
impl PartialEq for TypedVector {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.data == other.data && self.names == other.names
    }
}

impl TypedVector {
    /// Preallocates an empty vector for `size` values of `host_type`.
    ///
    /// Fails with `UnsupportedType` when the host type has no canonical
    /// mapping; callers building a whole table skip such columns.
    pub fn create(name: &str, host_type: &HostType, size: usize) -> Result<Self, BridgeError> {
        let canonical_type = CanonicalType::from_host_type(host_type)?;
        Ok(Self::with_type(name, canonical_type, size))
    }

    /// Preallocates an empty vector of a known canonical type.
    pub fn with_type(name: &str, canonical_type: CanonicalType, size: usize) -> Self {
        Self {
            name: name.to_string(),
            data: VectorData::with_capacity(canonical_type, size),
            names: None,
            cursor: 0,
        }
    }

    /// Wraps existing data. `names`, when given, must match the data length.
    pub fn from_parts(
        name: &str,
        data: VectorData,
        names: Option<Vec<String>>,
    ) -> Result<Self, BridgeError> {
        if let Some(n) = &names {
            if n.len() != data.len() {
                return Err(BridgeError::FormatError(format!(
                    "Vector '{}' has {} values but {} names",
                    name,
                    data.len(),
                    n.len()
                )));
            }
        }
        Ok(Self {
            name: name.to_string(),
            data,
            names,
            cursor: 0,
        })
    }

    /// Converts a foreign vector, choosing the canonical type from its kind.
    ///
    /// Factors decode to their level labels. Element names come from the
    /// `names` attribute, or from the labels of a single declared dimension.
    pub fn from_foreign_vector(name: &str, value: &ForeignValue) -> Result<Self, BridgeError> {
        let data = match value {
            ForeignValue::Double(v) => VectorData::Float64(v.values.clone()),
            ForeignValue::Integer(v) => VectorData::Int32(v.values.clone()),
            ForeignValue::Logical(v) => VectorData::Logical(v.values.clone()),
            ForeignValue::Str(v) => VectorData::Utf8(v.values.clone()),
            ForeignValue::Factor(f) => VectorData::Utf8(f.labels()),
            ForeignValue::Raw(v) => VectorData::Raw(v.values.clone()),
            ForeignValue::List(v) => VectorData::Nested(v.values.clone()),
            other @ (ForeignValue::Null | ForeignValue::ErrorMarker(_)) => {
                return Err(BridgeError::UnsupportedType(format!(
                    "Cannot convert foreign {} to a vector",
                    other.kind()
                )))
            }
        };

        let names = attributes::get_names(value)?;
        log::debug!(
            "Converted foreign {} '{}' to {} vector of length {}",
            value.kind(),
            name,
            data.canonical_type(),
            data.len()
        );
        Self::from_parts(name, data, names)
    }

    /// Appends one host value.
    ///
    /// `Null` appends the column's NA. `f32` widens and `i64` narrows (an
    /// out-of-range `i64` becomes NA). Characters are stored as one-character
    /// strings and arrays are wrapped as nested foreign vectors.
    pub fn add_value(&mut self, value: HostValue) -> Result<(), BridgeError> {
        if self.names.is_some() {
            return Err(BridgeError::InternalError(format!(
                "Cannot append to named vector '{}'",
                self.name
            )));
        }

        match (&mut self.data, value) {
            (data, HostValue::Null) => data.push_na()?,
            (VectorData::Float64(v), HostValue::Float64(x)) => v.push(x),
            (VectorData::Float64(v), HostValue::Float32(x)) => v.push(f64::from(x)),
            (VectorData::Int32(v), HostValue::Int32(x)) => v.push(x),
            (VectorData::Int32(v), HostValue::Int64(x)) => v.push(narrow_int64(x, &self.name)),
            (VectorData::Logical(v), HostValue::Bool(b)) => v.push(b as i8),
            (VectorData::Utf8(v), HostValue::Str(s)) => v.push(Some(s)),
            (VectorData::Utf8(v), HostValue::Char(c)) => v.push(Some(c.to_string())),
            (VectorData::Nested(v), HostValue::Array(a)) => v.push(a.to_foreign()),
            (data, other) => {
                return Err(BridgeError::UnsupportedType(format!(
                    "Cannot store {} value in {} column '{}'",
                    other.type_name(),
                    data.canonical_type(),
                    self.name
                )))
            }
        }
        Ok(())
    }

    /// Converts back to the foreign vector of the matching kind, carrying the
    /// element names as a `names` attribute.
    pub fn to_foreign_vector(&self) -> Result<ForeignValue, BridgeError> {
        let mut value = match &self.data {
            VectorData::Float64(v) => ForeignValue::Double(ForeignVector::new(v.clone())),
            VectorData::Int32(v) => ForeignValue::Integer(ForeignVector::new(v.clone())),
            VectorData::Logical(v) => ForeignValue::Logical(ForeignVector::new(v.clone())),
            VectorData::Utf8(v) => ForeignValue::Str(ForeignVector::new(v.clone())),
            VectorData::Raw(v) => ForeignValue::Raw(ForeignVector::new(v.clone())),
            VectorData::Nested(v) => {
                if let Some(bad) = v.iter().find(|e| matches!(e, ForeignValue::ErrorMarker(_))) {
                    return Err(BridgeError::UnsupportedType(format!(
                        "Nested element of kind {} in '{}' has no foreign vector form",
                        bad.kind(),
                        self.name
                    )));
                }
                ForeignValue::List(ForeignVector::new(v.clone()))
            }
        };

        if let (Some(names), Some(attrs)) = (&self.names, value.attributes_mut()) {
            attrs.set("names", ForeignValue::strings(names.clone()));
        }
        Ok(value)
    }

    // --- Accessors ---

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn canonical_type(&self) -> CanonicalType {
        self.data.canonical_type()
    }

    pub fn data(&self) -> &VectorData {
        &self.data
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn value(&self, index: usize) -> Option<CellValue> {
        self.data.get(index)
    }

    /// Name/value pairs in element order, or `None` for an unnamed vector.
    pub fn as_map(&self) -> Option<Vec<(String, CellValue)>> {
        let names = self.names.as_ref()?;
        Some(
            names
                .iter()
                .enumerate()
                .filter_map(|(i, n)| self.data.get(i).map(|cell| (n.clone(), cell)))
                .collect(),
        )
    }

    pub fn into_data(self) -> VectorData {
        self.data
    }
}

impl RowSource for TypedVector {
    fn name(&self) -> &str {
        &self.name
    }

    fn column_names(&self) -> Vec<String> {
        match self.names {
            Some(_) => vec!["Name".to_string(), "Value".to_string()],
            None => vec!["Value".to_string()],
        }
    }

    fn column_types(&self) -> Vec<CanonicalType> {
        match self.names {
            Some(_) => vec![CanonicalType::Utf8, self.canonical_type()],
            None => vec![self.canonical_type()],
        }
    }

    fn open(&mut self) {
        self.cursor = 0;
    }

    fn read_row(&mut self) -> Option<Vec<CellValue>> {
        let cell = self.data.get(self.cursor)?;
        let row = match &self.names {
            Some(names) => vec![CellValue::Utf8(names.get(self.cursor).cloned()), cell],
            None => vec![cell],
        };
        self.cursor += 1;
        Some(row)
    }
}
