//! This module defines the canonical, type-safe representation of column
//! element types used throughout the marshaling layer.

use crate::error::BridgeError;
use crate::types::host_value::HostType;
use arrow::datatypes::DataType as ArrowDataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical element type of a `TypedVector`.
///
/// Every convertible value, host or foreign, reduces to one of these.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalType {
    Float64,
    Int32,
    /// Logical bytes with an NA sentinel.
    Logical,
    Utf8,
    /// Raw bytes. Kept apart from `Logical` so raw vectors convert back as raw.
    Raw,
    /// Each element is itself a foreign vector.
    Nested,
}

impl CanonicalType {
    /// Maps a host property type to its canonical column type.
    ///
    /// `f32` widens to `Float64`; `i64` narrows to `Int32` because the
    /// interpreter has no 64-bit integer; `char` is stored as a one-character
    /// string.
    pub fn from_host_type(host_type: &HostType) -> Result<Self, BridgeError> {
        match host_type {
            HostType::Float64 | HostType::Float32 => Ok(Self::Float64),
            HostType::Int32 | HostType::Int64 => Ok(Self::Int32),
            HostType::Bool => Ok(Self::Logical),
            HostType::Utf8 | HostType::Char => Ok(Self::Utf8),
            HostType::Array(_) => Ok(Self::Nested),
            HostType::Other(name) => Err(BridgeError::UnsupportedType(format!(
                "No canonical column type for host type {}",
                name
            ))),
        }
    }

    /// Converts an Arrow `DataType` into a `CanonicalType`.
    pub fn from_arrow_type(arrow_type: &ArrowDataType) -> Result<Self, BridgeError> {
        match arrow_type {
            ArrowDataType::Float64 | ArrowDataType::Float32 => Ok(Self::Float64),
            ArrowDataType::Int32 | ArrowDataType::Int64 => Ok(Self::Int32),
            ArrowDataType::Boolean => Ok(Self::Logical),
            ArrowDataType::Utf8 => Ok(Self::Utf8),
            ArrowDataType::UInt8 => Ok(Self::Raw),
            dt => Err(BridgeError::UnsupportedType(format!(
                "Cannot convert Arrow type {:?} to CanonicalType",
                dt
            ))),
        }
    }

    /// Converts a `CanonicalType` back into an Arrow `DataType`.
    pub fn to_arrow_type(&self) -> Result<ArrowDataType, BridgeError> {
        match self {
            Self::Float64 => Ok(ArrowDataType::Float64),
            Self::Int32 => Ok(ArrowDataType::Int32),
            Self::Logical => Ok(ArrowDataType::Boolean),
            Self::Utf8 => Ok(ArrowDataType::Utf8),
            Self::Raw => Ok(ArrowDataType::UInt8),
            Self::Nested => Err(BridgeError::UnsupportedType(
                "Nested vectors have no Arrow column equivalent".to_string(),
            )),
        }
    }

    /// Returns `true` if the type is numeric (as opposed to text, logical or nested).
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Float64 | Self::Int32)
    }
}

/// Provides the canonical string representation for a `CanonicalType`.
impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
