//! Host-side primitive values and their static types.
//!
//! A host record exposes its properties as `HostValue`s and describes them with
//! `HostType`s. Only primitives and homogeneous primitive arrays are
//! representable in the interpreter; anything else is reported as
//! `HostType::Other` and dropped from column schemas.

use std::fmt;

use num_traits::ToPrimitive;

use crate::types::foreign_value::{ForeignValue, NA_INTEGER};

/// Element type of a homogeneous primitive array property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayElement {
    Float64,
    Int32,
    Bool,
    Utf8,
}

/// The static type of a host property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostType {
    Float64,
    Float32,
    Int32,
    Int64,
    Bool,
    Char,
    Utf8,
    Array(ArrayElement),
    /// A type with no primitive representation, carried by name for diagnostics.
    Other(String),
}

impl HostType {
    /// `true` for primitives and homogeneous primitive arrays.
    pub fn is_representable(&self) -> bool {
        !matches!(self, HostType::Other(_))
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Array(elem) => write!(f, "Array<{:?}>", elem),
            HostType::Other(name) => f.write_str(name),
            other => write!(f, "{:?}", other),
        }
    }
}

/// A homogeneous primitive array value.
#[derive(Debug, Clone, PartialEq)]
pub enum HostArray {
    Float64(Vec<f64>),
    Int32(Vec<i32>),
    Bool(Vec<bool>),
    Utf8(Vec<String>),
}

impl HostArray {
    /// Wraps the array as a foreign vector of the matching kind.
    pub fn to_foreign(&self) -> ForeignValue {
        match self {
            HostArray::Float64(v) => ForeignValue::doubles(v.clone()),
            HostArray::Int32(v) => ForeignValue::integers(v.clone()),
            HostArray::Bool(v) => ForeignValue::logicals(v.iter().map(|&b| Some(b)).collect()),
            HostArray::Utf8(v) => ForeignValue::strings(v.clone()),
        }
    }
}

/// A single host property value.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// An absent value; converts to the column's NA.
    Null,
    Float64(f64),
    Float32(f32),
    Int32(i32),
    Int64(i64),
    Bool(bool),
    Char(char),
    Str(String),
    Array(HostArray),
}

impl HostValue {
    /// A short type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Float64(_) => "f64",
            HostValue::Float32(_) => "f32",
            HostValue::Int32(_) => "i32",
            HostValue::Int64(_) => "i64",
            HostValue::Bool(_) => "bool",
            HostValue::Char(_) => "char",
            HostValue::Str(_) => "String",
            HostValue::Array(_) => "array",
        }
    }

    /// Converts a single value to a length-one foreign vector (arrays keep
    /// their length). `i64` narrows to an integer as it does in a column.
    pub fn to_foreign(&self) -> ForeignValue {
        match self {
            HostValue::Null => ForeignValue::Null,
            HostValue::Float64(v) => ForeignValue::doubles(vec![*v]),
            HostValue::Float32(v) => ForeignValue::doubles(vec![f64::from(*v)]),
            HostValue::Int32(v) => ForeignValue::integers(vec![*v]),
            HostValue::Int64(v) => ForeignValue::integers(vec![narrow_int64(*v, "scalar")]),
            HostValue::Bool(v) => ForeignValue::logicals(vec![Some(*v)]),
            HostValue::Char(c) => ForeignValue::string(c.to_string()),
            HostValue::Str(s) => ForeignValue::string(s.clone()),
            HostValue::Array(a) => a.to_foreign(),
        }
    }
}

/// Narrows an `i64` to the interpreter's 32-bit integer. Out-of-range values
/// become `NA_INTEGER` with a warning naming `target`.
pub fn narrow_int64(value: i64, target: &str) -> i32 {
    match value.to_i32() {
        Some(narrowed) if narrowed != NA_INTEGER => narrowed,
        _ => {
            log::warn!(
                "Value {} in '{}' does not fit in 32 bits; storing NA",
                value,
                target
            );
            NA_INTEGER
        }
    }
}

//==================================================================================
// Conversions from Rust field types
//==================================================================================

/// Implemented by Rust types that can back a record property. Used by the
/// `impl_record!` macro to derive accessor types and values.
pub trait HostField {
    fn host_type() -> HostType;
    fn to_host_value(&self) -> HostValue;
}

macro_rules! impl_host_field {
    ($ty:ty, $host_type:expr, $variant:ident) => {
        impl HostField for $ty {
            fn host_type() -> HostType {
                $host_type
            }
            fn to_host_value(&self) -> HostValue {
                HostValue::$variant(self.clone())
            }
        }
    };
}

impl_host_field!(f64, HostType::Float64, Float64);
impl_host_field!(f32, HostType::Float32, Float32);
impl_host_field!(i32, HostType::Int32, Int32);
impl_host_field!(i64, HostType::Int64, Int64);
impl_host_field!(bool, HostType::Bool, Bool);
impl_host_field!(char, HostType::Char, Char);
impl_host_field!(String, HostType::Utf8, Str);

macro_rules! impl_host_array_field {
    ($elem:ty, $array_elem:ident) => {
        impl HostField for Vec<$elem> {
            fn host_type() -> HostType {
                HostType::Array(ArrayElement::$array_elem)
            }
            fn to_host_value(&self) -> HostValue {
                HostValue::Array(HostArray::$array_elem(self.clone()))
            }
        }
    };
}

impl_host_array_field!(f64, Float64);
impl_host_array_field!(i32, Int32);
impl_host_array_field!(bool, Bool);
impl_host_array_field!(String, Utf8);

impl<T: HostField> HostField for Option<T> {
    fn host_type() -> HostType {
        T::host_type()
    }

    fn to_host_value(&self) -> HostValue {
        match self {
            Some(value) => value.to_host_value(),
            None => HostValue::Null,
        }
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        HostValue::Float64(v)
    }
}

impl From<i32> for HostValue {
    fn from(v: i32) -> Self {
        HostValue::Int32(v)
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        HostValue::Bool(v)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::Str(v.to_string())
    }
}

impl From<String> for HostValue {
    fn from(v: String) -> Self {
        HostValue::Str(v)
    }
}
