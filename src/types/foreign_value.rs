//! The closed value model of the foreign interpreter.
//!
//! Every value handed across the transport is one of the `ForeignValue`
//! variants below. Conversion code matches on the variant exhaustively instead
//! of probing runtime classes, so adding a kind is a compile error everywhere
//! it has to be handled.

use std::fmt;

//==================================================================================
// I. NA Sentinels
//==================================================================================

/// The interpreter's integer NA.
pub const NA_INTEGER: i32 = i32::MIN;

/// The byte sentinel used for a logical NA. Distinct from `0` (false) and `1` (true).
pub const NA_LOGICAL: i8 = i8::MIN;

/// `NA_real_` is a quiet NaN whose low word is 1954.
const NA_REAL_BITS: u64 = 0x7FF0_0000_0000_07A2;

/// Returns the interpreter's real NA.
pub fn na_real() -> f64 {
    f64::from_bits(NA_REAL_BITS)
}

/// Returns `true` if `value` is the real NA (and not merely some other NaN).
pub fn is_na_real(value: f64) -> bool {
    value.is_nan() && (value.to_bits() & 0xFFFF_FFFF) == 1954
}

/// Encodes an optional boolean as a logical byte.
pub fn logical_byte(value: Option<bool>) -> i8 {
    match value {
        Some(true) => 1,
        Some(false) => 0,
        None => NA_LOGICAL,
    }
}

//==================================================================================
// II. Attributes
//==================================================================================

/// The ordered attribute list of a foreign vector (`names`, `dim`, `dimnames`,
/// `class`, ...). Attribute values are themselves foreign values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, ForeignValue)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ForeignValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Sets `name`, replacing any existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: ForeignValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<ForeignValue> {
        let idx = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ForeignValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//==================================================================================
// III. Vector Payloads
//==================================================================================

/// An atomic or generic vector together with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignVector<T> {
    pub values: Vec<T>,
    pub attributes: Attributes,
}

impl<T> ForeignVector<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            attributes: Attributes::new(),
        }
    }
}

/// A factor: 1-based integer codes into a level table.
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    pub codes: Vec<i32>,
    pub levels: Vec<String>,
    pub attributes: Attributes,
}

impl Factor {
    pub fn new(codes: Vec<i32>, levels: Vec<String>) -> Self {
        Self {
            codes,
            levels,
            attributes: Attributes::new(),
        }
    }

    /// Decodes every code to its level label. NA codes, and codes that point
    /// outside the level table, decode to `None`.
    pub fn labels(&self) -> Vec<Option<String>> {
        self.codes
            .iter()
            .map(|&code| {
                if code == NA_INTEGER || code < 1 {
                    return None;
                }
                self.levels.get(code as usize - 1).cloned()
            })
            .collect()
    }
}

//==================================================================================
// IV. The Value Union
//==================================================================================

/// Every value the interpreter can hand back, or accept, across the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ForeignValue {
    /// The interpreter's "no value".
    Null,
    Double(ForeignVector<f64>),
    Integer(ForeignVector<i32>),
    /// Logical bytes: `1`, `0` or [`NA_LOGICAL`].
    Logical(ForeignVector<i8>),
    /// Character vector; `None` is `NA_character_`.
    Str(ForeignVector<Option<String>>),
    Factor(Factor),
    Raw(ForeignVector<u8>),
    /// Generic vector (list). Element names live in the `names` attribute.
    List(ForeignVector<ForeignValue>),
    /// The tagged value a `try(...)` produces when the wrapped expression raised.
    ErrorMarker(String),
}

/// The runtime kind of a [`ForeignValue`], used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignKind {
    Null,
    Double,
    Integer,
    Logical,
    Str,
    Factor,
    Raw,
    List,
    ErrorMarker,
}

impl fmt::Display for ForeignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // These mirror the interpreter's own mode names.
        let name = match self {
            ForeignKind::Null => "NULL",
            ForeignKind::Double => "double",
            ForeignKind::Integer => "integer",
            ForeignKind::Logical => "logical",
            ForeignKind::Str => "character",
            ForeignKind::Factor => "factor",
            ForeignKind::Raw => "raw",
            ForeignKind::List => "list",
            ForeignKind::ErrorMarker => "try-error",
        };
        f.write_str(name)
    }
}

impl ForeignValue {
    // --- Constructors ---

    pub fn doubles(values: Vec<f64>) -> Self {
        ForeignValue::Double(ForeignVector::new(values))
    }

    pub fn integers(values: Vec<i32>) -> Self {
        ForeignValue::Integer(ForeignVector::new(values))
    }

    pub fn logicals(values: Vec<Option<bool>>) -> Self {
        ForeignValue::Logical(ForeignVector::new(
            values.into_iter().map(logical_byte).collect(),
        ))
    }

    pub fn strings<S: Into<String>>(values: Vec<S>) -> Self {
        ForeignValue::Str(ForeignVector::new(
            values.into_iter().map(|s| Some(s.into())).collect(),
        ))
    }

    /// A length-one character vector.
    pub fn string(value: impl Into<String>) -> Self {
        ForeignValue::Str(ForeignVector::new(vec![Some(value.into())]))
    }

    pub fn raw(values: Vec<u8>) -> Self {
        ForeignValue::Raw(ForeignVector::new(values))
    }

    /// A generic list whose `names` attribute is taken from the pairs.
    pub fn named_list(elements: Vec<(String, ForeignValue)>) -> Self {
        let (names, values): (Vec<String>, Vec<ForeignValue>) = elements.into_iter().unzip();
        let mut list = ForeignVector::new(values);
        list.attributes.set("names", ForeignValue::strings(names));
        ForeignValue::List(list)
    }

    // --- Introspection ---

    pub fn kind(&self) -> ForeignKind {
        match self {
            ForeignValue::Null => ForeignKind::Null,
            ForeignValue::Double(_) => ForeignKind::Double,
            ForeignValue::Integer(_) => ForeignKind::Integer,
            ForeignValue::Logical(_) => ForeignKind::Logical,
            ForeignValue::Str(_) => ForeignKind::Str,
            ForeignValue::Factor(_) => ForeignKind::Factor,
            ForeignValue::Raw(_) => ForeignKind::Raw,
            ForeignValue::List(_) => ForeignKind::List,
            ForeignValue::ErrorMarker(_) => ForeignKind::ErrorMarker,
        }
    }

    /// Number of elements. `Null` and error markers have length 0.
    pub fn len(&self) -> usize {
        match self {
            ForeignValue::Null | ForeignValue::ErrorMarker(_) => 0,
            ForeignValue::Double(v) => v.values.len(),
            ForeignValue::Integer(v) => v.values.len(),
            ForeignValue::Logical(v) => v.values.len(),
            ForeignValue::Str(v) => v.values.len(),
            ForeignValue::Factor(f) => f.codes.len(),
            ForeignValue::Raw(v) => v.values.len(),
            ForeignValue::List(v) => v.values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ForeignValue::Null)
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            ForeignValue::Null | ForeignValue::ErrorMarker(_) => None,
            ForeignValue::Double(v) => Some(&v.attributes),
            ForeignValue::Integer(v) => Some(&v.attributes),
            ForeignValue::Logical(v) => Some(&v.attributes),
            ForeignValue::Str(v) => Some(&v.attributes),
            ForeignValue::Factor(f) => Some(&f.attributes),
            ForeignValue::Raw(v) => Some(&v.attributes),
            ForeignValue::List(v) => Some(&v.attributes),
        }
    }

    pub fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        match self {
            ForeignValue::Null | ForeignValue::ErrorMarker(_) => None,
            ForeignValue::Double(v) => Some(&mut v.attributes),
            ForeignValue::Integer(v) => Some(&mut v.attributes),
            ForeignValue::Logical(v) => Some(&mut v.attributes),
            ForeignValue::Str(v) => Some(&mut v.attributes),
            ForeignValue::Factor(f) => Some(&mut f.attributes),
            ForeignValue::Raw(v) => Some(&mut v.attributes),
            ForeignValue::List(v) => Some(&mut v.attributes),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&ForeignValue> {
        self.attributes().and_then(|attrs| attrs.get(name))
    }

    /// Builder-style attribute setter. A no-op for values that cannot carry
    /// attributes (`Null`, error markers).
    pub fn with_attribute(mut self, name: &str, value: ForeignValue) -> Self {
        if let Some(attrs) = self.attributes_mut() {
            attrs.set(name, value);
        }
        self
    }

    /// The character payload, if this is a character vector.
    pub fn as_strings(&self) -> Option<&[Option<String>]> {
        match self {
            ForeignValue::Str(v) => Some(&v.values),
            _ => None,
        }
    }

    /// `true` if the explicit `class` attribute contains `class`.
    pub fn inherits(&self, class: &str) -> bool {
        if matches!(self, ForeignValue::ErrorMarker(_)) {
            return class == "try-error";
        }
        self.attribute("class")
            .and_then(ForeignValue::as_strings)
            .map(|classes| classes.iter().any(|c| c.as_deref() == Some(class)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_na_real_is_distinct_from_plain_nan() {
        assert!(is_na_real(na_real()));
        assert!(!is_na_real(f64::NAN));
        assert!(!is_na_real(0.0));
    }

    #[test]
    fn test_attributes_set_replaces_in_place() {
        let mut attrs = Attributes::new();
        attrs.set("names", ForeignValue::strings(vec!["a"]));
        attrs.set("class", ForeignValue::string("foo"));
        attrs.set("names", ForeignValue::strings(vec!["b"]));

        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["names", "class"]);
        assert_eq!(attrs.get("names"), Some(&ForeignValue::strings(vec!["b"])));
    }

    #[test]
    fn test_factor_labels_decode_codes() {
        let factor = Factor::new(
            vec![2, 1, NA_INTEGER, 7],
            vec!["low".to_string(), "high".to_string()],
        );
        assert_eq!(
            factor.labels(),
            vec![Some("high".to_string()), Some("low".to_string()), None, None]
        );
    }

    #[test]
    fn test_inherits_reads_class_attribute() {
        let df = ForeignValue::named_list(vec![])
            .with_attribute("class", ForeignValue::strings(vec!["data.frame"]));
        assert!(df.inherits("data.frame"));
        assert!(!df.inherits("matrix"));
        assert!(ForeignValue::ErrorMarker("boom".into()).inherits("try-error"));
    }
}
