// In: src/attributes.rs

//! Name and dimension metadata of foreign vectors.
//!
//! Everything here is a pure read of the attribute list. The functions fail
//! with `FormatError` when an attribute is present but does not have the shape
//! the conversion layer relies on.

use crate::error::BridgeError;
use crate::types::ForeignValue;

/// Reads a character attribute, treating NA entries as empty strings.
fn string_attribute(value: &ForeignValue, attr: &str) -> Result<Option<Vec<String>>, BridgeError> {
    match value.attribute(attr) {
        None | Some(ForeignValue::Null) => Ok(None),
        Some(ForeignValue::Str(v)) => Ok(Some(
            v.values
                .iter()
                .map(|s| s.clone().unwrap_or_default())
                .collect(),
        )),
        Some(other) => Err(BridgeError::FormatError(format!(
            "'{}' attribute must be a character vector, found {}",
            attr,
            other.kind()
        ))),
    }
}

/// The extents from the `dim` attribute, or `None` when it is absent.
pub fn dim(value: &ForeignValue) -> Result<Option<Vec<usize>>, BridgeError> {
    let extents = match value.attribute("dim") {
        None | Some(ForeignValue::Null) => return Ok(None),
        Some(ForeignValue::Integer(v)) => v.values.iter().map(|&d| d as i64).collect::<Vec<_>>(),
        Some(ForeignValue::Double(v)) => v.values.iter().map(|&d| d as i64).collect(),
        Some(other) => {
            return Err(BridgeError::FormatError(format!(
                "'dim' attribute must be numeric, found {}",
                other.kind()
            )))
        }
    };

    extents
        .into_iter()
        .map(|d| {
            usize::try_from(d)
                .map_err(|_| BridgeError::FormatError(format!("Negative extent {} in 'dim'", d)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Number of declared dimensions; 0 when there is no `dim` attribute.
pub fn dimensions(value: &ForeignValue) -> Result<usize, BridgeError> {
    Ok(dim(value)?.map(|d| d.len()).unwrap_or(0))
}

/// The per-axis labels from `dimnames`. Each entry is `None` for an unset
/// axis. Returns `None` when the value has no `dimnames` at all.
pub fn get_dimnames(value: &ForeignValue) -> Result<Option<Vec<Option<Vec<String>>>>, BridgeError> {
    let list = match value.attribute("dimnames") {
        None | Some(ForeignValue::Null) => return Ok(None),
        Some(ForeignValue::List(list)) => list,
        Some(other) => {
            return Err(BridgeError::FormatError(format!(
                "'dimnames' attribute must be a list, found {}",
                other.kind()
            )))
        }
    };

    let mut axes = Vec::with_capacity(list.values.len());
    for (axis, entry) in list.values.iter().enumerate() {
        match entry {
            ForeignValue::Null => axes.push(None),
            ForeignValue::Str(labels) => axes.push(Some(
                labels
                    .values
                    .iter()
                    .map(|s| s.clone().unwrap_or_default())
                    .collect(),
            )),
            other => {
                return Err(BridgeError::FormatError(format!(
                    "dimnames entry {} must be NULL or character, found {}",
                    axis,
                    other.kind()
                )))
            }
        }
    }
    Ok(Some(axes))
}

/// The axis names, i.e. the `names` attribute of the `dimnames` list.
pub fn get_dimnames_names(value: &ForeignValue) -> Result<Option<Vec<String>>, BridgeError> {
    match value.attribute("dimnames") {
        Some(dimnames @ ForeignValue::List(_)) => string_attribute(dimnames, "names"),
        _ => Ok(None),
    }
}

/// The element names of `value`.
///
/// The explicit `names` attribute wins. Without it, a value with exactly one
/// dimension falls back to that dimension's labels.
pub fn get_names(value: &ForeignValue) -> Result<Option<Vec<String>>, BridgeError> {
    if let Some(names) = string_attribute(value, "names")? {
        return Ok(Some(names));
    }

    if dimensions(value)? == 1 {
        if let Some(mut axes) = get_dimnames(value)? {
            if !axes.is_empty() {
                return Ok(axes.swap_remove(0));
            }
        }
    }
    Ok(None)
}

/// A human-readable class label for diagnostics: the explicit class list in
/// brackets (`[matrix, array]`), or the value's kind name.
pub fn get_class_label(value: &ForeignValue) -> String {
    match value.attribute("class").and_then(ForeignValue::as_strings) {
        Some(classes) => {
            let labels: Vec<&str> = classes
                .iter()
                .map(|c| c.as_deref().unwrap_or("NA"))
                .collect();
            format!("[{}]", labels.join(", "))
        }
        None => value.kind().to_string(),
    }
}
