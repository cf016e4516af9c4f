//! Label narrowing: row labels that all parse as integers are carried as
//! integers, everything else stays text.

use serde::{Deserialize, Serialize};

use crate::types::CanonicalType;

/// Row labels after narrowing to the most specific representable type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum NarrowedLabels {
    Int32(Vec<i32>),
    Utf8(Vec<String>),
}

impl NarrowedLabels {
    pub fn len(&self) -> usize {
        match self {
            NarrowedLabels::Int32(v) => v.len(),
            NarrowedLabels::Utf8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn canonical_type(&self) -> CanonicalType {
        match self {
            NarrowedLabels::Int32(_) => CanonicalType::Int32,
            NarrowedLabels::Utf8(_) => CanonicalType::Utf8,
        }
    }

    /// The labels as text, whatever their narrowed type.
    pub fn to_strings(&self) -> Vec<String> {
        match self {
            NarrowedLabels::Int32(v) => v.iter().map(|i| i.to_string()).collect(),
            NarrowedLabels::Utf8(v) => v.clone(),
        }
    }
}

/// Narrows `labels` to `Int32` when every label parses as an `i32`.
/// An empty label set stays `Utf8`.
pub fn narrow_labels(labels: &[String]) -> NarrowedLabels {
    if labels.is_empty() {
        return NarrowedLabels::Utf8(Vec::new());
    }

    let parsed: Option<Vec<i32>> = labels.iter().map(|l| l.trim().parse::<i32>().ok()).collect();
    match parsed {
        Some(ints) => NarrowedLabels::Int32(ints),
        None => NarrowedLabels::Utf8(labels.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_integer_labels_narrow() {
        assert_eq!(
            narrow_labels(&labels(&["1", "2", "3"])),
            NarrowedLabels::Int32(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_mixed_labels_stay_text() {
        assert_eq!(
            narrow_labels(&labels(&["1", "b"])),
            NarrowedLabels::Utf8(labels(&["1", "b"]))
        );
        assert_eq!(
            narrow_labels(&labels(&["a", "b"])).canonical_type(),
            CanonicalType::Utf8
        );
    }

    #[test]
    fn test_empty_and_overflow() {
        assert!(narrow_labels(&[]).is_empty());
        assert_eq!(narrow_labels(&[]).canonical_type(), CanonicalType::Utf8);
        // Out of i32 range.
        assert_eq!(
            narrow_labels(&labels(&["3000000000"])).canonical_type(),
            CanonicalType::Utf8
        );
    }
}
