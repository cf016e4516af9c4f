//! Schema-by-example: the column set of a collection is read off its first
//! record.

use std::fmt;

use crate::error::BridgeError;
use crate::record::Record;
use crate::types::{CanonicalType, HostType};

/// One column of a record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub host_type: HostType,
}

/// The ordered (property name, property type) pairs of a record type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSchema {
    columns: Vec<ColumnSpec>,
}

impl ColumnSchema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

impl fmt::Display for ColumnSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{}: {}", c.name, c.host_type))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

pub struct RecordIntrospector;

impl RecordIntrospector {
    /// Derives the column schema of `sample`.
    ///
    /// Accessors declared by `boundary_type` or any of its ancestors are
    /// excluded, as are accessors whose type has no canonical column type.
    /// `boundary_type` must appear in the sample's lineage.
    pub fn introspect(sample: &dyn Record, boundary_type: &str) -> Result<ColumnSchema, BridgeError> {
        let lineage = sample.lineage();
        let boundary = lineage
            .iter()
            .position(|t| *t == boundary_type)
            .ok_or_else(|| {
                BridgeError::RecordSchemaError(format!(
                    "Boundary type '{}' is not in the record lineage {:?}",
                    boundary_type, lineage
                ))
            })?;
        let kept_types = &lineage[..boundary];

        let mut columns = Vec::new();
        for accessor in sample.accessors() {
            if !kept_types.contains(&accessor.declared_by) {
                continue;
            }
            if let Err(e) = CanonicalType::from_host_type(&accessor.host_type) {
                log::debug!("Skipping property '{}': {}", accessor.name, e);
                continue;
            }
            columns.push(ColumnSpec {
                name: accessor.name,
                host_type: accessor.host_type,
            });
        }

        let schema = ColumnSchema::new(columns);
        log::debug!("Record schema (boundary '{}'): {}", boundary_type, schema);
        Ok(schema)
    }
}
