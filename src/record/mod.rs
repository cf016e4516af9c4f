// In: src/record/mod.rs

//! Host records and their conversion into tables.
//!
//! A host type opts in by implementing `Record`, which describes its property
//! surface explicitly: the chain of declaring types, the typed accessors each
//! of them declares, and a by-name property lookup. `impl_record!` derives the
//! implementation for plain structs.

pub mod builder;
pub mod introspector;
pub mod table;

pub use builder::TableBuilder;
pub use introspector::{ColumnSchema, ColumnSpec, RecordIntrospector};
pub use table::Table;

use crate::types::{HostType, HostValue};

/// The implicit root of every lineage. It declares no accessors, so using it
/// as the boundary type keeps every property.
pub const ROOT_RECORD: &str = "Record";

/// One readable property of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub name: String,
    pub host_type: HostType,
    /// The type in the lineage that declares this accessor.
    pub declared_by: &'static str,
}

impl Accessor {
    pub fn new(name: &str, host_type: HostType, declared_by: &'static str) -> Self {
        Self {
            name: name.to_string(),
            host_type,
            declared_by,
        }
    }
}

/// A secondary property bag attached to a record, carrying its own column
/// metadata. Its columns are appended after the record's own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkedUpRow {
    columns: Vec<(String, HostType)>,
    values: Vec<(String, HostValue)>,
}

impl MarkedUpRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a column and sets this row's value for it.
    pub fn with(mut self, name: &str, host_type: HostType, value: HostValue) -> Self {
        self.columns.push((name.to_string(), host_type));
        self.values.push((name.to_string(), value));
        self
    }

    /// Declares a column without a value on this row.
    pub fn with_column(mut self, name: &str, host_type: HostType) -> Self {
        self.columns.push((name.to_string(), host_type));
        self
    }

    pub fn columns(&self) -> &[(String, HostType)] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&HostValue> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// The explicit property surface of a host record type.
pub trait Record {
    /// The declaring types, from the most derived to [`ROOT_RECORD`].
    fn lineage(&self) -> Vec<&'static str>;

    /// Every accessor, in declaration order.
    fn accessors(&self) -> Vec<Accessor>;

    /// The current value of the named property, or `None` if the record has
    /// no such property.
    fn property(&self, name: &str) -> Option<HostValue>;

    fn marked_up_row(&self) -> Option<&MarkedUpRow> {
        None
    }
}

/// Implements [`Record`] for a struct whose listed fields implement
/// [`HostField`](crate::types::HostField).
///
/// ```ignore
/// struct Person { id: i32, name: String }
/// impl_record!(Person { id: i32, name: String });
///
/// // A record that extends another by embedding it.
/// struct Employee { person: Person, salary: f64 }
/// impl_record!(Employee(base: person) { salary: f64 });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ident { $($field:ident : $fty:ty),* $(,)? }) => {
        impl $crate::record::Record for $ty {
            fn lineage(&self) -> Vec<&'static str> {
                vec![stringify!($ty), $crate::record::ROOT_RECORD]
            }

            fn accessors(&self) -> Vec<$crate::record::Accessor> {
                vec![$(
                    $crate::record::Accessor::new(
                        stringify!($field),
                        <$fty as $crate::types::HostField>::host_type(),
                        stringify!($ty),
                    )
                ),*]
            }

            fn property(&self, name: &str) -> Option<$crate::types::HostValue> {
                match name {
                    $(stringify!($field) => Some($crate::types::HostField::to_host_value(&self.$field)),)*
                    _ => None,
                }
            }
        }
    };
    ($ty:ident ( base : $base:ident ) { $($field:ident : $fty:ty),* $(,)? }) => {
        impl $crate::record::Record for $ty {
            fn lineage(&self) -> Vec<&'static str> {
                let mut lineage = vec![stringify!($ty)];
                lineage.extend($crate::record::Record::lineage(&self.$base));
                lineage
            }

            fn accessors(&self) -> Vec<$crate::record::Accessor> {
                let mut accessors = $crate::record::Record::accessors(&self.$base);
                let own: Vec<$crate::record::Accessor> = vec![$(
                    $crate::record::Accessor::new(
                        stringify!($field),
                        <$fty as $crate::types::HostField>::host_type(),
                        stringify!($ty),
                    )
                ),*];
                accessors.extend(own);
                accessors
            }

            fn property(&self, name: &str) -> Option<$crate::types::HostValue> {
                match name {
                    $(stringify!($field) => Some($crate::types::HostField::to_host_value(&self.$field)),)*
                    _ => $crate::record::Record::property(&self.$base, name),
                }
            }
        }
    };
}
