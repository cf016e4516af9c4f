//! This module defines the core, strongly-typed data representations shared by
//! every conversion in the bridge.
//!
//! It includes the closed `ForeignValue` union (the interpreter side), the
//! `HostValue`/`HostType` pair (the host side), and the `CanonicalType` enum
//! both sides reduce to.

pub mod canonical_type;
pub mod foreign_value;
pub mod host_value;

// Re-export the main type(s) for easier access.
pub use canonical_type::CanonicalType;
pub use foreign_value::{
    is_na_real, logical_byte, na_real, Attributes, Factor, ForeignKind, ForeignValue,
    ForeignVector, NA_INTEGER, NA_LOGICAL,
};
pub use host_value::{narrow_int64, ArrayElement, HostArray, HostField, HostType, HostValue};
