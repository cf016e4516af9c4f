//! This file is the root of the `rbridge` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`types`, `vector`,
//!     `record`, `session`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types most callers need, so that
//!     `use rbridge::{EvalSession, Table, ...}` is enough for typical use.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod attributes;
pub mod bridge;
pub mod config;
pub mod error;
pub mod logging;
pub mod matrix;
pub mod narrow;
pub mod record;
pub mod rows;
pub mod session;
pub mod types;
pub mod vector;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use bridge::{
    table_from_collection, table_from_foreign_value, table_from_named_foreign_value,
    table_from_record_batch, table_to_record_batch,
};
pub use config::SessionConfig;
pub use error::BridgeError;
pub use matrix::MatrixAdapter;
pub use narrow::{narrow_labels, NarrowedLabels};
pub use record::{Record, RecordIntrospector, Table, TableBuilder};
pub use rows::{CellValue, RowSource};
pub use session::{Console, EvalSession, OutputKind, Transport, TransportFault};
pub use types::{CanonicalType, ForeignValue, HostType, HostValue};
pub use vector::{TypedVector, VectorData};
