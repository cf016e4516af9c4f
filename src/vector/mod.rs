// In: src/vector/mod.rs

//! Single-column conversion between host values and foreign vectors.

pub mod typed_vector;

pub use typed_vector::{TypedVector, VectorData};
