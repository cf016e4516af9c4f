// In: src/error.rs

//! This module defines the single, unified error type for the entire rbridge library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    // =========================================================================
    // === Marshaling Errors (value conversion between host and interpreter)
    // =========================================================================
    /// No canonical mapping exists for a value or type. Callers converting a
    /// whole collection treat this as "skip this column".
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// A foreign attribute does not have the shape this layer accepts.
    #[error("Foreign value format error: {0}")]
    FormatError(String),

    #[error("Value of class {0} cannot be accessed as a matrix")]
    NotAMatrix(String),

    #[error("Record schema error: {0}")]
    RecordSchemaError(String),

    // =========================================================================
    // === Session Errors (the safe-evaluation protocol)
    // =========================================================================
    /// The connection or the evaluation wrapper itself faulted. The session
    /// stays usable afterwards.
    #[error("Transport fault at \"{context}\": {message}")]
    TransportError { context: String, message: String },

    /// The expression ran and raised inside the interpreter. Carries the
    /// interpreter's own message text.
    #[error("{0}")]
    EvaluationError(String),

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error originating from the underlying I/O subsystem (e.g. a script file not found).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while loading a config.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// A dense matrix could not be shaped from the foreign data.
    #[error("Matrix shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl BridgeError {
    /// Returns `true` for errors a collection conversion may recover from by
    /// skipping the offending column.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BridgeError::UnsupportedType(_))
    }
}
