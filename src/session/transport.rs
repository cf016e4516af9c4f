//! The boundary to the embedded interpreter.

use thiserror::Error;

use crate::types::ForeignValue;

/// A fault reported by the connection itself, as opposed to an error raised
/// by evaluated code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportFault {
    pub message: String,
}

impl TransportFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A live connection to the interpreter's global environment.
///
/// Implementations are driven from a single thread and must not be re-entered;
/// read-loop callbacks go through [`Console`](super::Console) only.
pub trait Transport {
    /// Binds `value` under `name` in the global environment.
    fn assign(&mut self, name: &str, value: ForeignValue) -> Result<(), TransportFault>;

    /// Parses and evaluates `expr` in the global environment.
    fn parse_and_eval(&mut self, expr: &str) -> Result<ForeignValue, TransportFault>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn assign(&mut self, name: &str, value: ForeignValue) -> Result<(), TransportFault> {
        (**self).assign(name, value)
    }

    fn parse_and_eval(&mut self, expr: &str) -> Result<ForeignValue, TransportFault> {
        (**self).parse_and_eval(expr)
    }
}
