//! An in-memory stand-in for the interpreter, for tests of code that drives an
//! `EvalSession`.
//!
//! `ScriptedTransport` understands the session's fixed protocol expressions
//! (the try wrapper, output capture, `.pep` printing and `geterrmessage()`)
//! and answers everything else from a table of scripted outcomes keyed by the
//! exact expression text.

use std::collections::HashMap;

use crate::session::message::ERROR_PLACEHOLDER;
use crate::session::transport::{Transport, TransportFault};
use crate::session::{CAPTURE_OUTPUT_EXPR, EXPRESSION_SYMBOL, LAST_ERROR_EXPR, PRINT_EXPR};
use crate::types::ForeignValue;

/// How the fake interpreter answers one expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The expression evaluates to this value.
    Value(ForeignValue),
    /// The expression raises an interpreter error with this condition message.
    Raise(String),
    /// The connection faults while evaluating the expression.
    Fault(String),
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    outcomes: HashMap<String, Outcome>,
    bindings: HashMap<String, ForeignValue>,
    last_error: Option<String>,
    eval_log: Vec<String>,
    assign_fault: Option<String>,
    last_error_fault: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, expr: &str, value: ForeignValue) -> Self {
        self.outcomes.insert(expr.to_string(), Outcome::Value(value));
        self
    }

    pub fn raise(mut self, expr: &str, message: &str) -> Self {
        self.outcomes
            .insert(expr.to_string(), Outcome::Raise(message.to_string()));
        self
    }

    pub fn fault(mut self, expr: &str, message: &str) -> Self {
        self.outcomes
            .insert(expr.to_string(), Outcome::Fault(message.to_string()));
        self
    }

    /// Seeds the text `geterrmessage()` returns.
    pub fn with_last_error(mut self, message: &str) -> Self {
        self.last_error = Some(message.to_string());
        self
    }

    /// Makes every `assign` fault.
    pub fn failing_assign(mut self, message: &str) -> Self {
        self.assign_fault = Some(message.to_string());
        self
    }

    /// Makes `geterrmessage()` itself fault.
    pub fn failing_last_error(mut self) -> Self {
        self.last_error_fault = true;
        self
    }

    /// Every expression text passed to `parse_and_eval`, in order.
    pub fn eval_log(&self) -> &[String] {
        &self.eval_log
    }

    pub fn binding(&self, name: &str) -> Option<&ForeignValue> {
        self.bindings.get(name)
    }

    /// The string currently bound to the expression symbol.
    fn bound_expression(&self) -> Result<String, TransportFault> {
        self.bindings
            .get(EXPRESSION_SYMBOL)
            .and_then(ForeignValue::as_strings)
            .and_then(|s| s.first().cloned().flatten())
            .ok_or_else(|| TransportFault::new(format!("object '{}' not found", EXPRESSION_SYMBOL)))
    }

    fn outcome(&self, expr: &str) -> Outcome {
        self.outcomes.get(expr).cloned().unwrap_or_else(|| {
            Outcome::Raise(format!("could not find function \"{}\"", expr))
        })
    }

    /// The condition text the interpreter records for an error in the try wrapper.
    fn wrapped_error(message: &str) -> String {
        format!("Error in {} : {}\n", ERROR_PLACEHOLDER, message)
    }

    fn eval_wrapped(&mut self) -> Result<ForeignValue, TransportFault> {
        let expr = self.bound_expression()?;
        match self.outcome(&expr) {
            Outcome::Value(v) => Ok(v),
            Outcome::Raise(msg) => {
                let text = Self::wrapped_error(&msg);
                self.last_error = Some(text.clone());
                Ok(ForeignValue::ErrorMarker(text))
            }
            Outcome::Fault(msg) => Err(TransportFault::new(msg)),
        }
    }
}

impl Transport for ScriptedTransport {
    fn assign(&mut self, name: &str, value: ForeignValue) -> Result<(), TransportFault> {
        if let Some(msg) = &self.assign_fault {
            return Err(TransportFault::new(msg.clone()));
        }
        self.bindings.insert(name.to_string(), value);
        Ok(())
    }

    fn parse_and_eval(&mut self, expr: &str) -> Result<ForeignValue, TransportFault> {
        self.eval_log.push(expr.to_string());

        if expr.starts_with("try(eval(parse(text=.expression.)), silent=") {
            return self.eval_wrapped();
        }

        match expr {
            LAST_ERROR_EXPR => {
                if self.last_error_fault {
                    return Err(TransportFault::new("error during evaluation"));
                }
                Ok(ForeignValue::string(self.last_error.clone().unwrap_or_default()))
            }
            CAPTURE_OUTPUT_EXPR | PRINT_EXPR => {
                let bound = self.bound_expression()?;
                match self.outcome(&bound) {
                    Outcome::Value(v) => Ok(v),
                    Outcome::Raise(msg) => {
                        self.last_error = Some(format!("Error: {}\n", msg));
                        Err(TransportFault::new("error during evaluation"))
                    }
                    Outcome::Fault(msg) => Err(TransportFault::new(msg)),
                }
            }
            direct => match self.outcomes.get(direct).cloned() {
                Some(Outcome::Value(v)) => Ok(v),
                Some(Outcome::Raise(msg)) => {
                    self.last_error = Some(format!("Error: {}\n", msg));
                    Err(TransportFault::new("error during evaluation"))
                }
                Some(Outcome::Fault(msg)) => Err(TransportFault::new(msg)),
                None => Err(TransportFault::new("parse error")),
            },
        }
    }
}
