// In: src/session/mod.rs

//! The single connection to the embedded interpreter and the safe-evaluation
//! protocol on top of it.
//!
//! Caller text is never spliced into executable source. `eval_try` binds the
//! expression as an ordinary string value under [`EXPRESSION_SYMBOL`] and then
//! evaluates one fixed wrapper expression that parses and runs it inside
//! `try(...)`. Quotes, backslashes and syntax errors in the caller's text
//! therefore surface as evaluation errors, never as protocol faults.
//!
//! The interpreter is single-threaded. Every operation takes `&mut self`, so
//! one evaluation is in flight at a time; `EvalSession` is not `Sync`.

pub mod console;
pub mod message;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;

pub use console::{BufferConsole, Console, OutputKind, StdConsole};
pub use transport::{Transport, TransportFault};

use std::collections::BTreeMap;
use std::path::Path;

use crate::attributes;
use crate::bridge::table_from_named_foreign_value;
use crate::config::SessionConfig;
use crate::error::BridgeError;
use crate::matrix::MatrixAdapter;
use crate::record::{Table, TableBuilder};
use crate::types::{na_real, ForeignValue, HostValue, NA_INTEGER};
use message::{expression_prefix, inject_expression, strip_carriage_returns, LAST_ERROR_UNAVAILABLE};

//==================================================================================
// I. Protocol Constants
//==================================================================================

/// The private global the expression text is bound to before evaluation.
pub const EXPRESSION_SYMBOL: &str = ".expression.";

/// Evaluates the bound expression and returns its printed output lines.
pub const CAPTURE_OUTPUT_EXPR: &str = "capture.output(eval(parse(text=.expression.)))";

/// Evaluates and prints the bound expression through the support function `.pep`.
pub const PRINT_EXPR: &str = ".pep(.expression.)";

pub const LAST_ERROR_EXPR: &str = "geterrmessage()";

/// The bundled support script defining `.pep`.
pub const SUPPORT_FUNCTIONS: &str = include_str!("support.R");

/// The fixed evaluation wrapper.
pub fn try_wrapper(silent: bool) -> String {
    format!(
        "try(eval(parse(text={})), silent={})",
        EXPRESSION_SYMBOL,
        if silent { "TRUE" } else { "FALSE" }
    )
}

//==================================================================================
// II. Session State
//==================================================================================

/// Opens the connection on first use.
pub type Connector<T> = Box<dyn FnMut() -> Result<T, TransportFault>>;

enum SessionState<T> {
    Uninitialized,
    Initialized(T),
}

pub struct EvalSession<T: Transport> {
    state: SessionState<T>,
    connector: Option<Connector<T>>,
    config: SessionConfig,
    console: Box<dyn Console>,
    support_functions_loaded: bool,
}

fn init_monitoring(config: &SessionConfig) {
    if config.monitoring.verbose {
        crate::logging::enable_verbose_logging(config.monitoring.log_file.as_deref());
    }
}

/// Rebuilds a session error with `prefix` in front of its message.
fn prefix_error(error: BridgeError, prefix: &str) -> BridgeError {
    match error {
        BridgeError::EvaluationError(msg) => {
            BridgeError::EvaluationError(format!("{} {}", prefix, msg))
        }
        BridgeError::TransportError { context, message } => BridgeError::TransportError {
            context: format!("{} {}", prefix, context),
            message,
        },
        other => other,
    }
}

impl<T: Transport> EvalSession<T> {
    /// A session over an already open connection.
    pub fn new(transport: T, config: SessionConfig) -> Self {
        init_monitoring(&config);
        log::info!("Evaluation session started");
        Self {
            state: SessionState::Initialized(transport),
            connector: None,
            config,
            console: Box::new(StdConsole),
            support_functions_loaded: false,
        }
    }

    /// A session that connects on first use. A failed connection leaves the
    /// session uninitialized; the next call tries again.
    pub fn lazy(config: SessionConfig, connector: Connector<T>) -> Self {
        init_monitoring(&config);
        Self {
            state: SessionState::Uninitialized,
            connector: Some(connector),
            config,
            console: Box::new(StdConsole),
            support_functions_loaded: false,
        }
    }

    pub fn with_console(mut self, console: Box<dyn Console>) -> Self {
        self.console = console;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, SessionState::Initialized(_))
    }

    pub fn support_functions_loaded(&self) -> bool {
        self.support_functions_loaded
    }

    /// The open connection, if any. Does not connect.
    pub fn transport_ref(&self) -> Option<&T> {
        match &self.state {
            SessionState::Initialized(t) => Some(t),
            SessionState::Uninitialized => None,
        }
    }

    /// The open connection, connecting first if needed.
    fn transport(&mut self) -> Result<&mut T, BridgeError> {
        if let SessionState::Uninitialized = self.state {
            let connector = self.connector.as_mut().ok_or_else(|| {
                BridgeError::InternalError("Session has neither a connection nor a connector".into())
            })?;
            let transport = connector().map_err(|fault| BridgeError::TransportError {
                context: "connect".to_string(),
                message: fault.message,
            })?;
            log::info!("Interpreter connection established");
            self.state = SessionState::Initialized(transport);
        }

        match &mut self.state {
            SessionState::Initialized(t) => Ok(t),
            SessionState::Uninitialized => Err(BridgeError::InternalError(
                "Session is not initialized after connecting".into(),
            )),
        }
    }

    fn fault(&self, expr: &str, fault: TransportFault) -> BridgeError {
        BridgeError::TransportError {
            context: expression_prefix(expr, self.config.error_context_chars),
            message: fault.message,
        }
    }

    //==============================================================================
    // III. Primitives
    //==============================================================================

    /// Binds `value` under `name` in the global environment.
    pub fn assign(&mut self, name: &str, value: ForeignValue) -> Result<(), BridgeError> {
        self.transport()?
            .assign(name, value)
            .map_err(|fault| BridgeError::TransportError {
                context: name.to_string(),
                message: fault.message,
            })
    }

    /// Evaluates `expr` directly, without the try wrapper. Any failure is
    /// reported only as the interpreter's generic diagnostic.
    pub fn eval(&mut self, expr: &str) -> Result<ForeignValue, BridgeError> {
        let result = self.transport()?.parse_and_eval(expr);
        result.map_err(|fault| self.fault(expr, fault))
    }

    /// The interpreter's last recorded error text, or a fixed marker if it
    /// cannot be read.
    pub fn last_error_message(&mut self) -> String {
        match self.eval(LAST_ERROR_EXPR) {
            Ok(ForeignValue::Str(v)) => v
                .values
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join("\n")
                .trim_end()
                .to_string(),
            Ok(other) => {
                log::warn!("{} returned {}", LAST_ERROR_EXPR, other.kind());
                LAST_ERROR_UNAVAILABLE.to_string()
            }
            Err(e) => {
                log::warn!("{} failed: {}", LAST_ERROR_EXPR, e);
                LAST_ERROR_UNAVAILABLE.to_string()
            }
        }
    }

    //==============================================================================
    // IV. Safe Evaluation
    //==============================================================================

    /// [`eval_try_with`](Self::eval_try_with) using the configured `silent` flag.
    pub fn eval_try(&mut self, expr: &str) -> Result<ForeignValue, BridgeError> {
        self.eval_try_with(expr, self.config.silent)
    }

    /// Evaluates `expr` inside the try wrapper.
    ///
    /// An error raised by the expression is an `EvaluationError` whose message
    /// names the expression. A fault of the wrapper itself is a
    /// `TransportError` carrying a prefix of the expression, the
    /// interpreter's last error text and the fault text. A `Null` result is a
    /// success.
    pub fn eval_try_with(&mut self, expr: &str, silent: bool) -> Result<ForeignValue, BridgeError> {
        self.assign(EXPRESSION_SYMBOL, ForeignValue::string(expr))?;

        let wrapper = try_wrapper(silent);
        let result = self.transport()?.parse_and_eval(&wrapper);

        match result {
            Err(fault) => {
                log::warn!("Evaluation wrapper faulted: {}", fault);
                let last_error = self.last_error_message();
                Err(BridgeError::TransportError {
                    context: expression_prefix(expr, self.config.error_context_chars),
                    message: format!("{}\n{}", last_error, fault),
                })
            }
            Ok(ForeignValue::ErrorMarker(msg)) => {
                Err(BridgeError::EvaluationError(inject_expression(&msg, expr)))
            }
            Ok(value) if value.inherits("try-error") => {
                let msg = value
                    .as_strings()
                    .and_then(|s| s.first().cloned().flatten())
                    .unwrap_or_default();
                Err(BridgeError::EvaluationError(inject_expression(&msg, expr)))
            }
            Ok(value) => Ok(value),
        }
    }

    /// Reads a UTF-8 script, drops carriage returns and evaluates it. Errors
    /// are prefixed with the path.
    pub fn eval_try_file(&mut self, path: impl AsRef<Path>) -> Result<ForeignValue, BridgeError> {
        let path = path.as_ref();
        let script = strip_carriage_returns(&std::fs::read_to_string(path)?);
        self.eval_try(&script)
            .map_err(|e| prefix_error(e, &path.display().to_string()))
    }

    /// Evaluates `expr` and converts a list result into a table. `Null` gives
    /// `None`.
    pub fn eval_try_list(&mut self, expr: &str) -> Result<Option<Table>, BridgeError> {
        match self.eval_try(expr)? {
            ForeignValue::Null => Ok(None),
            value @ ForeignValue::List(_) => TableBuilder::from_foreign_list(expr, &value).map(Some),
            other => Err(BridgeError::UnsupportedType(format!(
                "{} returned {} instead of a list",
                expr,
                attributes::get_class_label(&other)
            ))),
        }
    }

    /// Evaluates `expr` and converts the result into a table by shape.
    pub fn eval_try_table(&mut self, expr: &str) -> Result<Table, BridgeError> {
        let value = self.eval_try(expr)?;
        table_from_named_foreign_value(Some(expr), &value)
    }

    pub fn eval_try_matrix(&mut self, expr: &str) -> Result<MatrixAdapter, BridgeError> {
        let value = self.eval_try(expr)?;
        MatrixAdapter::new(Some(expr), &value)
    }

    /// Evaluates `expr`, which must return a non-empty named numeric vector.
    pub fn eval_try_named_numbers(&mut self, expr: &str) -> Result<Vec<(String, f64)>, BridgeError> {
        let value = self.eval_try(expr)?;
        let numbers: Vec<f64> = match &value {
            ForeignValue::Double(v) => v.values.clone(),
            ForeignValue::Integer(v) => v
                .values
                .iter()
                .map(|&x| if x == NA_INTEGER { na_real() } else { f64::from(x) })
                .collect(),
            other => {
                return Err(BridgeError::UnsupportedType(format!(
                    "{} returned {}",
                    expr,
                    attributes::get_class_label(other)
                )))
            }
        };

        if numbers.is_empty() {
            return Err(BridgeError::FormatError(format!("{} returned no values", expr)));
        }
        let names = attributes::get_names(&value)?.ok_or_else(|| {
            BridgeError::FormatError(format!("Result of {} does not supply names", expr))
        })?;

        Ok(names.into_iter().zip(numbers).collect())
    }

    //==============================================================================
    // V. Typed Direct Evaluation
    //==============================================================================

    /// A character result as (values, names); `None` for `Null`.
    fn eval_character(
        &mut self,
        expr: &str,
    ) -> Result<Option<(Vec<String>, Option<Vec<String>>)>, BridgeError> {
        let value = self.eval(expr)?;
        match &value {
            ForeignValue::Null => Ok(None),
            ForeignValue::Str(v) => {
                let values = v
                    .values
                    .iter()
                    .map(|s| s.clone().unwrap_or_else(|| "NA".to_string()))
                    .collect();
                Ok(Some((values, attributes::get_names(&value)?)))
            }
            other => Err(BridgeError::UnsupportedType(format!(
                "{} returned {} instead of character",
                expr,
                attributes::get_class_label(other)
            ))),
        }
    }

    /// Evaluates `expr`, which must return a character vector. `Null` gives
    /// an empty vector.
    pub fn eval_strings(&mut self, expr: &str) -> Result<Vec<String>, BridgeError> {
        Ok(self.eval_character(expr)?.map(|(v, _)| v).unwrap_or_default())
    }

    /// As [`eval_strings`](Self::eval_strings), joined with newlines. `Null`
    /// gives `None`.
    pub fn eval_string(&mut self, expr: &str) -> Result<Option<String>, BridgeError> {
        Ok(self.eval_character(expr)?.map(|(v, _)| v.join("\n")))
    }

    /// A named character vector as (name, value) pairs in element order.
    pub fn eval_named_strings(&mut self, expr: &str) -> Result<Vec<(String, String)>, BridgeError> {
        let Some((values, names)) = self.eval_character(expr)? else {
            return Ok(Vec::new());
        };
        let names = names.ok_or_else(|| {
            BridgeError::FormatError(format!("Result of {} does not supply names", expr))
        })?;
        Ok(names.into_iter().zip(values).collect())
    }

    /// As [`eval_named_strings`](Self::eval_named_strings), keyed and ordered
    /// by name. A repeated name keeps its last value.
    pub fn eval_named_strings_sorted(
        &mut self,
        expr: &str,
    ) -> Result<BTreeMap<String, String>, BridgeError> {
        Ok(self.eval_named_strings(expr)?.into_iter().collect())
    }

    /// Evaluates `expr` and returns what it printed, line by line.
    pub fn eval_capture_output(&mut self, expr: &str) -> Result<Vec<String>, BridgeError> {
        self.assign(EXPRESSION_SYMBOL, ForeignValue::string(expr))?;
        self.eval_strings(CAPTURE_OUTPUT_EXPR)
            .map_err(|e| prefix_error(e, &expression_prefix(expr, self.config.error_context_chars)))
    }

    //==============================================================================
    // VI. Read-Eval-Print
    //==============================================================================

    /// Evaluates the support script (the configured one, or the bundled
    /// `.pep` definitions). Does nothing once loaded.
    pub fn load_support_functions(&mut self) -> Result<(), BridgeError> {
        if self.support_functions_loaded {
            return Ok(());
        }
        let script = match &self.config.support_script {
            Some(path) => strip_carriage_returns(&std::fs::read_to_string(path)?),
            None => SUPPORT_FUNCTIONS.to_string(),
        };
        self.eval_try(&script)?;
        self.support_functions_loaded = true;
        log::info!("Support functions loaded");
        Ok(())
    }

    /// Evaluates `expr` and prints each visible result on the interpreter's
    /// console, as its own read loop would.
    ///
    /// Evaluation faults are swallowed (the interpreter has already printed
    /// them) and give `Ok(None)`. Only a failure to load the support
    /// functions is an error.
    pub fn eval_print(&mut self, expr: &str) -> Result<Option<ForeignValue>, BridgeError> {
        self.load_support_functions()?;

        let result = self
            .assign(EXPRESSION_SYMBOL, ForeignValue::string(expr))
            .and_then(|_| self.eval(PRINT_EXPR));
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("eval_print swallowed: {}", e);
                Ok(None)
            }
        }
    }

    //==============================================================================
    // VII. Structured Bindings & Console
    //==============================================================================

    /// Binds `table` as a named list (row labels first).
    pub fn assign_list(&mut self, name: &str, table: &Table) -> Result<(), BridgeError> {
        let value = table.to_foreign_list()?;
        self.assign(name, value)
    }

    pub fn assign_data_frame(&mut self, name: &str, table: &Table) -> Result<(), BridgeError> {
        let value = table.to_data_frame()?;
        self.assign(name, value)
    }

    /// Binds the entries as a named list, one element per entry, in order.
    pub fn assign_named_values(
        &mut self,
        name: &str,
        entries: &[(String, HostValue)],
    ) -> Result<(), BridgeError> {
        let elements = entries
            .iter()
            .map(|(key, value)| (key.clone(), value.to_foreign()))
            .collect();
        self.assign(name, ForeignValue::named_list(elements))
    }

    pub fn print_to_console(&mut self, msg: &str) {
        self.console.write(msg, OutputKind::Regular);
    }

    pub fn println_to_console(&mut self, msg: &str) {
        self.print_to_console(&format!("{}\n", msg));
    }

    /// Reads one line from the console on behalf of the interpreter.
    pub fn read_console(&mut self, prompt: &str) -> Option<String> {
        self.console.read(prompt)
    }
}

#[cfg(test)]
mod tests;
