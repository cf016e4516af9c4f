//! Error message text handling for the evaluation protocol.

/// The call text the interpreter reports for any error raised inside the
/// evaluation wrapper.
pub const ERROR_PLACEHOLDER: &str = "eval(expr, envir, enclos)";

/// Reported when the interpreter's last error text itself cannot be read.
pub const LAST_ERROR_UNAVAILABLE: &str = "geterrmessage failed!";

/// Replaces every occurrence of [`ERROR_PLACEHOLDER`] in `message` with the
/// double-quoted expression text, and drops trailing whitespace.
pub fn inject_expression(message: &str, expr: &str) -> String {
    message
        .replace(ERROR_PLACEHOLDER, &format!("\"{}\"", expr))
        .trim_end()
        .to_string()
}

/// Appended to an expression prefix that was cut.
const CUT_MARKER: &str = " ...";

/// At most `max_chars` characters of `expr`, counting the " ..." marker that
/// ends a cut prefix. Never splits a character. A limit too small to hold the
/// marker cuts without it.
pub fn expression_prefix(expr: &str, max_chars: usize) -> String {
    if expr.chars().count() <= max_chars {
        return expr.to_string();
    }
    let marker_chars = CUT_MARKER.chars().count();
    if max_chars <= marker_chars {
        return expr.chars().take(max_chars).collect();
    }
    let mut prefix: String = expr.chars().take(max_chars - marker_chars).collect();
    prefix.push_str(CUT_MARKER);
    prefix
}

/// Script text with every carriage return removed.
pub fn strip_carriage_returns(script: &str) -> String {
    script.replace('\r', "")
}
