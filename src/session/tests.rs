use super::testing::ScriptedTransport;
use super::*;
use crate::rows::{collect_rows, CellValue};
use crate::types::ForeignVector;
use std::cell::Cell;
use std::rc::Rc;

fn session(transport: ScriptedTransport) -> EvalSession<ScriptedTransport> {
    EvalSession::new(transport, SessionConfig::default())
}

fn log_of(session: &EvalSession<ScriptedTransport>) -> Vec<String> {
    session.transport_ref().unwrap().eval_log().to_vec()
}

#[test]
fn test_eval_try_returns_value() {
    // 1. Arrange
    let mut s = session(ScriptedTransport::new().respond("1+1", ForeignValue::doubles(vec![2.0])));

    // 2. Act
    let value = s.eval_try("1+1").unwrap();

    // 3. Assert
    assert_eq!(value, ForeignValue::doubles(vec![2.0]));
    assert_eq!(
        s.transport_ref().unwrap().binding(EXPRESSION_SYMBOL),
        Some(&ForeignValue::string("1+1"))
    );
    assert_eq!(log_of(&s), vec![try_wrapper(false)]);
}

#[test]
fn test_eval_try_error_names_the_expression() {
    let mut s = session(ScriptedTransport::new());

    match s.eval_try("nonexistent_fn()") {
        Err(BridgeError::EvaluationError(msg)) => {
            assert!(msg.contains("\"nonexistent_fn()\""), "message was {}", msg);
            assert!(!msg.contains(message::ERROR_PLACEHOLDER));
        }
        other => panic!("expected EvaluationError, got {:?}", other),
    }
    // The session stays usable.
    assert!(s.is_initialized());
}

#[test]
fn test_try_error_classed_string_is_evaluation_error() {
    let marker = ForeignValue::string("Error in eval(expr, envir, enclos) : bad\n")
        .with_attribute("class", ForeignValue::string("try-error"));
    let mut s = session(ScriptedTransport::new().respond("stop('bad')", marker));

    match s.eval_try("stop('bad')") {
        Err(BridgeError::EvaluationError(msg)) => {
            assert_eq!(msg, "Error in \"stop('bad')\" : bad")
        }
        other => panic!("expected EvaluationError, got {:?}", other),
    }
}

#[test]
fn test_quoting_never_reaches_executable_source() {
    // 1. Arrange
    let tricky = r#"paste("a\"b", 'c\'d', "\\")"#;
    let mut s = session(ScriptedTransport::new().respond(tricky, ForeignValue::string("ok")));

    // 2. Act
    let value = s.eval_try(tricky).unwrap();

    // 3. Assert
    assert_eq!(value, ForeignValue::string("ok"));
    for executed in log_of(&s) {
        assert!(!executed.contains(tricky));
    }
}

#[test]
fn test_null_result_is_success() {
    let mut s = session(ScriptedTransport::new().respond("invisible(NULL)", ForeignValue::Null));
    assert_eq!(s.eval_try("invisible(NULL)").unwrap(), ForeignValue::Null);
}

#[test]
fn test_wrapper_fault_reports_prefix_and_last_error() {
    // 1. Arrange
    let long_expr = "x".repeat(300);
    let mut s = session(
        ScriptedTransport::new()
            .fault(&long_expr, "connection reset")
            .with_last_error("Error: out of memory\n"),
    );

    // 2. Act
    let result = s.eval_try(&long_expr);

    // 3. Assert
    match result {
        Err(BridgeError::TransportError { context, message }) => {
            assert_eq!(context, format!("{} ...", "x".repeat(252)));
            assert_eq!(context.chars().count(), 256);
            assert_eq!(message, "Error: out of memory\nconnection reset");
        }
        other => panic!("expected TransportError, got {:?}", other),
    }
}

#[test]
fn test_last_error_lookup_failure_uses_marker_text() {
    let mut s = session(
        ScriptedTransport::new()
            .fault("f()", "broken pipe")
            .failing_last_error(),
    );

    match s.eval_try("f()") {
        Err(BridgeError::TransportError { context, message }) => {
            assert_eq!(context, "f()");
            assert!(message.starts_with(message::LAST_ERROR_UNAVAILABLE));
            assert!(message.contains("broken pipe"), "message was {}", message);
        }
        other => panic!("expected TransportError, got {:?}", other),
    }
}

#[test]
fn test_session_usable_after_wrapper_fault() {
    // 1. Arrange
    let mut s = session(
        ScriptedTransport::new()
            .fault("f()", "connection reset by peer")
            .respond("1+1", ForeignValue::doubles(vec![2.0])),
    );

    // 2. Act
    let faulted = s.eval_try("f()");
    let next = s.eval_try("1+1");

    // 3. Assert
    assert!(matches!(faulted, Err(BridgeError::TransportError { .. })));
    assert!(s.is_initialized());
    assert_eq!(next.unwrap(), ForeignValue::doubles(vec![2.0]));
}

#[test]
fn test_assign_fault_is_transport_error() {
    let mut s = session(ScriptedTransport::new().failing_assign("not connected"));
    let result = s.assign("x", ForeignValue::integers(vec![1]));
    assert!(matches!(
        result,
        Err(BridgeError::TransportError { ref context, .. }) if context == "x"
    ));
}

#[test]
fn test_direct_eval_reports_generic_diagnostic() {
    let mut s = session(ScriptedTransport::new());
    match s.eval("1 +") {
        Err(BridgeError::TransportError { message, .. }) => assert_eq!(message, "parse error"),
        other => panic!("expected TransportError, got {:?}", other),
    }
}

#[test]
fn test_lazy_session_retries_failed_connection() {
    // 1. Arrange
    let attempts = Rc::new(Cell::new(0));
    let counter = Rc::clone(&attempts);
    let connector: Connector<ScriptedTransport> = Box::new(move || {
        counter.set(counter.get() + 1);
        if counter.get() == 1 {
            Err(TransportFault::new("interpreter not found"))
        } else {
            Ok(ScriptedTransport::new().respond("1", ForeignValue::integers(vec![1])))
        }
    });
    let mut s = EvalSession::lazy(SessionConfig::default(), connector);

    // 2. Act
    let first = s.eval_try("1");
    let initialized_after_failure = s.is_initialized();
    let second = s.eval_try("1");

    // 3. Assert
    assert!(matches!(first, Err(BridgeError::TransportError { .. })));
    assert!(!initialized_after_failure);
    assert_eq!(second.unwrap(), ForeignValue::integers(vec![1]));
    assert_eq!(attempts.get(), 2);
}

#[test]
fn test_typed_string_evaluations() {
    let named = ForeignValue::strings(vec!["3.6", "x86_64"])
        .with_attribute("names", ForeignValue::strings(vec!["version", "arch"]));
    let mut s = session(
        ScriptedTransport::new()
            .respond("lines", ForeignValue::strings(vec!["a", "b"]))
            .respond("nothing", ForeignValue::Null)
            .respond("info", named)
            .respond("number", ForeignValue::doubles(vec![1.0])),
    );

    assert_eq!(s.eval_strings("lines").unwrap(), vec!["a", "b"]);
    assert_eq!(s.eval_string("lines").unwrap(), Some("a\nb".to_string()));
    assert!(s.eval_strings("nothing").unwrap().is_empty());
    assert_eq!(s.eval_string("nothing").unwrap(), None);
    assert_eq!(
        s.eval_named_strings("info").unwrap(),
        vec![
            ("version".to_string(), "3.6".to_string()),
            ("arch".to_string(), "x86_64".to_string())
        ]
    );
    let sorted: Vec<String> = s.eval_named_strings_sorted("info").unwrap().into_keys().collect();
    assert_eq!(sorted, vec!["arch", "version"]);
    assert!(matches!(
        s.eval_strings("number"),
        Err(BridgeError::UnsupportedType(_))
    ));
}

#[test]
fn test_capture_output_binds_expression() {
    let mut s = session(ScriptedTransport::new().respond(
        "str(x)",
        ForeignValue::strings(vec![" num [1:3] 1 2 3"]),
    ));

    let lines = s.eval_capture_output("str(x)").unwrap();

    assert_eq!(lines, vec![" num [1:3] 1 2 3"]);
    assert_eq!(log_of(&s), vec![CAPTURE_OUTPUT_EXPR.to_string()]);
}

#[test]
fn test_eval_try_shape_conversions() {
    let matrix = ForeignValue::doubles(vec![1.0, 2.0])
        .with_attribute("dim", ForeignValue::integers(vec![1, 2]));
    let counts = ForeignValue::integers(vec![3, 1])
        .with_attribute("names", ForeignValue::strings(vec!["a", "b"]));
    let list = ForeignValue::named_list(vec![("v".into(), ForeignValue::doubles(vec![1.0]))]);
    let mut s = session(
        ScriptedTransport::new()
            .respond("m", matrix)
            .respond("counts", counts)
            .respond("l", list)
            .respond("none", ForeignValue::Null)
            .respond("unnamed", ForeignValue::doubles(vec![1.0])),
    );

    let mut adapter = s.eval_try_matrix("m").unwrap();
    assert_eq!(
        collect_rows(&mut adapter),
        vec![vec![CellValue::Float64(1.0), CellValue::Float64(2.0)]]
    );
    assert!(matches!(
        s.eval_try_matrix("counts"),
        Err(BridgeError::NotAMatrix(_))
    ));

    assert_eq!(
        s.eval_try_named_numbers("counts").unwrap(),
        vec![("a".to_string(), 3.0), ("b".to_string(), 1.0)]
    );
    assert!(matches!(
        s.eval_try_named_numbers("unnamed"),
        Err(BridgeError::FormatError(_))
    ));

    let table = s.eval_try_list("l").unwrap().unwrap();
    assert_eq!(table.columns()[0].name(), "v");
    assert!(s.eval_try_list("none").unwrap().is_none());

    let counts_table = s.eval_try_table("counts").unwrap();
    assert!(counts_table.row_labels().is_some());
    assert_eq!(counts_table.name(), "counts");
}

#[test]
fn test_eval_print_loads_support_functions_once_and_swallows_errors() {
    // 1. Arrange
    let mut s = session(
        ScriptedTransport::new()
            .respond(SUPPORT_FUNCTIONS, ForeignValue::Null)
            .respond("x <- 1; x", ForeignValue::doubles(vec![1.0]))
            .raise("stop('boom')", "boom"),
    );

    // 2. Act
    let printed = s.eval_print("x <- 1; x").unwrap();
    let swallowed = s.eval_print("stop('boom')").unwrap();

    // 3. Assert
    assert_eq!(printed, Some(ForeignValue::doubles(vec![1.0])));
    assert_eq!(swallowed, None);
    assert!(s.support_functions_loaded());
    let wrapper_calls = log_of(&s)
        .iter()
        .filter(|e| e.starts_with("try("))
        .count();
    assert_eq!(wrapper_calls, 1);
}

#[test]
fn test_support_load_failure_is_an_error() {
    let mut s = session(ScriptedTransport::new());
    assert!(matches!(
        s.eval_print("1"),
        Err(BridgeError::EvaluationError(_))
    ));
    assert!(!s.support_functions_loaded());
}

#[test]
fn test_eval_try_file_strips_carriage_returns_and_prefixes_errors() {
    // 1. Arrange
    let dir = std::env::temp_dir();
    let good = dir.join("rbridge_session_test_good.R");
    let bad = dir.join("rbridge_session_test_bad.R");
    std::fs::write(&good, "y <- 2\r\ny\r\n").unwrap();
    std::fs::write(&bad, "oops(").unwrap();
    let mut s = session(ScriptedTransport::new().respond("y <- 2\ny\n", ForeignValue::doubles(vec![2.0])));

    // 2. Act
    let value = s.eval_try_file(&good);
    let error = s.eval_try_file(&bad);
    let missing = s.eval_try_file(dir.join("rbridge_session_test_missing.R"));

    // 3. Assert
    assert_eq!(value.unwrap(), ForeignValue::doubles(vec![2.0]));
    match error {
        Err(BridgeError::EvaluationError(msg)) => {
            assert!(msg.starts_with(&bad.display().to_string()))
        }
        other => panic!("expected EvaluationError, got {:?}", other),
    }
    assert!(matches!(missing, Err(BridgeError::Io(_))));

    let _ = std::fs::remove_file(good);
    let _ = std::fs::remove_file(bad);
}

#[test]
fn test_structured_assignments() {
    let labels = Table::label_column("id", &["a".to_string()]).unwrap();
    let column = crate::vector::TypedVector::from_foreign_vector(
        "v",
        &ForeignValue::doubles(vec![1.0]),
    )
    .unwrap();
    let table = Table::try_new("t", Some(labels), vec![column]).unwrap();
    let mut s = session(ScriptedTransport::new());

    s.assign_list("l", &table).unwrap();
    s.assign_data_frame("df", &table).unwrap();
    s.assign_named_values(
        "h",
        &[
            ("n".to_string(), HostValue::Int32(1)),
            ("s".to_string(), HostValue::Str("x".into())),
        ],
    )
    .unwrap();

    let transport = s.transport_ref().unwrap();
    match transport.binding("l") {
        Some(ForeignValue::List(list)) => assert_eq!(list.values.len(), 2),
        other => panic!("unexpected binding {:?}", other),
    }
    assert!(transport.binding("df").unwrap().inherits("data.frame"));
    assert_eq!(
        transport.binding("h"),
        Some(&ForeignValue::named_list(vec![
            ("n".to_string(), ForeignValue::integers(vec![1])),
            ("s".to_string(), ForeignValue::string("x")),
        ]))
    );
    // Nothing was evaluated to build these values.
    assert!(transport.eval_log().is_empty());
}

#[test]
fn test_console_output() {
    let mut s = session(ScriptedTransport::new()).with_console(Box::new(BufferConsole::with_input(vec!["yes"])));

    s.print_to_console("a");
    s.println_to_console("b");

    assert_eq!(s.read_console("> "), Some("yes".to_string()));
    assert_eq!(s.read_console("> "), None);
}

#[test]
fn test_buffer_console_separates_streams() {
    let mut console = BufferConsole::new();
    console.write("out", OutputKind::Regular);
    console.write("err", OutputKind::Error);
    assert_eq!(console.output(), "out");
    assert_eq!(console.errors(), "err");
}

#[test]
fn test_raw_result_passes_through() {
    let raw = ForeignValue::Raw(ForeignVector::new(vec![1, 2]));
    let mut s = session(ScriptedTransport::new().respond("as.raw(1:2)", raw.clone()));
    assert_eq!(s.eval_try("as.raw(1:2)").unwrap(), raw);
}
