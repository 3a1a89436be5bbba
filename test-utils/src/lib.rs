//! Shared helpers for Rill's integration tests (`tests/`). Rill has no
//! separate compiled executable to exec for a test run: these helpers
//! drive the library's `run_source` entry point directly, in-process.

use rill::object::Value;
use rill::{root_environment, run_source};

/// Evaluates `source` against a fresh root environment and returns the
/// resulting value. Panics if the source fails to parse.
pub fn eval(source: &str) -> Value {
    let env = root_environment();
    run_source(source, &env).unwrap_or_else(|errors| {
        panic!("unexpected parse errors for {source:?}: {errors:?}")
    })
}

/// Asserts that evaluating `source` produces a value whose display form
/// equals `expected`.
pub fn assert_evaluates_to(source: &str, expected: &str) {
    let value = eval(source);
    assert_eq!(value.to_string(), expected, "evaluating {source:?}");
}

/// Asserts that evaluating `source` yields a `Value::Error`.
pub fn assert_errors(source: &str) {
    let value = eval(source);
    assert!(value.is_error(), "expected {source:?} to error, got {value}");
}

/// Asserts that `source` fails to parse at all.
pub fn assert_parse_errors(source: &str) {
    let env = root_environment();
    assert!(
        run_source(source, &env).is_err(),
        "expected {source:?} to fail to parse"
    );
}
