//! Unit tests for the echo module.

use std::io::Cursor;

use promise_module::{EnrichedResponse, LogLevel, SessionEnd};
use rstest::rstest;
use serde_json::json;

use crate::{EchoError, EchoModule, PromiseModule, PromiseResult, run};

fn attributes(value: serde_json::Value) -> promise_module::protocol::Attributes {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

#[rstest]
#[case::plain("/etc/motd", true)]
#[case::empty("", false)]
#[case::blank("   ", false)]
#[case::multi_line("a\nb", false)]
fn promiser_validation(#[case] promiser: &str, #[case] accepted: bool) {
    assert_eq!(EchoModule.validate_promiser(promiser).is_valid(), accepted);
}

#[rstest]
#[case::none(json!({}), None)]
#[case::outcome_and_message(json!({"outcome": "repaired", "message": "done"}), None)]
#[case::unknown_key(json!({"colour": "red"}), Some("Unknown attribute 'colour'"))]
#[case::bad_outcome(json!({"outcome": "success"}), Some("not 'success'"))]
#[case::numeric_outcome(json!({"outcome": 1}), Some("must be a string"))]
#[case::numeric_message(json!({"message": 1}), Some("'message' must be a string"))]
fn attribute_validation(#[case] value: serde_json::Value, #[case] rejection: Option<&str>) {
    let verdict = EchoModule.validate_attributes(&attributes(value));
    match rejection {
        None => assert!(verdict.is_valid(), "expected acceptance, got {verdict:?}"),
        Some(expected) => {
            assert!(!verdict.is_valid(), "expected rejection");
            assert!(
                verdict.explanation().contains(expected),
                "expected '{expected}' in '{}'",
                verdict.explanation()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

#[test]
fn evaluation_defaults_to_kept() {
    let result = EchoModule
        .evaluate("/etc/motd", &attributes(json!({})))
        .expect("evaluation");
    assert_eq!(result, PromiseResult::kept("Promise '/etc/motd' kept"));
}

#[test]
fn evaluation_reports_requested_outcome_and_message() {
    let result = EchoModule
        .evaluate(
            "svc",
            &attributes(json!({"outcome": "not_kept", "message": "service is down"})),
        )
        .expect("evaluation");
    assert_eq!(result, PromiseResult::not_kept("service is down"));
    assert_eq!(
        result.log().first().map(promise_module::LogEntry::level),
        Some(LogLevel::Error)
    );
}

#[test]
fn evaluation_of_unvalidated_attributes_fails() {
    let error = EchoModule
        .evaluate("svc", &attributes(json!({"outcome": "maybe"})))
        .expect_err("bad outcome");
    assert!(error.message().contains("maybe"), "got {error}");
}

// ---------------------------------------------------------------------------
// stdin/stdout session
// ---------------------------------------------------------------------------

#[test]
fn run_answers_a_full_session() {
    let script = concat!(
        "cf-agent 3.18.0 v1\n",
        r#"{"operation":"evaluate_promise","promiser":"p","attributes":{"outcome":"repaired"}}"#,
        "\n",
        r#"{"operation":"terminate"}"#,
        "\n",
    );
    let mut stdin = Cursor::new(script);
    let mut stdout = Vec::new();

    let summary = run(&mut stdin, &mut stdout).expect("session should succeed");
    assert_eq!(summary.end(), SessionEnd::Terminated);

    let output = String::from_utf8(stdout).expect("utf8 stdout");
    let replies: Vec<&str> = output.split_terminator("\n\n").collect();
    assert_eq!(
        replies.first().copied(),
        Some(format!("echo {} v1 json_based", env!("CARGO_PKG_VERSION")).as_str())
    );
    let evaluated: EnrichedResponse =
        serde_json::from_str(replies.get(1).expect("evaluate reply")).expect("json");
    assert_eq!(
        evaluated.result(),
        &PromiseResult::repaired("Promise 'p' repaired")
    );
    assert_eq!(
        replies.last().copied(),
        Some(r#"{"operation":"terminate","result":"success","log":[{"level":"info","message":"echo completed successfully"}]}"#)
    );
}

#[test]
fn run_reports_protocol_mismatch() {
    let mut stdin = Cursor::new("cf-agent 3.18.0 v9\n");
    let mut stdout = Vec::new();

    let error = run(&mut stdin, &mut stdout).expect_err("mismatch is fatal");
    assert!(matches!(error, EchoError::Session(_)), "got {error}");
    assert!(stdout.is_empty());
}
