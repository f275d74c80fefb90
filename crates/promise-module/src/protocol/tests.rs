//! Unit tests for line classification and wire types.

use rstest::rstest;
use serde_json::json;

use super::*;

fn attributes_of(value: serde_json::Value) -> Attributes {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

#[rstest]
#[case::empty("")]
#[case::newline("\n")]
#[case::crlf("\r\n")]
#[case::spaces("   \n")]
fn blank_lines_are_not_classified(#[case] raw: &str) {
    assert_eq!(InboundLine::classify(raw), None);
}

#[test]
fn handshake_line_keeps_header_without_terminator() {
    let line = InboundLine::classify("cf-agent 3.18.0 v1\r\n").expect("line should classify");
    let InboundLine::Handshake(handshake) = line else {
        panic!("expected handshake, got {line:?}");
    };
    assert_eq!(handshake.header(), "cf-agent 3.18.0 v1");
    assert_eq!(handshake.version(), "v1");
    assert!(handshake.is_supported());
}

#[test]
fn json_line_is_an_operation() {
    let raw = r#"{"operation":"terminate"}"#;
    assert_eq!(
        InboundLine::classify(raw),
        Some(InboundLine::Operation(raw))
    );
}

#[test]
fn prefix_must_lead_the_line() {
    let raw = r#"{"operation":"cf-agent v1"}"#;
    assert!(matches!(
        InboundLine::classify(raw),
        Some(InboundLine::Operation(_))
    ));
}

#[rstest]
#[case::future("cf-agent 3.30.0 v2", "v2", false)]
#[case::suffix_only("cf-agent 3.18.0 xv1", "xv1", false)]
#[case::bare("cf-agent", "cf-agent", false)]
#[case::trailing_space("cf-agent 3.18.0 v1  ", "v1", true)]
#[case::minimal("cf-agent v1", "v1", true)]
fn handshake_version_is_the_last_token(
    #[case] header: &str,
    #[case] version: &str,
    #[case] supported: bool,
) {
    let Some(InboundLine::Handshake(handshake)) = InboundLine::classify(header) else {
        panic!("expected handshake for '{header}'");
    };
    assert_eq!(handshake.version(), version);
    assert_eq!(handshake.is_supported(), supported);
}

// ---------------------------------------------------------------------------
// Request decoding
// ---------------------------------------------------------------------------

#[test]
fn decodes_full_request() {
    let request = decode_request(
        r#"{"operation":"evaluate_promise","promiser":"/etc/motd","attributes":{"mode":"0644"}}"#,
    )
    .expect("decode");
    assert_eq!(request.operation(), "evaluate_promise");
    assert_eq!(request.promiser(), Some("/etc/motd"));
    assert_eq!(
        request.attributes(),
        Some(&attributes_of(json!({"mode": "0644"})))
    );
}

#[test]
fn decodes_operation_only_request() {
    let request = decode_request(r#"{"operation":"terminate"}"#).expect("decode");
    assert_eq!(request, PromiseRequest::new("terminate"));
    assert_eq!(request.promiser(), None);
    assert_eq!(request.attributes(), None);
}

#[test]
fn unknown_request_fields_are_ignored() {
    let request = decode_request(r#"{"operation":"terminate","log_level":"info"}"#)
        .expect("extra fields should be tolerated");
    assert_eq!(request.operation(), "terminate");
}

#[rstest]
#[case::not_json("not json")]
#[case::array(r#"["terminate"]"#)]
#[case::missing_operation(r#"{"promiser":"x"}"#)]
#[case::numeric_operation(r#"{"operation":3}"#)]
#[case::numeric_promiser(r#"{"operation":"validate_promise","promiser":1}"#)]
#[case::list_attributes(r#"{"operation":"validate_promise","attributes":[1]}"#)]
fn malformed_requests_fail_to_decode(#[case] line: &str) {
    assert!(decode_request(line).is_err(), "'{line}' should not decode");
}

#[rstest]
#[case::array(r#"["validate_promise","p",{}]"#, "an array")]
#[case::string(r#""terminate""#, "a string")]
#[case::number("42", "a number")]
#[case::null("null", "null")]
fn non_object_requests_name_what_was_found(#[case] line: &str, #[case] found: &str) {
    let error = decode_request(line).expect_err("only objects are requests");
    let message = error.to_string();
    assert!(
        message.contains(&format!("expected a JSON object, found {found}")),
        "unexpected message: {message}"
    );
}

// ---------------------------------------------------------------------------
// Response enrichment
// ---------------------------------------------------------------------------

#[test]
fn enrichment_carries_every_present_field_in_order() {
    let request = PromiseRequest::for_promise(
        "validate_promise",
        "/tmp/file",
        attributes_of(json!({"owner": "root"})),
    );
    let response = EnrichedResponse::new(&request, PromiseResult::valid("ok"));
    let json = serde_json::to_string(&response).expect("serialise");
    assert_eq!(
        json,
        concat!(
            r#"{"operation":"validate_promise","promiser":"/tmp/file","#,
            r#""attributes":{"owner":"root"},"result":"valid","#,
            r#""log":[{"level":"info","message":"ok"}]}"#,
        )
    );
}

#[test]
fn enrichment_omits_absent_fields() {
    let response = EnrichedResponse::new(
        &PromiseRequest::new("terminate"),
        PromiseResult::success("done"),
    );
    let value = serde_json::to_value(&response).expect("serialise");
    assert!(value.get("promiser").is_none());
    assert!(value.get("attributes").is_none());
    assert_eq!(value.get("operation"), Some(&json!("terminate")));
}

#[test]
fn bare_response_has_only_result_fields() {
    let response = EnrichedResponse::bare(PromiseResult::error("bad line"));
    let json = serde_json::to_string(&response).expect("serialise");
    assert_eq!(
        json,
        r#"{"result":"error","log":[{"level":"error","message":"bad line"}]}"#
    );
    assert_eq!(response.operation(), None);
}

#[test]
fn enriched_response_reads_back() {
    let line = r#"{"operation":"evaluate_promise","promiser":"p","attributes":{},"result":"kept","log":[]}"#;
    let response: EnrichedResponse = serde_json::from_str(line).expect("deserialise");
    assert_eq!(response.operation(), Some("evaluate_promise"));
    assert_eq!(response.promiser(), Some("p"));
    assert_eq!(response.attributes(), Some(&Attributes::new()));
    assert_eq!(response.result().outcome(), crate::outcome::Outcome::Kept);
}

#[test]
fn attributes_are_echoed_verbatim() {
    let request = decode_request(
        r#"{"operation":"evaluate_promise","promiser":"p","attributes":{"z":1,"a":123456789012345678901234567890}}"#,
    )
    .expect("decode");
    let response = EnrichedResponse::new(&request, PromiseResult::kept("ok"));
    let json = serde_json::to_string(&response).expect("serialise");
    assert!(
        json.contains(r#""attributes":{"z":1,"a":123456789012345678901234567890}"#),
        "attributes changed on the way through: {json}"
    );
}
