//! Wire types and line classification for the agent/module exchange.
//!
//! The protocol is line-delimited over stdio. The agent opens with one
//! plain-text handshake line, then sends one JSON object per line. The
//! module answers the handshake with plain text and every other request with
//! one JSON object followed by a blank separator line.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::outcome::PromiseResult;

/// Prefix identifying the agent's handshake line.
pub const HANDSHAKE_PREFIX: &str = "cf-agent";

/// The only protocol version this engine speaks.
pub const PROTOCOL_VERSION: &str = "v1";

/// Encoding announced in the handshake reply.
pub const PROTOCOL_FLAVOUR: &str = "json_based";

/// Attribute map carried by promise requests.
///
/// Key order and number text survive a decode/encode round trip, so the
/// attributes echoed in a response match the request.
pub type Attributes = serde_json::Map<String, Value>;

/// One operation request decoded from a JSON line.
///
/// # Example
///
/// ```
/// use promise_module::protocol::PromiseRequest;
///
/// let request: PromiseRequest = serde_json::from_str(
///     r#"{"operation":"validate_promise","promiser":"/tmp/x","attributes":{}}"#,
/// )
/// .expect("valid request");
/// assert_eq!(request.operation(), "validate_promise");
/// assert_eq!(request.promiser(), Some("/tmp/x"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromiseRequest {
    operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    promiser: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attributes: Option<Attributes>,
}

impl PromiseRequest {
    /// Creates a request carrying only an operation tag.
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            promiser: None,
            attributes: None,
        }
    }

    /// Creates a request for a specific promise.
    #[must_use]
    pub fn for_promise(
        operation: impl Into<String>,
        promiser: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        Self {
            operation: operation.into(),
            promiser: Some(promiser.into()),
            attributes: Some(attributes),
        }
    }

    /// Returns the operation tag.
    #[must_use]
    pub const fn operation(&self) -> &str {
        self.operation.as_str()
    }

    /// Returns the promiser, if the request carried one.
    #[must_use]
    pub fn promiser(&self) -> Option<&str> {
        self.promiser.as_deref()
    }

    /// Returns the attributes, if the request carried them.
    #[must_use]
    pub const fn attributes(&self) -> Option<&Attributes> {
        self.attributes.as_ref()
    }
}

/// A non-empty input line after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundLine<'a> {
    /// The agent's plain-text protocol announcement.
    Handshake(HandshakeLine<'a>),
    /// A JSON operation line, not yet decoded.
    Operation(&'a str),
}

impl<'a> InboundLine<'a> {
    /// Classifies a raw line, returning `None` for blank lines.
    ///
    /// Trailing line terminators are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use promise_module::protocol::InboundLine;
    ///
    /// assert!(InboundLine::classify("\n").is_none());
    /// assert!(matches!(
    ///     InboundLine::classify("cf-agent 3.18.0 v1\n"),
    ///     Some(InboundLine::Handshake(_))
    /// ));
    /// assert!(matches!(
    ///     InboundLine::classify("{\"operation\":\"terminate\"}"),
    ///     Some(InboundLine::Operation(_))
    /// ));
    /// ```
    #[must_use]
    pub fn classify(raw: &'a str) -> Option<Self> {
        let line = raw.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            return None;
        }
        if line.starts_with(HANDSHAKE_PREFIX) {
            Some(Self::Handshake(HandshakeLine(line)))
        } else {
            Some(Self::Operation(line))
        }
    }
}

/// The agent's handshake header, kept as raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeLine<'a>(&'a str);

impl<'a> HandshakeLine<'a> {
    /// Returns the header text.
    #[must_use]
    pub const fn header(&self) -> &'a str {
        self.0
    }

    /// Returns the trailing protocol version token, empty if there is none.
    #[must_use]
    pub fn version(&self) -> &'a str {
        self.0.split_whitespace().next_back().unwrap_or_default()
    }

    /// Returns whether the announced version is the one this engine speaks.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.version() == PROTOCOL_VERSION
    }
}

/// Decodes a JSON operation line.
///
/// # Errors
///
/// Returns the decoder error when the line is not a JSON object with a
/// string `operation`, or when `promiser` or `attributes` have the wrong
/// type.
pub fn decode_request(line: &str) -> Result<PromiseRequest, serde_json::Error> {
    // A derived struct visitor also accepts sequences, so objects are
    // checked before field decoding.
    match serde_json::from_str(line)? {
        Value::Object(fields) => serde_json::from_value(Value::Object(fields)),
        other => Err(serde::de::Error::custom(format_args!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A result together with the request fields it answers.
///
/// Carried-forward fields are emitted only when the request contained them,
/// ahead of the `result` and `log` keys.
///
/// # Example
///
/// ```
/// use promise_module::outcome::PromiseResult;
/// use promise_module::protocol::{EnrichedResponse, PromiseRequest};
///
/// let request = PromiseRequest::new("terminate");
/// let response =
///     EnrichedResponse::new(&request, PromiseResult::success("mymod completed successfully"));
/// assert_eq!(
///     serde_json::to_string(&response).expect("serialise"),
///     r#"{"operation":"terminate","result":"success","log":[{"level":"info","message":"mymod completed successfully"}]}"#,
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    promiser: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attributes: Option<Attributes>,
    #[serde(flatten)]
    result: PromiseResult,
}

impl EnrichedResponse {
    /// Layers `result` over the correlating fields of `request`.
    #[must_use]
    pub fn new(request: &PromiseRequest, result: PromiseResult) -> Self {
        Self {
            operation: Some(request.operation.clone()),
            promiser: request.promiser.clone(),
            attributes: request.attributes.clone(),
            result,
        }
    }

    /// Wraps a result that answers no decodable request.
    #[must_use]
    pub const fn bare(result: PromiseResult) -> Self {
        Self {
            operation: None,
            promiser: None,
            attributes: None,
            result,
        }
    }

    /// Returns the carried-forward operation tag.
    #[must_use]
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// Returns the carried-forward promiser.
    #[must_use]
    pub fn promiser(&self) -> Option<&str> {
        self.promiser.as_deref()
    }

    /// Returns the carried-forward attributes.
    #[must_use]
    pub const fn attributes(&self) -> Option<&Attributes> {
        self.attributes.as_ref()
    }

    /// Returns the result.
    #[must_use]
    pub const fn result(&self) -> &PromiseResult {
        &self.result
    }
}

#[cfg(test)]
mod tests;
