//! Engine errors.
//!
//! Only conditions that end the session surface as [`SessionError`].
//! Everything the agent can be told about (bad JSON, unknown operations,
//! failed evaluations) is answered with an `error` outcome instead.

use thiserror::Error;

/// Fatal conditions that abort a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The agent announced a protocol version this engine does not speak.
    #[error("unsupported protocol version '{version}' in handshake '{header}'")]
    UnsupportedProtocol {
        /// Full handshake line as received.
        header: String,
        /// Trailing version token, empty if the line had none.
        version: String,
    },

    /// Reading the next request line failed.
    #[error("failed to read request line: {source}")]
    Read {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing a response failed.
    #[error("failed to write response: {source}")]
    Write {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A response could not be encoded as JSON.
    #[error("failed to serialise response: {source}")]
    Serialize {
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while building a [`ModuleConfig`](crate::module::ModuleConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleConfigError {
    /// The named field was empty.
    #[error("module {field} must not be empty")]
    Empty {
        /// Field that was empty.
        field: &'static str,
    },

    /// The named field contained whitespace.
    #[error("module {field} '{value}' must not contain whitespace")]
    InvalidToken {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}
