//! The session loop driving one agent conversation.
//!
//! A [`Session`] reads one line at a time, classifies it, dispatches it and
//! writes exactly one response per non-blank line. Every response is
//! followed by a blank separator line. The loop ends after `terminate`, at
//! end of input, or on a fatal [`SessionError`].

use std::fmt::Display;
use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::dispatch::{Operation, dispatch, handshake};
use crate::error::SessionError;
use crate::module::{ModuleConfig, PromiseModule};
use crate::outcome::PromiseResult;
use crate::protocol::{EnrichedResponse, InboundLine, decode_request};

/// Tracing target for session lifecycle events.
const SESSION_TARGET: &str = "promise_module::session";

/// Why a session stopped without a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The agent sent `terminate`.
    Terminated,
    /// The input stream closed.
    EndOfInput,
}

/// Counters describing a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    lines_read: usize,
    responses_written: usize,
    end: SessionEnd,
}

impl SessionSummary {
    /// Returns the number of input lines read, blank lines included.
    #[must_use]
    pub const fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Returns the number of responses written.
    #[must_use]
    pub const fn responses_written(&self) -> usize {
        self.responses_written
    }

    /// Returns how the session ended.
    #[must_use]
    pub const fn end(&self) -> SessionEnd {
        self.end
    }
}

/// A response ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Plain-text handshake reply.
    Handshake(String),
    /// JSON operation reply.
    Operation {
        /// Enriched result.
        response: EnrichedResponse,
        /// Whether the session stops after this reply.
        last: bool,
    },
}

impl Response {
    /// Returns whether the session stops after this reply.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        matches!(self, Self::Operation { last: true, .. })
    }

    /// Renders the response as one line, without terminator.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Serialize`] if the JSON encoding fails.
    pub fn to_line(&self) -> Result<String, SessionError> {
        match self {
            Self::Handshake(text) => Ok(text.clone()),
            Self::Operation { response, .. } => serde_json::to_string(response)
                .map_err(|source| SessionError::Serialize { source }),
        }
    }
}

/// One agent conversation bound to a module configuration.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
///
/// use promise_module::module::{EvaluationError, ModuleConfig, PromiseModule, Validation};
/// use promise_module::outcome::PromiseResult;
/// use promise_module::protocol::Attributes;
/// use promise_module::session::{Session, SessionEnd};
///
/// struct Noop;
///
/// impl PromiseModule for Noop {
///     fn validate_promiser(&self, _: &str) -> Validation {
///         Validation::valid("ok")
///     }
///     fn validate_attributes(&self, _: &Attributes) -> Validation {
///         Validation::valid("ok")
///     }
///     fn evaluate(&self, _: &str, _: &Attributes) -> Result<PromiseResult, EvaluationError> {
///         Ok(PromiseResult::kept("ok"))
///     }
/// }
///
/// let session = Session::new(ModuleConfig::new("mymod", "1.0", Noop).expect("config"));
/// let mut input = Cursor::new("cf-agent 3.18.0 v1\n\n{\"operation\":\"terminate\"}\n");
/// let mut output = Vec::new();
/// let summary = session.run(&mut input, &mut output).expect("session");
///
/// assert_eq!(summary.end(), SessionEnd::Terminated);
/// assert_eq!(
///     String::from_utf8(output).expect("utf8"),
///     concat!(
///         "mymod 1.0 v1 json_based\n\n",
///         r#"{"operation":"terminate","result":"success","log":[{"level":"info","message":"mymod completed successfully"}]}"#,
///         "\n\n",
///     ),
/// );
/// ```
#[derive(Debug)]
pub struct Session<M> {
    config: ModuleConfig<M>,
}

impl<M: PromiseModule> Session<M> {
    /// Creates a session owning `config`.
    #[must_use]
    pub const fn new(config: ModuleConfig<M>) -> Self {
        Self { config }
    }

    /// Returns the module configuration.
    #[must_use]
    pub const fn config(&self) -> &ModuleConfig<M> {
        &self.config
    }

    /// Produces the response for one raw input line.
    ///
    /// Blank lines yield `Ok(None)`. Undecodable lines yield an `error`
    /// result without request fields.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnsupportedProtocol`] for a handshake that
    /// announces an unsupported version.
    pub fn respond(&self, raw: &str) -> Result<Option<Response>, SessionError> {
        let Some(inbound) = InboundLine::classify(raw) else {
            return Ok(None);
        };

        match inbound {
            InboundLine::Handshake(line) => {
                let reply = handshake(&self.config, line)?;
                info!(
                    target: SESSION_TARGET,
                    header = line.header(),
                    "handshake accepted"
                );
                Ok(Some(Response::Handshake(reply)))
            }
            InboundLine::Operation(text) => Ok(Some(self.respond_to_operation(text))),
        }
    }

    fn respond_to_operation(&self, text: &str) -> Response {
        match decode_request(text) {
            Ok(request) => {
                let operation = Operation::parse(request.operation());
                let result = dispatch(&self.config, &operation, &request);
                Response::Operation {
                    response: EnrichedResponse::new(&request, result),
                    last: operation.ends_session(),
                }
            }
            Err(error) => malformed(&error),
        }
    }

    /// Runs the session until `terminate`, end of input, or a fatal error.
    ///
    /// Lines that are not valid UTF-8 are answered like any other malformed
    /// request.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] on a handshake version mismatch, or when
    /// reading, encoding or writing fails. Nothing is written for the line
    /// that caused the error.
    pub fn run(
        &self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<SessionSummary, SessionError> {
        let mut lines_read = 0;
        let mut responses_written = 0;
        let mut line = Vec::new();

        loop {
            line.clear();
            let bytes_read = input
                .read_until(b'\n', &mut line)
                .map_err(|source| SessionError::Read { source })?;
            if bytes_read == 0 {
                debug!(target: SESSION_TARGET, "input closed");
                return Ok(SessionSummary {
                    lines_read,
                    responses_written,
                    end: SessionEnd::EndOfInput,
                });
            }
            lines_read += 1;

            let reply = match std::str::from_utf8(&line) {
                Ok(text) => self.respond(text)?,
                Err(error) => Some(malformed(&error)),
            };
            let Some(response) = reply else {
                continue;
            };
            write_response(output, &response.to_line()?)?;
            responses_written += 1;

            if response.is_last() {
                info!(
                    target: SESSION_TARGET,
                    module = self.config.name(),
                    responses_written,
                    "session terminated"
                );
                return Ok(SessionSummary {
                    lines_read,
                    responses_written,
                    end: SessionEnd::Terminated,
                });
            }
        }
    }
}

/// Runs a session for `config` over the given streams.
///
/// # Errors
///
/// See [`Session::run`].
pub fn run<M: PromiseModule>(
    config: ModuleConfig<M>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<SessionSummary, SessionError> {
    Session::new(config).run(input, output)
}

fn malformed(error: &dyn Display) -> Response {
    warn!(target: SESSION_TARGET, %error, "malformed request line");
    Response::Operation {
        response: EnrichedResponse::bare(PromiseResult::error(format!(
            "Malformed request: {error}"
        ))),
        last: false,
    }
}

fn write_response(output: &mut impl Write, line: &str) -> Result<(), SessionError> {
    output
        .write_all(line.as_bytes())
        .map_err(|source| SessionError::Write { source })?;
    output
        .write_all(b"\n\n")
        .map_err(|source| SessionError::Write { source })?;
    output
        .flush()
        .map_err(|source| SessionError::Write { source })
}
