//! Protocol engine for custom promise modules.
//!
//! A promise module is a long-lived child process started by the agent. The
//! agent announces itself with one plain-text handshake line and then sends
//! one JSON request per line on the module's standard input; the module
//! answers each line on standard output. This crate implements that
//! exchange so a module author only supplies a name, a version and a
//! [`PromiseModule`] implementation.
//!
//! # Architecture
//!
//! A [`Session`] reads a line and classifies it through
//! [`protocol::InboundLine`]. Handshake lines are answered with plain text.
//! Operation lines are decoded into a [`PromiseRequest`] and dispatched by
//! [`dispatch::Operation`]. The resulting [`PromiseResult`] is enriched with
//! the request's `operation`, `promiser` and `attributes` before being
//! written as one JSON line followed by a blank separator line.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::io::{self, BufReader};
//!
//! use promise_module::{
//!     EvaluationError, ModuleConfig, PromiseModule, PromiseResult, Session, Validation,
//! };
//! use promise_module::protocol::Attributes;
//!
//! struct Motd;
//!
//! impl PromiseModule for Motd {
//!     fn validate_promiser(&self, promiser: &str) -> Validation {
//!         if promiser.starts_with('/') {
//!             Validation::valid("absolute path")
//!         } else {
//!             Validation::invalid("promiser must be an absolute path")
//!         }
//!     }
//!
//!     fn validate_attributes(&self, _attributes: &Attributes) -> Validation {
//!         Validation::valid("no attributes required")
//!     }
//!
//!     fn evaluate(
//!         &self,
//!         promiser: &str,
//!         _attributes: &Attributes,
//!     ) -> Result<PromiseResult, EvaluationError> {
//!         Ok(PromiseResult::kept(format!("{promiser} is up to date")))
//!     }
//! }
//!
//! let config = ModuleConfig::new("motd", "0.1.0", Motd).expect("valid identity");
//! let mut input = BufReader::new(io::stdin().lock());
//! let mut output = io::stdout().lock();
//! Session::new(config).run(&mut input, &mut output).expect("session");
//! ```

pub mod dispatch;
pub mod error;
pub mod module;
pub mod outcome;
pub mod protocol;
pub mod session;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use self::error::{ModuleConfigError, SessionError};
pub use self::module::{EvaluationError, ModuleConfig, PromiseModule, Validation};
pub use self::outcome::{LogEntry, LogLevel, Outcome, PromiseResult};
pub use self::protocol::{EnrichedResponse, PromiseRequest};
pub use self::session::{Session, SessionEnd, SessionSummary, run};
