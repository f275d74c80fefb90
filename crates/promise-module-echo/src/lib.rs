//! Echo promise module.
//!
//! A module that changes nothing: each promise reports the outcome named in
//! its `outcome` attribute. Agents and host test suites use it to exercise
//! the protocol end to end without touching the system.
//!
//! Accepted attributes:
//!
//! - `outcome`: one of `kept`, `repaired`, `not_kept` (default `kept`).
//! - `message`: log message to report instead of the generated one.

#[cfg(test)]
mod tests;

use std::io::{BufRead, Write};

use promise_module::protocol::Attributes;
use promise_module::{
    EvaluationError, ModuleConfig, ModuleConfigError, Outcome, PromiseModule, PromiseResult,
    SessionError, SessionSummary, Validation,
};
use thiserror::Error;

/// Name announced during the handshake.
pub const MODULE_NAME: &str = "echo";

/// Version announced during the handshake.
pub const MODULE_VERSION: &str = env!("CARGO_PKG_VERSION");

const OUTCOME_ATTRIBUTE: &str = "outcome";
const MESSAGE_ATTRIBUTE: &str = "message";

/// Module reporting the outcome each promise asks for.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoModule;

impl PromiseModule for EchoModule {
    fn validate_promiser(&self, promiser: &str) -> Validation {
        if promiser.trim().is_empty() {
            return Validation::invalid("Promiser must not be empty");
        }
        if promiser.contains(['\n', '\r']) {
            return Validation::invalid("Promiser must be a single line");
        }
        Validation::valid("Promiser accepted")
    }

    fn validate_attributes(&self, attributes: &Attributes) -> Validation {
        if let Some(unknown) = attributes
            .keys()
            .find(|key| !matches!(key.as_str(), OUTCOME_ATTRIBUTE | MESSAGE_ATTRIBUTE))
        {
            return Validation::invalid(format!("Unknown attribute '{unknown}'"));
        }
        if let Err(explanation) = requested_outcome(attributes) {
            return Validation::invalid(explanation);
        }
        if let Err(explanation) = requested_message(attributes) {
            return Validation::invalid(explanation);
        }
        Validation::valid("Attributes accepted")
    }

    fn evaluate(
        &self,
        promiser: &str,
        attributes: &Attributes,
    ) -> Result<PromiseResult, EvaluationError> {
        let outcome = requested_outcome(attributes).map_err(EvaluationError::new)?;
        let message = requested_message(attributes)
            .map_err(EvaluationError::new)?
            .map_or_else(
                || format!("Promise '{promiser}' {outcome}"),
                str::to_owned,
            );
        Ok(PromiseResult::new(outcome, message))
    }
}

fn requested_outcome(attributes: &Attributes) -> Result<Outcome, String> {
    let Some(value) = attributes.get(OUTCOME_ATTRIBUTE) else {
        return Ok(Outcome::Kept);
    };
    match value.as_str() {
        Some("kept") => Ok(Outcome::Kept),
        Some("repaired") => Ok(Outcome::Repaired),
        Some("not_kept") => Ok(Outcome::NotKept),
        Some(other) => Err(format!(
            "Attribute 'outcome' must be kept, repaired or not_kept, not '{other}'"
        )),
        None => Err(String::from("Attribute 'outcome' must be a string")),
    }
}

fn requested_message(attributes: &Attributes) -> Result<Option<&str>, String> {
    attributes
        .get(MESSAGE_ATTRIBUTE)
        .map(|value| {
            value
                .as_str()
                .ok_or_else(|| String::from("Attribute 'message' must be a string"))
        })
        .transpose()
}

/// Errors that end the echo module process.
#[derive(Debug, Error)]
pub enum EchoError {
    /// The announced identity was rejected.
    #[error(transparent)]
    Config(#[from] ModuleConfigError),
    /// The session ended on a fatal protocol or I/O error.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Runs one echo session over the given streams.
///
/// # Errors
///
/// Returns an error if the session ends on a fatal condition.
pub fn run(
    stdin: &mut impl BufRead,
    stdout: &mut impl Write,
) -> Result<SessionSummary, EchoError> {
    let config = ModuleConfig::new(MODULE_NAME, MODULE_VERSION, EchoModule)?;
    Ok(promise_module::run(config, stdin, stdout)?)
}
