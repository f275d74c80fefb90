//! Operation dispatch.
//!
//! Each decoded request names one [`Operation`]. Handlers read the session's
//! [`ModuleConfig`] and produce a [`PromiseResult`]; the handshake is answered
//! separately by [`handshake`] because its reply is plain text.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, warn};

use crate::error::SessionError;
use crate::module::{ModuleConfig, PromiseModule, Validation};
use crate::outcome::PromiseResult;
use crate::protocol::{Attributes, HandshakeLine, PromiseRequest};

/// Tracing target for dispatch events.
const DISPATCH_TARGET: &str = "promise_module::dispatch";

/// Log message of a promise that passed both validators.
pub const VALIDATED_MESSAGE: &str = "Promise validated Successfully";

/// Operations the agent can request after the handshake.
///
/// # Example
///
/// ```
/// use promise_module::dispatch::Operation;
///
/// assert_eq!(Operation::parse("terminate"), Operation::Terminate);
/// assert_eq!(
///     Operation::parse("listen"),
///     Operation::Unknown(String::from("listen"))
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Check a promise without acting on it.
    ValidatePromise,
    /// Evaluate a promise and converge if needed.
    EvaluatePromise,
    /// End the session.
    Terminate,
    /// Any tag this engine does not recognise.
    Unknown(String),
}

impl Operation {
    /// Maps a wire tag to an operation.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag {
            "validate_promise" => Self::ValidatePromise,
            "evaluate_promise" => Self::EvaluatePromise,
            "terminate" => Self::Terminate,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// Returns the wire tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ValidatePromise => "validate_promise",
            Self::EvaluatePromise => "evaluate_promise",
            Self::Terminate => "terminate",
            Self::Unknown(tag) => tag.as_str(),
        }
    }

    /// Returns whether the session stops after answering this operation.
    #[must_use]
    pub const fn ends_session(&self) -> bool {
        matches!(self, Self::Terminate)
    }
}

/// Answers the agent's handshake line.
///
/// # Errors
///
/// Returns [`SessionError::UnsupportedProtocol`] when the line does not end
/// with the supported version token.
pub fn handshake<M: PromiseModule>(
    config: &ModuleConfig<M>,
    line: HandshakeLine<'_>,
) -> Result<String, SessionError> {
    if !line.is_supported() {
        return Err(SessionError::UnsupportedProtocol {
            header: line.header().to_owned(),
            version: line.version().to_owned(),
        });
    }
    Ok(config.handshake_reply())
}

/// Runs the handler for `operation` against `request`.
#[must_use]
pub fn dispatch<M: PromiseModule>(
    config: &ModuleConfig<M>,
    operation: &Operation,
    request: &PromiseRequest,
) -> PromiseResult {
    debug!(
        target: DISPATCH_TARGET,
        operation = operation.as_str(),
        promiser = request.promiser(),
        "dispatching operation"
    );
    match operation {
        Operation::ValidatePromise => with_promise(request, |promiser, attributes| {
            validate_promise(config.module(), promiser, attributes)
        }),
        Operation::EvaluatePromise => with_promise(request, |promiser, attributes| {
            evaluate_promise(config.module(), promiser, attributes)
        }),
        Operation::Terminate => terminate(config),
        Operation::Unknown(tag) => {
            warn!(target: DISPATCH_TARGET, operation = tag.as_str(), "unknown operation");
            PromiseResult::error(format!("Unknown operation '{tag}'"))
        }
    }
}

fn with_promise<F>(request: &PromiseRequest, handler: F) -> PromiseResult
where
    F: FnOnce(&str, &Attributes) -> PromiseResult,
{
    let Some(promiser) = request.promiser() else {
        return missing_field(request, "promiser");
    };
    let Some(attributes) = request.attributes() else {
        return missing_field(request, "attributes");
    };
    handler(promiser, attributes)
}

fn missing_field(request: &PromiseRequest, field: &str) -> PromiseResult {
    warn!(
        target: DISPATCH_TARGET,
        operation = request.operation(),
        field,
        "request is missing a required field"
    );
    PromiseResult::error(format!(
        "Request for '{}' is missing the '{field}' field",
        request.operation()
    ))
}

/// Promiser first, then attributes; the first rejection is reported.
fn validate_promise<M: PromiseModule>(
    module: &M,
    promiser: &str,
    attributes: &Attributes,
) -> PromiseResult {
    if let Validation::Invalid { explanation } = module.validate_promiser(promiser) {
        return PromiseResult::invalid(explanation);
    }
    if let Validation::Invalid { explanation } = module.validate_attributes(attributes) {
        return PromiseResult::invalid(explanation);
    }
    PromiseResult::valid(VALIDATED_MESSAGE)
}

fn evaluate_promise<M: PromiseModule>(
    module: &M,
    promiser: &str,
    attributes: &Attributes,
) -> PromiseResult {
    match catch_unwind(AssertUnwindSafe(|| module.evaluate(promiser, attributes))) {
        Ok(Ok(result)) => result,
        Ok(Err(error)) => {
            warn!(target: DISPATCH_TARGET, promiser, %error, "evaluation failed");
            PromiseResult::error(format!("Evaluation of '{promiser}' failed: {error}"))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(target: DISPATCH_TARGET, promiser, message, "evaluation panicked");
            PromiseResult::error(format!("Evaluation of '{promiser}' panicked: {message}"))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn terminate<M: PromiseModule>(config: &ModuleConfig<M>) -> PromiseResult {
    PromiseResult::success(format!("{} completed successfully", config.name()))
}
