//! Author-facing module interface.
//!
//! A promise module author implements [`PromiseModule`] and wraps it in a
//! [`ModuleConfig`] together with the name and version announced during the
//! handshake. The session owns the configuration for its whole lifetime and
//! lends it to the operation handlers by shared reference.

use std::error::Error as StdError;

use thiserror::Error;

use crate::error::ModuleConfigError;
use crate::outcome::PromiseResult;
use crate::protocol::Attributes;

/// Verdict returned by the promiser and attributes validators.
///
/// # Example
///
/// ```
/// use promise_module::module::Validation;
///
/// let verdict = Validation::invalid("promiser must be an absolute path");
/// assert!(!verdict.is_valid());
/// assert_eq!(verdict.explanation(), "promiser must be an absolute path");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The value is acceptable.
    Valid {
        /// Human-readable note, used for diagnostics only.
        explanation: String,
    },
    /// The value is rejected.
    Invalid {
        /// Reason reported back to the agent.
        explanation: String,
    },
}

impl Validation {
    /// Creates a passing verdict.
    #[must_use]
    pub fn valid(explanation: impl Into<String>) -> Self {
        Self::Valid {
            explanation: explanation.into(),
        }
    }

    /// Creates a failing verdict.
    #[must_use]
    pub fn invalid(explanation: impl Into<String>) -> Self {
        Self::Invalid {
            explanation: explanation.into(),
        }
    }

    /// Returns whether the verdict passed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Returns the explanation text.
    #[must_use]
    pub const fn explanation(&self) -> &str {
        match self {
            Self::Valid { explanation } | Self::Invalid { explanation } => explanation.as_str(),
        }
    }
}

/// Error returned by an evaluation function that could not produce a result.
///
/// The session converts it into an `error` outcome; it never ends the
/// session.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EvaluationError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl EvaluationError {
    /// Creates an error with a message only.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error wrapping an underlying cause.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the message text.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Handlers supplied by a module author.
///
/// Implementations may block; the session waits for each call to return
/// before reading the next request.
pub trait PromiseModule {
    /// Checks the promiser string of a promise.
    fn validate_promiser(&self, promiser: &str) -> Validation;

    /// Checks the attributes of a promise.
    fn validate_attributes(&self, attributes: &Attributes) -> Validation;

    /// Evaluates a promise and reports its outcome.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] when no outcome could be determined.
    fn evaluate(
        &self,
        promiser: &str,
        attributes: &Attributes,
    ) -> Result<PromiseResult, EvaluationError>;
}

/// Immutable per-session module configuration.
///
/// # Example
///
/// ```
/// use promise_module::module::{EvaluationError, ModuleConfig, PromiseModule, Validation};
/// use promise_module::outcome::PromiseResult;
/// use promise_module::protocol::Attributes;
///
/// struct AlwaysKept;
///
/// impl PromiseModule for AlwaysKept {
///     fn validate_promiser(&self, _promiser: &str) -> Validation {
///         Validation::valid("ok")
///     }
///
///     fn validate_attributes(&self, _attributes: &Attributes) -> Validation {
///         Validation::valid("ok")
///     }
///
///     fn evaluate(
///         &self,
///         promiser: &str,
///         _attributes: &Attributes,
///     ) -> Result<PromiseResult, EvaluationError> {
///         Ok(PromiseResult::kept(format!("{promiser} is fine")))
///     }
/// }
///
/// let config = ModuleConfig::new("always_kept", "1.0", AlwaysKept).expect("valid identity");
/// assert_eq!(config.handshake_reply(), "always_kept 1.0 v1 json_based");
/// ```
#[derive(Debug)]
pub struct ModuleConfig<M> {
    name: String,
    version: String,
    module: M,
}

impl<M: PromiseModule> ModuleConfig<M> {
    /// Creates a configuration after checking the announced identity.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleConfigError`] if the name or version is empty or
    /// contains whitespace, either of which would corrupt the handshake line.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        module: M,
    ) -> Result<Self, ModuleConfigError> {
        let module_name = name.into();
        let module_version = version.into();
        check_token("name", &module_name)?;
        check_token("version", &module_version)?;
        Ok(Self {
            name: module_name,
            version: module_version,
            module,
        })
    }

    /// Returns the module name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the module version.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Returns the author's handlers.
    #[must_use]
    pub const fn module(&self) -> &M {
        &self.module
    }

    /// Returns the plain-text reply sent in answer to a supported handshake.
    #[must_use]
    pub fn handshake_reply(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name,
            self.version,
            crate::protocol::PROTOCOL_VERSION,
            crate::protocol::PROTOCOL_FLAVOUR
        )
    }
}

fn check_token(field: &'static str, value: &str) -> Result<(), ModuleConfigError> {
    if value.is_empty() {
        return Err(ModuleConfigError::Empty { field });
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ModuleConfigError::InvalidToken {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}
