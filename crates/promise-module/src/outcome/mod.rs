//! Result vocabulary shared by every operation response.
//!
//! Each response carries one [`Outcome`] code and an ordered list of
//! [`LogEntry`] values. Codes map to a default [`LogLevel`] through
//! [`Outcome::default_level`], so a result can be built from an outcome and a
//! message alone while still letting callers pick a different severity.

use serde::{Deserialize, Serialize};

/// Outcome codes understood by the agent.
///
/// The wire representation is the snake case variant name, for example
/// `not_kept`.
///
/// # Example
///
/// ```
/// use promise_module::outcome::{LogLevel, Outcome};
///
/// assert_eq!(Outcome::NotKept.as_str(), "not_kept");
/// assert_eq!(Outcome::NotKept.default_level(), LogLevel::Error);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The promise was already satisfied.
    Kept,
    /// The promise was not satisfied and has been fixed.
    Repaired,
    /// The promise is not satisfied and could not be fixed.
    NotKept,
    /// A non-promise operation completed.
    Success,
    /// A non-promise operation failed.
    Failure,
    /// The module could not process the request.
    Error,
    /// A promise passed validation.
    Valid,
    /// A promise failed validation.
    Invalid,
}

impl Outcome {
    /// Every outcome code, in wire documentation order.
    pub const ALL: [Self; 8] = [
        Self::Kept,
        Self::Repaired,
        Self::NotKept,
        Self::Success,
        Self::Failure,
        Self::Error,
        Self::Valid,
        Self::Invalid,
    ];

    /// Returns the wire code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kept => "kept",
            Self::Repaired => "repaired",
            Self::NotKept => "not_kept",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }

    /// Returns the log level used when a result does not name one.
    #[must_use]
    pub const fn default_level(self) -> LogLevel {
        match self {
            Self::Kept | Self::Repaired | Self::Success | Self::Valid => LogLevel::Info,
            Self::NotKept | Self::Failure | Self::Error | Self::Invalid => LogLevel::Error,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity attached to a [`LogEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Unrecoverable condition.
    Critical,
    /// Failure affecting the promise.
    Error,
    /// Suspicious but non-fatal condition.
    Warning,
    /// Noteworthy event.
    Notice,
    /// Informational message.
    Info,
    /// Detailed progress message.
    Verbose,
    /// Debugging detail.
    Debug,
}

impl LogLevel {
    /// Returns the wire name of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Verbose => "verbose",
            Self::Debug => "debug",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One severity-tagged diagnostic line.
///
/// Messages are flattened to a single line on construction because each
/// response must occupy exactly one line of output.
///
/// # Example
///
/// ```
/// use promise_module::outcome::{LogEntry, LogLevel};
///
/// let entry = LogEntry::new(LogLevel::Info, "first\nsecond");
/// assert_eq!(entry.message(), "firstsecond");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    level: LogLevel,
    #[serde(deserialize_with = "deserialize_single_line")]
    message: String,
}

impl LogEntry {
    /// Creates an entry, stripping line breaks from `message`.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: single_line(message.into()),
        }
    }

    /// Returns the severity.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Returns the message text.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}

fn single_line(message: String) -> String {
    if message.contains(['\n', '\r']) {
        message.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
    } else {
        message
    }
}

fn deserialize_single_line<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(single_line)
}

/// Outcome of one operation together with its log.
///
/// Serialises as `{"result": <code>, "log": [...]}`. Log entries are kept in
/// insertion order.
///
/// # Example
///
/// ```
/// use promise_module::outcome::{LogLevel, Outcome, PromiseResult};
///
/// let result = PromiseResult::repaired("created /tmp/example")
///     .push_log(LogLevel::Verbose, "mode set to 0644");
/// assert_eq!(result.outcome(), Outcome::Repaired);
/// assert_eq!(result.log().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromiseResult {
    result: Outcome,
    #[serde(default)]
    log: Vec<LogEntry>,
}

impl PromiseResult {
    /// Creates a result logging `message` at the outcome's default level.
    #[must_use]
    pub fn new(outcome: Outcome, message: impl Into<String>) -> Self {
        Self::with_level(outcome, outcome.default_level(), message)
    }

    /// Creates a result logging `message` at an explicit level.
    #[must_use]
    pub fn with_level(outcome: Outcome, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            result: outcome,
            log: vec![LogEntry::new(level, message)],
        }
    }

    /// Creates a result with an empty log.
    #[must_use]
    pub const fn silent(outcome: Outcome) -> Self {
        Self {
            result: outcome,
            log: Vec::new(),
        }
    }

    /// Appends a log entry.
    #[must_use]
    pub fn push_log(mut self, level: LogLevel, message: impl Into<String>) -> Self {
        self.log.push(LogEntry::new(level, message));
        self
    }

    /// Shorthand for [`Outcome::Kept`] at the default level.
    #[must_use]
    pub fn kept(message: impl Into<String>) -> Self {
        Self::new(Outcome::Kept, message)
    }

    /// Shorthand for [`Outcome::Repaired`] at the default level.
    #[must_use]
    pub fn repaired(message: impl Into<String>) -> Self {
        Self::new(Outcome::Repaired, message)
    }

    /// Shorthand for [`Outcome::NotKept`] at the default level.
    #[must_use]
    pub fn not_kept(message: impl Into<String>) -> Self {
        Self::new(Outcome::NotKept, message)
    }

    /// Shorthand for [`Outcome::Success`] at the default level.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Outcome::Success, message)
    }

    /// Shorthand for [`Outcome::Failure`] at the default level.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(Outcome::Failure, message)
    }

    /// Shorthand for [`Outcome::Error`] at the default level.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Outcome::Error, message)
    }

    /// Shorthand for [`Outcome::Valid`] at the default level.
    #[must_use]
    pub fn valid(message: impl Into<String>) -> Self {
        Self::new(Outcome::Valid, message)
    }

    /// Shorthand for [`Outcome::Invalid`] at the default level.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(Outcome::Invalid, message)
    }

    /// Returns the outcome code.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.result
    }

    /// Returns the log entries in insertion order.
    #[must_use]
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }
}
