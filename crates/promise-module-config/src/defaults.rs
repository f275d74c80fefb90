use crate::logging::LogFormat;

/// Filter applied when neither the environment nor a flag names one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Returns [`DEFAULT_LOG_FILTER`] for call sites that compare against it.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned copy of the default filter, used as the serde and loader default.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for module binaries.
///
/// Modules usually run under an agent that captures stderr verbatim, so the
/// compact format is preferred over JSON.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
