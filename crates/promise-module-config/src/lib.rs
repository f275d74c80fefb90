//! Ambient configuration shared by promise module binaries.
//!
//! Promise modules are launched by an agent with no command line of their
//! own, so settings normally arrive through `PROMISE_MODULE_*` environment
//! variables. [`TelemetrySettings`] is loaded by `ortho_config`, which also
//! honours configuration files and `--log-filter`/`--log-format` flags when a
//! module is run by hand. The settings control diagnostics only: stdout
//! belongs to the protocol and nothing here affects it.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use self::defaults::{
    DEFAULT_LOG_FILTER, default_log_filter, default_log_filter_string, default_log_format,
};
pub use self::logging::LogFormat;

/// Diagnostic settings resolved for one module process.
///
/// Read from `PROMISE_MODULE_LOG_FILTER` and `PROMISE_MODULE_LOG_FORMAT`
/// when loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PROMISE_MODULE")]
pub struct TelemetrySettings {
    /// Tracing filter expression, for example `promise_module=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    log_filter: String,
    /// Rendering of diagnostic events.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    log_format: LogFormat,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self::new(default_log_filter_string(), default_log_format())
    }
}

impl TelemetrySettings {
    /// Creates settings from explicit values.
    #[must_use]
    pub fn new(log_filter: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            log_filter: log_filter.into(),
            log_format,
        }
    }

    /// Returns the tracing filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
