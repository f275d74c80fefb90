//! Output formats for module diagnostics on stderr.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How diagnostic events are rendered on stderr.
///
/// Flags parse case-insensitively through [`std::str::FromStr`]; environment
/// and file values go through serde and must be lowercase.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, for agents that ship stderr to a collector.
    Json,
    /// One terse line per event.
    #[default]
    Compact,
}
