//! Output formats for the `quire` tracing subscriber.
//!
//! The format is chosen with `log_format` in `quire.toml`, `QUIRE_LOG_FORMAT`
//! or `--log-format`; names match case-insensitively.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How diagnostic events are rendered on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event with fields flattened.
    #[default]
    Json,
    /// Terse single-line text for interactive use.
    Compact,
}

/// Returned when a `log_format` value names no known format.
pub type LogFormatParseError = strum::ParseError;
