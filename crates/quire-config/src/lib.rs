//! Shared configuration for the Quire document safety toolkit.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then a
//! `quire.toml` file, then `QUIRE_*` environment variables, then command-line
//! style arguments. Nothing here is global; callers load a [`Config`] and hand
//! it to the components that need it.
//!
//! ```rust,no_run
//! use quire_config::{Config, OrthoConfig};
//!
//! let config = Config::load().expect("configuration");
//! assert!(config.backup);
//! ```

mod defaults;
mod logging;

use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
/// Loader trait providing [`Config::load`] and [`Config::load_from_iter`].
pub use ortho_config::OrthoConfig;

/// Resolved configuration for file safety and package validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "QUIRE")]
pub struct Config {
    /// Tracing filter expression, e.g. `info` or `quire::safety=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for structured logs.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Whether writes may replace an existing file without confirmation.
    #[ortho_config(default = false)]
    pub allow_overwrite: bool,
    /// Whether a `.bak` copy is taken before an existing file is replaced.
    #[ortho_config(default = true)]
    pub backup: bool,
    /// Remove temporary directories when a scope completes normally.
    #[ortho_config(default = true)]
    pub cleanup_on_success: bool,
    /// Remove temporary directories when a scope exits with an error.
    #[ortho_config(default = true)]
    pub cleanup_on_error: bool,
    /// Commit transactions automatically when their scope completes.
    #[ortho_config(default = false)]
    pub auto_commit: bool,
    /// Parse every XML part of a package during the container check.
    #[ortho_config(default = true)]
    pub check_corruption: bool,
    /// Report style references with no matching definition.
    #[ortho_config(default = true)]
    pub check_consistency: bool,
    /// Report style definitions that nothing references.
    #[ortho_config(default = true)]
    pub check_unused: bool,
    /// Require at least one heading in the document body.
    #[ortho_config(default = false)]
    pub require_heading: bool,
    /// Deepest heading level accepted without a warning.
    pub max_depth: Option<u8>,
    /// Minimum number of words in the document body.
    pub min_words: Option<u64>,
    /// Maximum number of words in the document body.
    pub max_words: Option<u64>,
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for structured logs.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            allow_overwrite: false,
            backup: true,
            cleanup_on_success: true,
            cleanup_on_error: true,
            auto_commit: false,
            check_corruption: true,
            check_consistency: true,
            check_unused: true,
            require_heading: false,
            max_depth: None,
            min_words: None,
            max_words: None,
        }
    }
}
