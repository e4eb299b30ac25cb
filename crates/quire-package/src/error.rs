//! Errors raised when a package cannot be inspected at all.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Filesystem failure that prevents validation from producing a result.
///
/// Anything the validator can open is reported as data inside a
/// [`ValidationResult`](crate::ValidationResult) instead.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The path exists but could not be inspected or opened.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// The verb describing the attempted operation.
        action: &'static str,
        /// The document path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

impl ValidateError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
