//! Error types for scoped temp files, protected writes and transactions.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the file safety components.
///
/// Each variant carries the path it concerns so callers can report the
/// failure without threading extra context through.
#[derive(Debug, Error)]
pub enum SafetyError {
    /// A required file or scope resource does not exist.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The target exists and overwriting was not permitted.
    #[error(
        "file exists and overwrite not allowed: {} (allow overwrite or supply a confirmation callback)",
        path.display()
    )]
    AlreadyExists {
        /// The existing target.
        path: PathBuf,
    },

    /// The confirmation callback declined the overwrite.
    #[error("overwrite cancelled: {}", path.display())]
    Cancelled {
        /// The target that was left untouched.
        path: PathBuf,
    },

    /// The path exists but is not usable for the requested operation.
    #[error("invalid input {}: {reason}", path.display())]
    InvalidInput {
        /// The offending path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: &'static str,
    },

    /// An operation was attempted in the wrong scope or transaction state.
    #[error("transaction misuse: {reason}")]
    TransactionMisuse {
        /// Description of the violated precondition.
        reason: &'static str,
    },

    /// An I/O operation failed.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// The verb describing the attempted operation.
        action: &'static str,
        /// The path being operated on.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The temporary directory could not be removed at scope exit.
    #[error("failed to clean up temp directory {}: {source}", path.display())]
    Cleanup {
        /// The temporary directory that was left behind.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

impl SafetyError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates a transaction misuse error.
    #[must_use]
    pub const fn misuse(reason: &'static str) -> Self {
        Self::TransactionMisuse { reason }
    }

    /// Creates an I/O error for the given action and path.
    #[must_use]
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Returns true when the error reports a missing file.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true when the error reports scope or state misuse.
    #[must_use]
    pub const fn is_misuse(&self) -> bool {
        matches!(self, Self::TransactionMisuse { .. })
    }
}
