//! File safety primitives for editing compound documents in place.
//!
//! The crate offers three layers, each usable on its own:
//!
//! - [`TempFileManager`] owns a private temporary directory for the lifetime
//!   of a scope and removes it, with every file allocated inside, when the
//!   scope exits.
//! - [`SafeFileOperations`] reads and writes bytes without silently
//!   clobbering existing files: overwrites need permission or a
//!   [`ConfirmOverwrite`] callback, and the previous contents are kept in a
//!   `.bak` sibling.
//! - [`DocumentTransaction`] edits a working copy and replaces the original
//!   atomically on commit. An abandoned transaction leaves the original
//!   untouched.
//!
//! Scopes end deterministically on every path. The closure forms
//! ([`TempFileManager::run`], [`DocumentTransaction::run`]) finish the scope
//! from the body's result, and `Drop` covers early returns and panics.
//! Cleanup failures never replace the error that ended the scope.
//!
//! Events are emitted through `tracing` under the `quire::safety` target.

mod error;
mod ops;
mod replace;
mod temp;
mod transaction;

pub use error::SafetyError;
pub use ops::{ConfirmOverwrite, SafeFileOperations, WriteOptions};
pub use replace::{BACKUP_SUFFIX, backup_path_for};
pub use temp::{CleanupPolicy, ScopeOutcome, TEMP_DIR_PREFIX, TempFileInfo, TempFileManager};
pub use transaction::{DocumentTransaction, TransactionOptions};

/// Tracing target for events emitted by this crate.
pub(crate) const SAFETY_TARGET: &str = "quire::safety";

#[cfg(test)]
mod tests;
