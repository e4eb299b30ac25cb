//! Transactional editing and validation of WordprocessingML documents.
//!
//! This crate ties the toolkit together. [`Workbench`] turns a loaded
//! [`Config`] into the file safety components from [`quire_safety`] and the
//! package validator from [`quire_package`], and adds the validated commit:
//! a transaction's working copy replaces the original only when it passes
//! validation.
//!
//! ```rust,no_run
//! use quire::{CommitOutcome, Config, Workbench};
//!
//! # fn main() -> Result<(), quire::QuireError> {
//! let config = Config::default();
//! quire::telemetry::initialise(&config)?;
//! let workbench = Workbench::new(config);
//!
//! let mut transaction = workbench.transaction("report.docx");
//! let working = transaction.begin()?.to_path_buf();
//! // ... rewrite `working` ...
//! # let _ = working;
//! if let CommitOutcome::Rejected(result) = workbench.commit_if_valid(&mut transaction)? {
//!     tracing::warn!("{}", result.summary());
//! }
//! transaction.finish(quire::ScopeOutcome::Completed)?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod telemetry;
mod workbench;

pub use error::QuireError;
pub use quire_config::{Config, LogFormat};
pub use quire_package::{
    HeadingProfile, IssueClass, IssueCode, NumberedStyleHeadings, PackageValidator,
    ValidateError, ValidationIssue, ValidationLevel, ValidationResult, ValidatorOptions,
};
pub use quire_safety::{
    CleanupPolicy, ConfirmOverwrite, DocumentTransaction, SafeFileOperations, SafetyError,
    ScopeOutcome, TempFileInfo, TempFileManager, TransactionOptions, WriteOptions,
};
pub use workbench::{CommitOutcome, Workbench};

/// Tracing target for events emitted by this crate.
pub(crate) const QUIRE_TARGET: &str = "quire";

#[cfg(test)]
mod tests;
