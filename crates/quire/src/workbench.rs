//! Component wiring from a loaded [`Config`].

use std::path::{Path, PathBuf};

use tracing::info;

use quire_config::Config;
use quire_package::{PackageValidator, ValidationResult, ValidatorOptions};
use quire_safety::{
    CleanupPolicy, DocumentTransaction, SafeFileOperations, TempFileManager, TransactionOptions,
    WriteOptions,
};

use crate::QUIRE_TARGET;
use crate::error::QuireError;

/// What [`Workbench::commit_if_valid`] did with a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The working copy validated and replaced the original.
    Committed,
    /// The working copy failed validation; the transaction was rolled back
    /// and the original left untouched.
    Rejected(ValidationResult),
}

impl CommitOutcome {
    /// Returns true when the working copy was committed.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Builds the safety and validation components from one configuration.
///
/// The workbench holds no state beyond its [`Config`]; every accessor hands
/// out a fresh, independently owned component.
#[derive(Debug, Clone, Default)]
pub struct Workbench {
    config: Config,
}

impl Workbench {
    /// Wraps a loaded configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Cleanup policy for temp scopes.
    #[must_use]
    pub const fn cleanup_policy(&self) -> CleanupPolicy {
        CleanupPolicy {
            on_success: self.config.cleanup_on_success,
            on_error: self.config.cleanup_on_error,
        }
    }

    /// A temp scope manager with the configured cleanup policy.
    #[must_use]
    pub const fn temp_manager(&self) -> TempFileManager {
        TempFileManager::new(self.cleanup_policy())
    }

    /// Protected file operations with the configured overwrite default.
    #[must_use]
    pub const fn safe_file_operations(&self) -> SafeFileOperations {
        SafeFileOperations::new(self.config.allow_overwrite)
    }

    /// Write options carrying the configured backup switch.
    #[must_use]
    pub const fn write_options(&self) -> WriteOptions<'static> {
        WriteOptions::new().backup(self.config.backup)
    }

    /// Options for transactions opened by [`transaction`](Self::transaction).
    #[must_use]
    pub const fn transaction_options(&self) -> TransactionOptions {
        TransactionOptions {
            backup: self.config.backup,
            auto_commit: self.config.auto_commit,
            cleanup: self.cleanup_policy(),
        }
    }

    /// A transaction over `document_path`; call
    /// [`begin`](DocumentTransaction::begin) to start it.
    #[must_use]
    pub fn transaction(&self, document_path: impl Into<PathBuf>) -> DocumentTransaction {
        DocumentTransaction::new(document_path, self.transaction_options())
    }

    /// Validation switches and bounds from the configuration.
    #[must_use]
    pub const fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            check_corruption: self.config.check_corruption,
            check_consistency: self.config.check_consistency,
            check_unused: self.config.check_unused,
            require_heading: self.config.require_heading,
            max_depth: self.config.max_depth,
            min_words: self.config.min_words,
            max_words: self.config.max_words,
        }
    }

    /// A validator recognising the built-in heading styles.
    #[must_use]
    pub fn package_validator(&self) -> PackageValidator {
        PackageValidator::new(self.validator_options())
    }

    /// Runs every validation stage against `path`.
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::Validate`] when the path exists but cannot be
    /// inspected or opened.
    pub fn validate(&self, path: &Path) -> Result<ValidationResult, QuireError> {
        Ok(self.package_validator().validate(path)?)
    }

    /// Validates the transaction's working copy, then commits it when it is
    /// valid or rolls back when it is not.
    ///
    /// Rejection is not an error: the rejecting result comes back in
    /// [`CommitOutcome::Rejected`] and the original document is untouched.
    /// The transaction stays active either way, so the caller still
    /// finishes it.
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::Safety`] when the transaction is not active or
    /// the commit fails, and [`QuireError::Validate`] when the working copy
    /// cannot be read.
    pub fn commit_if_valid(
        &self,
        transaction: &mut DocumentTransaction,
    ) -> Result<CommitOutcome, QuireError> {
        let working = transaction.get_working_path()?.to_path_buf();
        let result = self.package_validator().validate(&working)?;

        if result.is_valid() {
            transaction.commit()?;
            info!(
                target: QUIRE_TARGET,
                document = %transaction.document_path().display(),
                warnings = result.warnings().count(),
                "validated working copy committed"
            );
            return Ok(CommitOutcome::Committed);
        }

        transaction.rollback()?;
        info!(
            target: QUIRE_TARGET,
            document = %transaction.document_path().display(),
            errors = result.errors().count(),
            "working copy rejected by validation"
        );
        Ok(CommitOutcome::Rejected(result))
    }
}
