//! Copy-on-write document transactions.
//!
//! A [`DocumentTransaction`] clones the document into a private temp scope,
//! lets the caller edit the clone, and writes it back over the original only
//! on [`commit`](DocumentTransaction::commit). Leaving the scope without a
//! commit leaves the original untouched.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::SAFETY_TARGET;
use crate::error::SafetyError;
use crate::replace::{backup_path_for, copy_bytes, replace_contents};
use crate::temp::{CleanupPolicy, ScopeOutcome, TempFileManager};

/// Logical name used for the working copy when the document has no file name.
const FALLBACK_WORKING_NAME: &str = "document";

/// Behaviour switches for a [`DocumentTransaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Copy the original to `<document>.bak` before committing over it.
    pub backup: bool,
    /// Commit automatically when the scope completes without error.
    pub auto_commit: bool,
    /// When the working copy's temp directory is removed.
    pub cleanup: CleanupPolicy,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            backup: true,
            auto_commit: false,
            cleanup: CleanupPolicy::ALWAYS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    New,
    Active,
    Closed,
}

/// Transaction that edits a working copy and replaces the original on commit.
///
/// Lifecycle: [`begin`](Self::begin) creates the working copy, edits go to
/// [`get_working_path`](Self::get_working_path), then
/// [`commit`](Self::commit) or [`rollback`](Self::rollback) decide the fate of
/// the original, and [`finish`](Self::finish) releases the temp scope.
/// [`run`](Self::run) wraps the whole sequence around a closure.
///
/// Dropping an active transaction releases its temp resources without
/// committing.
#[derive(Debug)]
pub struct DocumentTransaction {
    document_path: PathBuf,
    options: TransactionOptions,
    temp: TempFileManager,
    working_path: Option<PathBuf>,
    backup_path: Option<PathBuf>,
    phase: Phase,
    committed: bool,
}

impl DocumentTransaction {
    /// Prepares a transaction over `document_path`. Nothing touches the
    /// filesystem until [`begin`](Self::begin).
    #[must_use]
    pub fn new(document_path: impl Into<PathBuf>, options: TransactionOptions) -> Self {
        Self {
            document_path: document_path.into(),
            options,
            temp: TempFileManager::new(options.cleanup),
            working_path: None,
            backup_path: None,
            phase: Phase::New,
            committed: false,
        }
    }

    /// Runs `body` against a begun transaction and finishes it.
    ///
    /// The scope finishes as completed when `body` returns `Ok`, which
    /// commits when auto-commit is enabled, and as failed when it returns
    /// `Err`.
    ///
    /// # Errors
    ///
    /// Returns the body's error, or a [`SafetyError`] from beginning the
    /// transaction, auto-committing, or cleaning up after a successful body.
    pub fn run<T, E, F>(
        document_path: impl Into<PathBuf>,
        options: TransactionOptions,
        body: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<SafetyError>,
    {
        let mut transaction = Self::new(document_path, options);
        transaction.begin()?;
        match body(&mut transaction) {
            Ok(value) => {
                if transaction.is_active() {
                    transaction.finish(ScopeOutcome::Completed)?;
                }
                Ok(value)
            }
            Err(error) => {
                if transaction.is_active() {
                    transaction.finish(ScopeOutcome::Failed)?;
                }
                Err(error)
            }
        }
    }

    /// Enters the temp scope and creates the working copy.
    ///
    /// An existing document is copied byte for byte. A missing one yields an
    /// empty placeholder named after it.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::TransactionMisuse`] when the transaction has
    /// already begun, [`SafetyError::InvalidInput`] when the document path is
    /// not a regular file, or an I/O error when the working copy cannot be
    /// created.
    pub fn begin(&mut self) -> Result<&Path, SafetyError> {
        if self.phase != Phase::New {
            return Err(SafetyError::misuse("transaction already begun"));
        }

        self.temp.enter()?;
        let working = match self.create_working_copy() {
            Ok(path) => path,
            Err(error) => {
                self.temp.exit(ScopeOutcome::Failed)?;
                self.phase = Phase::Closed;
                return Err(error);
            }
        };

        debug!(
            target: SAFETY_TARGET,
            document = %self.document_path.display(),
            working = %working.display(),
            "transaction begun"
        );
        self.phase = Phase::Active;
        Ok(self.working_path.insert(working).as_path())
    }

    fn create_working_copy(&mut self) -> Result<PathBuf, SafetyError> {
        if self.document_path.exists() {
            return self.temp.copy_to_temp(&self.document_path);
        }
        let name = self
            .document_path
            .file_name()
            .map_or_else(
                || FALLBACK_WORKING_NAME.to_owned(),
                |name| name.to_string_lossy().into_owned(),
            );
        self.temp.create_temp_file(&name)
    }

    /// Path of the working copy.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::TransactionMisuse`] unless the transaction is
    /// active.
    pub fn get_working_path(&self) -> Result<&Path, SafetyError> {
        match (self.phase, self.working_path.as_deref()) {
            (Phase::Active, Some(path)) => Ok(path),
            _ => Err(SafetyError::misuse("transaction is not active")),
        }
    }

    /// Replaces the original document with the working copy.
    ///
    /// With backups enabled an existing original is first copied to its
    /// `.bak` path. The replacement itself is atomic.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::TransactionMisuse`] when the transaction is not
    /// active or has already been committed or rolled back, or an I/O error
    /// when the backup or replacement fails.
    pub fn commit(&mut self) -> Result<(), SafetyError> {
        if self.phase != Phase::Active {
            return Err(SafetyError::misuse("commit outside an active transaction"));
        }
        if self.committed {
            return Err(SafetyError::misuse("transaction already committed"));
        }

        let working = self.get_working_path()?;
        let data = fs::read(working).map_err(|err| SafetyError::io("read", working, err))?;

        if self.options.backup && self.document_path.exists() {
            let backup = backup_path_for(&self.document_path);
            copy_bytes(&self.document_path, &backup)?;
            info!(
                target: SAFETY_TARGET,
                document = %self.document_path.display(),
                backup = %backup.display(),
                "backup written before commit"
            );
            self.backup_path = Some(backup);
        }

        replace_contents(&self.document_path, &data)?;
        self.committed = true;
        info!(
            target: SAFETY_TARGET,
            document = %self.document_path.display(),
            bytes = data.len(),
            "transaction committed"
        );
        Ok(())
    }

    /// Abandons the working copy so no later auto-commit can happen.
    ///
    /// Nothing is written. Rolling back after a commit does not undo it; use
    /// [`restore_backup`](Self::restore_backup) for that.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::TransactionMisuse`] unless the transaction is
    /// active.
    pub fn rollback(&mut self) -> Result<(), SafetyError> {
        if self.phase != Phase::Active {
            return Err(SafetyError::misuse("rollback outside an active transaction"));
        }
        if !self.committed {
            info!(
                target: SAFETY_TARGET,
                document = %self.document_path.display(),
                "transaction rolled back"
            );
        }
        self.committed = true;
        Ok(())
    }

    /// Copies the recorded backup back over the original document.
    ///
    /// Usable in any phase, including after the transaction has finished.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::TransactionMisuse`] when no backup was taken,
    /// [`SafetyError::NotFound`] when the backup file has since disappeared,
    /// or an I/O error when the copy fails.
    pub fn restore_backup(&self) -> Result<(), SafetyError> {
        let Some(backup) = self.backup_path.as_deref() else {
            return Err(SafetyError::misuse("no backup recorded for this transaction"));
        };
        if !backup.exists() {
            return Err(SafetyError::not_found(backup));
        }

        let data = fs::read(backup).map_err(|err| SafetyError::io("read", backup, err))?;
        replace_contents(&self.document_path, &data)?;
        info!(
            target: SAFETY_TARGET,
            document = %self.document_path.display(),
            backup = %backup.display(),
            "backup restored"
        );
        Ok(())
    }

    /// Returns true when a backup was recorded and still exists on disk.
    #[must_use]
    pub fn has_backup(&self) -> bool {
        self.backup_path.as_deref().is_some_and(Path::exists)
    }

    /// Returns true once [`commit`](Self::commit) or
    /// [`rollback`](Self::rollback) has run.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        self.committed
    }

    /// Returns true between [`begin`](Self::begin) and
    /// [`finish`](Self::finish).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active)
    }

    /// The document this transaction protects.
    #[must_use]
    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    /// Backup taken by the last commit, if any.
    #[must_use]
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Options the transaction was created with.
    #[must_use]
    pub const fn options(&self) -> TransactionOptions {
        self.options
    }

    /// Ends the transaction and releases its temp scope.
    ///
    /// A completed scope auto-commits when enabled and nothing has been
    /// committed or rolled back yet. A failed auto-commit turns the cleanup
    /// into a failed-scope cleanup, so the commit error is the one returned.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::TransactionMisuse`] unless the transaction is
    /// active, the auto-commit error, or [`SafetyError::Cleanup`] when the
    /// temp directory cannot be removed after a completed scope.
    pub fn finish(&mut self, outcome: ScopeOutcome) -> Result<(), SafetyError> {
        if self.phase != Phase::Active {
            return Err(SafetyError::misuse("finish outside an active transaction"));
        }

        let commit_result =
            if outcome == ScopeOutcome::Completed && self.options.auto_commit && !self.committed {
                self.commit()
            } else {
                Ok(())
            };

        let cleanup_outcome = if commit_result.is_ok() {
            outcome
        } else {
            ScopeOutcome::Failed
        };
        self.phase = Phase::Closed;
        self.working_path = None;
        let cleanup_result = self.temp.exit(cleanup_outcome);

        debug!(
            target: SAFETY_TARGET,
            document = %self.document_path.display(),
            ?outcome,
            committed = self.committed,
            "transaction finished"
        );
        commit_result.and(cleanup_result)
    }
}

impl Drop for DocumentTransaction {
    fn drop(&mut self) {
        if self.phase != Phase::Active {
            return;
        }
        if let Err(error) = self.finish(ScopeOutcome::Failed) {
            warn!(
                target: SAFETY_TARGET,
                document = %self.document_path.display(),
                error = %error,
                "transaction cleanup failed during drop"
            );
        }
    }
}
