//! Scope-bound temporary directories and files.
//!
//! A [`TempFileManager`] owns at most one temporary directory at a time. The
//! directory is created when a scope is entered and removed as a unit when the
//! scope exits, subject to the manager's [`CleanupPolicy`]. Every file the
//! scope allocates lives inside that directory, so removal accounts for all
//! of them.

use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::SAFETY_TARGET;
use crate::error::SafetyError;

/// Prefix shared by every temporary directory a scope allocates.
pub const TEMP_DIR_PREFIX: &str = "quire_";

/// How a scope ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOutcome {
    /// The scope body finished without error.
    Completed,
    /// The scope body returned an error or panicked.
    Failed,
}

/// Which scope outcomes remove the temporary directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupPolicy {
    /// Remove the directory when the scope completes normally.
    pub on_success: bool,
    /// Remove the directory when the scope fails.
    pub on_error: bool,
}

impl CleanupPolicy {
    /// Always remove the directory.
    pub const ALWAYS: Self = Self {
        on_success: true,
        on_error: true,
    };

    /// Returns true when a scope ending with `outcome` should be removed.
    #[must_use]
    pub const fn should_remove(self, outcome: ScopeOutcome) -> bool {
        match outcome {
            ScopeOutcome::Completed => self.on_success,
            ScopeOutcome::Failed => self.on_error,
        }
    }
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self::ALWAYS
    }
}

/// Record of a file allocated inside a temp scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempFileInfo {
    path: PathBuf,
    original_name: String,
    created_at: SystemTime,
}

impl TempFileInfo {
    /// Absolute path of the temp file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Logical name the file was requested under, e.g. `document.docx`.
    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// When the file was allocated.
    #[must_use]
    pub const fn created_at(&self) -> SystemTime {
        self.created_at
    }
}

/// Owns one temporary directory per scope and the files allocated in it.
///
/// Scopes are entered with [`enter`](Self::enter) and left with
/// [`exit`](Self::exit), or wrapped with [`run`](Self::run). A manager dropped
/// while its scope is still active exits the scope itself: during a panic the
/// exit counts as [`ScopeOutcome::Failed`], otherwise as
/// [`ScopeOutcome::Completed`].
///
/// ```rust,no_run
/// use quire_safety::{CleanupPolicy, TempFileManager};
///
/// # fn main() -> Result<(), quire_safety::SafetyError> {
/// let mut manager = TempFileManager::new(CleanupPolicy::default());
/// let scratch = manager.run(|scope| scope.create_temp_file("draft.docx"))?;
/// assert!(!scratch.exists());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TempFileManager {
    policy: CleanupPolicy,
    active: Option<TempDir>,
    files: Vec<TempFileInfo>,
}

impl TempFileManager {
    /// Creates an idle manager with the given cleanup policy.
    #[must_use]
    pub const fn new(policy: CleanupPolicy) -> Self {
        Self {
            policy,
            active: None,
            files: Vec::new(),
        }
    }

    /// Cleanup policy applied at scope exit.
    #[must_use]
    pub const fn policy(&self) -> CleanupPolicy {
        self.policy
    }

    /// Returns true while a scope is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Enters a scope by allocating a uniquely named temporary directory.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::TransactionMisuse`] when a scope is already
    /// active, or an I/O error when the directory cannot be created.
    pub fn enter(&mut self) -> Result<&Path, SafetyError> {
        if self.active.is_some() {
            return Err(SafetyError::misuse("temp scope already active"));
        }

        let dir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir()
            .map_err(|err| SafetyError::io("create temp directory in", std::env::temp_dir(), err))?;
        debug!(
            target: SAFETY_TARGET,
            dir = %dir.path().display(),
            "temp scope entered"
        );

        self.files.clear();
        Ok(self.active.insert(dir).path())
    }

    /// Directory owned by the active scope.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::TransactionMisuse`] outside an active scope.
    pub fn temp_dir(&self) -> Result<&Path, SafetyError> {
        self.active
            .as_ref()
            .map(TempDir::path)
            .ok_or_else(|| SafetyError::misuse("temp file manager used outside an active scope"))
    }

    /// Allocates an empty file named `<random token>_<logical_name>`.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::TransactionMisuse`] outside an active scope,
    /// [`SafetyError::InvalidInput`] when `logical_name` is not a single path
    /// component, or an I/O error when the file cannot be created.
    pub fn create_temp_file(&mut self, logical_name: &str) -> Result<PathBuf, SafetyError> {
        let dir = self.temp_dir()?.to_path_buf();
        ensure_single_component(logical_name)?;

        let token = Uuid::new_v4().simple();
        let path = dir.join(format!("{token}_{logical_name}"));
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| SafetyError::io("create", &path, err))?;

        debug!(
            target: SAFETY_TARGET,
            file = %path.display(),
            logical_name,
            "temp file allocated"
        );
        self.files.push(TempFileInfo {
            path: path.clone(),
            original_name: logical_name.to_owned(),
            created_at: SystemTime::now(),
        });
        Ok(path)
    }

    /// Copies `source` into a fresh temp file named after it.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::NotFound`] when `source` does not exist,
    /// [`SafetyError::InvalidInput`] when it is not a regular file, plus the
    /// errors of [`create_temp_file`](Self::create_temp_file).
    pub fn copy_to_temp(&mut self, source: &Path) -> Result<PathBuf, SafetyError> {
        if !source.exists() {
            return Err(SafetyError::not_found(source));
        }
        if !source.is_file() {
            return Err(SafetyError::InvalidInput {
                path: source.to_path_buf(),
                reason: "not a regular file",
            });
        }

        let logical_name = source
            .file_name()
            .map(OsStr::to_string_lossy)
            .unwrap_or_default();
        let path = self.create_temp_file(&logical_name)?;
        fs::copy(source, &path).map_err(|err| SafetyError::io("copy", source, err))?;
        Ok(path)
    }

    /// Snapshot of the files allocated by the current or most recent scope.
    #[must_use]
    pub fn list_temp_files(&self) -> Vec<TempFileInfo> {
        self.files.clone()
    }

    /// Leaves the active scope, removing the directory when the policy says
    /// so for `outcome`.
    ///
    /// A removal failure is only reported for [`ScopeOutcome::Completed`].
    /// After a failure it is logged and swallowed so the caller's original
    /// error stays the one that propagates.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::TransactionMisuse`] when no scope is active, or
    /// [`SafetyError::Cleanup`] when removal fails after a completed scope.
    pub fn exit(&mut self, outcome: ScopeOutcome) -> Result<(), SafetyError> {
        let Some(dir) = self.active.take() else {
            return Err(SafetyError::misuse("no active temp scope to exit"));
        };

        if !self.policy.should_remove(outcome) {
            let kept = dir.keep();
            debug!(
                target: SAFETY_TARGET,
                dir = %kept.display(),
                ?outcome,
                "temp directory kept"
            );
            return Ok(());
        }

        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => {
                debug!(
                    target: SAFETY_TARGET,
                    dir = %path.display(),
                    ?outcome,
                    "temp directory removed"
                );
                Ok(())
            }
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) if outcome == ScopeOutcome::Completed => {
                Err(SafetyError::Cleanup { path, source })
            }
            Err(source) => {
                warn!(
                    target: SAFETY_TARGET,
                    dir = %path.display(),
                    error = %source,
                    "temp cleanup failed; keeping the original error"
                );
                Ok(())
            }
        }
    }

    /// Runs `body` inside a scope.
    ///
    /// The scope exits as completed when `body` returns `Ok` and as failed
    /// when it returns `Err`; the body's error is always the one returned.
    ///
    /// # Errors
    ///
    /// Returns the body's error, or a [`SafetyError`] from entering the
    /// scope or cleaning up after a successful body.
    pub fn run<T, E, F>(&mut self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<SafetyError>,
    {
        self.enter()?;
        match body(self) {
            Ok(value) => {
                if self.is_active() {
                    self.exit(ScopeOutcome::Completed)?;
                }
                Ok(value)
            }
            Err(error) => {
                if self.is_active() {
                    self.exit(ScopeOutcome::Failed)?;
                }
                Err(error)
            }
        }
    }
}

impl Drop for TempFileManager {
    fn drop(&mut self) {
        if self.active.is_none() {
            return;
        }
        let outcome = if std::thread::panicking() {
            ScopeOutcome::Failed
        } else {
            ScopeOutcome::Completed
        };
        if let Err(error) = self.exit(outcome) {
            warn!(
                target: SAFETY_TARGET,
                error = %error,
                "temp scope cleanup failed during drop"
            );
        }
    }
}

fn ensure_single_component(logical_name: &str) -> Result<(), SafetyError> {
    let mut components = Path::new(logical_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)) | None, None) => Ok(()),
        _ => Err(SafetyError::InvalidInput {
            path: PathBuf::from(logical_name),
            reason: "logical name must be a single path component",
        }),
    }
}
