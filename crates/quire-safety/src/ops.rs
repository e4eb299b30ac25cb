//! Overwrite-protected byte I/O.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::SAFETY_TARGET;
use crate::error::SafetyError;
use crate::replace::{backup_path_for, copy_bytes, replace_contents};

/// Decides whether an existing file may be overwritten.
///
/// Implemented for any `Fn(&Path) -> bool`, so a closure that prompts the
/// user can be passed directly.
pub trait ConfirmOverwrite {
    /// Returns true to proceed with overwriting `target`.
    fn confirm(&self, target: &Path) -> bool;
}

impl<F> ConfirmOverwrite for F
where
    F: Fn(&Path) -> bool,
{
    fn confirm(&self, target: &Path) -> bool {
        self(target)
    }
}

/// Per-call overwrite settings for [`SafeFileOperations::write_file`].
#[derive(Clone, Copy)]
pub struct WriteOptions<'a> {
    allow_overwrite: Option<bool>,
    backup: bool,
    confirm: Option<&'a dyn ConfirmOverwrite>,
}

impl<'a> WriteOptions<'a> {
    /// Options that defer overwrite permission to the operations' default and
    /// take a backup before replacing an existing file.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allow_overwrite: None,
            backup: true,
            confirm: None,
        }
    }

    /// Explicitly allows or forbids replacing an existing target.
    #[must_use]
    pub const fn allow_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = Some(allow);
        self
    }

    /// Enables or disables the `.bak` copy of an existing target.
    #[must_use]
    pub const fn backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Asks `confirm` before replacing an existing target.
    ///
    /// A callback takes precedence over [`allow_overwrite`](Self::allow_overwrite):
    /// declining cancels the write even when overwriting is allowed.
    #[must_use]
    pub fn confirm_with(mut self, confirm: &'a dyn ConfirmOverwrite) -> Self {
        self.confirm = Some(confirm);
        self
    }
}

impl Default for WriteOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WriteOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOptions")
            .field("allow_overwrite", &self.allow_overwrite)
            .field("backup", &self.backup)
            .field("confirm", &self.confirm.is_some())
            .finish()
    }
}

/// Reads and writes files without silently destroying existing data.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafeFileOperations {
    default_allow_overwrite: bool,
}

impl SafeFileOperations {
    /// Creates operations whose writes fall back to `default_allow_overwrite`
    /// when a call does not decide for itself.
    #[must_use]
    pub const fn new(default_allow_overwrite: bool) -> Self {
        Self {
            default_allow_overwrite,
        }
    }

    /// Overwrite permission used when a call leaves it unset.
    #[must_use]
    pub const fn default_allow_overwrite(&self) -> bool {
        self.default_allow_overwrite
    }

    /// Writes `data` to `target` and returns the final path.
    ///
    /// # Process
    ///
    /// 1. An existing target is offered to the confirm callback, if any.
    /// 2. Without a callback, an existing target requires overwrite
    ///    permission.
    /// 3. When overwriting with backups enabled, the current bytes are copied
    ///    to `<target>.bak` before anything else is written.
    /// 4. Missing parent directories are created.
    /// 5. The new bytes replace the target atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::Cancelled`] when the callback declines,
    /// [`SafetyError::AlreadyExists`] when overwriting is not allowed, or an
    /// I/O error when the backup or write fails.
    pub fn write_file(
        &self,
        data: &[u8],
        target: &Path,
        options: WriteOptions<'_>,
    ) -> Result<PathBuf, SafetyError> {
        if target.exists() {
            self.authorise_overwrite(target, &options)?;
            if options.backup {
                let backup = backup_path_for(target);
                copy_bytes(target, &backup)?;
                info!(
                    target: SAFETY_TARGET,
                    file = %target.display(),
                    backup = %backup.display(),
                    "backup written before overwrite"
                );
            }
        }

        replace_contents(target, data)?;
        debug!(
            target: SAFETY_TARGET,
            file = %target.display(),
            bytes = data.len(),
            "file written"
        );
        Ok(target.to_path_buf())
    }

    /// Reads the raw bytes of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::NotFound`] when `source` is missing,
    /// [`SafetyError::InvalidInput`] when it is not a regular file, or an I/O
    /// error when it cannot be read.
    pub fn read_file(&self, source: &Path) -> Result<Vec<u8>, SafetyError> {
        if !source.exists() {
            return Err(SafetyError::not_found(source));
        }
        if !source.is_file() {
            return Err(SafetyError::InvalidInput {
                path: source.to_path_buf(),
                reason: "not a regular file",
            });
        }
        fs::read(source).map_err(|err| SafetyError::io("read", source, err))
    }

    /// Copies `source` to `target` with the overwrite rules of
    /// [`write_file`](Self::write_file).
    ///
    /// # Errors
    ///
    /// Returns any error from [`read_file`](Self::read_file) or
    /// [`write_file`](Self::write_file).
    pub fn copy_file(
        &self,
        source: &Path,
        target: &Path,
        options: WriteOptions<'_>,
    ) -> Result<PathBuf, SafetyError> {
        let data = self.read_file(source)?;
        self.write_file(&data, target, options)
    }

    fn authorise_overwrite(
        &self,
        target: &Path,
        options: &WriteOptions<'_>,
    ) -> Result<(), SafetyError> {
        if let Some(confirm) = options.confirm {
            if confirm.confirm(target) {
                return Ok(());
            }
            info!(
                target: SAFETY_TARGET,
                file = %target.display(),
                "overwrite declined by confirmation callback"
            );
            return Err(SafetyError::Cancelled {
                path: target.to_path_buf(),
            });
        }

        if options
            .allow_overwrite
            .unwrap_or(self.default_allow_overwrite)
        {
            return Ok(());
        }
        Err(SafetyError::AlreadyExists {
            path: target.to_path_buf(),
        })
    }
}
