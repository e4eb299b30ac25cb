//! Atomic replacement of file contents.
//!
//! New bytes are written to a sibling temporary file and renamed over the
//! target, so a concurrent reader sees either the old or the new contents and
//! never a partial write.

use std::ffi::OsStr;
use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use crate::error::SafetyError;

/// Suffix appended to a file name to form its backup path.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Returns the backup location for `path`: the same path with a literal
/// `.bak` appended to its file name (`report.docx` → `report.docx.bak`).
#[must_use]
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsStr::to_os_string)
        .unwrap_or_default();
    name.push(BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// Directory holding `path`, treating a bare file name as the current
/// directory.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Creates every missing ancestor of `path`.
pub(crate) fn ensure_parent(path: &Path) -> Result<(), SafetyError> {
    let parent = parent_dir(path);
    fs::create_dir_all(parent).map_err(|err| SafetyError::io("create directory", parent, err))
}

/// Replaces the contents of `path` with `data`.
///
/// The temp file is created in the target's directory so the final rename
/// stays on one filesystem. Permissions of an existing target carry over.
pub(crate) fn replace_contents(path: &Path, data: &[u8]) -> Result<(), SafetyError> {
    ensure_parent(path)?;
    let parent = parent_dir(path);

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)
        .map_err(|err| SafetyError::io("write", path, err))?;

    temp_file
        .write_all(data)
        .map_err(|err| SafetyError::io("write", path, err))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|err| SafetyError::io("sync", path, err))?;

    if let Ok(metadata) = fs::metadata(path) {
        temp_file
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(|err| SafetyError::io("copy permissions to", path, err))?;
    }

    temp_file
        .persist(path)
        .map_err(|err| SafetyError::io("write", path, err.error))?;

    Ok(())
}

/// Copies the current bytes of `source` to `destination` verbatim.
pub(crate) fn copy_bytes(source: &Path, destination: &Path) -> Result<(), SafetyError> {
    fs::copy(source, destination)
        .map(|_| ())
        .map_err(|err| SafetyError::io("copy", source, err))
}
