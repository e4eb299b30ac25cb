//! Container stage: the file, its ZIP archive, required parts and markup.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::debug;

use super::OpenedPackage;
use crate::PACKAGE_TARGET;
use crate::error::ValidateError;
use crate::markup::{BodyScan, check_well_formed, scan_body};
use crate::package::{MAIN_DOCUMENT_PART, Package, REQUIRED_PARTS, is_markup_part};
use crate::result::{IssueCode, ValidationIssue, ValidationResult};

const ACCEPTED_EXTENSIONS: [&str; 2] = ["docx", "docm"];

/// Runs the container stage and hands back the opened package when it passed.
///
/// With `deep` set every XML part is parsed, not just the main document.
pub(crate) fn run(
    path: &Path,
    deep: bool,
) -> Result<(ValidationResult, Option<OpenedPackage>), ValidateError> {
    let mut result = ValidationResult::for_path(path);
    debug!(target: PACKAGE_TARGET, path = %path.display(), deep, "container stage started");

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            result.push(
                ValidationIssue::error(format!("File not found: {}", path.display()))
                    .with_code(IssueCode::FileNotFound)
                    .suggest("Check the file path"),
            );
            return Ok((result, None));
        }
        Err(err) => return Err(ValidateError::io("inspect", path, err)),
    };
    if !metadata.is_file() {
        result.push(
            ValidationIssue::error(format!("Not a file: {}", path.display()))
                .with_code(IssueCode::NotAFile),
        );
        return Ok((result, None));
    }

    check_extension(path, &mut result);

    let file = File::open(path).map_err(|err| ValidateError::io("open", path, err))?;
    let mut package = match Package::open(file) {
        Ok(package) => package,
        Err(err) => {
            debug!(target: PACKAGE_TARGET, path = %path.display(), error = %err, "not a zip archive");
            result.push(
                ValidationIssue::error("Not a valid ZIP file")
                    .with_code(IssueCode::InvalidZip)
                    .suggest("File may be corrupted or not a DOCX document"),
            );
            return Ok((result, None));
        }
    };

    for part in REQUIRED_PARTS {
        if !package.contains(part) {
            result.push(
                ValidationIssue::error(format!("Missing required file: {part}"))
                    .with_code(IssueCode::MissingRequiredFile)
                    .at(part)
                    .suggest("File may be corrupted or not a valid DOCX"),
            );
        }
    }
    if !result.is_valid() {
        return Ok((result, None));
    }

    let Some(body) = scan_main_document(&mut package, &mut result) else {
        return Ok((result, None));
    };
    result.set_metadata("has_body", body.has_body);
    result.set_metadata("element_count", body.element_count);
    result.set_metadata("paragraph_count", body.paragraphs.len());
    result.push(ValidationIssue::info(format!(
        "Document has {} paragraphs",
        body.paragraphs.len()
    )));

    if deep {
        check_all_parts(&mut package, &mut result);
    }

    if result.is_valid() {
        Ok((result, Some(OpenedPackage { package, body })))
    } else {
        Ok((result, None))
    }
}

fn check_extension(path: &Path, result: &mut ValidationResult) {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    let accepted = extension
        .as_deref()
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext));
    if accepted {
        return;
    }
    let suffix = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    result.push(
        ValidationIssue::warning(format!("Unexpected file extension: {suffix}"))
            .with_code(IssueCode::UnexpectedExtension)
            .suggest("DOCX files should have .docx or .docm extension"),
    );
}

fn scan_main_document(
    package: &mut Package,
    result: &mut ValidationResult,
) -> Option<BodyScan> {
    let bytes = match package.read_part(MAIN_DOCUMENT_PART) {
        Ok(bytes) => bytes,
        Err(err) => {
            result.push(
                ValidationIssue::error(format!("Could not read {MAIN_DOCUMENT_PART}: {err}"))
                    .with_code(IssueCode::UnreadablePart)
                    .at(MAIN_DOCUMENT_PART)
                    .suggest("File may be corrupted"),
            );
            return None;
        }
    };

    match scan_body(&bytes) {
        Ok(body) => Some(body),
        Err(err) => {
            result.push(
                ValidationIssue::error(format!("Malformed XML in {MAIN_DOCUMENT_PART}: {err}"))
                    .with_code(IssueCode::XmlParseError)
                    .at(MAIN_DOCUMENT_PART)
                    .suggest("File may be corrupted"),
            );
            None
        }
    }
}

/// Parses every markup part except the already scanned main document.
/// Each malformed part is reported; one failure does not stop the others.
fn check_all_parts(package: &mut Package, result: &mut ValidationResult) {
    for name in package.part_names() {
        if name == MAIN_DOCUMENT_PART || !is_markup_part(&name) {
            continue;
        }
        debug!(target: PACKAGE_TARGET, part = %name, "checking part markup");
        match package.read_part(&name) {
            Ok(bytes) => {
                if let Err(err) = check_well_formed(&bytes) {
                    result.push(
                        ValidationIssue::error(format!("Malformed XML in {name}: {err}"))
                            .with_code(IssueCode::XmlParseError)
                            .at(name),
                    );
                }
            }
            Err(err) => {
                result.push(
                    ValidationIssue::warning(format!("Could not read {name}: {err}"))
                        .with_code(IssueCode::UnreadablePart)
                        .at(name),
                );
            }
        }
    }
}
