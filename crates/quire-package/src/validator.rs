//! Staged validation of a document package.

use std::path::Path;

use tracing::{debug, info};

use crate::PACKAGE_TARGET;
use crate::checks::{self, OpenedPackage};
use crate::error::ValidateError;
use crate::heading::{HeadingProfile, NumberedStyleHeadings};
use crate::result::{IssueCode, ValidationIssue, ValidationResult};

/// Switches and bounds for the validation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Parse every XML part of the package, not only the main document.
    pub check_corruption: bool,
    /// Warn about styles referenced but not defined.
    pub check_consistency: bool,
    /// Warn about styles defined but never referenced.
    pub check_unused: bool,
    /// Fail documents without headings.
    pub require_heading: bool,
    /// Deepest heading level allowed without a warning.
    pub max_depth: Option<u8>,
    /// Minimum word count.
    pub min_words: Option<u64>,
    /// Maximum word count.
    pub max_words: Option<u64>,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            check_corruption: true,
            check_consistency: true,
            check_unused: true,
            require_heading: false,
            max_depth: None,
            min_words: None,
            max_words: None,
        }
    }
}

/// Validates WordprocessingML packages in four stages.
///
/// The container stage gates the others: the style, structure and content
/// stages only inspect a package whose container passed. Each stage can be
/// run on its own, or [`validate`](Self::validate) runs them all against a
/// single opened package.
///
/// Every method returns `Err` only when the path exists but cannot be
/// inspected or opened. All other findings are issues in the returned
/// [`ValidationResult`].
#[derive(Debug, Clone)]
pub struct PackageValidator<P = NumberedStyleHeadings> {
    options: ValidatorOptions,
    headings: P,
}

impl PackageValidator {
    /// Creates a validator recognising `Heading1` to `Heading6`.
    #[must_use]
    pub fn new(options: ValidatorOptions) -> Self {
        Self {
            options,
            headings: NumberedStyleHeadings::default(),
        }
    }
}

impl Default for PackageValidator {
    fn default() -> Self {
        Self::new(ValidatorOptions::default())
    }
}

impl<P: HeadingProfile> PackageValidator<P> {
    /// Replaces the heading profile used by the structure stage.
    #[must_use]
    pub fn with_heading_profile<Q: HeadingProfile>(self, headings: Q) -> PackageValidator<Q> {
        PackageValidator {
            options: self.options,
            headings,
        }
    }

    /// Options in effect.
    #[must_use]
    pub const fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Checks the file, its archive, the required parts and, when
    /// `check_corruption` is set, the markup of every XML part.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::Io`] when the path exists but cannot be
    /// inspected or opened.
    pub fn check_container(&self, path: &Path) -> Result<ValidationResult, ValidateError> {
        let (result, _) = checks::container::run(path, self.options.check_corruption)?;
        Ok(log_verdict("container", result))
    }

    /// Checks style references against style definitions.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::Io`] when the path exists but cannot be
    /// inspected or opened.
    pub fn check_styles(&self, path: &Path) -> Result<ValidationResult, ValidateError> {
        let mut result = ValidationResult::for_path(path);
        if let Some(mut opened) = gate(path, "styles", &mut result)? {
            checks::styles::run(&mut opened.package, &opened.body, &self.options, &mut result);
        }
        Ok(log_verdict("styles", result))
    }

    /// Checks heading presence, order and depth.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::Io`] when the path exists but cannot be
    /// inspected or opened.
    pub fn check_structure(&self, path: &Path) -> Result<ValidationResult, ValidateError> {
        let mut result = ValidationResult::for_path(path);
        if let Some(opened) = gate(path, "structure", &mut result)? {
            checks::structure::run(&opened.body, &self.options, &self.headings, &mut result);
        }
        Ok(log_verdict("structure", result))
    }

    /// Checks word and character counts against the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::Io`] when the path exists but cannot be
    /// inspected or opened.
    pub fn check_content(&self, path: &Path) -> Result<ValidationResult, ValidateError> {
        let mut result = ValidationResult::for_path(path);
        if let Some(opened) = gate(path, "content", &mut result)? {
            checks::content::run(&opened.body, &self.options, &mut result);
        }
        Ok(log_verdict("content", result))
    }

    /// Runs every stage and merges the findings into one result.
    ///
    /// When the container stage fails the other stages are skipped and the
    /// result holds only the container findings.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::Io`] when the path exists but cannot be
    /// inspected or opened.
    pub fn validate(&self, path: &Path) -> Result<ValidationResult, ValidateError> {
        let (mut result, opened) = checks::container::run(path, self.options.check_corruption)?;
        let Some(OpenedPackage { mut package, body }) = opened else {
            debug!(
                target: PACKAGE_TARGET,
                path = %path.display(),
                "container invalid; dependent stages skipped"
            );
            return Ok(log_verdict("full", result));
        };

        checks::styles::run(&mut package, &body, &self.options, &mut result);
        checks::structure::run(&body, &self.options, &self.headings, &mut result);
        checks::content::run(&body, &self.options, &mut result);
        Ok(log_verdict("full", result))
    }
}

/// Runs a shallow container check for a dependent stage. On failure records a
/// single `CONTAINER_INVALID` error in `result` and returns `None`.
fn gate(
    path: &Path,
    stage: &str,
    result: &mut ValidationResult,
) -> Result<Option<OpenedPackage>, ValidateError> {
    let (container, opened) = checks::container::run(path, false)?;
    if opened.is_none() {
        debug!(
            target: PACKAGE_TARGET,
            path = %path.display(),
            stage,
            errors = container.errors().count(),
            "container invalid; stage skipped"
        );
        result.push(
            ValidationIssue::error(format!("Cannot validate {stage}: invalid package"))
                .with_code(IssueCode::ContainerInvalid)
                .suggest("Run the container check for details"),
        );
    }
    Ok(opened)
}

fn log_verdict(stage: &str, result: ValidationResult) -> ValidationResult {
    info!(
        target: PACKAGE_TARGET,
        path = %result
            .validated_path()
            .map(|path| path.display().to_string())
            .unwrap_or_default(),
        stage,
        valid = result.is_valid(),
        errors = result.errors().count(),
        warnings = result.warnings().count(),
        "package validation finished"
    );
    result
}
