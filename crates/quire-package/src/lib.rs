//! Structural validation of WordprocessingML (`.docx`) packages.
//!
//! A package is a ZIP archive of XML parts. [`PackageValidator`] inspects it
//! without building a document object model, in four stages:
//!
//! 1. **Container**: the file exists, is a ZIP archive, carries the required
//!    parts, and its XML parts are well-formed.
//! 2. **Styles**: style references in the body resolve to definitions, and
//!    definitions are used.
//! 3. **Structure**: heading presence and hierarchy, as decided by a
//!    [`HeadingProfile`].
//! 4. **Content**: word and character counts against optional bounds.
//!
//! Stages 2 to 4 depend on the container stage and are skipped when it fails.
//! Findings come back as a [`ValidationResult`]; a result is valid while it
//! holds no error-level issue. Only filesystem failures on an existing path
//! surface as [`ValidateError`].
//!
//! Events are emitted through `tracing` under the `quire::package` target.

mod checks;
mod error;
mod heading;
mod markup;
mod package;
mod result;
mod validator;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::ValidateError;
pub use heading::{HeadingProfile, NumberedStyleHeadings};
pub use package::{
    CONTENT_TYPES_PART, MAIN_DOCUMENT_PART, REQUIRED_PARTS, ROOT_RELATIONSHIPS_PART, STYLES_PART,
};
pub use result::{IssueClass, IssueCode, ValidationIssue, ValidationLevel, ValidationResult};
pub use validator::{PackageValidator, ValidatorOptions};

/// Tracing target for events emitted by this crate.
pub(crate) const PACKAGE_TARGET: &str = "quire::package";

#[cfg(test)]
mod tests;
