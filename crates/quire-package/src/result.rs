//! Validation result model shared by every check.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ValidationLevel {
    /// The document is unusable or violates a hard constraint.
    Error,
    /// The document is usable but should be reviewed.
    Warning,
    /// Informational finding.
    Info,
}

/// Failure class an [`IssueCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum IssueClass {
    /// The path does not exist.
    NotFound,
    /// The path exists but is not a usable file.
    InvalidInput,
    /// The ZIP container is unreadable or incomplete.
    CorruptArchive,
    /// An XML part is not well-formed.
    MalformedMarkup,
    /// A caller-supplied constraint was not met.
    ConstraintViolation,
}

/// Machine-readable identifier attached to a [`ValidationIssue`].
///
/// Codes render in `SCREAMING_SNAKE_CASE`, e.g. `MISSING_REQUIRED_FILE`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// The document path does not exist.
    FileNotFound,
    /// The document path is not a regular file.
    NotAFile,
    /// The file extension is not `.docx` or `.docm`.
    UnexpectedExtension,
    /// The file is not a ZIP archive.
    InvalidZip,
    /// A mandatory package part is absent.
    MissingRequiredFile,
    /// A package part is not well-formed XML.
    XmlParseError,
    /// A package part could not be decompressed or read.
    UnreadablePart,
    /// A dependent check was skipped because the container is invalid.
    ContainerInvalid,
    /// The package carries no style definitions part.
    MissingStyles,
    /// A style is referenced but never defined.
    UndefinedStyle,
    /// A style is defined but never referenced.
    UnusedStyle,
    /// Headings were required but none exist.
    NoHeadings,
    /// The first paragraph with content is not a heading.
    MissingLeadingHeading,
    /// A heading skips one or more levels.
    HeadingLevelJump,
    /// A heading is deeper than the permitted maximum.
    HeadingTooDeep,
    /// A heading has no text.
    EmptyHeading,
    /// No paragraph has text.
    EmptyDocument,
    /// Fewer words than the configured minimum.
    InsufficientWords,
    /// More words than the configured maximum.
    ExcessiveWords,
    /// The document contains no words at all.
    EmptyContent,
}

impl IssueCode {
    /// Failure class of this code, or `None` for advisory codes.
    #[must_use]
    pub const fn class(self) -> Option<IssueClass> {
        match self {
            Self::FileNotFound => Some(IssueClass::NotFound),
            Self::NotAFile => Some(IssueClass::InvalidInput),
            Self::InvalidZip | Self::MissingRequiredFile | Self::UnreadablePart => {
                Some(IssueClass::CorruptArchive)
            }
            Self::XmlParseError => Some(IssueClass::MalformedMarkup),
            Self::NoHeadings | Self::InsufficientWords | Self::ExcessiveWords => {
                Some(IssueClass::ConstraintViolation)
            }
            _ => None,
        }
    }
}

/// A single finding produced by a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    level: ValidationLevel,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<IssueCode>,
}

impl ValidationIssue {
    /// Creates an issue with the given level and message.
    #[must_use]
    pub fn new(level: ValidationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            location: None,
            suggestion: None,
            code: None,
        }
    }

    /// Creates an error-level issue.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ValidationLevel::Error, message)
    }

    /// Creates a warning-level issue.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ValidationLevel::Warning, message)
    }

    /// Creates an info-level issue.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ValidationLevel::Info, message)
    }

    /// Attaches a machine-readable code.
    #[must_use]
    pub const fn with_code(mut self, code: IssueCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches a location such as `heading 3` or `style 'Title'`.
    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attaches a remediation hint.
    #[must_use]
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Severity.
    #[must_use]
    pub const fn level(&self) -> ValidationLevel {
        self.level
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the issue occurs, if known.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Suggested fix, if any.
    #[must_use]
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    /// Machine-readable code, if any.
    #[must_use]
    pub const fn code(&self) -> Option<IssueCode> {
        self.code
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.level)?;
        if let Some(location) = &self.location {
            write!(f, " ({location})")?;
        }
        write!(f, " {}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " → {suggestion}")?;
        }
        Ok(())
    }
}

/// Ordered issues and metadata produced by one or more checks.
///
/// A result is valid while it holds no [`ValidationLevel::Error`] issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    issues: Vec<ValidationIssue>,
    metadata: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validated_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Creates an empty result for `path`.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        Self {
            validated_path: Some(path.to_path_buf()),
            ..Self::default()
        }
    }

    /// Path the result describes, if any.
    #[must_use]
    pub fn validated_path(&self) -> Option<&Path> {
        self.validated_path.as_deref()
    }

    /// Returns true when no error-level issue has been recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|issue| issue.level == ValidationLevel::Error)
    }

    /// Appends an issue.
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Every issue in the order it was recorded.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Error-level issues.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> + '_ {
        self.at_level(ValidationLevel::Error)
    }

    /// Warning-level issues.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> + '_ {
        self.at_level(ValidationLevel::Warning)
    }

    /// Info-level issues.
    pub fn infos(&self) -> impl Iterator<Item = &ValidationIssue> + '_ {
        self.at_level(ValidationLevel::Info)
    }

    fn at_level(&self, level: ValidationLevel) -> impl Iterator<Item = &ValidationIssue> + '_ {
        self.issues.iter().filter(move |issue| issue.level == level)
    }

    /// Returns true when any issue carries `code`.
    #[must_use]
    pub fn has_code(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|issue| issue.code == Some(code))
    }

    /// Records a metadata value, replacing any previous value for `key`.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// All metadata.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// Metadata value for `key`.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Appends `other`'s issues in order and overlays its metadata.
    ///
    /// The validated path is kept unless this result has none.
    pub fn merge(&mut self, other: Self) {
        self.issues.extend(other.issues);
        self.metadata.extend(other.metadata);
        if self.validated_path.is_none() {
            self.validated_path = other.validated_path;
        }
    }

    /// Multi-line report: verdict, per-level counts, then error and warning
    /// lines.
    #[must_use]
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.is_valid() { "PASSED" } else { "FAILED" };
        writeln!(f, "Validation Result: {verdict}")?;
        writeln!(f, "  Errors: {}", self.errors().count())?;
        writeln!(f, "  Warnings: {}", self.warnings().count())?;
        write!(f, "  Info: {}", self.infos().count())?;

        write_section(f, "Errors", self.errors())?;
        write_section(f, "Warnings", self.warnings())
    }
}

fn write_section<'a>(
    f: &mut fmt::Formatter<'_>,
    heading: &str,
    issues: impl Iterator<Item = &'a ValidationIssue>,
) -> fmt::Result {
    let mut issues = issues.peekable();
    if issues.peek().is_none() {
        return Ok(());
    }
    write!(f, "\n\n{heading}:")?;
    for issue in issues {
        write!(f, "\n  {issue}")?;
    }
    Ok(())
}
