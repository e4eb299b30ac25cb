//! Style stage: references in the body against the style definitions part.

use tracing::debug;

use crate::PACKAGE_TARGET;
use crate::markup::{BodyScan, scan_styles};
use crate::package::{Package, STYLES_PART};
use crate::result::{IssueCode, ValidationIssue, ValidationResult};
use crate::validator::ValidatorOptions;

/// Unused styles reported individually before the rest are summarised.
const UNUSED_STYLE_REPORT_LIMIT: usize = 5;

pub(crate) fn run(
    package: &mut Package,
    body: &BodyScan,
    options: &ValidatorOptions,
    result: &mut ValidationResult,
) {
    debug!(target: PACKAGE_TARGET, "style stage started");
    if !package.contains(STYLES_PART) {
        result.push(
            ValidationIssue::warning("No styles.xml found")
                .with_code(IssueCode::MissingStyles)
                .suggest("Document may have no custom styles"),
        );
        return;
    }

    let bytes = match package.read_part(STYLES_PART) {
        Ok(bytes) => bytes,
        Err(err) => {
            result.push(
                ValidationIssue::error(format!("Could not read {STYLES_PART}: {err}"))
                    .with_code(IssueCode::UnreadablePart)
                    .at(STYLES_PART),
            );
            return;
        }
    };
    let definitions = match scan_styles(&bytes) {
        Ok(definitions) => definitions,
        Err(err) => {
            result.push(
                ValidationIssue::error(format!("Malformed XML in {STYLES_PART}: {err}"))
                    .with_code(IssueCode::XmlParseError)
                    .at(STYLES_PART),
            );
            return;
        }
    };

    result.set_metadata("defined_styles", definitions.len());
    result.push(ValidationIssue::info(format!(
        "Found {} defined styles",
        definitions.len()
    )));
    result.set_metadata("used_styles", body.style_refs.len());
    result.push(ValidationIssue::info(format!(
        "Found {} used styles",
        body.style_refs.len()
    )));

    if options.check_consistency {
        for style_id in &body.style_refs {
            if definitions.iter().all(|def| &def.id != style_id) {
                result.push(
                    ValidationIssue::warning(format!("Style '{style_id}' is used but not defined"))
                        .with_code(IssueCode::UndefinedStyle)
                        .at(format!("style '{style_id}'"))
                        .suggest("Add style definition or remove usage"),
                );
            }
        }
    }

    if options.check_unused {
        let unused: Vec<_> = definitions
            .iter()
            .filter(|def| !body.style_refs.contains(&def.id))
            .collect();
        if unused.is_empty() {
            return;
        }

        result.push(ValidationIssue::info(format!(
            "Found {} unused styles",
            unused.len()
        )));
        for def in unused.iter().take(UNUSED_STYLE_REPORT_LIMIT) {
            result.push(
                ValidationIssue::warning(format!("Style '{}' is defined but never used", def.name))
                    .with_code(IssueCode::UnusedStyle)
                    .at(format!("style '{}'", def.id))
                    .suggest("Consider removing unused style"),
            );
        }
        let remaining = unused.len().saturating_sub(UNUSED_STYLE_REPORT_LIMIT);
        if remaining > 0 {
            result.push(ValidationIssue::info(format!(
                "... and {remaining} more unused styles"
            )));
        }
    }
}
