//! Structure stage: heading presence, order, depth and emptiness.

use tracing::debug;

use crate::PACKAGE_TARGET;
use crate::heading::HeadingProfile;
use crate::markup::BodyScan;
use crate::result::{IssueCode, ValidationIssue, ValidationResult};
use crate::validator::ValidatorOptions;

/// Characters of heading text quoted in issue locations.
const LOCATION_TEXT_LIMIT: usize = 50;

struct Heading<'a> {
    /// Position among the headings, counted from 1.
    ordinal: usize,
    /// Position among all paragraphs.
    paragraph: usize,
    level: u8,
    text: &'a str,
}

impl Heading<'_> {
    fn location(&self) -> String {
        let excerpt: String = self.text.chars().take(LOCATION_TEXT_LIMIT).collect();
        format!("heading {}: '{excerpt}'", self.ordinal)
    }
}

pub(crate) fn run(
    body: &BodyScan,
    options: &ValidatorOptions,
    profile: &impl HeadingProfile,
    result: &mut ValidationResult,
) {
    debug!(target: PACKAGE_TARGET, "structure stage started");
    result.set_metadata("paragraph_count", body.paragraphs.len());

    let headings: Vec<Heading<'_>> = body
        .paragraphs
        .iter()
        .enumerate()
        .filter_map(|(paragraph, para)| {
            let level = profile.heading_level(para.style.as_deref()?)?;
            Some((paragraph, level, para.trimmed_text()))
        })
        .enumerate()
        .map(|(index, (paragraph, level, text))| Heading {
            ordinal: index + 1,
            paragraph,
            level,
            text,
        })
        .collect();

    result.set_metadata("heading_count", headings.len());
    result.push(ValidationIssue::info(format!(
        "Found {} headings",
        headings.len()
    )));
    if let Some(max_level) = headings.iter().map(|heading| heading.level).max() {
        result.set_metadata("max_heading_level", max_level);
        result.push(ValidationIssue::info(format!(
            "Maximum heading level: H{max_level}"
        )));
    }

    if options.require_heading {
        check_leading_heading(body, &headings, result);
    }
    if let Some(max_depth) = options.max_depth {
        check_depth(&headings, max_depth, result);
    }
    check_sequence(&headings, result);

    if !body.paragraphs.iter().any(|para| para.has_content()) {
        result.push(
            ValidationIssue::warning("Document appears to be empty (no text content)")
                .with_code(IssueCode::EmptyDocument),
        );
    }
}

fn check_leading_heading(body: &BodyScan, headings: &[Heading<'_>], result: &mut ValidationResult) {
    if headings.is_empty() {
        result.push(
            ValidationIssue::error("Document does not contain any headings")
                .with_code(IssueCode::NoHeadings)
                .suggest("Add at least one heading to structure the document"),
        );
        return;
    }

    let Some(first_content) = body.paragraphs.iter().position(|para| para.has_content()) else {
        return;
    };
    if headings.iter().all(|heading| heading.paragraph != first_content) {
        result.push(
            ValidationIssue::warning("Document does not start with a heading")
                .with_code(IssueCode::MissingLeadingHeading)
                .at(format!("paragraph {}", first_content + 1))
                .suggest("Consider starting with a heading for better structure"),
        );
    }
}

fn check_depth(headings: &[Heading<'_>], max_depth: u8, result: &mut ValidationResult) {
    for heading in headings.iter().filter(|heading| heading.level > max_depth) {
        result.push(
            ValidationIssue::warning(format!(
                "Heading level H{} exceeds max depth H{max_depth}",
                heading.level
            ))
            .with_code(IssueCode::HeadingTooDeep)
            .at(heading.location())
            .suggest(format!("Consider limiting heading depth to H{max_depth}")),
        );
    }
}

/// Flags forward jumps of more than one level between consecutive headings
/// and headings without text.
fn check_sequence(headings: &[Heading<'_>], result: &mut ValidationResult) {
    let mut previous: Option<u8> = None;
    for heading in headings {
        if let Some(prev) = previous {
            if heading.level > prev.saturating_add(1) {
                result.push(
                    ValidationIssue::warning(format!(
                        "Heading level jump: H{prev} → H{} (skips {} level(s))",
                        heading.level,
                        heading.level - prev - 1
                    ))
                    .with_code(IssueCode::HeadingLevelJump)
                    .at(heading.location())
                    .suggest(format!(
                        "Use H{} instead of H{}",
                        prev.saturating_add(1),
                        heading.level
                    )),
                );
            }
        }

        if heading.text.is_empty() {
            result.push(
                ValidationIssue::warning(format!("Empty heading at H{}", heading.level))
                    .with_code(IssueCode::EmptyHeading)
                    .at(format!("heading {}", heading.ordinal)),
            );
        }

        previous = Some(heading.level);
    }
}
