//! Content stage: word and character counts against optional bounds.

use tracing::debug;

use super::group_thousands;
use crate::PACKAGE_TARGET;
use crate::markup::BodyScan;
use crate::result::{IssueCode, ValidationIssue, ValidationResult};
use crate::validator::ValidatorOptions;

pub(crate) fn run(body: &BodyScan, options: &ValidatorOptions, result: &mut ValidationResult) {
    let full_text = body.text_runs.join(" ");
    let word_count = to_u64(full_text.split_whitespace().count());
    let character_count = to_u64(full_text.chars().count());
    debug!(target: PACKAGE_TARGET, word_count, character_count, "content stage counted");

    result.set_metadata("word_count", word_count);
    result.set_metadata("character_count", character_count);
    result.push(ValidationIssue::info(format!(
        "Word count: {}",
        group_thousands(word_count)
    )));
    result.push(ValidationIssue::info(format!(
        "Character count: {}",
        group_thousands(character_count)
    )));

    if let Some(min_words) = options.min_words.filter(|min| word_count < *min) {
        let shortfall = min_words - word_count;
        result.set_metadata("word_shortfall", shortfall);
        result.push(
            ValidationIssue::error(format!(
                "Document has {} words, minimum is {}",
                group_thousands(word_count),
                group_thousands(min_words)
            ))
            .with_code(IssueCode::InsufficientWords)
            .suggest(format!("Add at least {} more words", group_thousands(shortfall))),
        );
    }

    if let Some(max_words) = options.max_words.filter(|max| word_count > *max) {
        let excess = word_count - max_words;
        result.set_metadata("word_excess", excess);
        result.push(
            ValidationIssue::error(format!(
                "Document has {} words, maximum is {}",
                group_thousands(word_count),
                group_thousands(max_words)
            ))
            .with_code(IssueCode::ExcessiveWords)
            .suggest(format!("Remove at least {} words", group_thousands(excess))),
        );
    }

    if word_count == 0 {
        result.push(
            ValidationIssue::warning("Document contains no text").with_code(IssueCode::EmptyContent),
        );
    }
}

fn to_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}
