//! Behaviour-driven tests for package validation.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use crate::test_support::{PackageBuilder, heading, paragraph, words};
use crate::{IssueCode, PackageValidator, ValidationResult, ValidatorOptions};

/// A quoted string value from a Gherkin feature file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QuotedString(String);

impl FromStr for QuotedString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim_matches('"').to_owned()))
    }
}

impl QuotedString {
    fn as_str(&self) -> &str {
        &self.0
    }
}

struct TestWorld {
    dir: TempDir,
    name: String,
    builder: Option<PackageBuilder>,
    options: ValidatorOptions,
    result: Option<ValidationResult>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
            name: String::from("doc.docx"),
            builder: None,
            options: ValidatorOptions::default(),
            result: None,
        }
    }
}

impl TestWorld {
    fn path(&self) -> PathBuf {
        self.dir.path().join(&self.name)
    }

    fn result(&self) -> &ValidationResult {
        self.result.as_ref().expect("package should be validated")
    }
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

// Given steps

#[given("a file {name} containing {contents}")]
fn given_plain_file(world: &mut TestWorld, name: QuotedString, contents: QuotedString) {
    world.name = name.as_str().to_owned();
    fs::write(world.path(), contents.as_str()).expect("write file");
}

#[given("a package {name} with paragraph {text}")]
fn given_package_with_paragraph(world: &mut TestWorld, name: QuotedString, text: QuotedString) {
    world.name = name.as_str().to_owned();
    world.builder = Some(PackageBuilder::with_body(&paragraph(None, text.as_str())));
}

#[given("a package {name} with headings {levels}")]
fn given_package_with_headings(world: &mut TestWorld, name: QuotedString, levels: QuotedString) {
    world.name = name.as_str().to_owned();
    let paragraphs: Vec<String> = levels
        .as_str()
        .split(',')
        .map(|raw| {
            let level: u8 = raw.trim().parse().expect("heading level");
            heading(level, &format!("Section at level {level}"))
        })
        .collect();
    world.builder = Some(PackageBuilder::with_paragraphs(paragraphs));
}

#[given("a package {name} with {count} words")]
fn given_package_with_words(world: &mut TestWorld, name: QuotedString, count: usize) {
    world.name = name.as_str().to_owned();
    world.builder = Some(PackageBuilder::with_body(&paragraph(None, &words(count))));
}

#[given("the package lacks part {part}")]
fn given_missing_part(world: &mut TestWorld, part: QuotedString) {
    let builder = world.builder.take().expect("package should be described");
    world.builder = Some(builder.without(part.as_str()));
}

#[given("headings are required")]
fn given_headings_required(world: &mut TestWorld) {
    world.options.require_heading = true;
}

#[given("a minimum of {count} words")]
fn given_minimum_words(world: &mut TestWorld, count: u64) {
    world.options.min_words = Some(count);
}

// When steps

#[when("the package is validated")]
fn when_validated(world: &mut TestWorld) {
    let path = world.path();
    if let Some(builder) = &world.builder {
        builder.write_to(&path).expect("write package");
    }
    let result = PackageValidator::new(world.options)
        .validate(&path)
        .expect("validate package");
    world.result = Some(result);
}

// Then steps

#[then("the result is valid")]
fn then_valid(world: &mut TestWorld) {
    let result = world.result();
    assert!(result.is_valid(), "{result}");
}

#[then("the result is invalid")]
fn then_invalid(world: &mut TestWorld) {
    let result = world.result();
    assert!(!result.is_valid(), "{result}");
}

#[then("the result has exactly {count} error")]
fn then_error_count(world: &mut TestWorld, count: usize) {
    let result = world.result();
    assert_eq!(result.errors().count(), count, "{result}");
}

#[then("an issue has code {code}")]
fn then_issue_code(world: &mut TestWorld, code: QuotedString) {
    let expected = IssueCode::from_str(code.as_str()).expect("known issue code");
    let result = world.result();
    assert!(result.has_code(expected), "expected {expected} in:\n{result}");
}

#[then("an error mentions {snippet}")]
fn then_error_mentions(world: &mut TestWorld, snippet: QuotedString) {
    let result = world.result();
    assert!(
        result
            .errors()
            .any(|issue| issue.message().contains(snippet.as_str())),
        "expected an error mentioning '{}' in:\n{result}",
        snippet.as_str()
    );
}

#[then("a warning mentions {snippet}")]
fn then_warning_mentions(world: &mut TestWorld, snippet: QuotedString) {
    let result = world.result();
    assert!(
        result
            .warnings()
            .any(|issue| issue.message().contains(snippet.as_str())),
        "expected a warning mentioning '{}' in:\n{result}",
        snippet.as_str()
    );
}

#[then("the metadata {key} is {value}")]
fn then_metadata(world: &mut TestWorld, key: QuotedString, value: QuotedString) {
    let result = world.result();
    let actual = result
        .metadata_value(key.as_str())
        .unwrap_or_else(|| panic!("metadata '{}' missing in:\n{result}", key.as_str()));
    assert_eq!(actual.to_string(), value.as_str());
}

#[scenario(path = "tests/features/package_validation.feature")]
fn package_validation_behaviour(world: TestWorld) {
    let _ = world;
}
