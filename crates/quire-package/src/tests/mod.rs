//! Unit tests for package validation.

mod heading_tests;
mod markup_tests;

mod behaviour;

use std::path::PathBuf;

use tempfile::TempDir;

use crate::test_support::PackageBuilder;

/// Writes `builder` as `name` inside `dir`.
fn write_package(dir: &TempDir, name: &str, builder: &PackageBuilder) -> PathBuf {
    let path = dir.path().join(name);
    builder.write_to(&path).expect("write package");
    path
}
