//! The four validation stages.
//!
//! The container stage opens the package and scans the main document part.
//! The other stages consume that scan, so they only run against a package the
//! container stage accepted.

pub(crate) mod container;
pub(crate) mod content;
pub(crate) mod structure;
pub(crate) mod styles;

use crate::markup::BodyScan;
use crate::package::Package;

/// A package that passed the container stage, with its scanned body.
pub(crate) struct OpenedPackage {
    pub(crate) package: Package,
    pub(crate) body: BodyScan,
}

/// Formats `value` with comma thousands separators (`12,345`).
pub(crate) fn group_thousands(value: u64) -> String {
    let mut reversed = String::new();
    let mut in_group = 0_u8;
    for digit in value.to_string().chars().rev() {
        if in_group == 3 {
            reversed.push(',');
            in_group = 0;
        }
        reversed.push(digit);
        in_group += 1;
    }
    reversed.chars().rev().collect()
}
