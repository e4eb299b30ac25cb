//! Tests for heading profiles.

use rstest::rstest;

use crate::{HeadingProfile, NumberedStyleHeadings};

#[rstest]
#[case::first("Heading1", Some(1))]
#[case::deepest("Heading6", Some(6))]
#[case::beyond_default("Heading7", None)]
#[case::zero("Heading0", None)]
#[case::padded("Heading01", None)]
#[case::signed("Heading+1", None)]
#[case::bare_prefix("Heading", None)]
#[case::lowercase("heading1", None)]
#[case::body("Normal", None)]
fn default_profile_levels(#[case] style: &str, #[case] expected: Option<u8>) {
    assert_eq!(NumberedStyleHeadings::default().heading_level(style), expected);
}

#[test]
fn custom_prefix_and_depth() {
    let profile = NumberedStyleHeadings::new("Titre", 9);
    assert_eq!(profile.heading_level("Titre9"), Some(9));
    assert_eq!(profile.heading_level("Heading1"), None);
}

#[test]
fn closures_act_as_profiles() {
    let titles = |style: &str| (style == "Title").then_some(1_u8);
    assert_eq!(titles.heading_level("Title"), Some(1));
    assert_eq!(titles.heading_level("Heading1"), None);
}
