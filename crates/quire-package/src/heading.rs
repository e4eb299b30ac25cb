//! Mapping from paragraph style ids to heading levels.

/// Decides which paragraph styles are headings and at what level.
///
/// Implemented for any `Fn(&str) -> Option<u8>`, so a lookup can be supplied
/// as a closure:
///
/// ```rust,ignore
/// let titles = |style: &str| (style == "Title").then_some(1);
/// let validator = PackageValidator::new(options).with_heading_profile(titles);
/// ```
pub trait HeadingProfile {
    /// Heading level for `style_id`, or `None` when it is not a heading.
    fn heading_level(&self, style_id: &str) -> Option<u8>;
}

impl<F> HeadingProfile for F
where
    F: Fn(&str) -> Option<u8>,
{
    fn heading_level(&self, style_id: &str) -> Option<u8> {
        self(style_id)
    }
}

/// Headings named by a fixed prefix and a level number, e.g. `Heading2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedStyleHeadings {
    prefix: String,
    max_level: u8,
}

impl NumberedStyleHeadings {
    /// Prefix of the built-in WordprocessingML heading styles.
    pub const DEFAULT_PREFIX: &'static str = "Heading";
    /// Deepest built-in heading level recognised by default.
    pub const DEFAULT_MAX_LEVEL: u8 = 6;

    /// Recognises `<prefix>1` through `<prefix><max_level>`.
    #[must_use]
    pub fn new(prefix: impl Into<String>, max_level: u8) -> Self {
        Self {
            prefix: prefix.into(),
            max_level,
        }
    }
}

impl Default for NumberedStyleHeadings {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFIX, Self::DEFAULT_MAX_LEVEL)
    }
}

impl HeadingProfile for NumberedStyleHeadings {
    fn heading_level(&self, style_id: &str) -> Option<u8> {
        let digits = style_id.strip_prefix(self.prefix.as_str())?;
        let level: u8 = digits.parse().ok()?;
        // Reject spellings such as `Heading01` or `Heading+1`.
        if level.to_string() != digits {
            return None;
        }
        (1..=self.max_level).contains(&level).then_some(level)
    }
}
