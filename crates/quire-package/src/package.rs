//! Read access to the ZIP container of a document package.

use std::fs::File;
use std::io::Read;

use zip::ZipArchive;
use zip::result::ZipError;

/// Content-types descriptor every package must carry.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
/// Main document body.
pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";
/// Root relationship manifest.
pub const ROOT_RELATIONSHIPS_PART: &str = "_rels/.rels";
/// Style definitions, optional.
pub const STYLES_PART: &str = "word/styles.xml";

/// Parts whose absence makes a package unusable, in reporting order.
pub const REQUIRED_PARTS: [&str; 3] = [
    CONTENT_TYPES_PART,
    MAIN_DOCUMENT_PART,
    ROOT_RELATIONSHIPS_PART,
];

/// An opened package archive.
pub(crate) struct Package {
    archive: ZipArchive<File>,
}

impl Package {
    /// Reads the central directory of `file`.
    pub(crate) fn open(file: File) -> Result<Self, ZipError> {
        ZipArchive::new(file).map(|archive| Self { archive })
    }

    /// Entry names in archive order.
    pub(crate) fn part_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_owned).collect()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Decompresses an entry into memory.
    pub(crate) fn read_part(&mut self, name: &str) -> Result<Vec<u8>, ZipError> {
        let mut entry = self.archive.by_name(name)?;
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// Returns true for entries the deep check parses as XML.
pub(crate) fn is_markup_part(name: &str) -> bool {
    name.ends_with(".xml") || name.ends_with(".rels")
}
