//! Synthetic `.docx` packages for tests.
//!
//! [`PackageBuilder`] assembles the parts of a minimal WordprocessingML
//! package and writes them as a ZIP archive. Body markup is built from
//! [`paragraph`], [`heading`] and [`words`].

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::package::{
    CONTENT_TYPES_PART, MAIN_DOCUMENT_PART, ROOT_RELATIONSHIPS_PART, STYLES_PART,
};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#
);

const ROOT_RELATIONSHIPS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);

/// Builder for synthetic document packages.
#[derive(Debug, Clone, Default)]
pub struct PackageBuilder {
    parts: Vec<Part>,
}

#[derive(Debug, Clone)]
struct Part {
    name: String,
    contents: Vec<u8>,
    method: CompressionMethod,
}

impl PackageBuilder {
    /// A package with no parts at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A valid package whose body holds `body_xml`.
    #[must_use]
    pub fn with_body(body_xml: &str) -> Self {
        Self::empty()
            .part(CONTENT_TYPES_PART, CONTENT_TYPES_XML)
            .part(ROOT_RELATIONSHIPS_PART, ROOT_RELATIONSHIPS_XML)
            .part(MAIN_DOCUMENT_PART, document_xml(body_xml))
    }

    /// A valid package whose body holds `paragraphs` in order.
    #[must_use]
    pub fn with_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let body: String = paragraphs
            .into_iter()
            .map(|para| para.as_ref().to_owned())
            .collect();
        Self::with_body(&body)
    }

    /// Adds or replaces a deflated part.
    #[must_use]
    pub fn part(self, name: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(name, contents.into(), CompressionMethod::Deflated)
    }

    /// Adds or replaces a part stored without compression, so its bytes
    /// appear verbatim in the archive.
    #[must_use]
    pub fn stored_part(self, name: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(name, contents.into(), CompressionMethod::Stored)
    }

    /// Removes a part.
    #[must_use]
    pub fn without(mut self, name: &str) -> Self {
        self.parts.retain(|part| part.name != name);
        self
    }

    fn insert(mut self, name: &str, contents: Vec<u8>, method: CompressionMethod) -> Self {
        self.parts.retain(|part| part.name != name);
        self.parts.push(Part {
            name: name.to_owned(),
            contents,
            method,
        });
        self
    }

    /// Adds a styles part defining paragraph styles `ids`, each named after
    /// its id.
    #[must_use]
    pub fn with_styles<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let definitions: String = ids
            .into_iter()
            .map(|id| {
                let escaped = escape(id.as_ref());
                format!(
                    r#"<w:style w:type="paragraph" w:styleId="{escaped}"><w:name w:val="{escaped}"/></w:style>"#
                )
            })
            .collect();
        self.part(
            STYLES_PART,
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><w:styles xmlns:w="{W_NS}">{definitions}</w:styles>"#),
        )
    }

    /// Writes the package to `path`.
    ///
    /// # Errors
    ///
    /// Returns any I/O or ZIP encoding failure.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let mut writer = ZipWriter::new(File::create(path)?);
        for part in &self.parts {
            let options = SimpleFileOptions::default().compression_method(part.method);
            writer.start_file(part.name.as_str(), options)?;
            writer.write_all(&part.contents)?;
        }
        writer.finish()?;
        Ok(())
    }
}

/// Wraps body markup in a `w:document` root.
#[must_use]
pub fn document_xml(body_xml: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body_xml}</w:body></w:document>"#
    )
}

/// A paragraph with an optional style and a single text run.
#[must_use]
pub fn paragraph(style: Option<&str>, text: &str) -> String {
    let properties = style
        .map(|id| format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, escape(id)))
        .unwrap_or_default();
    let run = if text.is_empty() {
        String::new()
    } else {
        format!(
            r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape(text)
        )
    };
    format!("<w:p>{properties}{run}</w:p>")
}

/// A paragraph styled `Heading<level>`.
#[must_use]
pub fn heading(level: u8, text: &str) -> String {
    paragraph(Some(&format!("Heading{level}")), text)
}

/// `count` space-separated words.
#[must_use]
pub fn words(count: usize) -> String {
    vec!["word"; count].join(" ")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
