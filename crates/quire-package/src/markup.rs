//! Streaming extraction from WordprocessingML parts.
//!
//! Parts are walked once with a namespace-aware `quick-xml` reader. The walk
//! enforces the well-formedness rules a tree parser would (a single root, no
//! stray text outside it, balanced tags) and hands resolved elements to a
//! [`Visitor`] that extracts what a check needs.

use std::collections::BTreeSet;
use std::fmt;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};

/// WordprocessingML main namespace.
const WORDPROCESSING_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Why a part is not well-formed, with the byte offset where it was noticed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MarkupError {
    message: String,
    position: u64,
}

impl MarkupError {
    fn new(message: impl Into<String>, position: u64) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.position)
    }
}

/// An element start with its WordprocessingML attributes resolved.
pub(crate) struct Element {
    in_wordprocessing_ns: bool,
    local_name: Vec<u8>,
    attributes: Vec<(Vec<u8>, String)>,
}

impl Element {
    /// Returns true for `w:<local>` elements.
    fn is_w(&self, local: &[u8]) -> bool {
        self.in_wordprocessing_ns && self.local_name == local
    }

    /// Value of the `w:<local>` attribute.
    fn w_attr(&self, local: &[u8]) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == local)
            .map(|(_, value)| value.as_str())
    }
}

/// Receives the resolved structure of a part.
pub(crate) trait Visitor {
    fn open(&mut self, _element: &Element) {}
    fn close(&mut self, _element: &Element) {}
    fn text(&mut self, _text: &str) {}
}

struct Ignore;

impl Visitor for Ignore {}

/// Checks that `bytes` is a well-formed XML document.
pub(crate) fn check_well_formed(bytes: &[u8]) -> Result<(), MarkupError> {
    walk(bytes, &mut Ignore).map(|_| ())
}

/// Walks `bytes`, returning the number of elements seen.
fn walk(bytes: &[u8], visitor: &mut impl Visitor) -> Result<usize, MarkupError> {
    let mut reader = NsReader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut open: Vec<Element> = Vec::new();
    let mut seen_root = false;
    let mut element_count = 0_usize;

    loop {
        let position = u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX);
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| MarkupError::new(err.to_string(), position))?;

        match event {
            Event::Start(start) | Event::Empty(start)
                if open.is_empty() && seen_root =>
            {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                return Err(MarkupError::new(
                    format!("second root element <{name}>"),
                    position,
                ));
            }
            Event::Start(start) => {
                let element = resolve(&reader, &start, position)?;
                seen_root = true;
                element_count += 1;
                visitor.open(&element);
                open.push(element);
            }
            Event::Empty(start) => {
                let element = resolve(&reader, &start, position)?;
                seen_root = true;
                element_count += 1;
                visitor.open(&element);
                visitor.close(&element);
            }
            Event::End(_) => {
                let Some(element) = open.pop() else {
                    return Err(MarkupError::new("closing tag without an open element", position));
                };
                visitor.close(&element);
            }
            Event::Text(text) => {
                let decoded = text
                    .unescape()
                    .map_err(|err| MarkupError::new(err.to_string(), position))?;
                if open.is_empty() {
                    if !decoded.trim().is_empty() {
                        return Err(MarkupError::new("text outside the root element", position));
                    }
                } else {
                    visitor.text(&decoded);
                }
            }
            Event::CData(data) => {
                if open.is_empty() {
                    return Err(MarkupError::new("CDATA outside the root element", position));
                }
                let decoded = std::str::from_utf8(&data)
                    .map_err(|err| MarkupError::new(err.to_string(), position))?;
                visitor.text(decoded);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let position = u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX);
    if let Some(element) = open.last() {
        let name = String::from_utf8_lossy(&element.local_name).into_owned();
        return Err(MarkupError::new(
            format!("unexpected end of document inside <{name}>"),
            position,
        ));
    }
    if !seen_root {
        return Err(MarkupError::new("no root element", position));
    }
    Ok(element_count)
}

fn resolve(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    position: u64,
) -> Result<Element, MarkupError> {
    let (namespace, local) = reader.resolve_element(start.name());
    require_bound(&namespace, position)?;
    let mut attributes = Vec::new();
    for entry in start.attributes() {
        let attribute = entry.map_err(|err| MarkupError::new(err.to_string(), position))?;
        if attribute.key.as_namespace_binding().is_some() {
            continue;
        }
        let value = attribute
            .unescape_value()
            .map_err(|err| MarkupError::new(err.to_string(), position))?;
        let (attr_namespace, attr_local) = reader.resolve_attribute(attribute.key);
        require_bound(&attr_namespace, position)?;
        if is_wordprocessing(&attr_namespace) {
            attributes.push((attr_local.as_ref().to_vec(), value.into_owned()));
        }
    }

    Ok(Element {
        in_wordprocessing_ns: is_wordprocessing(&namespace),
        local_name: local.as_ref().to_vec(),
        attributes,
    })
}

/// Rejects a prefix with no `xmlns:` declaration in scope. `xml` is
/// predeclared.
fn require_bound(namespace: &ResolveResult<'_>, position: u64) -> Result<(), MarkupError> {
    match namespace {
        ResolveResult::Unknown(prefix) if prefix.as_slice() != b"xml" => Err(MarkupError::new(
            format!(
                "unbound namespace prefix '{}'",
                String::from_utf8_lossy(prefix)
            ),
            position,
        )),
        _ => Ok(()),
    }
}

fn is_wordprocessing(namespace: &ResolveResult<'_>) -> bool {
    matches!(namespace, ResolveResult::Bound(Namespace(uri)) if *uri == WORDPROCESSING_NS)
}

/// A body paragraph: its first paragraph style and its concatenated text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Paragraph {
    pub(crate) style: Option<String>,
    pub(crate) text: String,
}

impl Paragraph {
    /// Text with surrounding whitespace removed.
    pub(crate) fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    pub(crate) fn has_content(&self) -> bool {
        !self.trimmed_text().is_empty()
    }
}

/// Everything the dependent checks need from the main document part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BodyScan {
    pub(crate) element_count: usize,
    pub(crate) has_body: bool,
    /// Paragraphs in document order, nested ones included.
    pub(crate) paragraphs: Vec<Paragraph>,
    /// Style ids referenced by paragraphs (`w:pStyle`) and runs (`w:rStyle`).
    pub(crate) style_refs: BTreeSet<String>,
    /// Non-empty `w:t` contents in document order.
    pub(crate) text_runs: Vec<String>,
}

#[derive(Default)]
struct BodyVisitor {
    scan: BodyScan,
    open_paragraphs: Vec<usize>,
    open_runs: Vec<bool>,
    text_depth: usize,
    current_text: String,
}

impl Visitor for BodyVisitor {
    fn open(&mut self, element: &Element) {
        if !element.in_wordprocessing_ns {
            return;
        }
        match element.local_name.as_slice() {
            b"body" => self.scan.has_body = true,
            b"p" => {
                self.open_paragraphs.push(self.scan.paragraphs.len());
                self.scan.paragraphs.push(Paragraph::default());
            }
            b"r" => self.open_runs.push(false),
            b"pStyle" => self.record_paragraph_style(element),
            b"rStyle" => self.record_run_style(element),
            b"t" => {
                self.text_depth += 1;
            }
            _ => {}
        }
    }

    fn close(&mut self, element: &Element) {
        if element.is_w(b"p") {
            self.open_paragraphs.pop();
        } else if element.is_w(b"r") {
            self.open_runs.pop();
        } else if element.is_w(b"t") {
            self.text_depth = self.text_depth.saturating_sub(1);
            if self.text_depth == 0 {
                self.finish_text();
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.text_depth > 0 {
            self.current_text.push_str(text);
        }
    }
}

impl BodyVisitor {
    fn record_paragraph_style(&mut self, element: &Element) {
        let Some(style) = element.w_attr(b"val").filter(|style| !style.is_empty()) else {
            return;
        };
        let mut claimed = false;
        for index in &self.open_paragraphs {
            if let Some(paragraph) = self.scan.paragraphs.get_mut(*index) {
                if paragraph.style.is_none() {
                    paragraph.style = Some(style.to_owned());
                    claimed = true;
                }
            }
        }
        if claimed {
            self.scan.style_refs.insert(style.to_owned());
        }
    }

    fn record_run_style(&mut self, element: &Element) {
        let Some(style) = element.w_attr(b"val").filter(|style| !style.is_empty()) else {
            return;
        };
        let mut claimed = false;
        for styled in &mut self.open_runs {
            if !*styled {
                *styled = true;
                claimed = true;
            }
        }
        if claimed {
            self.scan.style_refs.insert(style.to_owned());
        }
    }

    fn finish_text(&mut self) {
        let text = std::mem::take(&mut self.current_text);
        if text.is_empty() {
            return;
        }
        for index in &self.open_paragraphs {
            if let Some(paragraph) = self.scan.paragraphs.get_mut(*index) {
                paragraph.text.push_str(&text);
            }
        }
        self.scan.text_runs.push(text);
    }
}

/// Extracts paragraphs, style references and text runs from the main
/// document part.
pub(crate) fn scan_body(bytes: &[u8]) -> Result<BodyScan, MarkupError> {
    let mut visitor = BodyVisitor::default();
    let element_count = walk(bytes, &mut visitor)?;
    visitor.scan.element_count = element_count;
    Ok(visitor.scan)
}

/// A style definition from the styles part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StyleDefinition {
    pub(crate) id: String,
    /// Display name, falling back to the id when the definition has none.
    pub(crate) name: String,
}

#[derive(Default)]
struct StylesVisitor {
    definitions: Vec<StyleDefinition>,
    current: Option<(String, Option<String>)>,
}

impl Visitor for StylesVisitor {
    fn open(&mut self, element: &Element) {
        if element.is_w(b"style") {
            self.current = element
                .w_attr(b"styleId")
                .filter(|id| !id.is_empty())
                .map(|id| (id.to_owned(), None));
        } else if element.is_w(b"name") {
            if let Some((_, name @ None)) = self.current.as_mut() {
                *name = element.w_attr(b"val").map(str::to_owned);
            }
        }
    }

    fn close(&mut self, element: &Element) {
        if !element.is_w(b"style") {
            return;
        }
        let Some((id, name)) = self.current.take() else {
            return;
        };
        let display_name = name.unwrap_or_else(|| id.clone());
        if let Some(existing) = self.definitions.iter_mut().find(|def| def.id == id) {
            existing.name = display_name;
        } else {
            self.definitions.push(StyleDefinition {
                id,
                name: display_name,
            });
        }
    }
}

/// Extracts style definitions in document order. A redefined id keeps its
/// first position and its last name.
pub(crate) fn scan_styles(bytes: &[u8]) -> Result<Vec<StyleDefinition>, MarkupError> {
    let mut visitor = StylesVisitor::default();
    walk(bytes, &mut visitor)?;
    Ok(visitor.definitions)
}
