//! Tests for the streaming markup scanner.

use rstest::rstest;

use crate::markup::{check_well_formed, scan_body, scan_styles};
use crate::test_support::{document_xml, heading, paragraph};

const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

#[test]
fn scans_paragraph_styles_and_text() {
    let body = format!(
        "{}{}",
        heading(1, "Intro"),
        paragraph(Some("BodyText"), "Hello world")
    );
    let scan = scan_body(document_xml(&body).as_bytes()).expect("scan body");

    assert!(scan.has_body);
    assert_eq!(scan.paragraphs.len(), 2);
    let styles: Vec<_> = scan
        .paragraphs
        .iter()
        .map(|para| para.style.as_deref())
        .collect();
    assert_eq!(styles, vec![Some("Heading1"), Some("BodyText")]);
    assert_eq!(scan.text_runs, vec!["Intro", "Hello world"]);
    assert!(scan.style_refs.contains("Heading1"));
    assert!(scan.style_refs.contains("BodyText"));
}

#[test]
fn run_styles_are_references() {
    let body = r#"<w:p><w:r><w:rPr><w:rStyle w:val="Emphasis"/></w:rPr><w:t>x</w:t></w:r></w:p>"#;
    let scan = scan_body(document_xml(body).as_bytes()).expect("scan body");

    assert_eq!(scan.paragraphs.first().and_then(|p| p.style.clone()), None);
    assert!(scan.style_refs.contains("Emphasis"));
}

#[test]
fn first_paragraph_style_wins() {
    let body = r#"<w:p><w:pPr><w:pStyle w:val="A"/><w:pStyle w:val="B"/></w:pPr></w:p>"#;
    let scan = scan_body(document_xml(body).as_bytes()).expect("scan body");

    assert_eq!(
        scan.paragraphs.first().and_then(|p| p.style.as_deref()),
        Some("A")
    );
    assert!(!scan.style_refs.contains("B"));
}

#[test]
fn text_from_nested_paragraphs_reaches_the_outer_one() {
    let body = r#"<w:p><w:r><w:t>outer</w:t></w:r><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:p>"#;
    let scan = scan_body(document_xml(body).as_bytes()).expect("scan body");

    let texts: Vec<_> = scan.paragraphs.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["outerinner", "inner"]);
}

#[test]
fn elements_outside_the_namespace_are_ignored() {
    let xml = format!(
        r#"<w:document xmlns:w="{W}" xmlns:x="urn:other"><w:body><x:p><x:t>hidden</x:t></x:p></w:body></w:document>"#
    );
    let scan = scan_body(xml.as_bytes()).expect("scan body");

    assert!(scan.paragraphs.is_empty());
    assert!(scan.text_runs.is_empty());
    assert_eq!(scan.element_count, 4);
}

#[test]
fn entities_in_text_are_decoded() {
    let scan = scan_body(document_xml(&paragraph(None, "R&D <draft>")).as_bytes())
        .expect("scan body");
    assert_eq!(scan.text_runs, vec!["R&D <draft>"]);
}

#[rstest]
#[case::unclosed("<a><b></a>")]
#[case::truncated("<a><b></b>")]
#[case::second_root("<a/><b/>")]
#[case::trailing_text("<a/>text")]
#[case::stray_close("<a/></a>")]
#[case::no_root("")]
#[case::unbound_element_prefix("<x:a/>")]
#[case::unbound_nested_prefix("<x:root xmlns:x=\"urn:x\"><y:child/></x:root>")]
#[case::unbound_attribute_prefix("<a y:flag=\"1\"/>")]
#[case::prefix_out_of_scope("<a><b xmlns:x=\"urn:x\"/><x:c/></a>")]
fn rejects_malformed_markup(#[case] xml: &str) {
    assert!(check_well_formed(xml.as_bytes()).is_err(), "{xml:?} accepted");
}

#[test]
fn accepts_declaration_and_whitespace_around_the_root() {
    check_well_formed(b"<?xml version=\"1.0\"?>\n<a><b/></a>\n").expect("well formed");
}

#[test]
fn declared_and_reserved_prefixes_are_accepted() {
    check_well_formed(
        br#"<x:a xmlns:x="urn:x" xmlns="urn:default" xml:lang="en"><b x:flag="1"/></x:a>"#,
    )
    .expect("well formed");
}

#[test]
fn unbound_prefix_is_named_in_the_error() {
    let err = check_well_formed(b"<x:root><y:child/></x:root>").expect_err("unbound prefix");
    assert_eq!(err.to_string(), "unbound namespace prefix 'x' at byte 0");
}

#[test]
fn body_with_undeclared_wordprocessing_prefix_is_rejected() {
    let xml = "<w:document><w:body><w:p/></w:body></w:document>";
    assert!(scan_body(xml.as_bytes()).is_err());
}

#[test]
fn errors_carry_a_byte_offset() {
    let err = check_well_formed(b"<a/><b/>").expect_err("second root");
    assert!(err.to_string().contains("at byte 4"), "{err}");
}

#[test]
fn style_definitions_keep_first_position_and_last_name() {
    let xml = format!(
        r#"<w:styles xmlns:w="{W}">
            <w:style w:styleId="Normal"><w:name w:val="Normal"/></w:style>
            <w:style w:styleId="Quote"/>
            <w:style w:styleId="Normal"><w:name w:val="Body"/></w:style>
        </w:styles>"#
    );
    let definitions = scan_styles(xml.as_bytes()).expect("scan styles");

    let pairs: Vec<_> = definitions
        .iter()
        .map(|def| (def.id.as_str(), def.name.as_str()))
        .collect();
    assert_eq!(pairs, vec![("Normal", "Body"), ("Quote", "Quote")]);
}
