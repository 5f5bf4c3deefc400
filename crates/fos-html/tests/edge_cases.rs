//! Edge case tests for fos-html
//!
//! Malformed markup, attributes and fragment insertion.

use fos_dom::{DomTree, inner_html};
use fos_html::{HtmlParser, parse, parse_fragment_into};

#[test]
fn test_parse_empty_input() {
    let doc = parse("").unwrap();
    assert!(doc.body().is_valid(), "html5ever always synthesizes a body");
    assert_eq!(inner_html(doc.tree(), doc.body()), "");
}

#[test]
fn test_parse_malformed_html() {
    let html = "<div><p>Unclosed paragraph<span>Unclosed span</div>";
    let doc = parse(html).unwrap();
    let spans = doc.query_selector_all(doc.tree().root(), "div span").unwrap();
    assert_eq!(spans.len(), 1);
}

#[test]
fn test_parse_attributes_lowercased() {
    let doc = parse(r#"<a HREF="/x" Data-Id="7">link</a>"#).unwrap();
    let a = doc.query_selector(doc.tree().root(), "a").unwrap().unwrap();
    let elem = doc.tree().element(a).unwrap();
    assert_eq!(elem.get_attr("href"), Some("/x"));
    assert_eq!(elem.get_attr("data-id"), Some("7"));
}

#[test]
fn test_parse_with_url_and_id_lookup() {
    let doc = HtmlParser::new()
        .parse_with_url(r#"<body><main id="app"></main></body>"#, "https://example.com/")
        .unwrap();
    assert_eq!(doc.url(), "https://example.com/");
    assert!(doc.get_element_by_id("app").is_some());
}

#[test]
fn test_parse_entities_decoded() {
    let doc = parse("<p>a &amp; b &lt; c</p>").unwrap();
    assert_eq!(doc.tree().text_content(doc.body()), "a & b < c");
}

#[test]
fn test_fragment_roundtrip_through_serializer() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let div = tree.create_element("div");
    tree.append_child(root, div).unwrap();

    let markup = r#"<ul class="menu"><li>One</li><li>Two &amp; three</li></ul><br>"#;
    parse_fragment_into(&mut tree, div, markup).unwrap();
    assert_eq!(inner_html(&tree, div), markup);
}

#[test]
fn test_fragment_appends_after_existing_children() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let div = tree.create_element("div");
    tree.append_child(root, div).unwrap();

    parse_fragment_into(&mut tree, div, "<i>a</i>").unwrap();
    let added = parse_fragment_into(&mut tree, div, "<i>b</i>").unwrap();
    assert_eq!(added.len(), 1);
    assert_eq!(tree.text_content(div), "ab");
}

#[test]
fn test_fragment_plain_text() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let p = tree.create_element("p");
    tree.append_child(root, p).unwrap();

    parse_fragment_into(&mut tree, p, "  just text  ").unwrap();
    assert_eq!(tree.text_content(p), "  just text  ");
}
