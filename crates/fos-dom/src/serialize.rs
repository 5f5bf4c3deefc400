//! Markup serialization (innerHTML / outerHTML)

use crate::{DomTree, NodeData, NodeId};

/// Elements that never have children or an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "source", "track", "wbr",
];

/// Elements whose text children are emitted verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Serialize the children of `id`
pub fn inner_html(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    let raw = tree
        .element(id)
        .is_some_and(|e| RAW_TEXT_ELEMENTS.contains(&e.tag.as_str()));
    for (child, _) in tree.children(id) {
        write_node(tree, child, raw, &mut out);
    }
    out
}

/// Serialize `id` itself, including its own tag
pub fn outer_html(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, false, &mut out);
    out
}

fn write_node(tree: &DomTree, id: NodeId, raw_text: bool, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    match &node.data {
        NodeData::Document => out.push_str(&inner_html(tree, id)),
        NodeData::Doctype { name } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeData::Text(text) if raw_text => out.push_str(text),
        NodeData::Text(text) => out.push_str(&escape_text(text)),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element(elem) => {
            out.push('<');
            out.push_str(&elem.tag);
            for attr in elem.attrs.iter() {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                out.push_str(&escape_attr(&attr.value));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                return;
            }
            out.push_str(&inner_html(tree, id));
            out.push_str("</");
            out.push_str(&elem.tag);
            out.push('>');
        }
    }
}

/// Escape text content
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}
