//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it into our arena DOM.

use fos_dom::{Document, DomTree, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::ParseError;

/// HTML5 parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, ParseError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, ParseError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = Self::parse_rcdom(html)?;

        let mut document = Document::empty(url);
        let root = document.tree().root();
        for child in dom.document.children.borrow().iter() {
            convert_node(child, document.tree_mut(), root, false)?;
        }
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Parse `markup` as the content of a <body> and append the resulting
    /// nodes to `parent`. Returns the top-level nodes that were appended.
    pub fn parse_fragment_into(&self, tree: &mut DomTree, parent: NodeId, markup: &str) -> Result<Vec<NodeId>, ParseError> {
        let wrapped = format!("<html><head></head><body>{}</body></html>", markup);
        let dom = Self::parse_rcdom(&wrapped)?;

        let Some(body) = find_element(&dom.document, &["html", "body"]) else {
            return Ok(Vec::new());
        };

        let before = tree.children(parent).count();
        for child in body.children.borrow().iter() {
            convert_node(child, tree, parent, true)?;
        }
        Ok(tree.children(parent).skip(before).map(|(id, _)| id).collect())
    }

    fn parse_rcdom(html: &str) -> Result<RcDom, ParseError> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;
        Ok(dom)
    }
}

/// Follow a chain of element names down from `handle`
fn find_element(handle: &Handle, path: &[&str]) -> Option<Handle> {
    let Some((first, rest)) = path.split_first() else {
        return Some(handle.clone());
    };
    let child = handle.children.borrow().iter().find(|c| match &c.data {
        RcNodeData::Element { name, .. } => &*name.local == *first,
        _ => false,
    })?.clone();
    find_element(&child, rest)
}

/// Convert an RcDom node (and its subtree) into `tree` under `parent`
fn convert_node(handle: &Handle, tree: &mut DomTree, parent: NodeId, keep_whitespace: bool) -> Result<(), ParseError> {
    match &handle.data {
        RcNodeData::Document => {
            for child in handle.children.borrow().iter() {
                convert_node(child, tree, parent, keep_whitespace)?;
            }
        }
        RcNodeData::Doctype { name, .. } => {
            let id = tree.create_doctype(name);
            tree.append_child(parent, id)?;
        }
        RcNodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if keep_whitespace || !text.trim().is_empty() {
                let id = tree.create_text(&text);
                tree.append_child(parent, id)?;
            }
        }
        RcNodeData::Comment { contents } => {
            let id = tree.create_comment(contents);
            tree.append_child(parent, id)?;
        }
        RcNodeData::Element { name, attrs, .. } => {
            let id = tree.create_element(&name.local);
            if let Some(elem) = tree.element_mut(id) {
                for attr in attrs.borrow().iter() {
                    elem.set_attr(&attr.name.local, &attr.value);
                }
            }
            tree.append_child(parent, id)?;

            for child in handle.children.borrow().iter() {
                convert_node(child, tree, id, keep_whitespace)?;
            }
        }
        RcNodeData::ProcessingInstruction { .. } => {}
    }
    Ok(())
}
