//! fOS HTML Parser
//!
//! HTML5 parsing built on html5ever, producing `fos-dom` trees.

mod parser;

pub use parser::HtmlParser;
pub use fos_dom::Document;

use fos_dom::{DomTree, NodeId};

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse(html)
}

/// Parse `markup` as body content and append the result under `parent`
pub fn parse_fragment_into(tree: &mut DomTree, parent: NodeId, markup: &str) -> Result<Vec<NodeId>, ParseError> {
    HtmlParser::new().parse_fragment_into(tree, parent, markup)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to read markup: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tree construction failed: {0}")]
    Dom(#[from] fos_dom::DomError),
}
