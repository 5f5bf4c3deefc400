//! fOS DOM - Document Object Model
//!
//! Arena-allocated DOM tree backing the fOS Query helpers.

mod node;
mod tree;
mod document;
mod attributes;
mod classlist;
mod style;
mod selector;
mod serialize;
pub mod dom_events;

pub use node::{Node, NodeData, ElementData};
pub use tree::{DomTree, Children};
pub use document::Document;
pub use attributes::{Attr, NamedNodeMap};
pub use classlist::DOMTokenList;
pub use style::InlineStyle;
pub use selector::{SelectorList, SelectorError};
pub use serialize::{inner_html, outer_html, escape_text, escape_attr};
pub use dom_events::{Event, EventListeners, Listener, ListenerId, ListenerOptions, EventDispatcher};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// DOM mutation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Cannot insert {child:?} into {parent:?}")]
    Hierarchy { parent: NodeId, child: NodeId },
}
