//! DOM Node
//!
//! Nodes link to each other by `NodeId` rather than by pointer, so the
//! whole tree lives in one arena and handles stay `Copy`.

use crate::{NodeId, NamedNodeMap, DOMTokenList, InlineStyle};

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::with_data(NodeData::Text(content.to_string()))
    }

    /// Create a comment node
    pub fn comment(content: &str) -> Self {
        Self::with_data(NodeData::Comment(content.to_string()))
    }

    /// Create a doctype node
    pub fn doctype(name: &str) -> Self {
        Self::with_data(NodeData::Doctype { name: name.to_string() })
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// DOCTYPE
    Doctype { name: String },
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase local name
    pub tag: String,
    /// Attributes in insertion order
    pub attrs: NamedNodeMap,
    /// Parsed inline style, mirrored into the `style` attribute
    style: InlineStyle,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: NamedNodeMap::new(),
            style: InlineStyle::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get_attribute(name)
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if name.eq_ignore_ascii_case("style") {
            self.style = InlineStyle::parse(value);
        }
        self.attrs.set_attribute(name, value);
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        if name.eq_ignore_ascii_case("style") {
            self.style = InlineStyle::new();
        }
        self.attrs.remove_named_item(name).map(|a| a.value)
    }

    /// Value of the `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    /// Raw `class` attribute, empty when absent
    pub fn class_name(&self) -> &str {
        self.get_attr("class").unwrap_or("")
    }

    /// Parsed class tokens
    pub fn class_list(&self) -> DOMTokenList {
        DOMTokenList::from_string(self.class_name())
    }

    /// Inline style declarations
    pub fn style(&self) -> &InlineStyle {
        &self.style
    }

    /// Set one inline style property and re-serialize the `style` attribute
    pub fn set_style_property(&mut self, property: &str, value: &str) {
        self.style.set_property(property, value);
        let css_text = self.style.css_text();
        self.attrs.set_attribute("style", &css_text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_tag_lowercased() {
        let node = Node::element("DIV");
        assert_eq!(node.as_element().map(|e| e.tag.as_str()), Some("div"));
    }

    #[test]
    fn test_style_attribute_mirrors_properties() {
        let mut elem = ElementData::new("p");
        elem.set_style_property("color", "red");
        elem.set_style_property("display", "none");
        assert_eq!(elem.get_attr("style"), Some("color: red; display: none;"));

        elem.set_attr("style", "margin: 0");
        assert_eq!(elem.style().get_property("margin"), Some("0"));
        assert_eq!(elem.style().get_property("color"), None);
    }

    #[test]
    fn test_class_list_from_attribute() {
        let mut elem = ElementData::new("span");
        elem.set_attr("class", "a  b c");
        assert_eq!(elem.class_list().length(), 3);
        assert!(elem.class_list().contains("b"));
    }
}
