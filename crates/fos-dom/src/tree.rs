//! DOM Tree (arena-based allocation)

use crate::{Node, NodeData, NodeId, ElementData, DomError};

/// Arena-based DOM tree. Slot 0 is always the document node.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()] }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Element data for `id`, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data for `id`
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Number of nodes in the arena (detached nodes included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content))
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node::doctype(name))
    }

    /// Parent of `id`, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Check whether `ancestor` is `id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.get(parent).is_none() {
            return Err(DomError::NodeNotFound(parent));
        }
        if self.get(child).is_none() {
            return Err(DomError::NodeNotFound(child));
        }
        if child == NodeId::ROOT || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Hierarchy { parent, child });
        }
        if matches!(self.nodes[parent.index()].data, NodeData::Text(_) | NodeData::Comment(_) | NodeData::Doctype { .. }) {
            return Err(DomError::Hierarchy { parent, child });
        }

        self.detach(child);

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
        Ok(())
    }

    /// Unlink `id` from its parent and siblings. No-op when already detached.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Detach every child of `parent`.
    ///
    /// Slots are never reused, so a `NodeId` always names the same node and
    /// detached subtrees stay readable. The arena only grows.
    pub fn remove_children(&mut self, parent: NodeId) {
        let children: Vec<NodeId> = self.children(parent).map(|(id, _)| id).collect();
        for child in children {
            self.detach(child);
        }
    }

    /// Iterate over direct children
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        let first = self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next: first }
    }

    /// Descendants of `root` in document (pre-)order, `root` excluded
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).map(|(id, _)| id).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let first = stack.len();
            stack.extend(self.children(id).map(|(child, _)| child));
            stack[first..].reverse();
        }
        out
    }

    /// Event propagation path: `target` followed by its ancestors
    pub fn propagation_path(&self, target: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.get(target).map(|_| target);
        while let Some(id) = current {
            path.push(id);
            current = self.parent(id);
        }
        path
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(t)) | Some(NodeData::Comment(t)) => t.clone(),
            Some(_) => self.descendants(id)
                .into_iter()
                .filter_map(|d| self.get(d).and_then(Node::as_text))
                .collect(),
            None => String::new(),
        }
    }

    /// Replace all children of `id` with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        match self.get_mut(id).map(|n| &mut n.data) {
            None => Err(DomError::NodeNotFound(id)),
            Some(NodeData::Text(t)) | Some(NodeData::Comment(t)) => {
                *t = text.to_string();
                Ok(())
            }
            Some(_) => {
                if let Some(only) = self.sole_text_child(id) {
                    if text.is_empty() {
                        self.detach(only);
                    } else if let Some(NodeData::Text(t)) = self.get_mut(only).map(|n| &mut n.data) {
                        *t = text.to_string();
                    }
                    return Ok(());
                }
                self.remove_children(id);
                if !text.is_empty() {
                    let node = self.create_text(text);
                    self.append_child(id, node)?;
                }
                Ok(())
            }
        }
    }

    fn sole_text_child(&self, parent: NodeId) -> Option<NodeId> {
        let node = self.get(parent)?;
        let first = node.first_child;
        if !first.is_valid() || first != node.last_child {
            return None;
        }
        self.get(first)?.as_text().map(|_| first)
    }

    /// First element child of `parent` with the given tag
    pub fn find_child_element(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|(_, n)| n.as_element().is_some_and(|e| e.tag.eq_ignore_ascii_case(tag)))
            .map(|(id, _)| id)
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the direct children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.is_valid() {
            return None;
        }
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
