//! Selection
//!
//! `Target` resolution and the `Wrapper` collection every helper operates on.

use std::fmt;
use std::rc::Rc;

use fos_dom::dom_events::DOM_CONTENT_LOADED;
use fos_dom::{Event, Listener, ListenerId, ListenerOptions, NodeId};

use crate::host::DomHost;

/// What to wrap
#[derive(Clone)]
pub enum Target {
    /// Exactly this node
    Node(NodeId),
    /// Elements matching `selector` under `parent` (the document when `None`)
    Selector { selector: String, parent: Option<NodeId> },
    /// Run once when the document finishes loading
    Ready(Rc<dyn Fn()>),
}

impl Target {
    /// Selector scoped to `parent`
    pub fn scoped(selector: &str, parent: NodeId) -> Self {
        Self::Selector {
            selector: selector.to_string(),
            parent: Some(parent),
        }
    }

    pub fn ready(callback: impl Fn() + 'static) -> Self {
        Self::Ready(Rc::new(callback))
    }
}

impl From<NodeId> for Target {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Self::Selector {
            selector: selector.to_string(),
            parent: None,
        }
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Self::Selector { selector, parent: None }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => f.debug_tuple("Node").field(id).finish(),
            Self::Selector { selector, parent } => f
                .debug_struct("Selector")
                .field("selector", selector)
                .field("parent", parent)
                .finish(),
            Self::Ready(_) => f.write_str("Ready(..)"),
        }
    }
}

/// Ordered collection of nodes bound to a host
pub struct Wrapper<'h, H: DomHost + ?Sized> {
    pub(crate) host: &'h H,
    pub(crate) nodes: Vec<NodeId>,
}

impl<'h, H: DomHost + ?Sized> Wrapper<'h, H> {
    pub fn new(host: &'h H, nodes: Vec<NodeId>) -> Self {
        Self { host, nodes }
    }

    pub fn empty(host: &'h H) -> Self {
        Self::new(host, Vec::new())
    }

    pub fn host(&self) -> &'h H {
        self.host
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.get(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Call `f` with each node and its index, in order
    pub fn each(&self, mut f: impl FnMut(usize, NodeId)) -> &Self {
        for (i, node) in self.iter().enumerate() {
            f(i, node);
        }
        self
    }
}

impl<H: DomHost + ?Sized> Clone for Wrapper<'_, H> {
    fn clone(&self) -> Self {
        Self {
            host: self.host,
            nodes: self.nodes.clone(),
        }
    }
}

impl<H: DomHost + ?Sized> Extend<NodeId> for Wrapper<'_, H> {
    fn extend<I: IntoIterator<Item = NodeId>>(&mut self, iter: I) {
        self.nodes.extend(iter);
    }
}

impl<H: DomHost + ?Sized> fmt::Debug for Wrapper<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapper").field("nodes", &self.nodes).finish()
    }
}

/// Resolve `target` against `host`
pub fn query<'h, H, T>(host: &'h H, target: T) -> Wrapper<'h, H>
where
    H: DomHost + ?Sized,
    T: Into<Target>,
{
    match target.into() {
        Target::Node(id) => Wrapper::new(host, vec![id]),
        Target::Selector { selector, parent } => Wrapper::new(host, select(host, &selector, parent)),
        Target::Ready(callback) => {
            register_ready(host, callback);
            Wrapper::empty(host)
        }
    }
}

/// Every element in the document matching `selector`
pub fn query_all<'h, H: DomHost + ?Sized>(host: &'h H, selector: &str) -> Wrapper<'h, H> {
    Wrapper::new(host, select(host, selector, None))
}

/// Run `callback` once the host fires `DOMContentLoaded`.
/// Repeated registrations each run.
pub fn ready<H: DomHost + ?Sized>(host: &H, callback: impl Fn() + 'static) -> ListenerId {
    register_ready(host, Rc::new(callback))
}

fn register_ready<H: DomHost + ?Sized>(host: &H, callback: Rc<dyn Fn()>) -> ListenerId {
    let listener: Listener = Rc::new(move |_: &mut Event| callback());
    host.add_listener(host.root(), DOM_CONTENT_LOADED, listener, ListenerOptions { once: true })
}

/// Elements matching `selector` under `parent`, in document order.
/// An invalid selector matches nothing.
pub fn select<H: DomHost + ?Sized>(host: &H, selector: &str, parent: Option<NodeId>) -> Vec<NodeId> {
    let scope = parent.unwrap_or_else(|| host.root());
    match host.select(scope, selector) {
        Ok(nodes) => {
            tracing::trace!("select '{}' -> {} match(es)", selector, nodes.len());
            nodes
        }
        Err(e) => {
            tracing::warn!("invalid selector '{}': {}", selector, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Page;
    use std::cell::Cell;

    const HTML: &str = "<section id='s'><p class='a'>1</p><div><p>2</p></div></section><p id='last'>3</p>";

    #[test]
    fn test_query_node() {
        let page = Page::parse(HTML).unwrap();
        let last = page.document().get_element_by_id("last").unwrap();
        let w = query(&page, last);
        assert_eq!(w.len(), 1);
        assert_eq!(w.first(), Some(last));
    }

    #[test]
    fn test_query_selector_document_order() {
        let page = Page::parse(HTML).unwrap();
        let w = query(&page, "p");
        assert_eq!(w.len(), 3);
        let texts: Vec<_> = w.iter().map(|id| page.text_content(id).unwrap()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_query_scoped() {
        let page = Page::parse(HTML).unwrap();
        let section = page.document().get_element_by_id("s").unwrap();
        let w = query(&page, Target::scoped("p", section));
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn test_each_visits_in_order_with_index() {
        let page = Page::parse(HTML).unwrap();
        let mut seen = Vec::new();
        query(&page, "p")
            .each(|i, node| seen.push((i, page.text_content(node).unwrap())))
            .each(|_, node| {
                let _ = page.set_attribute(node, "data-seen", "1");
            });
        assert_eq!(seen, vec![(0, "1".to_string()), (1, "2".to_string()), (2, "3".to_string())]);
        assert_eq!(query(&page, "p[data-seen]").len(), 3);
    }

    #[test]
    fn test_invalid_selector_is_empty() {
        let page = Page::parse(HTML).unwrap();
        assert!(query(&page, "p[").is_empty());
        assert!(query_all(&page, "").is_empty());
    }

    #[test]
    fn test_ready_fires_once() {
        let page = Page::parse(HTML).unwrap();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let w = query(&page, Target::ready(move || h.set(h.get() + 1)));
        assert!(w.is_empty());

        page.finish_loading();
        page.finish_loading();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_ready_not_deduplicated() {
        let page = Page::new("about:blank");
        let hits = Rc::new(Cell::new(0));
        for _ in 0..2 {
            let h = hits.clone();
            ready(&page, move || h.set(h.get() + 1));
        }
        page.finish_loading();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_extend_appends() {
        let page = Page::parse(HTML).unwrap();
        let last = page.document().get_element_by_id("last").unwrap();
        let mut w = query(&page, ".a");
        w.extend([last]);
        assert_eq!(w.len(), 2);
        assert_eq!(w.get(1), Some(last));
        assert_eq!(w.get(2), None);
    }
}
