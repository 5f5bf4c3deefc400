//! DOM host
//!
//! The DOM capability the helpers run against, and `Page`, the in-process
//! host built on `fos-dom` and `fos-html`.

use std::cell::{Ref, RefCell};

use fos_dom::{
    inner_html, Document, DomError, DomTree, Event, EventDispatcher, EventListeners, Listener,
    ListenerId, ListenerOptions, NodeId, SelectorError,
};
use fos_html::ParseError;

/// Errors raised by host mutations
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Access to a document and its event system.
///
/// All methods take `&self`; listeners run during `dispatch` and are free
/// to call back into the host.
pub trait DomHost {
    /// The document node
    fn root(&self) -> NodeId;

    /// Elements under `scope` matching `selector`, in document order
    fn select(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError>;

    fn add_listener(&self, target: NodeId, event_type: &str, listener: Listener, options: ListenerOptions) -> ListenerId;

    fn remove_listener(&self, target: NodeId, event_type: &str, id: ListenerId) -> bool;

    /// Fire `event` at its target. Returns false if the default was prevented.
    fn dispatch(&self, event: Event) -> bool;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), HostError>;

    /// Inline style property value
    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    /// Set an inline style property. An empty value removes it.
    fn set_style(&self, node: NodeId, property: &str, value: &str) -> Result<(), HostError>;

    fn inner_html(&self, node: NodeId) -> Option<String>;

    /// Replace the children of `node` with parsed `markup`
    fn set_inner_html(&self, node: NodeId, markup: &str) -> Result<(), HostError>;

    fn text_content(&self, node: NodeId) -> Option<String>;

    /// Replace the children of `node` with a single text node
    fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), HostError>;
}

/// A loaded document with its listeners
#[derive(Debug)]
pub struct Page {
    document: RefCell<Document>,
    listeners: RefCell<EventListeners>,
}

impl Page {
    /// Create a page with an empty html/head/body skeleton
    pub fn new(url: &str) -> Self {
        Self::from_document(Document::new(url))
    }

    /// Parse a full HTML document
    pub fn parse(html: &str) -> Result<Self, ParseError> {
        fos_html::parse(html).map(Self::from_document)
    }

    pub fn parse_with_url(html: &str, url: &str) -> Result<Self, ParseError> {
        fos_html::HtmlParser::new().parse_with_url(html, url).map(Self::from_document)
    }

    pub fn from_document(document: Document) -> Self {
        Self {
            document: RefCell::new(document),
            listeners: RefCell::new(EventListeners::new()),
        }
    }

    /// Borrow the document. Do not hold the borrow across host calls.
    pub fn document(&self) -> Ref<'_, Document> {
        self.document.borrow()
    }

    pub fn url(&self) -> String {
        self.document.borrow().url().to_string()
    }

    /// Fire `DOMContentLoaded` on the document
    pub fn finish_loading(&self) -> bool {
        tracing::debug!("DOMContentLoaded: {}", self.url());
        self.dispatch(Event::content_loaded(self.root()))
    }

    /// Number of listeners registered for `event_type` on `target`
    pub fn listener_count(&self, target: NodeId, event_type: &str) -> usize {
        self.listeners.borrow().count(target, event_type)
    }

    fn with_element<F>(&self, node: NodeId, f: F) -> Result<(), HostError>
    where
        F: FnOnce(&mut DomTree) -> Result<(), HostError>,
    {
        let mut document = self.document.borrow_mut();
        let tree = document.tree_mut();
        let error = match tree.get(node) {
            None => Some(DomError::NodeNotFound(node)),
            Some(n) if !n.is_element() => Some(DomError::NotAnElement(node)),
            Some(_) => None,
        };
        match error {
            Some(e) => Err(e.into()),
            None => f(tree),
        }
    }
}

impl DomHost for Page {
    fn root(&self) -> NodeId {
        self.document.borrow().tree().root()
    }

    fn select(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        self.document.borrow().query_selector_all(scope, selector)
    }

    fn add_listener(&self, target: NodeId, event_type: &str, listener: Listener, options: ListenerOptions) -> ListenerId {
        self.listeners.borrow_mut().add(target, event_type, listener, options)
    }

    fn remove_listener(&self, target: NodeId, event_type: &str, id: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(target, event_type, id)
    }

    fn dispatch(&self, mut event: Event) -> bool {
        let path = {
            let document = self.document.borrow();
            let path = document.tree().propagation_path(event.target);
            if event.bubbles {
                path
            } else {
                path.into_iter().take(1).collect()
            }
        };
        tracing::trace!("dispatch '{}' along {} node(s)", event.event_type, path.len());

        for node in path {
            event.current_target = Some(node);
            // snapshot so listeners can (un)register while running
            let listeners = self.listeners.borrow_mut().take_for_dispatch(node, &event.event_type);
            for listener in listeners {
                listener(&mut event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        event.current_target = None;
        !event.is_default_prevented()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let document = self.document.borrow();
        document.tree().element(node)?.get_attr(name).map(String::from)
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), HostError> {
        self.with_element(node, |tree| {
            if let Some(element) = tree.element_mut(node) {
                element.set_attr(name, value);
            }
            Ok(())
        })
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        let document = self.document.borrow();
        document.tree().element(node)?.style().get_property(property).map(String::from)
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) -> Result<(), HostError> {
        self.with_element(node, |tree| {
            if let Some(element) = tree.element_mut(node) {
                element.set_style_property(property, value);
            }
            Ok(())
        })
    }

    fn inner_html(&self, node: NodeId) -> Option<String> {
        let document = self.document.borrow();
        document.tree().get(node)?;
        Some(inner_html(document.tree(), node))
    }

    fn set_inner_html(&self, node: NodeId, markup: &str) -> Result<(), HostError> {
        self.with_element(node, |tree| {
            tree.remove_children(node);
            fos_html::parse_fragment_into(tree, node, markup)?;
            Ok(())
        })
    }

    fn text_content(&self, node: NodeId) -> Option<String> {
        let document = self.document.borrow();
        document.tree().get(node)?;
        Some(document.tree().text_content(node))
    }

    fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), HostError> {
        self.with_element(node, |tree| Ok(tree.set_text_content(node, text)?))
    }
}

impl EventDispatcher for Page {
    fn dispatch_event(&self, event: Event) -> bool {
        self.dispatch(event)
    }
}
