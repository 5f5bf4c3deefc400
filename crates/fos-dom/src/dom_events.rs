//! DOM Events
//!
//! Event objects and per-node listener registration. Dispatch itself lives
//! with whoever owns the tree, so listeners can run without a borrow held.

use std::collections::HashMap;
use std::rc::Rc;

use crate::NodeId;

/// Fired on the document once parsing has finished
pub const DOM_CONTENT_LOADED: &str = "DOMContentLoaded";

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: Option<NodeId>,
    pub bubbles: bool,
    pub cancelable: bool,
    /// Free-form payload for custom events
    pub detail: Option<String>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// Create an event with explicit bubbling/cancelable flags
    pub fn new(event_type: &str, target: NodeId, bubbles: bool, cancelable: bool) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: None,
            bubbles,
            cancelable,
            detail: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Bubbling, non-cancelable custom event
    pub fn custom(event_type: &str, target: NodeId) -> Self {
        Self::new(event_type, target, true, false)
    }

    /// Create DOMContentLoaded event
    pub fn content_loaded(document: NodeId) -> Self {
        Self::new(DOM_CONTENT_LOADED, document, true, false)
    }

    /// Prevent default action. Ignored for non-cancelable events.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation to further nodes on the path
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Event listener callback
pub type Listener = Rc<dyn Fn(&mut Event)>;

/// Handle returned on registration, used for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Listener options
#[derive(Debug, Clone, Copy, Default)]
pub struct ListenerOptions {
    /// Remove the listener after its first invocation
    pub once: bool,
}

struct Registration {
    id: ListenerId,
    listener: Listener,
    once: bool,
}

/// Listener registry keyed by (node, event type)
#[derive(Default)]
pub struct EventListeners {
    by_target: HashMap<(NodeId, String), Vec<Registration>>,
    next_id: u64,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Duplicate registrations are kept.
    pub fn add(&mut self, target: NodeId, event_type: &str, listener: Listener, options: ListenerOptions) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.by_target
            .entry((target, event_type.to_string()))
            .or_default()
            .push(Registration { id, listener, once: options.once });
        id
    }

    /// Remove a listener by handle
    pub fn remove(&mut self, target: NodeId, event_type: &str, id: ListenerId) -> bool {
        let key = (target, event_type.to_string());
        let Some(list) = self.by_target.get_mut(&key) else { return false };
        let before = list.len();
        list.retain(|r| r.id != id);
        let removed = list.len() < before;
        if list.is_empty() {
            self.by_target.remove(&key);
        }
        removed
    }

    /// Snapshot the listeners to invoke for one node, dropping `once` entries
    pub fn take_for_dispatch(&mut self, target: NodeId, event_type: &str) -> Vec<Listener> {
        let key = (target, event_type.to_string());
        let Some(list) = self.by_target.get_mut(&key) else { return Vec::new() };
        let snapshot = list.iter().map(|r| r.listener.clone()).collect();
        list.retain(|r| !r.once);
        if list.is_empty() {
            self.by_target.remove(&key);
        }
        snapshot
    }

    /// Number of listeners registered for a node and type
    pub fn count(&self, target: NodeId, event_type: &str) -> usize {
        self.by_target
            .get(&(target, event_type.to_string()))
            .map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListeners")
            .field("targets", &self.by_target.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// Event dispatcher trait
pub trait EventDispatcher {
    /// Dispatch `event` along its propagation path.
    /// Returns false if a listener prevented the default action.
    fn dispatch_event(&self, event: Event) -> bool;
}
