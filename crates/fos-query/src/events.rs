//! Event facade
//!
//! Handlers return a `HandlerResult`; `Cancel` (or `false`) prevents the
//! default action and stops propagation.

use std::rc::Rc;

use fos_dom::{Event, Listener, ListenerId, ListenerOptions, NodeId};

use crate::host::DomHost;
use crate::wrapper::Wrapper;

/// What a handler asks the facade to do with the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlerResult {
    #[default]
    Continue,
    /// Prevent default and stop propagation
    Cancel,
}

impl From<()> for HandlerResult {
    fn from(_: ()) -> Self {
        Self::Continue
    }
}

impl From<bool> for HandlerResult {
    fn from(keep_going: bool) -> Self {
        if keep_going { Self::Continue } else { Self::Cancel }
    }
}

/// Register `handler` for `event_type` on `target` (bubble phase)
pub fn attach<H, F, R>(host: &H, target: NodeId, event_type: &str, handler: F) -> ListenerId
where
    H: DomHost + ?Sized,
    F: Fn(&mut Event) -> R + 'static,
    R: Into<HandlerResult>,
{
    let listener: Listener = Rc::new(move |event: &mut Event| {
        if handler(event).into() == HandlerResult::Cancel {
            event.prevent_default();
            event.stop_propagation();
        }
    });
    host.add_listener(target, event_type, listener, ListenerOptions::default())
}

/// Fire a bubbling, non-cancelable custom event at `target`
pub fn dispatch<H: DomHost + ?Sized>(host: &H, target: NodeId, event_type: &str) -> bool {
    tracing::debug!("trigger '{}' on {:?}", event_type, target);
    host.dispatch(Event::custom(event_type, target))
}

impl<H: DomHost + ?Sized> Wrapper<'_, H> {
    /// Attach `handler` to every element
    pub fn on<F, R>(&self, event_type: &str, handler: F) -> &Self
    where
        F: Fn(&mut Event) -> R + 'static,
        R: Into<HandlerResult>,
    {
        let handler = Rc::new(handler);
        for node in self.iter() {
            let handler = handler.clone();
            attach(self.host, node, event_type, move |event: &mut Event| handler(event));
        }
        self
    }

    /// Dispatch a custom event on every element
    pub fn trigger(&self, event_type: &str) -> &Self {
        for node in self.iter() {
            dispatch(self.host, node, event_type);
        }
        self
    }
}
