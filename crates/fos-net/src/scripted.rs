//! Scripted transports
//!
//! An in-memory backend that answers requests from a queue of canned
//! outcomes and records what was sent. Used by tests and demos that must
//! not touch the network.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::client::Request;
use crate::xhr::{Backend, LocalBoxFuture, Transport, TransportError, XmlHttpRequest};
use crate::{EventLoop, NetError, Response};

/// What a scripted request resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome {
    Respond(Response),
    Fail(String),
    Abort,
}

impl ScriptedOutcome {
    /// 200 with a plain-text body
    pub fn ok(body: &str) -> Self {
        Self::Respond(Response::new(200, body))
    }

    /// 200 with an `application/json` body
    pub fn json(body: &str) -> Self {
        Self::Respond(Response::new(200, body).with_header("Content-Type", "application/json"))
    }

    /// Given status with an empty body
    pub fn status(status: u16) -> Self {
        Self::Respond(Response::new(status, ""))
    }

    fn into_result(self) -> Result<Response, NetError> {
        match self {
            Self::Respond(response) => Ok(response),
            Self::Fail(message) => Err(NetError::Network(message)),
            Self::Abort => Err(NetError::Aborted),
        }
    }
}

/// A request as the backend saw it
pub type RecordedRequest = Request;

#[derive(Debug)]
struct Script {
    queue: VecDeque<ScriptedOutcome>,
    fallback: ScriptedOutcome,
    log: Vec<RecordedRequest>,
}

/// Backend that pops outcomes off a shared queue
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    script: Rc<RefCell<Script>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            script: Rc::new(RefCell::new(Script {
                queue: VecDeque::new(),
                fallback: ScriptedOutcome::status(404),
                log: Vec::new(),
            })),
        }
    }

    /// Record `request` and take the next outcome
    fn next(&self, request: &Request) -> Result<Response, NetError> {
        let mut script = self.script.borrow_mut();
        script.log.push(request.clone());
        let outcome = match script.queue.pop_front() {
            Some(outcome) => outcome,
            None => script.fallback.clone(),
        };
        tracing::debug!("scripted {} {} -> {}", request.method, request.url, outcome_label(&outcome));
        outcome.into_result()
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for ScriptedBackend {
    fn execute(&self, request: &Request) -> Result<Response, NetError> {
        self.next(request)
    }

    fn execute_async(&self, request: Request) -> LocalBoxFuture<Result<Response, NetError>> {
        // resolved now, delivered when the loop runs
        Box::pin(std::future::ready(self.next(&request)))
    }
}

fn outcome_label(outcome: &ScriptedOutcome) -> String {
    match outcome {
        ScriptedOutcome::Respond(r) => r.status.to_string(),
        ScriptedOutcome::Fail(m) => format!("fail: {}", m),
        ScriptedOutcome::Abort => "abort".into(),
    }
}

/// Provider whose transports share one scripted backend
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    backend: ScriptedBackend,
    event_loop: EventLoop,
}

impl ScriptedProvider {
    pub fn new(event_loop: EventLoop) -> Self {
        Self {
            backend: ScriptedBackend::new(),
            event_loop,
        }
    }

    pub fn event_loop(&self) -> &EventLoop {
        &self.event_loop
    }

    /// Queue the outcome for the next unanswered request
    pub fn enqueue(&self, outcome: ScriptedOutcome) -> &Self {
        self.backend.script.borrow_mut().queue.push_back(outcome);
        self
    }

    /// Outcome used once the queue is empty (404 by default)
    pub fn set_fallback(&self, outcome: ScriptedOutcome) {
        self.backend.script.borrow_mut().fallback = outcome;
    }

    /// Every request sent so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.backend.script.borrow().log.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.backend.script.borrow().log.last().cloned()
    }
}

impl crate::provider::TransportProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn create(&self) -> Result<Box<dyn Transport>, TransportError> {
        Ok(Box::new(XmlHttpRequest::new(self.backend.clone(), self.event_loop.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TransportProvider;
    use crate::xhr::ReadyState;

    #[test]
    fn test_outcomes_are_consumed_in_order() {
        let provider = ScriptedProvider::new(EventLoop::new());
        provider.enqueue(ScriptedOutcome::ok("first")).enqueue(ScriptedOutcome::status(500));

        let a = provider.create().unwrap();
        a.open("GET", "/a", false).unwrap();
        a.send(None).unwrap();
        assert_eq!(a.response_text(), "first");

        let b = provider.create().unwrap();
        b.open("GET", "/b", false).unwrap();
        b.send(None).unwrap();
        assert_eq!(b.status(), 500);

        let c = provider.create().unwrap();
        c.open("GET", "/c", false).unwrap();
        c.send(None).unwrap();
        assert_eq!(c.status(), 404);

        let urls: Vec<_> = provider.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_request_is_recorded_at_send_time() {
        let event_loop = EventLoop::new();
        let provider = ScriptedProvider::new(event_loop.clone());
        provider.enqueue(ScriptedOutcome::json("{}"));

        let t = provider.create().unwrap();
        t.open("post", "/submit", true).unwrap();
        t.set_request_header("Content-Type", "text/plain").unwrap();
        t.send(Some("payload".into())).unwrap();

        let req = provider.last_request().unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.body.as_deref(), Some("payload"));
        assert_eq!(t.ready_state(), ReadyState::Opened);

        event_loop.run_until_idle();
        assert_eq!(t.ready_state(), ReadyState::Done);
        assert_eq!(t.response_header("content-type").as_deref(), Some("application/json"));
    }

    #[test]
    fn test_fail_outcome_surfaces_network_error() {
        let provider = ScriptedProvider::new(EventLoop::new());
        provider.set_fallback(ScriptedOutcome::Fail("offline".into()));

        let t = provider.create().unwrap();
        t.open("GET", "/x", false).unwrap();
        assert_eq!(
            t.send(None),
            Err(TransportError::Net(NetError::Network("offline".into())))
        );
        assert_eq!(t.status(), 0);
    }
}
