//! Edge case tests for fos-net
//!
//! Transport state machine, providers and event loop delivery.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fos_net::*;

fn scripted() -> (ScriptedProvider, EventLoop) {
    let event_loop = EventLoop::new();
    (ScriptedProvider::new(event_loop.clone()), event_loop)
}

// ============================================================================
// READY STATE TESTS
// ============================================================================

#[test]
fn test_ready_state_ordering() {
    assert!(ReadyState::Unsent < ReadyState::Opened);
    assert!(ReadyState::Loading < ReadyState::Done);
    assert_eq!(ReadyState::Done as u8, 4);
    assert_eq!(ReadyState::default(), ReadyState::Unsent);
}

#[test]
fn test_open_notifies_observers() {
    let (provider, _) = scripted();
    let t = provider.create().unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    t.on_ready_state_change(Rc::new(move |t: &dyn Transport| s.borrow_mut().push(t.ready_state())));

    t.open("GET", "/a", true).unwrap();
    assert_eq!(*seen.borrow(), vec![ReadyState::Opened]);
}

#[test]
fn test_send_before_open_is_invalid() {
    let (provider, _) = scripted();
    let t = provider.create().unwrap();
    assert_eq!(t.send(None), Err(TransportError::InvalidState));
    assert!(provider.requests().is_empty());
}

#[test]
fn test_reopen_resets_response() {
    let (provider, _) = scripted();
    provider.enqueue(ScriptedOutcome::ok("one"));
    let t = provider.create().unwrap();
    t.open("GET", "/a", false).unwrap();
    t.send(None).unwrap();
    assert_eq!(t.response_text(), "one");

    t.open("GET", "/b", false).unwrap();
    assert_eq!(t.ready_state(), ReadyState::Opened);
    assert_eq!(t.status(), 0);
    assert_eq!(t.response_text(), "");
}

// ============================================================================
// ASYNC DELIVERY TESTS
// ============================================================================

#[test]
fn test_async_completion_waits_for_loop() {
    let (provider, event_loop) = scripted();
    provider.enqueue(ScriptedOutcome::ok("later"));

    let t = provider.create().unwrap();
    let done = Rc::new(Cell::new(0));
    let d = done.clone();
    t.on_ready_state_change(Rc::new(move |t: &dyn Transport| {
        if t.ready_state() == ReadyState::Done {
            d.set(d.get() + 1);
        }
    }));
    t.open("GET", "/a", true).unwrap();
    t.send(None).unwrap();

    assert_eq!(done.get(), 0);
    assert_eq!(event_loop.pending(), 1);
    event_loop.run_until_idle();
    assert_eq!(done.get(), 1);
    assert_eq!(t.response_text(), "later");
}

#[test]
fn test_sync_completion_is_inline() {
    let (provider, event_loop) = scripted();
    let t = provider.create().unwrap();
    t.open("GET", "/a", false).unwrap();
    t.send(None).unwrap();
    assert_eq!(t.ready_state(), ReadyState::Done);
    assert_eq!(event_loop.pending(), 0);
}

#[test]
fn test_async_abort_leaves_status_zero() {
    let (provider, event_loop) = scripted();
    provider.enqueue(ScriptedOutcome::Abort);
    let t = provider.create().unwrap();
    t.open("GET", "/a", true).unwrap();
    t.send(None).unwrap();
    event_loop.run_until_idle();
    assert_eq!(t.ready_state(), ReadyState::Done);
    assert_eq!(t.status(), 0);
}

// ============================================================================
// HEADER AND BODY TESTS
// ============================================================================

#[test]
fn test_repeated_headers_are_combined() {
    let (provider, _) = scripted();
    let t = provider.create().unwrap();
    t.open("GET", "/a", false).unwrap();
    t.set_request_header("Accept", "text/html").unwrap();
    t.set_request_header("accept", "application/json").unwrap();
    t.send(None).unwrap();

    let req = provider.last_request().unwrap();
    assert_eq!(req.headers.len(), 1);
    assert_eq!(req.header("Accept"), Some("text/html, application/json"));
}

#[test]
fn test_forbidden_headers_rejected() {
    let (provider, _) = scripted();
    let t = provider.create().unwrap();
    t.open("GET", "/a", false).unwrap();
    for name in ["Host", "Content-Length", "Proxy-Authorization", "Sec-Foo"] {
        assert_eq!(
            t.set_request_header(name, "x"),
            Err(TransportError::ForbiddenHeader(name.to_string()))
        );
    }
}

#[test]
fn test_get_drops_body() {
    let (provider, _) = scripted();
    let t = provider.create().unwrap();
    t.open("GET", "/a", false).unwrap();
    t.send(Some("ignored".into())).unwrap();
    assert_eq!(provider.last_request().unwrap().body, None);
}

#[test]
fn test_method_is_uppercased() {
    let (provider, _) = scripted();
    let t = provider.create().unwrap();
    t.open("delete", "/a", false).unwrap();
    t.send(None).unwrap();
    assert_eq!(provider.last_request().unwrap().method, "DELETE");
}

#[test]
fn test_response_header_missing() {
    let (provider, _) = scripted();
    provider.enqueue(ScriptedOutcome::ok("x"));
    let t = provider.create().unwrap();
    t.open("GET", "/a", false).unwrap();
    t.send(None).unwrap();
    assert_eq!(t.response_header("Content-Type"), None);
}

// ============================================================================
// HTTP CLIENT TESTS
// ============================================================================

#[test]
fn test_http_transport_rejects_relative_url() {
    let provider = HttpTransportProvider::new(ClientConfig::default(), EventLoop::new());
    let t = provider.create().unwrap();
    assert!(matches!(
        t.open("GET", "/relative", true),
        Err(TransportError::Net(NetError::InvalidUrl(_)))
    ));
}

#[test]
fn test_client_config_defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.max_redirects, 10);
    assert!(config.user_agent.starts_with("fOS"));
    assert!(config.default_headers.is_empty());
}

#[test]
fn test_canonical_reasons() {
    assert_eq!(canonical_reason(304), "Not Modified");
    assert_eq!(canonical_reason(599), "");
}
