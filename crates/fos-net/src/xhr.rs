//! XMLHttpRequest
//!
//! The transport object behind the AJAX helper: an XHR-shaped state machine
//! (`open` → `send` → ready-state notifications) over a pluggable backend.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::client::{validate_url, HttpClient, Request};
use crate::{EventLoop, NetError, Response};

/// XMLHttpRequest ready states
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum ReadyState {
    /// Client has been created, open() not called yet
    #[default]
    Unsent = 0,
    /// open() has been called
    Opened = 1,
    /// send() has been called, headers received
    HeadersReceived = 2,
    /// Downloading, responseText holds partial data
    Loading = 3,
    /// Operation complete
    Done = 4,
}

/// Ready-state observer
pub type ReadyStateHandler = Rc<dyn Fn(&dyn Transport)>;

/// Uniform transport interface.
///
/// Methods take `&self` because observers receive the transport while it
/// is mid-transition.
pub trait Transport {
    /// Initialize a request
    fn open(&self, method: &str, url: &str, asynchronous: bool) -> Result<(), TransportError>;

    /// Add a request header. Repeated names are joined with ", ".
    fn set_request_header(&self, name: &str, value: &str) -> Result<(), TransportError>;

    /// Register a ready-state observer
    fn on_ready_state_change(&self, handler: ReadyStateHandler);

    /// Issue the request
    fn send(&self, body: Option<String>) -> Result<(), TransportError>;

    fn ready_state(&self) -> ReadyState;

    /// HTTP status, 0 until headers arrive or after a network failure
    fn status(&self) -> u16;

    fn status_text(&self) -> String;

    fn response_text(&self) -> String;

    /// Case-insensitive response header lookup
    fn response_header(&self, name: &str) -> Option<String>;
}

/// Transport errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid state")]
    InvalidState,

    #[error("Forbidden header: {0}")]
    ForbiddenHeader(String),

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error("No transport available")]
    Unavailable,
}

/// Boxed future that stays on the event loop thread
pub type LocalBoxFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// Executes requests for an `XmlHttpRequest`
pub trait Backend: 'static {
    /// Perform the request on the calling thread
    fn execute(&self, request: &Request) -> Result<Response, NetError>;

    /// Perform the request without blocking the event loop
    fn execute_async(&self, request: Request) -> LocalBoxFuture<Result<Response, NetError>>;

    /// Check a URL at `open()` time
    fn check_url(&self, _url: &str) -> Result<(), NetError> {
        Ok(())
    }
}

impl Backend for HttpClient {
    fn execute(&self, request: &Request) -> Result<Response, NetError> {
        HttpClient::execute(self, request)
    }

    fn execute_async(&self, request: Request) -> LocalBoxFuture<Result<Response, NetError>> {
        let client = self.clone();
        Box::pin(async move { smol::unblock(move || client.execute(&request)).await })
    }

    fn check_url(&self, url: &str) -> Result<(), NetError> {
        validate_url(url).map(|_| ())
    }
}

#[derive(Debug, Default)]
struct XhrState {
    ready_state: ReadyState,
    status: u16,
    status_text: String,
    response_text: String,
    response_headers: Vec<(String, String)>,
    method: String,
    url: String,
    async_flag: bool,
    request_headers: Vec<(String, String)>,
    send_flag: bool,
}

struct Inner<B> {
    backend: B,
    event_loop: EventLoop,
    state: RefCell<XhrState>,
    handlers: RefCell<Vec<ReadyStateHandler>>,
}

/// XMLHttpRequest object
pub struct XmlHttpRequest<B: Backend = HttpClient> {
    inner: Rc<Inner<B>>,
}

impl<B: Backend> Clone for XmlHttpRequest<B> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<B: Backend> XmlHttpRequest<B> {
    /// Create a new XMLHttpRequest. Async sends complete on `event_loop`.
    pub fn new(backend: B, event_loop: EventLoop) -> Self {
        Self {
            inner: Rc::new(Inner {
                backend,
                event_loop,
                state: RefCell::new(XhrState::default()),
                handlers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Move to `state` and notify observers with no borrow held
    fn set_ready_state(&self, state: ReadyState) {
        self.inner.state.borrow_mut().ready_state = state;
        tracing::trace!("xhr ready state -> {:?}", state);
        let handlers = self.inner.handlers.borrow().clone();
        for handler in handlers {
            handler(self);
        }
    }

    /// Apply the backend's result and walk the remaining states
    fn finish(&self, result: Result<Response, NetError>) -> Result<(), TransportError> {
        match result {
            Ok(response) => {
                {
                    let mut st = self.inner.state.borrow_mut();
                    st.status = response.status;
                    st.status_text = response.status_text.clone();
                    st.response_headers = response.headers.clone();
                }
                self.set_ready_state(ReadyState::HeadersReceived);
                self.inner.state.borrow_mut().response_text = response.text();
                self.set_ready_state(ReadyState::Loading);
                self.set_ready_state(ReadyState::Done);
                Ok(())
            }
            Err(e) => {
                {
                    let mut st = self.inner.state.borrow_mut();
                    st.status = 0;
                    st.status_text.clear();
                    st.response_text.clear();
                    st.response_headers.clear();
                }
                self.set_ready_state(ReadyState::Done);
                match e {
                    NetError::Aborted => Ok(()),
                    e => Err(e.into()),
                }
            }
        }
    }
}

impl<B: Backend> Transport for XmlHttpRequest<B> {
    fn open(&self, method: &str, url: &str, asynchronous: bool) -> Result<(), TransportError> {
        if method.is_empty() || !method.bytes().all(is_token_byte) {
            return Err(TransportError::InvalidMethod(method.to_string()));
        }
        self.inner.backend.check_url(url)?;

        {
            let mut st = self.inner.state.borrow_mut();
            *st = XhrState {
                method: method.to_ascii_uppercase(),
                url: url.to_string(),
                async_flag: asynchronous,
                ..XhrState::default()
            };
        }
        self.set_ready_state(ReadyState::Opened);
        Ok(())
    }

    fn set_request_header(&self, name: &str, value: &str) -> Result<(), TransportError> {
        let mut st = self.inner.state.borrow_mut();
        if st.ready_state != ReadyState::Opened || st.send_flag {
            return Err(TransportError::InvalidState);
        }
        if is_forbidden_header(&name.to_ascii_lowercase()) {
            return Err(TransportError::ForbiddenHeader(name.to_string()));
        }

        match st.request_headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => st.request_headers.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn on_ready_state_change(&self, handler: ReadyStateHandler) {
        self.inner.handlers.borrow_mut().push(handler);
    }

    fn send(&self, body: Option<String>) -> Result<(), TransportError> {
        let (request, asynchronous) = {
            let mut st = self.inner.state.borrow_mut();
            if st.ready_state != ReadyState::Opened || st.send_flag {
                return Err(TransportError::InvalidState);
            }
            st.send_flag = true;

            // GET and HEAD never carry a body
            let body = match st.method.as_str() {
                "GET" | "HEAD" => None,
                _ => body,
            };
            let request = Request {
                method: st.method.clone(),
                url: st.url.clone(),
                headers: st.request_headers.clone(),
                body,
            };
            (request, st.async_flag)
        };

        if asynchronous {
            let this = self.clone();
            let work = self.inner.backend.execute_async(request);
            self.inner.event_loop.spawn(async move {
                let result = work.await;
                if let Err(e) = this.finish(result) {
                    tracing::debug!("async request failed: {}", e);
                }
            });
            Ok(())
        } else {
            let result = self.inner.backend.execute(&request);
            self.finish(result)
        }
    }

    fn ready_state(&self) -> ReadyState {
        self.inner.state.borrow().ready_state
    }

    fn status(&self) -> u16 {
        self.inner.state.borrow().status
    }

    fn status_text(&self) -> String {
        self.inner.state.borrow().status_text.clone()
    }

    fn response_text(&self) -> String {
        self.inner.state.borrow().response_text.clone()
    }

    fn response_header(&self, name: &str) -> Option<String> {
        self.inner
            .state
            .borrow()
            .response_headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }
}

impl<B: Backend> std::fmt::Debug for XmlHttpRequest<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.inner.state.borrow();
        f.debug_struct("XmlHttpRequest")
            .field("method", &st.method)
            .field("url", &st.url)
            .field("ready_state", &st.ready_state)
            .field("status", &st.status)
            .finish()
    }
}

/// RFC 7230 token characters
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// Check if header is forbidden
fn is_forbidden_header(name: &str) -> bool {
    matches!(name,
        "accept-charset" | "accept-encoding" | "access-control-request-headers" |
        "access-control-request-method" | "connection" | "content-length" |
        "cookie" | "cookie2" | "date" | "dnt" | "expect" | "host" |
        "keep-alive" | "origin" | "referer" | "te" | "trailer" |
        "transfer-encoding" | "upgrade" | "via"
    ) || name.starts_with("proxy-") || name.starts_with("sec-")
}
