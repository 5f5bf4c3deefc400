//! fOS Networking
//!
//! XMLHttpRequest-style transports, the blocking HTTP client behind them,
//! and the single-threaded event loop that delivers their callbacks.

pub mod client;
pub mod event_loop;
pub mod provider;
pub mod scripted;
pub mod xhr;

pub use client::{ClientConfig, ClientConfigBuilder, HttpClient, Request};
pub use event_loop::EventLoop;
pub use provider::{FirstAvailable, HttpTransportProvider, TransportProvider};
pub use scripted::{RecordedRequest, ScriptedBackend, ScriptedOutcome, ScriptedProvider};
pub use xhr::{Backend, LocalBoxFuture, ReadyState, ReadyStateHandler, Transport, TransportError, XmlHttpRequest};

/// HTTP Response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// Build a response with a canonical status text
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: canonical_reason(status).to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Get body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check if response is successful
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Reason phrase for the status codes the helpers care about
pub fn canonical_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

/// Network error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Request aborted")]
    Aborted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_is_success() {
        assert!(Response::new(200, "").is_success());
        assert!(!Response::new(404, "").is_success());
        assert!(!Response::new(304, "").is_success());
    }

    #[test]
    fn test_response_header_case_insensitive() {
        let resp = Response::new(200, "{}").with_header("Content-Type", "application/json");
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.status_text, "OK");
    }

    #[test]
    fn test_response_text_lossy() {
        let resp = Response::new(200, vec![b'h', b'i', 0xff]);
        assert_eq!(resp.text(), "hi\u{fffd}");
    }
}
