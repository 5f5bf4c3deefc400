//! AJAX helper
//!
//! Issues one request per call through a `TransportProvider` and reports
//! the outcome through optional callbacks: zero or one of success/error,
//! then complete. Nothing is returned to the caller.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use fos_net::{ReadyState, Transport, TransportError, TransportProvider};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::querystring::{kvjoin_default, urlcat};

/// Request data
#[derive(Debug, Clone, PartialEq)]
pub enum RequestData {
    /// Sent as-is
    Text(String),
    /// Flat mapping: query string on GET, form body on POST, JSON text otherwise
    Fields(Map<String, Value>),
}

impl From<&str> for RequestData {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RequestData {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Map<String, Value>> for RequestData {
    fn from(fields: Map<String, Value>) -> Self {
        Self::Fields(fields)
    }
}

/// Response body handed to `success`
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    /// Parsed because the response declared a JSON content type
    Json(Value),
}

impl Payload {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Deserialize the payload into `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self {
            Self::Json(value) => T::deserialize(value),
            Self::Text(text) => serde_json::from_str(text),
        }
    }
}

/// Faults reported to the `error` callback
#[derive(Debug, thiserror::Error)]
pub enum AjaxError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

/// `success(payload, status_text, transport)`
pub type SuccessCallback = Box<dyn FnOnce(Payload, &str, &dyn Transport)>;
/// `error(transport, status_text, fault)`
pub type ErrorCallback = Box<dyn FnOnce(&dyn Transport, &str, Option<&AjaxError>)>;
/// `complete(transport, status_text)`
pub type CompleteCallback = Box<dyn FnOnce(&dyn Transport, &str)>;

#[derive(Default)]
struct Callbacks {
    success: Option<SuccessCallback>,
    error: Option<ErrorCallback>,
    complete: Option<CompleteCallback>,
}

impl Callbacks {
    fn success(&mut self, payload: Payload, status_text: &str, transport: &dyn Transport) {
        if let Some(f) = self.success.take() {
            f(payload, status_text, transport);
        }
    }

    fn error(&mut self, transport: &dyn Transport, status_text: &str, fault: Option<&AjaxError>) {
        if let Some(f) = self.error.take() {
            f(transport, status_text, fault);
        }
    }

    fn complete(&mut self, transport: &dyn Transport, status_text: &str) {
        if let Some(f) = self.complete.take() {
            f(transport, status_text);
        }
    }
}

/// Request configuration
pub struct AjaxConfig {
    /// Target URL. A request without one is never issued.
    pub url: Option<String>,
    /// HTTP method, case-insensitive
    pub method: String,
    pub data: Option<RequestData>,
    /// Defer completion to the event loop. Off by default, so a request
    /// settles before `ajax` returns.
    pub asynchronous: bool,
    /// Extra request headers, set after the marker header
    pub headers: Vec<(String, String)>,
    /// Send `X-Requested-With: XMLHttpRequest`
    pub mark_requested_with: bool,
    callbacks: Callbacks,
}

impl Default for AjaxConfig {
    fn default() -> Self {
        Self {
            url: None,
            method: "GET".into(),
            data: None,
            asynchronous: false,
            headers: Vec::new(),
            mark_requested_with: true,
            callbacks: Callbacks::default(),
        }
    }
}

impl AjaxConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    pub fn data(mut self, data: impl Into<RequestData>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Structured data from a JSON object, e.g. `json!({"q": "rust"})`.
    /// Non-object values are sent as their JSON text.
    pub fn fields(mut self, fields: Value) -> Self {
        self.data = Some(match fields {
            Value::Object(map) => RequestData::Fields(map),
            other => RequestData::Text(other.to_string()),
        });
        self
    }

    pub fn asynchronous(mut self, asynchronous: bool) -> Self {
        self.asynchronous = asynchronous;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn mark_requested_with(mut self, mark: bool) -> Self {
        self.mark_requested_with = mark;
        self
    }

    pub fn success(mut self, f: impl FnOnce(Payload, &str, &dyn Transport) + 'static) -> Self {
        self.callbacks.success = Some(Box::new(f));
        self
    }

    pub fn error(mut self, f: impl FnOnce(&dyn Transport, &str, Option<&AjaxError>) + 'static) -> Self {
        self.callbacks.error = Some(Box::new(f));
        self
    }

    pub fn complete(mut self, f: impl FnOnce(&dyn Transport, &str) + 'static) -> Self {
        self.callbacks.complete = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for AjaxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AjaxConfig")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("data", &self.data)
            .field("asynchronous", &self.asynchronous)
            .field("headers", &self.headers)
            .field("mark_requested_with", &self.mark_requested_with)
            .finish_non_exhaustive()
    }
}

type SharedCallbacks = Rc<RefCell<Option<Callbacks>>>;

/// Issue the request described by `config`.
///
/// Setup problems (no URL, no transport) are logged and nothing fires.
/// A status of 0 on completion fires nothing either.
pub fn ajax<P: TransportProvider + ?Sized>(provider: &P, config: AjaxConfig) {
    let AjaxConfig {
        url,
        method,
        data,
        asynchronous,
        headers,
        mark_requested_with,
        callbacks,
    } = config;

    let Some(mut url) = url.filter(|u| !u.is_empty()) else {
        tracing::debug!("ajax: no url, request skipped");
        return;
    };
    let transport = match provider.create() {
        Ok(transport) => transport,
        Err(e) => {
            tracing::debug!("ajax: no transport from '{}': {}", provider.name(), e);
            return;
        }
    };

    let method = match method.trim() {
        "" => "GET".to_string(),
        m => m.to_ascii_uppercase(),
    };

    let mut form_encoded = false;
    let body = match data {
        None => None,
        Some(RequestData::Text(text)) => Some(text),
        Some(RequestData::Fields(fields)) if method == "GET" => {
            url = urlcat(&url, &fields);
            None
        }
        Some(RequestData::Fields(fields)) if method == "POST" => {
            form_encoded = true;
            Some(kvjoin_default(&fields))
        }
        Some(RequestData::Fields(fields)) => Some(Value::Object(fields).to_string()),
    };

    let callbacks: SharedCallbacks = Rc::new(RefCell::new(Some(callbacks)));

    tracing::info!("ajax {} {}", method, url);
    if let Err(e) = transport.open(&method, &url, asynchronous) {
        fail(&callbacks, &*transport, e.into());
        return;
    }

    if mark_requested_with {
        set_header(&*transport, "X-Requested-With", "XMLHttpRequest");
    }
    for (name, value) in &headers {
        set_header(&*transport, name, value);
    }
    if form_encoded {
        set_header(&*transport, "Content-Type", "application/x-www-form-urlencoded");
    }

    let pending = callbacks.clone();
    transport.on_ready_state_change(Rc::new(move |t: &dyn Transport| {
        if t.ready_state() != ReadyState::Done {
            return;
        }
        let status = t.status();
        if status == 0 {
            tracing::debug!("ajax: finished without a response");
            return;
        }
        let taken = pending.borrow_mut().take();
        if let Some(mut callbacks) = taken {
            settle(&mut callbacks, t, status);
        }
    }));

    if transport.ready_state() == ReadyState::Done {
        tracing::debug!("ajax: transport already done, not sending");
        return;
    }

    if let Err(e) = transport.send(body) {
        fail(&callbacks, &*transport, e.into());
    }
}

fn set_header(transport: &dyn Transport, name: &str, value: &str) {
    if let Err(e) = transport.set_request_header(name, value) {
        tracing::warn!("ajax: header '{}' not set: {}", name, e);
    }
}

/// Run success/error then complete for a finished response
fn settle(callbacks: &mut Callbacks, transport: &dyn Transport, status: u16) {
    let status_text = transport.status_text();
    tracing::debug!("ajax: settled with {} {}", status, status_text);

    if status == 200 || status == 304 {
        match payload(transport) {
            Ok(payload) => callbacks.success(payload, &status_text, transport),
            Err(e) => callbacks.error(transport, &status_text, Some(&e)),
        }
    } else {
        callbacks.error(transport, &status_text, None);
    }
    callbacks.complete(transport, &status_text);
}

/// Report a fault raised while opening or sending
fn fail(callbacks: &SharedCallbacks, transport: &dyn Transport, fault: AjaxError) {
    tracing::debug!("ajax: request failed: {}", fault);
    let taken = callbacks.borrow_mut().take();
    if let Some(mut callbacks) = taken {
        let status_text = transport.status_text();
        callbacks.error(transport, &status_text, Some(&fault));
        callbacks.complete(transport, &status_text);
    }
}

fn payload(transport: &dyn Transport) -> Result<Payload, AjaxError> {
    let text = transport.response_text();
    let is_json = transport
        .response_header("Content-Type")
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));

    if is_json && !text.is_empty() {
        Ok(Payload::Json(serde_json::from_str(&text)?))
    } else {
        Ok(Payload::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_net::{EventLoop, ScriptedOutcome, ScriptedProvider};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Default)]
    struct Log(Rc<RefCell<Vec<String>>>);

    impl Log {
        fn push(&self) -> impl Fn(String) + 'static {
            let log = self.0.clone();
            move |entry| log.borrow_mut().push(entry)
        }

        fn entries(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    fn observed(config: AjaxConfig, log: &Log) -> AjaxConfig {
        let (s, e, c) = (log.push(), log.push(), log.push());
        config
            .success(move |payload, text, _| s(format!("success {:?} {}", payload, text)))
            .error(move |t, text, fault| e(format!("error {} {} {}", t.status(), text, fault.is_some())))
            .complete(move |_, text| c(format!("complete {}", text)))
    }

    fn provider() -> (ScriptedProvider, EventLoop) {
        let event_loop = EventLoop::new();
        (ScriptedProvider::new(event_loop.clone()), event_loop)
    }

    #[test]
    fn test_success_then_complete() {
        let (provider, event_loop) = provider();
        provider.enqueue(ScriptedOutcome::ok("hello"));
        let log = Log::default();

        ajax(&provider, observed(AjaxConfig::new("/hello").asynchronous(true), &log));
        assert!(log.entries().is_empty());

        event_loop.run_until_idle();
        assert_eq!(log.entries(), vec!["success Text(\"hello\") OK", "complete OK"]);
    }

    #[test]
    fn test_default_request_settles_before_return() {
        let (provider, event_loop) = provider();
        provider.enqueue(ScriptedOutcome::ok("now"));
        let log = Log::default();

        assert!(!AjaxConfig::new("/now").asynchronous);
        ajax(&provider, observed(AjaxConfig::new("/now"), &log));
        assert_eq!(log.entries(), vec!["success Text(\"now\") OK", "complete OK"]);
        assert_eq!(event_loop.pending(), 0);
    }

    #[test]
    fn test_not_modified_is_success() {
        let (provider, event_loop) = provider();
        provider.enqueue(ScriptedOutcome::status(304));
        let log = Log::default();

        ajax(&provider, observed(AjaxConfig::new("/cached"), &log));
        event_loop.run_until_idle();
        assert_eq!(log.entries(), vec!["success Text(\"\") Not Modified", "complete Not Modified"]);
    }

    #[test]
    fn test_http_error_status() {
        let (provider, event_loop) = provider();
        provider.enqueue(ScriptedOutcome::status(500));
        let log = Log::default();

        ajax(&provider, observed(AjaxConfig::new("/boom"), &log));
        event_loop.run_until_idle();
        assert_eq!(
            log.entries(),
            vec!["error 500 Internal Server Error false", "complete Internal Server Error"]
        );
    }

    #[test]
    fn test_status_zero_is_silent() {
        let (provider, event_loop) = provider();
        provider.enqueue(ScriptedOutcome::Abort);
        let log = Log::default();

        ajax(&provider, observed(AjaxConfig::new("/gone"), &log));
        event_loop.run_until_idle();
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_json_payload() {
        let (provider, event_loop) = provider();
        provider.enqueue(ScriptedOutcome::json(r#"{"n": 3}"#));
        let got = Rc::new(RefCell::new(None));
        let g = got.clone();

        ajax(
            &provider,
            AjaxConfig::new("/data").success(move |payload, _, _| *g.borrow_mut() = Some(payload)),
        );
        event_loop.run_until_idle();
        assert_eq!(*got.borrow(), Some(Payload::Json(json!({"n": 3}))));
    }

    #[test]
    fn test_empty_json_body_is_not_parsed() {
        let (provider, event_loop) = provider();
        provider.enqueue(ScriptedOutcome::json(""));
        let log = Log::default();

        ajax(&provider, observed(AjaxConfig::new("/empty"), &log));
        event_loop.run_until_idle();
        assert_eq!(log.entries()[0], "success Text(\"\") OK");
    }

    #[test]
    fn test_get_fields_go_to_url() {
        let (provider, _) = provider();
        let fields = json!({"q": "a b", "skip": ""});

        ajax(&provider, AjaxConfig::new("/search").fields(fields));
        let req = provider.last_request().unwrap();
        assert_eq!(req.url, "/search?q=a%20b");
        assert_eq!(req.body, None);
        assert_eq!(req.header("X-Requested-With"), Some("XMLHttpRequest"));
    }

    #[test]
    fn test_post_fields_form_encoded() {
        let (provider, _) = provider();
        let fields = json!({"name": "J&J", "n": 2});

        ajax(&provider, AjaxConfig::new("/submit").method("post").fields(fields));
        let req = provider.last_request().unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.url, "/submit");
        assert_eq!(req.body.as_deref(), Some("n=2&name=J%26J"));
        assert_eq!(req.header("Content-Type"), Some("application/x-www-form-urlencoded"));
    }

    #[test]
    fn test_put_fields_sent_as_json_text() {
        let (provider, _) = provider();

        ajax(&provider, AjaxConfig::new("/item").method("put").fields(json!({"a": "b"})));
        let req = provider.last_request().unwrap();
        assert_eq!(req.method, "PUT");
        assert_eq!(req.url, "/item");
        assert_eq!(req.body.as_deref(), Some(r#"{"a":"b"}"#));
        assert_eq!(req.header("Content-Type"), None);
    }

    #[test]
    fn test_missing_url_is_silent() {
        let (provider, _) = provider();
        let log = Log::default();
        ajax(&provider, observed(AjaxConfig::default(), &log));
        ajax(&provider, observed(AjaxConfig::new(""), &log));
        assert!(provider.requests().is_empty());
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_payload_json_typed() {
        #[derive(Deserialize)]
        struct Item {
            id: u32,
        }
        let payload = Payload::Json(json!({"id": 7}));
        assert_eq!(payload.json::<Item>().unwrap().id, 7);
        assert_eq!(Payload::Text("[1,2]".into()).json::<Vec<u8>>().unwrap(), vec![1, 2]);
    }
}
