//! HTTP Client
//!
//! Blocking request execution over reqwest. Transports call this from the
//! event loop's blocking pool (async requests) or inline (sync requests).

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::{NetError, Response};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// Max redirects to follow (0 = disable)
    pub max_redirects: u32,
    /// Headers sent with every request
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "fOS-Query/0.1".into(),
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            max_redirects: 10,
            default_headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Start from defaults
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Client configuration builder
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_agent(mut self, ua: &str) -> Self {
        self.config.user_agent = ua.to_string();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, max: u32) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        self.config.default_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Request handed to a backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Request {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Blocking HTTP client.
///
/// The reqwest client is built on first use and shared by every clone.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    config: ClientConfig,
    inner: Arc<OnceLock<reqwest::blocking::Client>>,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            inner: Arc::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Perform `request`, blocking the calling thread
    pub fn execute(&self, request: &Request) -> Result<Response, NetError> {
        let url = validate_url(&request.url)?;
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| NetError::InvalidMethod(request.method.clone()))?;

        let mut builder = self.client()?.request(method, url);
        for (name, value) in self.config.default_headers.iter().chain(request.headers.iter()) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        tracing::info!("HTTP {} {}", request.method, request.url);

        let response = builder.send().map_err(map_reqwest_error)?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();
        let body = response.bytes().map_err(map_reqwest_error)?.to_vec();

        tracing::debug!("HTTP {} {} -> {}", request.method, request.url, status.as_u16());

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }

    fn client(&self) -> Result<&reqwest::blocking::Client, NetError> {
        if let Some(client) = self.inner.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .connect_timeout(self.config.connect_timeout)
            .timeout(self.config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(self.config.max_redirects as usize))
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;
        tracing::debug!("HTTP client built for '{}'", self.config.user_agent);
        Ok(self.inner.get_or_init(|| client))
    }
}

/// Parse an absolute http(s) URL
pub fn validate_url(input: &str) -> Result<url::Url, NetError> {
    let url = url::Url::parse(input).map_err(|e| NetError::InvalidUrl(format!("{}: {}", input, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(NetError::InvalidUrl(format!("{}: unsupported scheme '{}'", input, other))),
    }
}

fn map_reqwest_error(e: reqwest::Error) -> NetError {
    if e.is_timeout() {
        NetError::Timeout
    } else {
        NetError::Network(e.to_string())
    }
}
