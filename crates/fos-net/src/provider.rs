//! Transport providers
//!
//! Factories that hand out fresh transports. The AJAX helper asks a
//! provider for one transport per request.

use crate::client::{ClientConfig, HttpClient};
use crate::xhr::{Transport, TransportError, XmlHttpRequest};
use crate::EventLoop;

/// Creates transports on demand
pub trait TransportProvider {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Create a fresh, unopened transport
    fn create(&self) -> Result<Box<dyn Transport>, TransportError>;
}

/// Provider backed by the reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransportProvider {
    client: HttpClient,
    event_loop: EventLoop,
}

impl HttpTransportProvider {
    pub fn new(config: ClientConfig, event_loop: EventLoop) -> Self {
        Self {
            client: HttpClient::new(config),
            event_loop,
        }
    }

    pub fn event_loop(&self) -> &EventLoop {
        &self.event_loop
    }
}

impl TransportProvider for HttpTransportProvider {
    fn name(&self) -> &str {
        "http"
    }

    fn create(&self) -> Result<Box<dyn Transport>, TransportError> {
        Ok(Box::new(XmlHttpRequest::new(self.client.clone(), self.event_loop.clone())))
    }
}

/// Tries providers in order and keeps the first that yields a transport
#[derive(Default)]
pub struct FirstAvailable {
    providers: Vec<Box<dyn TransportProvider>>,
}

impl FirstAvailable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate
    pub fn with(mut self, provider: impl TransportProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl TransportProvider for FirstAvailable {
    fn name(&self) -> &str {
        "first-available"
    }

    fn create(&self) -> Result<Box<dyn Transport>, TransportError> {
        for provider in &self.providers {
            match provider.create() {
                Ok(transport) => {
                    tracing::debug!("using transport provider '{}'", provider.name());
                    return Ok(transport);
                }
                Err(e) => {
                    tracing::debug!("transport provider '{}' unavailable: {}", provider.name(), e);
                }
            }
        }
        Err(TransportError::Unavailable)
    }
}

impl std::fmt::Debug for FirstAvailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}
