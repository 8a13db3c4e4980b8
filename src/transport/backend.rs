use crate::error::ErrorKind;
use futures::Stream;
use reqwest::Url;
use std::pin::Pin;

/// Status and body of a completed request
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body (may be empty)
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Messages pushed over a live subscription, one `data` payload per item.
///
/// An `Err` item means the connection broke; the stream ending means the
/// server closed it. Either way the session is over.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<String, ErrorKind>> + Send>>;

/// Request/response capability used by the command dispatcher
///
/// Implementations do not apply their own timeouts; the dispatcher bounds
/// every attempt and drops the future when the deadline passes.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET with no body
    async fn get(&self, url: &str) -> Result<TransportResponse, ErrorKind>;

    /// Issue a POST with a JSON body
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, ErrorKind>;

    /// Transport name for logging
    fn name(&self) -> &str;
}

/// Persistent server-push capability used by the stream consumer
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Open a subscription.
    ///
    /// Returning `Ok` is the "open" signal: the handshake succeeded and
    /// messages may follow.
    async fn subscribe(&self, url: &Url) -> Result<EventStream, ErrorKind>;
}
