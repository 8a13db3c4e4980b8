use super::backend::{EventSource, EventStream, Transport, TransportResponse};
use super::sse::SseDecoder;
use crate::error::ErrorKind;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

/// `reqwest`-backed transport for commands and the event stream
///
/// The client carries no overall request timeout so the event stream can
/// stay open indefinitely; command attempts are bounded by the dispatcher.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    async fn finish(response: reqwest::Response) -> TransportResponse {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        TransportResponse { status, body }
    }
}

fn network_failure(err: reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::NetworkFailure(err.to_string())
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, ErrorKind> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(network_failure)?;

        Ok(Self::finish(response).await)
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, ErrorKind> {
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(network_failure)?;

        Ok(Self::finish(response).await)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[async_trait::async_trait]
impl EventSource for HttpTransport {
    async fn subscribe(&self, url: &Url) -> Result<EventStream, ErrorKind> {
        debug!("Opening event stream {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(network_failure)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ErrorKind::Http(status.as_u16()));
        }

        let mut decoder = SseDecoder::new();
        let events = response
            .bytes_stream()
            .map(move |chunk| match chunk {
                Ok(bytes) => match decoder.feed(&bytes) {
                    Ok(events) => events.into_iter().map(Ok).collect::<Vec<_>>(),
                    Err(e) => vec![Err(e)],
                },
                Err(e) => vec![Err(network_failure(e))],
            })
            .flat_map(stream::iter);

        Ok(Box::pin(events))
    }
}
