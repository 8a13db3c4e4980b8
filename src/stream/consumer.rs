use super::events::{InboundEvent, Mood};
use super::handler::EventHandler;
use crate::connectivity::ConnectivityMonitor;
use crate::error::ErrorKind;
use crate::retry::{RetryDecision, RetryPolicy};
use crate::transport::{EventSource, EventStream};
use anyhow::{Context, Result};
use futures::stream::StreamExt;
use reqwest::Url;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const STREAM_PATH: &str = "/api/speech/stream";

/// Configuration for the event stream consumer
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Base URL of the server (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Identifier sent as `tabletId` on every (re)connection
    pub client_id: String,

    /// Wait between a stream failure and the next connection attempt
    /// Default: 5 seconds
    pub reconnect_delay: Duration,

    /// Wait before announcing offline mode when the stream cannot be set up
    /// Default: 1 second
    pub offline_notice_delay: Duration,
}

impl StreamConfig {
    /// `{base}/api/speech/stream?tabletId={client_id}`
    pub fn stream_url(&self) -> Result<Url> {
        let raw = format!("{}{}", self.base_url.trim_end_matches('/'), STREAM_PATH);
        let mut url =
            Url::parse(&raw).with_context(|| format!("Invalid stream endpoint: {}", raw))?;
        url.query_pairs_mut()
            .append_pair("tabletId", &self.client_id);
        Ok(url)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            client_id: generate_client_id(),
            reconnect_delay: Duration::from_millis(5000),
            offline_notice_delay: Duration::from_millis(1000),
        }
    }
}

/// Fresh client identifier, e.g. `tablet_3f9c0a1b2`
pub fn generate_client_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("tablet_{}", &id[..9])
}

/// Lifecycle of the consumer's current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreamState {
    /// `connect` not called yet
    Idle,
    /// Opening a subscription
    Connecting,
    /// Subscription open, messages flowing
    Open,
    /// Session failed; a reconnect is scheduled
    ClosedRetryPending,
    /// The stream could not be set up at all; running in offline mode
    ClosedTerminal,
    /// Closed on request; no reconnect
    Closed,
}

/// Keeps a server-push connection alive and routes its events
///
/// Reconnects after every failure at a fixed interval, forever, until
/// [`close`](Self::close) is called.
pub struct EventStreamConsumer {
    context: SessionContext,
    session: Mutex<Option<JoinHandle<()>>>,
}

/// Everything a session task needs, shared with the consumer
#[derive(Clone)]
struct SessionContext {
    source: Arc<dyn EventSource>,
    handler: Arc<dyn EventHandler>,
    connectivity: ConnectivityMonitor,
    config: StreamConfig,
    state: Arc<watch::Sender<StreamState>>,
}

impl EventStreamConsumer {
    pub fn new(
        source: Arc<dyn EventSource>,
        handler: Arc<dyn EventHandler>,
        config: StreamConfig,
        connectivity: ConnectivityMonitor,
    ) -> Self {
        let (state, _rx) = watch::channel(StreamState::Idle);

        Self {
            context: SessionContext {
                source,
                handler,
                connectivity,
                config,
                state: Arc::new(state),
            },
            session: Mutex::new(None),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.context.config.client_id
    }

    /// Current session state
    pub fn state(&self) -> StreamState {
        *self.context.state.borrow()
    }

    /// Receiver that observes every state transition
    pub fn subscribe_state(&self) -> watch::Receiver<StreamState> {
        self.context.state.subscribe()
    }

    /// Start a new session, replacing any existing one
    ///
    /// The endpoint is `StreamConfig::stream_url` (base URL plus
    /// [`STREAM_PATH`]) and the client ID is `StreamConfig::client_id`, so
    /// every reconnect of this consumer reuses both. The state is already
    /// `Connecting` when this returns.
    pub async fn connect(&self) {
        let mut session = self.session.lock().await;
        if let Some(previous) = session.take() {
            debug!("Replacing existing stream session");
            previous.abort();
            let _ = previous.await;
        }

        let context = self.context.clone();
        let task = match context.config.stream_url() {
            Ok(url) => {
                info!(
                    "Starting event stream for client {}",
                    context.config.client_id
                );
                context.set_state(StreamState::Connecting);
                tokio::spawn(context.run(url))
            }
            Err(e) => {
                error!("Cannot start event stream: {:#}", e);
                context.set_state(StreamState::ClosedTerminal);
                tokio::spawn(context.offline_mode())
            }
        };

        *session = Some(task);
    }

    /// Stop the current session; nothing reconnects afterwards
    pub async fn close(&self) {
        if let Some(task) = self.session.lock().await.take() {
            task.abort();
            let _ = task.await;
        }

        self.context.set_state(StreamState::Closed);
        info!("Event stream closed");
    }
}

impl Drop for EventStreamConsumer {
    fn drop(&mut self) {
        if let Ok(mut session) = self.session.try_lock() {
            if let Some(task) = session.take() {
                task.abort();
            }
        }
    }
}

impl SessionContext {
    fn set_state(&self, state: StreamState) {
        self.state.send_replace(state);
    }

    /// Session loop: connect, consume, and after any failure wait and retry
    async fn run(self, url: Url) {
        let policy = RetryPolicy::Unbounded {
            interval: self.config.reconnect_delay,
        };

        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            self.set_state(StreamState::Connecting);
            info!("Connecting to event stream {} (attempt {})", url, attempt);

            let failure = match self.source.subscribe(&url).await {
                Ok(stream) => {
                    self.on_open().await;
                    self.consume(stream).await
                }
                Err(e) => e,
            };

            error!("Event stream error: {}", failure);
            self.on_failure().await;

            match policy.decide(attempt) {
                RetryDecision::RetryAfter(delay) => {
                    info!("Reconnecting to event stream in {:?}", delay);
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::GiveUp => {
                    self.set_state(StreamState::ClosedTerminal);
                    return;
                }
            }
        }
    }

    async fn on_open(&self) {
        info!("🔗 Connected to event stream");
        self.set_state(StreamState::Open);
        self.connectivity.set_connected(true);
        self.handler.on_connectivity_change(true).await;
        self.handler
            .on_status("Connected to server".to_string())
            .await;
    }

    async fn on_failure(&self) {
        self.set_state(StreamState::ClosedRetryPending);
        self.connectivity.set_connected(false);
        self.handler.on_connectivity_change(false).await;
        self.handler
            .on_status("Connection error - offline mode".to_string())
            .await;
    }

    /// Route messages until the stream breaks or ends
    async fn consume(&self, mut stream: EventStream) -> ErrorKind {
        while let Some(item) = stream.next().await {
            match item {
                Ok(data) => self.route(&data).await,
                Err(e) => return e,
            }
        }

        ErrorKind::NetworkFailure("stream closed by server".to_string())
    }

    async fn route(&self, data: &str) {
        let event = match InboundEvent::parse(data) {
            Ok(event) => event,
            Err(e) => {
                warn!("Dropping malformed stream message: {}", e);
                return;
            }
        };

        debug!("📨 Received {:?}", event);

        match event {
            InboundEvent::Speech { text, options } => {
                self.handler.on_speech(text, options).await;
            }
            InboundEvent::Mood(name) => match Mood::parse(&name) {
                Some(mood) => self.handler.on_mood(mood).await,
                None => warn!("Unknown mood: {}", name),
            },
            InboundEvent::Status { message } => {
                self.handler.on_status(message).await;
            }
            InboundEvent::Unknown(kind) => {
                info!("Ignoring message of unknown type: {:?}", kind);
            }
        }
    }

    /// The stream cannot be set up; tell the host once and stay offline
    async fn offline_mode(self) {
        info!("🔄 Entering offline demo mode");
        tokio::time::sleep(self.config.offline_notice_delay).await;

        self.connectivity.set_connected(false);
        self.handler.on_connectivity_change(false).await;
        self.handler
            .on_status("Offline demo mode - commands only".to_string())
            .await;
    }
}
