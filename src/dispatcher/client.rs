use super::command::{Command, CommandKind, DispatchOutcome};
use super::config::DispatcherConfig;
use super::messages::CommandResponse;
use super::text::{estimate_duration, sanitize};
use crate::connectivity::ConnectivityMonitor;
use crate::error::ErrorKind;
use crate::retry::{AttemptState, RetryDecision, RetryPolicy};
use crate::transport::{Transport, TransportResponse};
use crate::voice::{VoiceConfig, VoiceOptions};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const HEALTH_PATH: &str = "/api/health";
pub const SPEAK_PATH: &str = "/api/speak";
pub const STOP_PATH: &str = "/api/stop";

/// Sends speak/stop/health commands to the remote actuator
///
/// No method returns an error: every failure ends up as `false` (or a
/// failed [`DispatchOutcome`]) plus a log line.
pub struct CommandDispatcher {
    transport: Arc<dyn Transport>,
    config: DispatcherConfig,
    connectivity: ConnectivityMonitor,
    speaking: Arc<SpeakingWindow>,
}

impl CommandDispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        config: DispatcherConfig,
        connectivity: ConnectivityMonitor,
    ) -> Self {
        info!(
            "Command dispatcher for {} via {} transport",
            config.base_url,
            transport.name()
        );

        Self {
            transport,
            config,
            connectivity,
            speaking: Arc::new(SpeakingWindow::default()),
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    /// Whether the last successful utterance is probably still playing
    pub fn is_speaking(&self) -> bool {
        self.speaking.is_active()
    }

    /// Probe the health endpoint once and record the result
    pub async fn check_connection(&self) -> bool {
        let outcome = self.dispatch(&Command::health_check()).await;

        self.connectivity.set_connected(outcome.success);

        if outcome.success {
            info!("Actuator reachable at {}", self.config.base_url);
        } else {
            warn!(
                "Actuator unreachable at {}: {}",
                self.config.base_url,
                describe(&outcome.last_error)
            );
        }

        outcome.success
    }

    /// Ask the actuator to say `text`, retrying transient failures
    pub async fn speak(&self, text: &str, options: Option<VoiceOptions>) -> bool {
        self.speak_with_outcome(text, options).await.success
    }

    /// [`speak`](Self::speak), reporting attempts and the last failure
    pub async fn speak_with_outcome(
        &self,
        text: &str,
        options: Option<VoiceOptions>,
    ) -> DispatchOutcome {
        if text.trim().is_empty() {
            warn!("Refusing to speak empty text");
            return DispatchOutcome::failed(
                0,
                Some(ErrorKind::ValidationFailure("text is empty".to_string())),
            );
        }

        let clean = sanitize(text);
        if clean.is_empty() {
            warn!("Nothing speakable left after sanitizing");
            return DispatchOutcome::failed(
                0,
                Some(ErrorKind::ValidationFailure(
                    "text is empty after sanitizing".to_string(),
                )),
            );
        }

        let voice = VoiceConfig::merged(VoiceConfig::DISPATCHER, &options.unwrap_or_default());
        let window = estimate_duration(&clean);
        let command = Command::speak(clean, voice);

        let outcome = self.dispatch(&command).await;
        if outcome.success {
            self.speaking.start(window);
        } else {
            warn!(
                "Giving up on speak after {} attempts: {}",
                outcome.attempts,
                describe(&outcome.last_error)
            );
        }

        outcome
    }

    /// Ask the actuator to stop talking. One attempt, no retry.
    pub async fn stop(&self) -> bool {
        let outcome = self.dispatch(&Command::stop()).await;

        if outcome.success {
            self.speaking.clear();
            info!("Stop acknowledged");
        } else {
            warn!("Stop failed: {}", describe(&outcome.last_error));
        }

        outcome.success
    }

    /// Deliver `command` according to its kind's timeout and retry policy
    pub async fn dispatch(&self, command: &Command) -> DispatchOutcome {
        let (path, timeout, policy) = self.route(command.kind());
        let url = self.config.endpoint(path);
        let body = command.body(&self.config.source);

        let mut state = AttemptState::default();
        loop {
            state.begin();
            debug!("{:?} attempt {} -> {}", command.kind(), state.attempt, url);

            match self.attempt(&url, body.as_ref(), timeout).await {
                Ok(response) => {
                    log_acknowledgement(command.kind(), &response);
                    return DispatchOutcome::delivered(state.attempt);
                }
                Err(error) => {
                    warn!(
                        "{:?} attempt {} failed: {}",
                        command.kind(),
                        state.attempt,
                        error
                    );

                    match state.fail(error, &policy) {
                        RetryDecision::RetryAfter(delay) => {
                            info!("Retrying {:?} in {:?}", command.kind(), delay);
                            tokio::time::sleep(delay).await;
                        }
                        RetryDecision::GiveUp => {
                            return DispatchOutcome::failed(state.attempt, state.last_error);
                        }
                    }
                }
            }
        }
    }

    fn route(&self, kind: CommandKind) -> (&'static str, Duration, RetryPolicy) {
        match kind {
            CommandKind::HealthCheck => (
                HEALTH_PATH,
                self.config.health_timeout,
                RetryPolicy::once(),
            ),
            CommandKind::Speak => (
                SPEAK_PATH,
                self.config.request_timeout,
                RetryPolicy::Capped {
                    max_attempts: self.config.max_retries.max(1),
                    base_delay: self.config.backoff_base,
                },
            ),
            CommandKind::Stop => (STOP_PATH, self.config.request_timeout, RetryPolicy::once()),
        }
    }

    /// One bounded request. Dropping the request future on timeout cancels it.
    async fn attempt(
        &self,
        url: &str,
        body: Option<&serde_json::Value>,
        timeout: Duration,
    ) -> Result<TransportResponse, ErrorKind> {
        let request = async {
            match body {
                Some(body) => self.transport.post_json(url, body).await,
                None => self.transport.get(url).await,
            }
        };

        let response = tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| ErrorKind::Timeout)??;

        if response.is_success() {
            Ok(response)
        } else {
            Err(ErrorKind::Http(response.status))
        }
    }
}

fn log_acknowledgement(kind: CommandKind, response: &TransportResponse) {
    let message = serde_json::from_str::<CommandResponse>(&response.body)
        .ok()
        .and_then(|r| r.message);

    match message {
        Some(message) => info!("{:?} delivered: {}", kind, message),
        None => debug!("{:?} delivered (status {})", kind, response.status),
    }
}

fn describe(error: &Option<ErrorKind>) -> String {
    error
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown error".to_string())
}

/// Advisory "still speaking" flag driven by duration estimates
///
/// Each start bumps a generation so an older timer cannot clear a newer
/// window.
#[derive(Debug, Default)]
struct SpeakingWindow {
    generation: AtomicU64,
    active: AtomicBool,
}

impl SpeakingWindow {
    fn start(self: &Arc<Self>, duration: Duration) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.active.store(true, Ordering::SeqCst);

        let window = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if window.generation.load(Ordering::SeqCst) == generation {
                window.active.store(false, Ordering::SeqCst);
            }
        });
    }

    fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
