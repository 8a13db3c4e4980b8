use super::events::Mood;
use crate::dispatcher::estimate_duration;
use crate::voice::{VoiceConfig, VoiceOptions};
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Host-side callbacks the stream consumer routes events to
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    /// A `speech` event arrived
    async fn on_speech(&self, text: String, options: VoiceOptions);

    /// A `mood` event with a recognized mood arrived
    async fn on_mood(&self, mood: Mood);

    /// Human-readable status text (pushed, or produced by the consumer)
    async fn on_status(&self, message: String);

    /// The stream opened (`true`) or failed (`false`)
    async fn on_connectivity_change(&self, connected: bool);
}

/// Opaque capability that turns text into audible speech
#[async_trait::async_trait]
pub trait UtteranceRenderer: Send + Sync {
    /// Speak `text`, returning when playback ends
    async fn render(&self, text: &str, voice: VoiceConfig) -> Result<()>;
}

/// Renderer that only logs and holds for the estimated speaking time
pub struct LogRenderer;

#[async_trait::async_trait]
impl UtteranceRenderer for LogRenderer {
    async fn render(&self, text: &str, voice: VoiceConfig) -> Result<()> {
        info!(
            "🗣️  \"{}\" (rate={}, pitch={}, volume={})",
            text, voice.rate, voice.pitch, voice.volume
        );
        tokio::time::sleep(estimate_duration(text)).await;
        Ok(())
    }
}

/// Snapshot of what the robot face is showing
#[derive(Debug, Clone, PartialEq)]
pub struct FaceState {
    pub mood: Mood,
    pub status: String,
    pub connected: bool,
    pub speaking: bool,
}

impl Default for FaceState {
    fn default() -> Self {
        Self {
            mood: Mood::Happy,
            status: "Mood: happy (default)".to_string(),
            connected: false,
            speaking: false,
        }
    }
}

/// In-memory robot face driven by stream events
///
/// Speech uses the page voice preset. A new utterance interrupts the one
/// in progress.
pub struct RobotFace {
    renderer: Arc<dyn UtteranceRenderer>,
    state: Arc<Mutex<FaceState>>,
    utterance: Mutex<Option<JoinHandle<()>>>,
    /// Bumped under the state lock whenever an utterance starts or is cut
    /// off; a finished utterance only resets the face if it still matches.
    generation: Arc<AtomicU64>,
}

impl RobotFace {
    pub fn new(renderer: Arc<dyn UtteranceRenderer>) -> Self {
        Self {
            renderer,
            state: Arc::new(Mutex::new(FaceState::default())),
            utterance: Mutex::new(None),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current face state
    pub async fn state(&self) -> FaceState {
        self.state.lock().await.clone()
    }

    /// Cut off the utterance in progress, if any
    pub async fn silence(&self) {
        if let Some(task) = self.utterance.lock().await.take() {
            task.abort();
        }

        let mut state = self.state.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        state.speaking = false;
    }

    async fn update_status(&self, message: String) {
        info!("📊 Status: {}", message);
        self.state.lock().await.status = message;
    }
}

#[async_trait::async_trait]
impl EventHandler for RobotFace {
    async fn on_speech(&self, text: String, options: VoiceOptions) {
        self.silence().await;

        let voice = VoiceConfig::merged(VoiceConfig::PAGE, &options);
        let preview: String = text.chars().take(30).collect();

        let generation = {
            let mut state = self.state.lock().await;
            state.speaking = true;
            state.status = format!("Speaking: \"{}...\"", preview);
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let renderer = Arc::clone(&self.renderer);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let task = tokio::spawn(async move {
            let result = renderer.render(&text, voice).await;

            let mut state = state.lock().await;
            if current.load(Ordering::SeqCst) != generation {
                debug!("Utterance superseded; leaving face state alone");
                return;
            }
            state.speaking = false;
            match result {
                Ok(()) => state.status = "Ready to speak".to_string(),
                Err(e) => {
                    error!("Speech rendering failed: {}", e);
                    state.status = "Speech synthesis error".to_string();
                }
            }
        });

        *self.utterance.lock().await = Some(task);
    }

    async fn on_mood(&self, mood: Mood) {
        self.state.lock().await.mood = mood;
        self.update_status(format!("Mood: {}", mood)).await;
    }

    async fn on_status(&self, message: String) {
        self.update_status(message).await;
    }

    async fn on_connectivity_change(&self, connected: bool) {
        info!(
            "Connection indicator: {}",
            if connected { "connected" } else { "disconnected" }
        );
        self.state.lock().await.connected = connected;
    }
}
