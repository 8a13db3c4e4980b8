// Tests for the in-memory robot face host

use anyhow::Result;
use robot_mouth::{
    EventHandler, FaceState, Mood, RobotFace, UtteranceRenderer, VoiceConfig, VoiceOptions,
};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

/// Records every utterance and "plays" it for a fixed time
struct RecordingRenderer {
    played: Mutex<Vec<(String, VoiceConfig)>>,
    length: Duration,
    fail: bool,
}

impl RecordingRenderer {
    fn new(length: Duration) -> Arc<Self> {
        Arc::new(Self {
            played: Mutex::new(Vec::new()),
            length,
            fail: false,
        })
    }
}

#[async_trait::async_trait]
impl UtteranceRenderer for RecordingRenderer {
    async fn render(&self, text: &str, voice: VoiceConfig) -> Result<()> {
        self.played.lock().unwrap().push((text.to_string(), voice));
        tokio::time::sleep(self.length).await;
        if self.fail {
            anyhow::bail!("no audio device");
        }
        Ok(())
    }
}

/// Blocks its worker thread on "first" until released; anything else plays
/// forever
struct GatedRenderer {
    started: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

#[async_trait::async_trait]
impl UtteranceRenderer for GatedRenderer {
    async fn render(&self, text: &str, _voice: VoiceConfig) -> Result<()> {
        if text == "first" {
            self.started.lock().unwrap().send(()).ok();
            // No await point here, so aborting the task cannot cut this short
            self.release
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(5))
                .ok();
            return Ok(());
        }
        std::future::pending::<Result<()>>().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_face_starts_happy_and_offline() {
    let face = RobotFace::new(RecordingRenderer::new(Duration::from_secs(1)));
    assert_eq!(face.state().await, FaceState::default());
    assert_eq!(face.state().await.mood, Mood::Happy);
    assert!(!face.state().await.connected);
}

#[tokio::test(start_paused = true)]
async fn test_speech_uses_page_preset() {
    let renderer = RecordingRenderer::new(Duration::from_secs(2));
    let face = RobotFace::new(renderer.clone());

    let options = VoiceOptions {
        volume: Some(0.4),
        ..Default::default()
    };
    face.on_speech("Good morning".to_string(), options).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    let state = face.state().await;
    assert!(state.speaking);
    assert!(state.status.starts_with("Speaking: \"Good morning"));

    let played = renderer.played.lock().unwrap().clone();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].1.rate, VoiceConfig::PAGE.rate);
    assert_eq!(played[0].1.volume, 0.4);

    tokio::time::sleep(Duration::from_secs(3)).await;
    let state = face.state().await;
    assert!(!state.speaking);
    assert_eq!(state.status, "Ready to speak");
}

#[tokio::test(start_paused = true)]
async fn test_new_speech_interrupts_current() {
    let renderer = RecordingRenderer::new(Duration::from_secs(10));
    let face = RobotFace::new(renderer.clone());

    face.on_speech("first".to_string(), VoiceOptions::default()).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    face.on_speech("second".to_string(), VoiceOptions::default()).await;

    // The first utterance would have finished here had it not been cut off
    tokio::time::sleep(Duration::from_secs(9)).await;
    assert!(face.state().await.speaking);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!face.state().await.speaking);
    assert_eq!(renderer.played.lock().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_render_failure_is_reported_in_status() {
    let renderer = Arc::new(RecordingRenderer {
        played: Mutex::new(Vec::new()),
        length: Duration::from_millis(10),
        fail: true,
    });
    let face = RobotFace::new(renderer);

    face.on_speech("hello".to_string(), VoiceOptions::default()).await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let state = face.state().await;
    assert!(!state.speaking);
    assert_eq!(state.status, "Speech synthesis error");
}

#[tokio::test(start_paused = true)]
async fn test_mood_status_and_connectivity_updates() {
    let face = RobotFace::new(RecordingRenderer::new(Duration::from_secs(1)));

    face.on_mood(Mood::Surprised).await;
    assert_eq!(face.state().await.mood, Mood::Surprised);
    assert_eq!(face.state().await.status, "Mood: surprised");

    face.on_status("Battery at 20%".to_string()).await;
    assert_eq!(face.state().await.status, "Battery at 20%");

    face.on_connectivity_change(true).await;
    assert!(face.state().await.connected);
}

#[tokio::test(start_paused = true)]
async fn test_silence_stops_speaking() {
    let face = RobotFace::new(RecordingRenderer::new(Duration::from_secs(30)));

    face.on_speech("a long speech".to_string(), VoiceOptions::default()).await;
    assert!(face.state().await.speaking);

    face.silence().await;
    assert!(!face.state().await.speaking);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_finished_utterance_leaves_newer_one_alone() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let face = RobotFace::new(Arc::new(GatedRenderer {
        started: Mutex::new(started_tx),
        release: Mutex::new(release_rx),
    }));

    face.on_speech("first".to_string(), VoiceOptions::default()).await;
    tokio::task::spawn_blocking(move || started_rx.recv_timeout(Duration::from_secs(5)))
        .await
        .unwrap()
        .unwrap();

    // The first utterance is mid-render and past the reach of abort
    face.on_speech("second".to_string(), VoiceOptions::default()).await;
    release_tx.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let state = face.state().await;
    assert!(state.speaking);
    assert!(state.status.starts_with("Speaking: \"second"));
}
