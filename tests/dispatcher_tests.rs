// Integration tests for the command dispatcher
//
// A scripted in-memory transport stands in for the actuator. Tests run on a
// paused tokio clock so backoff delays and timeouts are exact.

use robot_mouth::{
    CommandDispatcher, ConnectivityMonitor, ConnectivityState, DispatcherConfig, ErrorKind,
    Transport, TransportResponse, VoiceConfig, VoiceOptions,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Copy)]
enum Reply {
    Status(u16),
    Refused,
    Hang,
}

struct Call {
    method: &'static str,
    url: String,
    body: Option<serde_json::Value>,
    at: Instant,
}

struct ScriptedTransport {
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Reply>, fallback: Reply) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn always(reply: Reply) -> Arc<Self> {
        Self::new(Vec::new(), reply)
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|c| c.at).collect()
    }

    async fn respond(
        &self,
        method: &'static str,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<TransportResponse, ErrorKind> {
        self.calls.lock().unwrap().push(Call {
            method,
            url: url.to_string(),
            body,
            at: Instant::now(),
        });

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);

        match reply {
            Reply::Status(status) => Ok(TransportResponse::new(status, r#"{"message":"ok"}"#)),
            Reply::Refused => Err(ErrorKind::NetworkFailure("connection refused".to_string())),
            Reply::Hang => std::future::pending().await,
        }
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, ErrorKind> {
        self.respond("GET", url, None).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, ErrorKind> {
        self.respond("POST", url, Some(body.clone())).await
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn dispatcher(transport: Arc<ScriptedTransport>) -> CommandDispatcher {
    CommandDispatcher::new(
        transport,
        DispatcherConfig::default(),
        ConnectivityMonitor::new(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_speak_gives_up_after_three_attempts_with_linear_backoff() {
    let transport = ScriptedTransport::always(Reply::Status(503));
    let dispatcher = dispatcher(transport.clone());

    let outcome = dispatcher.speak_with_outcome("Hello there", None).await;

    assert!(!outcome.success);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.last_error, Some(ErrorKind::Http(503)));
    assert_eq!(transport.call_count(), 3);

    let times = transport.call_times();
    assert_eq!(times[1] - times[0], Duration::from_millis(1000));
    assert_eq!(times[2] - times[1], Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn test_speak_returns_false_when_network_keeps_failing() {
    let transport = ScriptedTransport::always(Reply::Refused);
    let dispatcher = dispatcher(transport.clone());

    assert!(!dispatcher.speak("Anyone home?", None).await);
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_speak_succeeds_on_second_attempt() {
    let transport = ScriptedTransport::new(vec![Reply::Refused], Reply::Status(200));
    let dispatcher = dispatcher(transport.clone());

    let outcome = dispatcher.speak_with_outcome("Second time lucky", None).await;

    assert!(outcome.success);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.last_error, None);
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_each_speak_attempt_is_bounded_by_timeout() {
    let transport = ScriptedTransport::always(Reply::Hang);
    let dispatcher = dispatcher(transport.clone());

    let started = Instant::now();
    let outcome = dispatcher.speak_with_outcome("Are you there?", None).await;

    assert!(!outcome.success);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.last_error, Some(ErrorKind::Timeout));
    // 3 x 5s timeouts + 1s + 2s backoff
    assert_eq!(started.elapsed(), Duration::from_secs(18));
}

#[tokio::test(start_paused = true)]
async fn test_empty_text_never_reaches_transport() {
    let transport = ScriptedTransport::always(Reply::Status(200));
    let dispatcher = dispatcher(transport.clone());

    let outcome = dispatcher.speak_with_outcome("   \n\t ", None).await;
    assert!(!outcome.success);
    assert_eq!(outcome.attempts, 0);
    assert!(matches!(
        outcome.last_error,
        Some(ErrorKind::ValidationFailure(_))
    ));

    // Only emoji: nothing left to say
    assert!(!dispatcher.speak("😀🎉", None).await);

    assert_eq!(transport.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_speak_sends_sanitized_text_and_merged_config() {
    let transport = ScriptedTransport::always(Reply::Status(200));
    let dispatcher = dispatcher(transport.clone());

    let options = VoiceOptions {
        rate: Some(1.2),
        ..Default::default()
    };
    assert!(dispatcher.speak("Hi **there** 👋", Some(options)).await);

    let calls = transport.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "POST");
    assert_eq!(calls[0].url, "http://localhost:3000/api/speak");

    let body = calls[0].body.as_ref().unwrap();
    assert_eq!(body["text"], "Hi there");
    assert_eq!(body["source"], "chat-widget");
    assert_eq!(body["config"]["rate"].as_f64().unwrap() as f32, 1.2);
    assert_eq!(
        body["config"]["pitch"].as_f64().unwrap() as f32,
        VoiceConfig::DISPATCHER.pitch
    );
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_a_single_attempt() {
    let transport = ScriptedTransport::always(Reply::Status(500));
    let dispatcher = dispatcher(transport.clone());

    assert!(!dispatcher.stop().await);
    assert_eq!(transport.call_count(), 1);

    let calls = transport.calls.lock().unwrap();
    assert_eq!(calls[0].url, "http://localhost:3000/api/stop");
}

#[tokio::test(start_paused = true)]
async fn test_stop_succeeds_on_2xx() {
    let transport = ScriptedTransport::always(Reply::Status(204));
    let dispatcher = dispatcher(transport.clone());

    assert!(dispatcher.stop().await);
}

#[tokio::test(start_paused = true)]
async fn test_check_connection_times_out_and_marks_disconnected() {
    let transport = ScriptedTransport::always(Reply::Hang);
    let dispatcher = dispatcher(transport.clone());

    let started = Instant::now();
    assert!(!dispatcher.check_connection().await);

    assert!(started.elapsed() <= Duration::from_millis(5000));
    assert_eq!(transport.call_count(), 1);
    assert_eq!(
        dispatcher.connectivity().current(),
        ConnectivityState::Disconnected
    );
}

#[tokio::test(start_paused = true)]
async fn test_check_connection_success_marks_connected() {
    let transport = ScriptedTransport::always(Reply::Status(200));
    let dispatcher = dispatcher(transport.clone());

    assert_eq!(dispatcher.connectivity().current(), ConnectivityState::Unknown);
    assert!(dispatcher.check_connection().await);
    assert_eq!(
        dispatcher.connectivity().current(),
        ConnectivityState::Connected
    );

    let calls = transport.calls.lock().unwrap();
    assert_eq!(calls[0].method, "GET");
    assert_eq!(calls[0].url, "http://localhost:3000/api/health");
}

#[tokio::test(start_paused = true)]
async fn test_speak_failure_does_not_touch_connectivity() {
    let transport = ScriptedTransport::always(Reply::Refused);
    let dispatcher = dispatcher(transport);

    assert!(!dispatcher.speak("hello", None).await);
    assert_eq!(dispatcher.connectivity().current(), ConnectivityState::Unknown);
}

#[tokio::test(start_paused = true)]
async fn test_speaking_window_follows_estimate() {
    let transport = ScriptedTransport::always(Reply::Status(200));
    let dispatcher = dispatcher(transport);

    assert!(!dispatcher.is_speaking());
    assert!(dispatcher.speak("one two three", None).await);
    assert!(dispatcher.is_speaking());

    // Three words clamp to the 2 second minimum
    tokio::time::sleep(Duration::from_millis(1999)).await;
    assert!(dispatcher.is_speaking());
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(!dispatcher.is_speaking());
}

#[tokio::test(start_paused = true)]
async fn test_later_speak_restarts_window() {
    let transport = ScriptedTransport::always(Reply::Status(200));
    let dispatcher = dispatcher(transport);

    // 2 second window
    assert!(dispatcher.speak("short one", None).await);
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // Twenty words: an 8 second window starting at t=1.5s
    let long = vec!["word"; 20].join(" ");
    assert!(dispatcher.speak(&long, None).await);

    // Past the end of the first window
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(dispatcher.is_speaking());

    tokio::time::sleep(Duration::from_millis(6999)).await;
    assert!(dispatcher.is_speaking());
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(!dispatcher.is_speaking());
}

#[tokio::test(start_paused = true)]
async fn test_stop_clears_speaking_window() {
    let transport = ScriptedTransport::always(Reply::Status(200));
    let dispatcher = dispatcher(transport);

    assert!(dispatcher.speak("a fairly short sentence", None).await);
    assert!(dispatcher.is_speaking());

    assert!(dispatcher.stop().await);
    assert!(!dispatcher.is_speaking());
}
