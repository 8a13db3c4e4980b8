pub mod config;
pub mod connectivity;
pub mod dispatcher;
pub mod error;
pub mod retry;
pub mod stream;
pub mod transport;
pub mod voice;

pub use config::Config;
pub use connectivity::{ConnectivityMonitor, ConnectivityState};
pub use dispatcher::{
    estimate_duration, sanitize, Command, CommandDispatcher, CommandKind, DispatchOutcome,
    DispatcherConfig,
};
pub use error::ErrorKind;
pub use retry::{AttemptState, RetryDecision, RetryPolicy};
pub use stream::{
    EventHandler, EventStreamConsumer, FaceState, InboundEvent, LogRenderer, Mood, RobotFace,
    StreamConfig, StreamState, UtteranceRenderer,
};
pub use transport::{EventSource, EventStream, HttpTransport, Transport, TransportResponse};
pub use voice::{VoiceConfig, VoiceOptions};
