//! Inbound event stream
//!
//! The `EventStreamConsumer` holds one server-push session open at a time:
//! - `speech` events go to `EventHandler::on_speech`
//! - `mood` events go to `EventHandler::on_mood` (happy, surprised, normal)
//! - `status` events go to `EventHandler::on_status`
//!
//! Malformed or unknown messages are logged and dropped. Any stream failure
//! marks the connection down and schedules one reconnect after a fixed delay.

mod consumer;
mod events;
mod handler;

pub use consumer::{generate_client_id, EventStreamConsumer, StreamConfig, StreamState, STREAM_PATH};
pub use events::{InboundEvent, Mood};
pub use handler::{EventHandler, FaceState, LogRenderer, RobotFace, UtteranceRenderer};
