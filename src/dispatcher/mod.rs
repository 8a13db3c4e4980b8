//! Outbound command delivery
//!
//! The `CommandDispatcher` pushes commands to the remote actuator:
//! - `speak`: sanitized text + voice config, up to 3 attempts with linear backoff
//! - `stop`: single best-effort attempt
//! - `check_connection`: single health probe that updates connectivity
//!
//! Every attempt is bounded by a timeout. Nothing here returns an error to
//! the caller; failures become `false` and log output.

mod client;
mod command;
mod config;
pub mod messages;
mod text;

pub use client::{CommandDispatcher, HEALTH_PATH, SPEAK_PATH, STOP_PATH};
pub use command::{Command, CommandKind, DispatchOutcome, SpeakPayload};
pub use config::DispatcherConfig;
pub use messages::{CommandResponse, SpeakRequest, StopRequest};
pub use text::{
    estimate_duration, sanitize, MAX_SPEECH_DURATION, MIN_SPEECH_DURATION, WORDS_PER_MINUTE,
};
