use super::messages::{SpeakRequest, StopRequest};
use crate::error::ErrorKind;
use crate::voice::VoiceConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Kind of outbound instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommandKind {
    Speak,
    Stop,
    HealthCheck,
}

/// Text and voice for a `Speak` command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakPayload {
    /// Already sanitized text
    pub text: String,
    pub voice_config: VoiceConfig,
}

/// A single instruction to the remote actuator
///
/// Fields are private so a command cannot change once issued.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    kind: CommandKind,
    payload: Option<SpeakPayload>,
    issued_at: DateTime<Utc>,
}

impl Command {
    pub fn speak(text: String, voice_config: VoiceConfig) -> Self {
        Self {
            kind: CommandKind::Speak,
            payload: Some(SpeakPayload { text, voice_config }),
            issued_at: Utc::now(),
        }
    }

    pub fn stop() -> Self {
        Self {
            kind: CommandKind::Stop,
            payload: None,
            issued_at: Utc::now(),
        }
    }

    pub fn health_check() -> Self {
        Self {
            kind: CommandKind::HealthCheck,
            payload: None,
            issued_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn payload(&self) -> Option<&SpeakPayload> {
        self.payload.as_ref()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// JSON body sent with the command, if it has one
    pub fn body(&self, source: &str) -> Option<serde_json::Value> {
        let timestamp = self.issued_at.to_rfc3339();

        let body = match (self.kind, &self.payload) {
            (CommandKind::Speak, Some(payload)) => serde_json::to_value(SpeakRequest {
                text: payload.text.clone(),
                config: payload.voice_config,
                timestamp,
                source: source.to_string(),
            }),
            (CommandKind::Stop, _) => serde_json::to_value(StopRequest {
                timestamp,
                source: source.to_string(),
            }),
            _ => return None,
        };

        body.ok()
    }
}

/// Result of delivering one [`Command`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub success: bool,
    /// Network attempts made (0 when rejected before sending)
    pub attempts: u32,
    pub last_error: Option<ErrorKind>,
}

impl DispatchOutcome {
    pub(crate) fn delivered(attempts: u32) -> Self {
        Self {
            success: true,
            attempts,
            last_error: None,
        }
    }

    pub(crate) fn failed(attempts: u32, error: Option<ErrorKind>) -> Self {
        Self {
            success: false,
            attempts,
            last_error: error,
        }
    }
}
