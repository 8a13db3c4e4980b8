use crate::voice::VoiceConfig;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/speak`
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
    pub config: VoiceConfig,
    pub timestamp: String, // RFC3339 timestamp
    pub source: String,
}

/// Body of `POST /api/stop`
#[derive(Debug, Serialize, Deserialize)]
pub struct StopRequest {
    pub timestamp: String, // RFC3339 timestamp
    pub source: String,
}

/// Acknowledgement returned by the actuator on success
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub message: Option<String>,
}
