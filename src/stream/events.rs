use crate::error::ErrorKind;
use crate::voice::VoiceOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Facial expression the host can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Surprised,
    Normal,
}

impl Mood {
    /// Wire name to mood; `None` for anything unrecognized
    pub fn parse(name: &str) -> Option<Mood> {
        match name {
            "happy" => Some(Mood::Happy),
            "surprised" => Some(Mood::Surprised),
            "normal" => Some(Mood::Normal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Surprised => "surprised",
            Mood::Normal => "normal",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pushed message, classified by its `type` field
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// `{"type":"speech","text":...,"options":{...}}`
    Speech { text: String, options: VoiceOptions },
    /// `{"type":"mood","mood":...}`; the name is validated when routed
    Mood(String),
    /// `{"type":"status","message":...}`
    Status { message: String },
    /// Any other (or missing) `type`
    Unknown(String),
}

#[derive(Deserialize)]
struct SpeechBody {
    text: String,
    #[serde(default)]
    options: Option<VoiceOptions>,
}

#[derive(Deserialize)]
struct MoodBody {
    mood: String,
}

#[derive(Deserialize)]
struct StatusBody {
    message: String,
}

impl InboundEvent {
    /// Classify one `data` payload
    pub fn parse(raw: &str) -> Result<Self, ErrorKind> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ErrorKind::ParseFailure(e.to_string()))?;

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let event = match kind.as_str() {
            "speech" => {
                let body: SpeechBody = from_value(value)?;
                InboundEvent::Speech {
                    text: body.text,
                    options: body.options.unwrap_or_default(),
                }
            }
            "mood" => InboundEvent::Mood(from_value::<MoodBody>(value)?.mood),
            "status" => InboundEvent::Status {
                message: from_value::<StatusBody>(value)?.message,
            },
            _ => InboundEvent::Unknown(kind),
        };

        Ok(event)
    }
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ErrorKind> {
    serde_json::from_value(value).map_err(|e| ErrorKind::ParseFailure(e.to_string()))
}
