use serde::{Deserialize, Serialize};

/// Voice parameters sent along with an utterance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Speaking rate (0.5 to 2.0)
    pub rate: f32,
    /// Voice pitch (0.5 to 2.0)
    pub pitch: f32,
    /// Output volume (0.1 to 1.0)
    pub volume: f32,
}

/// Partial voice parameters, as supplied by a caller or a pushed `speech` event
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
}

pub const RATE_RANGE: (f32, f32) = (0.5, 2.0);
pub const PITCH_RANGE: (f32, f32) = (0.5, 2.0);
pub const VOLUME_RANGE: (f32, f32) = (0.1, 1.0);

impl VoiceConfig {
    /// Default profile for commands sent through the dispatcher
    pub const DISPATCHER: VoiceConfig = VoiceConfig {
        rate: 0.85,
        pitch: 0.8,
        volume: 1.0,
    };

    /// Default profile used by the robot face when rendering pushed speech
    pub const PAGE: VoiceConfig = VoiceConfig {
        rate: 0.9,
        pitch: 1.0,
        volume: 1.0,
    };

    /// Overlay `options` on `preset`.
    ///
    /// Missing, zero or non-finite fields fall back to the preset value;
    /// supplied values are clamped into their valid range.
    pub fn merged(preset: VoiceConfig, options: &VoiceOptions) -> VoiceConfig {
        VoiceConfig {
            rate: pick(options.rate, preset.rate, RATE_RANGE),
            pitch: pick(options.pitch, preset.pitch, PITCH_RANGE),
            volume: pick(options.volume, preset.volume, VOLUME_RANGE),
        }
    }
}

impl From<VoiceConfig> for VoiceOptions {
    fn from(config: VoiceConfig) -> Self {
        Self {
            rate: Some(config.rate),
            pitch: Some(config.pitch),
            volume: Some(config.volume),
        }
    }
}

fn pick(value: Option<f32>, fallback: f32, (min, max): (f32, f32)) -> f32 {
    match value {
        Some(v) if v.is_finite() && v != 0.0 => v.clamp(min, max),
        _ => fallback,
    }
}
