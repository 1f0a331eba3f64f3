use serde::{Deserialize, Serialize};

use crate::protocol::models::{Blob, Content, GenerationConfig, Modality, SpeechConfig};

pub const PCM_INPUT_MIME: &str = "audio/pcm;rate=16000";

/// Messages sent by the client over the `BidiGenerateContent` socket.
///
/// Each message is a JSON object with exactly one top-level key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ClientMessage {
    Setup(LiveSetup),
    RealtimeInput(RealtimeInput),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiveSetup {
    /// Fully qualified model resource name, e.g. `models/<id>`.
    pub model: String,
    pub generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl LiveSetup {
    /// Audio-only setup with a prebuilt voice.
    #[must_use]
    pub fn audio(model: &str, voice: &str, system_instruction: Option<&str>) -> Self {
        let model = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        Self {
            model,
            generation_config: GenerationConfig {
                response_modalities: Some(vec![Modality::Audio]),
                speech_config: Some(SpeechConfig::prebuilt(voice)),
                ..GenerationConfig::default()
            },
            system_instruction: system_instruction.map(Content::instruction),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput {
    pub audio: Blob,
}

impl RealtimeInput {
    /// Wrap a base64 PCM16 frame captured at 16 kHz.
    #[must_use]
    pub fn pcm16k(data: String) -> Self {
        Self {
            audio: Blob {
                mime_type: PCM_INPUT_MIME.to_string(),
                data,
            },
        }
    }
}
