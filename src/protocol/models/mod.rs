pub mod common;
pub mod content;
pub mod generation;

pub use common::{
    DEFAULT_CHAT_MODEL, DEFAULT_LIVE_MODEL, DEFAULT_VIDEO_MODEL, DEFAULT_VOICE, Modality,
    Temperature, TemperatureError, TopP, TopPError,
};
pub use content::{Blob, Content, Part, Role};
pub use generation::{
    GenerationConfig, PrebuiltVoiceConfig, SpeechConfig, ThinkingConfig, VoiceConfig,
};
