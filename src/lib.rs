#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! Client for the Lista Papa Francisco campaign assistant.
//!
//! Text chat streams replies from Gemini `generateContent` over one
//! persistent session ([`ChatService`]); voice calls run over the Gemini Live
//! WebSocket with 16 kHz microphone capture and gapless 24 kHz playback
//! ([`LiveService`]). The [`app`] module holds the view-state controllers a
//! front-end drives.

pub mod app;
#[cfg(feature = "audio-io")]
pub mod audio;
pub mod chat;
pub mod config;
pub mod error;
pub mod live;
pub mod prompts;
pub mod protocol;
pub mod transport;

pub use app::{CallAction, Conversation, LiveCall, Message, MessageRole, SendOutcome, Transcript};
pub use chat::{Attachment, AttachmentKind, ChatBackend, ChatService, ChatSession};
pub use config::{Sampling, Settings, SettingsBuilder};
pub use error::{ApiError, Error, Result};
pub use live::{
    AudioCapture, AudioDevices, AudioSink, LiveConnector, LiveEvent, LiveService, LiveState,
    LiveTransport,
};
pub use protocol::models::{Temperature, TopP};
pub use transport::rest::GeminiRestAdapter;
pub use transport::ws::LiveClient;

const TRACE_TRUNCATE_SUFFIX: &str = "... (truncated)";

pub(crate) fn safe_truncate(s: &str, max_bytes: usize) -> std::borrow::Cow<'_, str> {
    if s.len() <= max_bytes {
        return std::borrow::Cow::Borrowed(s);
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    std::borrow::Cow::Owned(format!(
        "{} {} {} bytes",
        &s[..end],
        TRACE_TRUNCATE_SUFFIX,
        s.len() - end
    ))
}
