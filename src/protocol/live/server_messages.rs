use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::protocol::models::{Blob, Content};

/// A message received on the `BidiGenerateContent` socket.
///
/// The server sends one populated field per message; unknown fields are
/// ignored so that newer server message kinds do not break decoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    pub setup_complete: Option<Value>,
    pub server_content: Option<ServerContent>,
    pub go_away: Option<GoAway>,
    pub usage_metadata: Option<Value>,
    pub error: Option<ApiError>,
}

impl ServerMessage {
    #[must_use]
    pub const fn is_setup_complete(&self) -> bool {
        self.setup_complete.is_some()
    }

    #[must_use]
    pub fn interrupted(&self) -> bool {
        self.server_content
            .as_ref()
            .and_then(|c| c.interrupted)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn turn_complete(&self) -> bool {
        self.server_content
            .as_ref()
            .and_then(|c| c.turn_complete)
            .unwrap_or(false)
    }

    /// Inline audio blobs carried by the model turn, in order.
    pub fn audio_blobs(&self) -> impl Iterator<Item = &Blob> {
        self.server_content
            .iter()
            .filter_map(|c| c.model_turn.as_ref())
            .flat_map(|turn| turn.parts.iter())
            .filter_map(|part| part.inline_data.as_ref())
            .filter(|blob| blob.mime_type.starts_with("audio/"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    pub model_turn: Option<Content>,
    pub interrupted: Option<bool>,
    pub turn_complete: Option<bool>,
    pub generation_complete: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoAway {
    /// Protobuf duration string, e.g. `"10s"`.
    pub time_left: Option<String>,
}
