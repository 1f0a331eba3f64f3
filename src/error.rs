use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the Gemini REST and Live endpoints.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
    /// Canonical status name such as `INVALID_ARGUMENT` or `UNAVAILABLE`.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiError,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("HTTP protocol error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse or serialize JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Header error: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Gemini API error: {0:?}")]
    Api(ApiError),

    #[error("The connection was closed unexpectedly")]
    ConnectionClosed,

    #[error("Missing configuration: {0}")]
    Config(String),

    #[error("Invalid attachment: {0}")]
    Attachment(String),

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Timed out: {0}")]
    Timeout(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
