use crate::protocol::models::Part;
use crate::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Audio,
}

impl AttachmentKind {
    /// Classify a MIME type. Anything other than `image/*` or `audio/*` is rejected.
    #[must_use]
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let top = mime_type.split('/').next()?.trim().to_ascii_lowercase();
        match top.as_str() {
            "image" => Some(Self::Image),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }
}

/// A user-supplied file, kept as a `data:` URL so it can be shown and sent as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub mime_type: String,
    pub url: String,
}

impl Attachment {
    /// # Errors
    /// Returns `Error::Attachment` if the MIME type is not an image or audio type.
    #[allow(clippy::result_large_err)]
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Result<Self> {
        let kind = AttachmentKind::from_mime(mime_type)
            .ok_or_else(|| Error::Attachment(format!("unsupported file type: {mime_type}")))?;
        let data = general_purpose::STANDARD.encode(bytes);
        Ok(Self {
            kind,
            mime_type: mime_type.to_string(),
            url: format!("data:{mime_type};base64,{data}"),
        })
    }

    /// Read a file and guess its MIME type from the extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or its type is not supported.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mime_type = mime_from_extension(path).ok_or_else(|| {
            Error::Attachment(format!("unsupported file type: {}", path.display()))
        })?;
        let bytes = tokio::fs::read(path).await?;
        tracing::debug!(path = %path.display(), mime_type, len = bytes.len(), "Read attachment");
        Self::from_bytes(mime_type, &bytes)
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    ///
    /// # Errors
    /// Returns `Error::Attachment` if the URL is malformed or the type is unsupported.
    #[allow(clippy::result_large_err)]
    pub fn from_data_url(url: &str) -> Result<Self> {
        let (mime_type, _) = split_data_url(url)?;
        let kind = AttachmentKind::from_mime(mime_type)
            .ok_or_else(|| Error::Attachment(format!("unsupported file type: {mime_type}")))?;
        Ok(Self {
            kind,
            mime_type: mime_type.to_string(),
            url: url.to_string(),
        })
    }

    /// The base64 payload after the comma.
    ///
    /// # Errors
    /// Returns `Error::Attachment` if the URL has no payload.
    #[allow(clippy::result_large_err)]
    pub fn base64_data(&self) -> Result<&str> {
        split_data_url(&self.url).map(|(_, data)| data)
    }

    /// # Errors
    /// Returns an error if the payload is missing or not valid base64.
    #[allow(clippy::result_large_err)]
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(general_purpose::STANDARD.decode(self.base64_data()?)?)
    }

    /// # Errors
    /// Returns `Error::Attachment` if the URL has no payload.
    #[allow(clippy::result_large_err)]
    pub fn to_part(&self) -> Result<Part> {
        Ok(Part::inline_data(self.mime_type.clone(), self.base64_data()?))
    }
}

#[allow(clippy::result_large_err)]
fn split_data_url(url: &str) -> Result<(&str, &str)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::Attachment("not a data URL".to_string()))?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| Error::Attachment("data URL has no payload".to_string()))?;
    let mime_type = header.split(';').next().unwrap_or_default();
    if mime_type.is_empty() || data.is_empty() {
        return Err(Error::Attachment("data URL has no payload".to_string()));
    }
    Ok((mime_type, data))
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "weba" => "audio/webm",
        _ => return None,
    };
    Some(mime)
}
