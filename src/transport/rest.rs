use crate::config::Settings;
use crate::error::{ApiError, ApiErrorEnvelope, Error, Result};
use crate::protocol::chat::{GenerateContentRequest, GenerateContentResponse};
use crate::protocol::video::{GenerateVideosRequest, VideoInstance, VideoOperation, VideoParameters};
use crate::safe_truncate;
use async_stream::try_stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::header::HeaderValue;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";
const TRACE_LOG_MAX_BYTES: usize = 1024;
const VIDEO_CONTEXT_MAX_CHARS: usize = 100;

/// An adapter for the Gemini REST API.
#[derive(Clone, Debug)]
pub struct GeminiRestAdapter {
    client: Client,
    auth_header: HeaderValue,
    base_url: String,
}

impl GeminiRestAdapter {
    /// Create an adapter from resolved settings.
    ///
    /// # Errors
    /// Returns an error if the API key results in an invalid header or client build fails.
    #[allow(clippy::result_large_err)]
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::new_with_timeouts(
            &settings.api_key,
            &settings.rest_base_url,
            settings.connect_timeout,
            settings.pool_idle_timeout,
        )
    }

    /// Create a new adapter with custom timeouts.
    ///
    /// No overall request timeout is set: streamed replies stay open for as
    /// long as the model keeps generating.
    ///
    /// # Errors
    /// Returns an error if the API key results in an invalid header or client build fails.
    #[allow(clippy::result_large_err)]
    pub fn new_with_timeouts(
        api_key: &str,
        base_url: &str,
        connect_timeout: Duration,
        pool_idle_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .pool_idle_timeout(pool_idle_timeout)
            .build()?;

        let mut auth_header = HeaderValue::from_str(api_key)?;
        auth_header.set_sensitive(true);

        Ok(Self {
            client,
            auth_header,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Start a streamed `generateContent` call and return the reply chunks.
    ///
    /// The HTTP request is issued before this returns; the body is consumed
    /// lazily as the stream is polled.
    ///
    /// # Errors
    /// Returns an error if the request fails or the server rejects it. Errors
    /// while reading the body are yielded by the stream.
    pub async fn stream_generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<BoxStream<'static, Result<GenerateContentResponse>>> {
        let url = format!("{}/models/{model}:streamGenerateContent?alt=sse", self.base_url);

        let res = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.auth_header)
            .json(request)
            .send()
            .await?;
        let res = check_status(res).await?;

        let mut bytes = Box::pin(res.bytes_stream());
        let stream = try_stream! {
            let mut decoder = SseDecoder::default();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(Error::from)?;
                for data in decoder.push(&chunk) {
                    yield parse_stream_chunk(&data)?;
                }
            }
            if let Some(data) = decoder.finish() {
                yield parse_stream_chunk(&data)?;
            }
        };

        Ok(stream.boxed())
    }

    /// Generate a short portrait video for the given text and download it.
    ///
    /// Polls the long-running operation every `poll_interval` until it is
    /// done or `deadline` elapses.
    ///
    /// # Errors
    /// Returns an error if a request fails, the operation reports an error,
    /// no video URI is produced, or the deadline passes.
    pub async fn generate_video(
        &self,
        model: &str,
        text_context: &str,
        poll_interval: Duration,
        deadline: Duration,
    ) -> Result<Vec<u8>> {
        let prompt = video_prompt(text_context);
        let mut operation = self.start_video_operation(model, prompt).await?;
        tracing::info!(operation = %operation.name, "Video generation started");

        let poll = async {
            while !operation.done {
                tokio::time::sleep(poll_interval).await;
                operation = self.get_video_operation(&operation.name).await?;
                tracing::debug!(
                    operation = %operation.name,
                    done = operation.done,
                    "Polled video operation"
                );
            }
            Ok::<_, Error>(())
        };
        tokio::time::timeout(deadline, poll)
            .await
            .map_err(|_| Error::Timeout("video generation"))??;

        if let Some(err) = operation.error.take() {
            return Err(Error::Api(err));
        }
        let uri = operation
            .video_uri()
            .ok_or_else(|| Error::UnexpectedResponse("No video URI".to_string()))?
            .to_string();

        self.download(&uri).await
    }

    /// # Errors
    /// Returns an error if the HTTP request fails.
    pub async fn start_video_operation(
        &self,
        model: &str,
        prompt: String,
    ) -> Result<VideoOperation> {
        let url = format!("{}/models/{model}:predictLongRunning", self.base_url);
        let body = GenerateVideosRequest {
            instances: vec![VideoInstance { prompt }],
            parameters: VideoParameters::default(),
        };

        let res = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.auth_header)
            .json(&body)
            .send()
            .await?;
        Ok(check_status(res).await?.json().await?)
    }

    /// # Errors
    /// Returns an error if the HTTP request fails.
    pub async fn get_video_operation(&self, name: &str) -> Result<VideoOperation> {
        let url = format!("{}/{name}", self.base_url);
        let res = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.auth_header)
            .send()
            .await?;
        Ok(check_status(res).await?.json().await?)
    }

    async fn download(&self, uri: &str) -> Result<Vec<u8>> {
        let res = self
            .client
            .get(uri)
            .header(API_KEY_HEADER, &self.auth_header)
            .send()
            .await?;
        Ok(check_status(res).await?.bytes().await?.to_vec())
    }
}

fn video_prompt(text_context: &str) -> String {
    let context: String = text_context.chars().take(VIDEO_CONTEXT_MAX_CHARS).collect();
    format!(
        "Cinematic video of a peaceful scouting environment. Warm lighting, 4k. Context: {context}"
    )
}

/// Turn a non-success response into `Error::Api`, keeping the server's message when present.
async fn check_status(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    tracing::debug!(%status, "Gemini error body: {}", safe_truncate(&body, TRACE_LOG_MAX_BYTES));
    let error = serde_json::from_str::<ApiErrorEnvelope>(&body).map_or_else(
        |_| ApiError {
            code: status.as_u16(),
            message: status.canonical_reason().unwrap_or("request failed").to_string(),
            status: None,
        },
        |envelope| envelope.error,
    );
    Err(Error::Api(error))
}

#[allow(clippy::result_large_err)]
fn parse_stream_chunk(data: &str) -> Result<GenerateContentResponse> {
    tracing::trace!("Received chunk: {}", safe_truncate(data, TRACE_LOG_MAX_BYTES));
    let value: Value = serde_json::from_str(data)?;
    if value.get("error").is_some() {
        let envelope: ApiErrorEnvelope = serde_json::from_value(value)?;
        return Err(Error::Api(envelope.error));
    }
    Ok(serde_json::from_value(value)?)
}

/// Incremental decoder for `text/event-stream` bodies.
///
/// Bytes are buffered until a full line is available, so multi-byte
/// characters split across network chunks decode correctly.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
    data: Option<String>,
}

impl SseDecoder {
    /// Feed raw bytes; returns the data payloads of every event completed by them.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.handle_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush an event left open when the body ended without a blank line.
    pub(crate) fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let rest = String::from_utf8_lossy(&rest).into_owned();
            if let Some(event) = self.handle_line(rest.trim_end_matches('\r')) {
                return Some(event);
            }
        }
        self.data.take()
    }

    fn handle_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.data.take();
        }
        if let Some(rest) = line.strip_prefix("data:") {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            match &mut self.data {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(rest);
                }
                None => self.data = Some(rest.to_string()),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_decoder_handles_split_events() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: {\"a\":").is_empty());
        let events = decoder.push(b"1}\r\n\r\ndata: {\"b\":2}\r\n\r\n");
        assert_eq!(events, vec!["{\"a\":1}".to_string(), "{\"b\":2}".to_string()]);
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn sse_decoder_keeps_multibyte_characters_across_chunks() {
        let payload = "data: {\"text\":\"conexão\"}\n\n".as_bytes();
        let split = payload.iter().position(|&b| b == 0xC3).unwrap() + 1;
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(&payload[..split]).is_empty());
        let events = decoder.push(&payload[split..]);
        assert_eq!(events, vec!["{\"text\":\"conexão\"}".to_string()]);
    }

    #[test]
    fn sse_decoder_flushes_unterminated_event() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b": keep-alive\n").is_empty());
        assert!(decoder.push(b"data: last").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("last"));
    }

    #[test]
    fn stream_chunk_with_error_maps_to_api_error() {
        let err = parse_stream_chunk(
            r#"{"error":{"code":503,"message":"overloaded","status":"UNAVAILABLE"}}"#,
        )
        .unwrap_err();
        match err {
            Error::Api(api) => {
                assert_eq!(api.code, 503);
                assert_eq!(api.status.as_deref(), Some("UNAVAILABLE"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn video_prompt_truncates_context_by_characters() {
        let context = "á".repeat(150);
        let prompt = video_prompt(&context);
        assert!(prompt.ends_with(&"á".repeat(100)));
        assert!(!prompt.ends_with(&"á".repeat(101)));
    }
}
