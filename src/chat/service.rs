use super::attachment::Attachment;
use super::backend::ChatBackend;
use super::session::ChatSession;
use crate::Result;
use crate::config::{Sampling, Settings};
use crate::prompts::DEFAULT_ATTACHMENT_PROMPT;
use crate::protocol::models::{Content, Part};
use crate::transport::rest::GeminiRestAdapter;
use async_stream::try_stream;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use parking_lot::Mutex;
use std::sync::Arc;

/// Stream of visible text fragments for one reply.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Parameters fixed on every session the service creates.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub system_instruction: String,
    pub sampling: Sampling,
}

impl From<&Settings> for ChatConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            model: settings.chat_model.clone(),
            system_instruction: settings.chat_instruction.clone(),
            sampling: settings.sampling,
        }
    }
}

type SessionSlot = Arc<Mutex<Option<Arc<ChatSession>>>>;

/// Owner of the single chat session.
///
/// The session is created on first use and dropped after any failure so the
/// next message starts a clean conversation.
pub struct ChatService {
    backend: Arc<dyn ChatBackend>,
    config: ChatConfig,
    session: SessionSlot,
}

impl ChatService {
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>, config: ChatConfig) -> Self {
        Self {
            backend,
            config,
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// Chat service backed by the Gemini REST API.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    #[allow(clippy::result_large_err)]
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let adapter = GeminiRestAdapter::new(settings)?;
        Ok(Self::new(Arc::new(adapter), ChatConfig::from(settings)))
    }

    /// The cached session, if one exists.
    #[must_use]
    pub fn current_session(&self) -> Option<Arc<ChatSession>> {
        self.session.lock().clone()
    }

    /// Discard the session. In-flight streams keep their own handle.
    pub fn reset(&self) {
        if let Some(session) = self.session.lock().take() {
            tracing::info!(session = %session.id(), "Chat session reset");
        }
    }

    /// Send a message and stream the reply as text fragments.
    ///
    /// Nothing is sent until the stream is first polled. An attachment is
    /// submitted as a second part; with no text the default attachment prompt
    /// is used. Thought parts are never yielded.
    ///
    /// Any error, whether from the request or mid-stream, drops the session
    /// before it is yielded.
    pub fn send_message_stream(
        &self,
        text: &str,
        attachment: Option<&Attachment>,
    ) -> FragmentStream {
        let session = self.session_or_create();
        let backend = Arc::clone(&self.backend);
        let message = user_message(text, attachment);

        let turn_session = Arc::clone(&session);
        let turn: FragmentStream = Box::pin(try_stream! {
            let message = message?;
            let request = turn_session.request_for(message.clone());
            let mut chunks = backend.stream_generate(turn_session.model(), request).await?;
            let mut reply = String::new();
            while let Some(chunk) = chunks.next().await {
                if let Some(fragment) = chunk?.text() {
                    reply.push_str(&fragment);
                    yield fragment;
                }
            }
            turn_session.commit(message, reply);
        });

        let slot = Arc::clone(&self.session);
        turn.inspect_err(move |err| {
            tracing::warn!(session = %session.id(), "Chat stream failed: {err}");
            invalidate(&slot, &session);
        })
        .boxed()
    }

    fn session_or_create(&self) -> Arc<ChatSession> {
        let mut slot = self.session.lock();
        if let Some(session) = slot.as_ref() {
            return Arc::clone(session);
        }
        let session = Arc::new(ChatSession::new(
            self.config.model.clone(),
            &self.config.system_instruction,
            self.config.sampling.generation_config(),
        ));
        tracing::info!(session = %session.id(), model = %self.config.model, "Chat session created");
        *slot = Some(Arc::clone(&session));
        session
    }
}

/// Drop the cached session, unless a reset already replaced it.
fn invalidate(slot: &SessionSlot, failed: &Arc<ChatSession>) {
    let mut slot = slot.lock();
    if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, failed)) {
        *slot = None;
    }
}

#[allow(clippy::result_large_err)]
fn user_message(text: &str, attachment: Option<&Attachment>) -> Result<Content> {
    let Some(attachment) = attachment else {
        return Ok(Content::user(vec![Part::text(text)]));
    };
    let text = if text.trim().is_empty() { DEFAULT_ATTACHMENT_PROMPT } else { text };
    Ok(Content::user(vec![Part::text(text), attachment.to_part()?]))
}
