use super::message::Message;
use super::transcript::Transcript;
use super::widgets::MenuAction;
use crate::chat::{Attachment, ChatService};
use crate::prompts::CHAT_FAILURE_MESSAGE;
use crate::{Error, Result};
use futures::StreamExt;
use std::path::Path;

/// What became of a send request.
#[derive(Debug)]
pub enum SendOutcome {
    /// Empty text without an attachment; nothing happened.
    Ignored,
    /// The reply streamed to completion.
    Replied { reply_id: String },
    /// The chat failed; the fallback message was appended.
    Failed { error: Error },
}

/// Result of activating a menu entry.
#[derive(Debug)]
pub enum MenuOutcome {
    Reset,
    Sent(SendOutcome),
    OpenLink(&'static str),
}

/// Chat transcript plus the send flow that fills it.
pub struct Conversation {
    chat: ChatService,
    transcript: Transcript,
    loading: bool,
}

impl Conversation {
    #[must_use]
    pub fn new(chat: ChatService) -> Self {
        Self {
            chat,
            transcript: Transcript::new(),
            loading: false,
        }
    }

    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn chat(&self) -> &ChatService {
        &self.chat
    }

    /// Forget the chat session and restore the welcome transcript.
    pub fn reset(&mut self) {
        self.chat.reset();
        self.transcript.reset();
    }

    /// Send a message and stream the reply into the transcript.
    ///
    /// The user message and an empty streaming reply are appended first;
    /// fragments are applied in arrival order. `observe` runs after every
    /// transcript change. A chat failure appends the fallback message, drops
    /// the reply if it is still empty and is reported as [`SendOutcome::Failed`].
    /// Loading is already cleared when `observe` sees the finished reply.
    pub async fn send<F>(
        &mut self,
        text: &str,
        attachment: Option<Attachment>,
        mut observe: F,
    ) -> SendOutcome
    where
        F: FnMut(&Self),
    {
        if text.trim().is_empty() && attachment.is_none() {
            return SendOutcome::Ignored;
        }
        if self.loading {
            self.abandon_stale_reply();
        }
        self.loading = true;

        let mut fragments = self.chat.send_message_stream(text, attachment.as_ref());
        self.transcript.push(Message::user(text, attachment));
        let reply_id = self.transcript.push(Message::placeholder());
        observe(self);

        let mut failure = None;
        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(fragment) => {
                    self.transcript.append_text(&reply_id, &fragment);
                    observe(self);
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        self.transcript.finish_streaming(&reply_id);
        self.loading = false;
        let outcome = match failure {
            None => SendOutcome::Replied { reply_id },
            Some(error) => {
                tracing::error!("Failed to generate response: {error}");
                self.transcript.push(Message::assistant(CHAT_FAILURE_MESSAGE));
                self.transcript.remove_if_empty(&reply_id);
                SendOutcome::Failed { error }
            }
        };
        observe(self);
        outcome
    }

    /// A set flag on entry means an earlier send was dropped mid-stream.
    fn abandon_stale_reply(&mut self) {
        let stale = self.transcript.last().filter(|m| m.streaming).map(|m| m.id.clone());
        if let Some(id) = stale {
            tracing::debug!(reply_id = %id, "Closing reply left open by a cancelled send");
            self.transcript.finish_streaming(&id);
            self.transcript.remove_if_empty(&id);
        }
        self.loading = false;
    }

    /// Read a file and send it with `text`. Nothing is appended if the file
    /// cannot be used.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not an image or
    /// audio file.
    pub async fn send_file<F>(
        &mut self,
        text: &str,
        path: impl AsRef<Path>,
        observe: F,
    ) -> Result<SendOutcome>
    where
        F: FnMut(&Self),
    {
        let attachment = Attachment::from_path(path).await?;
        Ok(self.send(text, Some(attachment), observe).await)
    }

    /// Run a menu entry: reset, ask its question, or hand back its link.
    pub async fn activate<F>(&mut self, action: MenuAction, observe: F) -> MenuOutcome
    where
        F: FnMut(&Self),
    {
        match action {
            MenuAction::Reset => {
                self.reset();
                MenuOutcome::Reset
            }
            MenuAction::Ask(question) => {
                MenuOutcome::Sent(self.send(question, None, observe).await)
            }
            MenuAction::OpenLink(url) => MenuOutcome::OpenLink(url),
        }
    }
}
