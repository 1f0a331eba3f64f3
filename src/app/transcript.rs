use super::message::{Message, MessageRole};

/// Ordered conversation shown to the user, starting with the welcome message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: vec![Message::welcome()],
        }
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(Message::welcome());
    }

    /// Append a message and return its id.
    pub fn push(&mut self, message: Message) -> String {
        let id = message.id.clone();
        self.messages.push(message);
        id
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Text of the latest finished assistant reply.
    #[must_use]
    pub fn last_reply_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant && !m.streaming && !m.text.is_empty())
            .map(|m| m.text.as_str())
    }

    pub(crate) fn append_text(&mut self, id: &str, fragment: &str) {
        if let Some(message) = self.get_mut(id) {
            message.text.push_str(fragment);
        }
    }

    pub(crate) fn finish_streaming(&mut self, id: &str) {
        if let Some(message) = self.get_mut(id) {
            message.streaming = false;
        }
    }

    /// Drop the message if it never received any text.
    pub(crate) fn remove_if_empty(&mut self, id: &str) {
        self.messages.retain(|m| m.id != id || !m.text.is_empty());
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
