use super::widgets::{QuickReply, RichCard};
use crate::chat::Attachment;
use crate::prompts::{WELCOME_MESSAGE, WELCOME_MESSAGE_ID, welcome_quick_replies};
use uuid::Uuid;

const ID_LEN: usize = 7;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Short random base-36 message id.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn generate_id() -> String {
    let mut n = Uuid::new_v4().as_u128();
    let mut id = String::with_capacity(ID_LEN);
    for _ in 0..ID_LEN {
        id.push(char::from(BASE36[(n % 36) as usize]));
        n /= 36;
    }
    id
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub text: String,
    pub attachment: Option<Attachment>,
    /// Set while reply fragments are still arriving.
    pub streaming: bool,
    pub quick_replies: Vec<QuickReply>,
    pub cards: Vec<RichCard>,
}

impl Message {
    #[must_use]
    pub fn user(text: impl Into<String>, attachment: Option<Attachment>) -> Self {
        Self {
            id: generate_id(),
            role: MessageRole::User,
            text: text.into(),
            attachment,
            streaming: false,
            quick_replies: Vec::new(),
            cards: Vec::new(),
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            role: MessageRole::Assistant,
            text: text.into(),
            attachment: None,
            streaming: false,
            quick_replies: Vec::new(),
            cards: Vec::new(),
        }
    }

    /// Empty assistant reply that fragments will fill in.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            streaming: true,
            ..Self::assistant(String::new())
        }
    }

    #[must_use]
    pub fn welcome() -> Self {
        Self {
            id: WELCOME_MESSAGE_ID.to_string(),
            quick_replies: welcome_quick_replies(),
            ..Self::assistant(WELCOME_MESSAGE)
        }
    }

    #[must_use]
    pub fn with_cards(mut self, cards: Vec<RichCard>) -> Self {
        self.cards = cards;
        self
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// Quick replies are offered only once the reply is complete.
    #[must_use]
    pub fn visible_quick_replies(&self) -> &[QuickReply] {
        if self.streaming { &[] } else { &self.quick_replies }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_short_base36_and_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn welcome_message_carries_default_quick_replies() {
        let welcome = Message::welcome();
        assert_eq!(welcome.id, "init-1");
        assert_eq!(welcome.role, MessageRole::Assistant);
        assert_eq!(welcome.quick_replies.len(), 5);
        assert_eq!(welcome.quick_replies[0].text, "Ver Azimutes");
        assert_eq!(welcome.quick_replies[0].emoji.as_deref(), Some("🏕️"));
    }

    #[test]
    fn streaming_placeholder_hides_quick_replies() {
        let mut reply = Message::placeholder();
        reply.quick_replies = welcome_quick_replies();
        assert!(reply.visible_quick_replies().is_empty());
        reply.streaming = false;
        assert_eq!(reply.visible_quick_replies().len(), 5);
    }
}
