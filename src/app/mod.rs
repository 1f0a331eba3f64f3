//! View-state controllers behind the chat screen and the voice-call overlay.

pub mod conversation;
pub mod live_call;
pub mod message;
pub mod reply;
pub mod transcript;
pub mod widgets;

pub use crate::chat::{Attachment, AttachmentKind};
pub use conversation::{Conversation, MenuOutcome, SendOutcome};
pub use live_call::{CallAction, LiveCall};
pub use message::{Message, MessageRole, generate_id};
pub use reply::{ContactLink, ReplyKind, classify, contact_links};
pub use transcript::Transcript;
pub use widgets::{MenuAction, MenuItem, QuickReply, RichCard, Suggestion};
