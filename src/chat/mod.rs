//! Streaming text chat over one persistent session.

pub mod attachment;
pub mod backend;
pub mod service;
pub mod session;

pub use attachment::{Attachment, AttachmentKind};
pub use backend::{ChatBackend, ChunkStream};
pub use service::{ChatConfig, ChatService, FragmentStream};
pub use session::ChatSession;
