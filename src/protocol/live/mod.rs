pub mod client_messages;
pub mod server_messages;

pub use client_messages::{ClientMessage, LiveSetup, RealtimeInput, PCM_INPUT_MIME};
pub use server_messages::{GoAway, ServerContent, ServerMessage};
