use super::message::Message;
use crate::prompts::{CONTACT_EMAIL, INSTAGRAM_URL};

const CONTACT_KEYWORDS: [&str; 3] = ["contact", "redes sociais", "email"];

/// Extra affordances rendered under an assistant reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Plain,
    /// Reply talks about getting in touch; offer email and Instagram.
    Contact,
}

/// Keyword heuristic over the finished reply text.
///
/// Matches substrings, so "contacto", "contactar" and "e-mail" style wording
/// in Portuguese replies all count, as do false positives such as "contactless".
#[must_use]
pub fn classify(message: &Message) -> ReplyKind {
    if message.is_user() || message.streaming {
        return ReplyKind::Plain;
    }
    let text = message.text.to_lowercase();
    if CONTACT_KEYWORDS.iter().any(|k| text.contains(k)) {
        ReplyKind::Contact
    } else {
        ReplyKind::Plain
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactLink {
    Email(&'static str),
    Instagram(&'static str),
}

impl ContactLink {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email(_) => "Contactar",
            Self::Instagram(_) => "Instagram",
        }
    }

    #[must_use]
    pub fn url(&self) -> String {
        match self {
            Self::Email(address) => format!("mailto:{address}"),
            Self::Instagram(url) => (*url).to_string(),
        }
    }
}

#[must_use]
pub const fn contact_links() -> [ContactLink; 2] {
    [ContactLink::Email(CONTACT_EMAIL), ContactLink::Instagram(INSTAGRAM_URL)]
}
