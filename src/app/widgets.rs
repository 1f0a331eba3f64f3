/// A one-tap reply shown under an assistant message; tapping sends `action`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReply {
    pub text: String,
    pub action: String,
    pub emoji: Option<String>,
}

impl QuickReply {
    #[must_use]
    pub fn new(text: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: action.into(),
            emoji: None,
        }
    }

    #[must_use]
    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    #[must_use]
    pub fn label(&self) -> String {
        match &self.emoji {
            Some(emoji) => format!("{emoji} {}", self.text),
            None => self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichCard {
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub icon: Option<String>,
    pub action_label: Option<String>,
    pub action_value: Option<String>,
}

impl RichCard {
    /// Text sent when the card's button is pressed: the value, else the label.
    /// Cards without a label have no button.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        let label = self.action_label.as_deref()?;
        Some(self.action_value.as_deref().unwrap_or(label))
    }
}

/// A preset question shown above the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub label: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Start over, after confirmation.
    Reset,
    /// Send a preset question.
    Ask(&'static str),
    OpenLink(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub action: MenuAction,
}
