use std::fmt;

/// Phase of a live voice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LiveState {
    #[default]
    Idle,
    Connecting,
    /// Connected; no reply audio pending.
    Listening,
    /// Connected; reply audio pending or playing.
    Speaking,
    Closed,
    /// Connect or transport failure. Left only by retrying or closing.
    Error,
}

impl LiveState {
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Listening | Self::Speaking)
    }

    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use LiveState::{Closed, Connecting, Error, Idle, Listening, Speaking};
        matches!(
            (self, next),
            (Idle | Closed | Error, Connecting)
                | (Connecting, Listening | Error | Closed)
                | (Listening, Speaking | Error | Closed)
                | (Speaking, Listening | Error | Closed)
                | (Error, Closed)
        )
    }
}

impl fmt::Display for LiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Listening => "listening",
            Self::Speaking => "speaking",
            Self::Closed => "closed",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Reports speaking only when it flips.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeakingTracker {
    speaking: bool,
}

impl SpeakingTracker {
    /// Returns the new value if it differs from the last one reported.
    pub fn update(&mut self, speaking: bool) -> Option<bool> {
        if self.speaking == speaking {
            return None;
        }
        self.speaking = speaking;
        Some(speaking)
    }

    #[must_use]
    pub const fn is_speaking(&self) -> bool {
        self.speaking
    }
}
