use crate::live::volume::VOICE_THRESHOLD;
use crate::live::{LiveEvent, LiveService, LiveState};
use crate::prompts::{LIVE_CONNECT_FAILED, LIVE_RETRY_FAILED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallAction {
    Retry,
    Exit,
    HangUp,
}

/// Voice-call overlay: connect on open, show status, offer retry on failure.
pub struct LiveCall {
    service: LiveService,
    error: Option<&'static str>,
    speaking: bool,
    smoothed_volume: f32,
}

impl LiveCall {
    #[must_use]
    pub const fn new(service: LiveService) -> Self {
        Self {
            service,
            error: None,
            speaking: false,
            smoothed_volume: 0.0,
        }
    }

    /// Connect the call. On failure the overlay shows the connection error.
    pub async fn open(&mut self) {
        self.error = None;
        if let Err(err) = self.service.connect().await {
            tracing::error!("Failed to connect live session: {err}");
            self.error = Some(LIVE_CONNECT_FAILED);
        }
    }

    pub async fn retry(&mut self) {
        self.error = None;
        if let Err(err) = self.service.retry().await {
            tracing::error!("Retry failed: {err}");
            self.error = Some(LIVE_RETRY_FAILED);
        }
    }

    /// Hang up or exit; releases the call in any state.
    pub async fn close(&mut self) {
        self.service.disconnect().await;
        self.speaking = false;
        self.smoothed_volume = 0.0;
    }

    /// Wait for the next call event and fold it into the overlay state.
    pub async fn next_event(&mut self) -> Option<LiveEvent> {
        let event = self.service.next_event().await?;
        self.apply(&event);
        Some(event)
    }

    pub fn apply(&mut self, event: &LiveEvent) {
        match event {
            LiveEvent::SpeakingChanged(speaking) => self.speaking = *speaking,
            LiveEvent::InputVolume { smoothed, .. } => self.smoothed_volume = *smoothed,
            LiveEvent::MicrophoneUnavailable { .. } => {
                self.error.get_or_insert(LIVE_CONNECT_FAILED);
            }
            LiveEvent::StateChanged(LiveState::Error) => {
                self.speaking = false;
                self.error.get_or_insert(LIVE_CONNECT_FAILED);
            }
            LiveEvent::StateChanged(_) | LiveEvent::TurnComplete | LiveEvent::Closed => {}
        }
    }

    /// Message to show, if the call failed. A session that ended in
    /// `LiveState::Error` counts even if its event was never read.
    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        self.error
            .or_else(|| (self.state() == LiveState::Error).then_some(LIVE_CONNECT_FAILED))
    }

    #[must_use]
    pub fn state(&self) -> LiveState {
        self.service.state()
    }

    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.speaking && self.state() != LiveState::Error
    }

    #[must_use]
    pub fn actions(&self) -> &'static [CallAction] {
        if self.error().is_some() {
            &[CallAction::Retry, CallAction::Exit]
        } else {
            &[CallAction::HangUp]
        }
    }

    #[must_use]
    pub fn status_label(&self) -> &'static str {
        if self.state() == LiveState::Connecting {
            "A Ligar"
        } else if self.is_speaking() {
            "A Falar"
        } else {
            "A Ouvir"
        }
    }

    /// The caller's voice is currently being picked up.
    #[must_use]
    pub fn voice_detected(&self) -> bool {
        !self.is_speaking() && self.smoothed_volume > VOICE_THRESHOLD
    }
}
