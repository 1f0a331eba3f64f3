use super::state::LiveState;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    StateChanged(LiveState),
    SpeakingChanged(bool),
    /// Level of the latest captured frame and its smoothed value.
    InputVolume {
        rms: f32,
        smoothed: f32,
    },
    /// Capture could not be opened; the call continues without it.
    MicrophoneUnavailable {
        message: String,
    },
    TurnComplete,
    Closed,
}

pub struct LiveEventStream<'a> {
    rx: &'a mut mpsc::Receiver<LiveEvent>,
}

impl<'a> LiveEventStream<'a> {
    #[must_use]
    pub const fn new(rx: &'a mut mpsc::Receiver<LiveEvent>) -> Self {
        Self { rx }
    }
}

impl Stream for LiveEventStream<'_> {
    type Item = LiveEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        Pin::new(&mut this.rx).poll_recv(cx)
    }
}

/// Slots kept free for everything except volume samples.
const RESERVED_SLOTS: usize = 16;

/// Shared sink for state changes and events, used by the service and its task.
///
/// Events are offered with `try_send` and dropped when the channel is full.
/// Volume samples stop once only `RESERVED_SLOTS` remain, so an undrained
/// stream still carries the state changes that follow.
#[derive(Clone)]
pub(crate) struct Reporter {
    state: Arc<watch::Sender<LiveState>>,
    events: mpsc::Sender<LiveEvent>,
}

impl Reporter {
    pub(crate) fn new(
        state: Arc<watch::Sender<LiveState>>,
        events: mpsc::Sender<LiveEvent>,
    ) -> Self {
        Self { state, events }
    }

    /// Move to `next` if the transition is allowed. Returns whether it changed.
    pub(crate) fn set_state(&self, next: LiveState) -> bool {
        let mut from = None;
        let changed = self.state.send_if_modified(|current| {
            if *current == next || !current.can_transition_to(next) {
                from = Some(*current);
                return false;
            }
            *current = next;
            true
        });
        if changed {
            tracing::debug!(state = %next, "Live state changed");
            self.emit(LiveEvent::StateChanged(next));
        } else if let Some(from) = from.filter(|from| *from != next) {
            tracing::warn!(%from, to = %next, "Ignoring invalid live state transition");
        }
        changed
    }

    pub(crate) fn emit(&self, event: LiveEvent) {
        let is_volume = matches!(event, LiveEvent::InputVolume { .. });
        if is_volume && self.events.capacity() <= RESERVED_SLOTS {
            tracing::trace!("Live event channel nearly full, skipping volume sample");
            return;
        }
        if let Err(err) = self.events.try_send(event) {
            tracing::trace!("Live event dropped: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_emits_only_valid_changes() {
        let (state_tx, state_rx) = watch::channel(LiveState::Idle);
        let (tx, mut rx) = mpsc::channel(8);
        let reporter = Reporter::new(Arc::new(state_tx), tx);

        assert!(reporter.set_state(LiveState::Connecting));
        assert!(!reporter.set_state(LiveState::Connecting));
        assert!(!reporter.set_state(LiveState::Speaking));
        assert!(reporter.set_state(LiveState::Listening));

        assert_eq!(*state_rx.borrow(), LiveState::Listening);
        assert_eq!(rx.try_recv().unwrap(), LiveEvent::StateChanged(LiveState::Connecting));
        assert_eq!(rx.try_recv().unwrap(), LiveEvent::StateChanged(LiveState::Listening));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_channel_drops_events() {
        let (state_tx, _) = watch::channel(LiveState::Idle);
        let (tx, mut rx) = mpsc::channel(1);
        let reporter = Reporter::new(Arc::new(state_tx), tx);
        reporter.emit(LiveEvent::TurnComplete);
        reporter.emit(LiveEvent::Closed);
        assert_eq!(rx.try_recv().unwrap(), LiveEvent::TurnComplete);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn volume_samples_leave_room_for_state_changes() {
        let (state_tx, _) = watch::channel(LiveState::Listening);
        let (tx, mut rx) = mpsc::channel(RESERVED_SLOTS + 4);
        let reporter = Reporter::new(Arc::new(state_tx), tx);

        for _ in 0..100 {
            reporter.emit(LiveEvent::InputVolume {
                rms: 0.5,
                smoothed: 0.5,
            });
        }
        assert!(reporter.set_state(LiveState::Error));
        reporter.emit(LiveEvent::Closed);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 6);
        assert!(events[..4].iter().all(|e| matches!(e, LiveEvent::InputVolume { .. })));
        assert_eq!(events[4], LiveEvent::StateChanged(LiveState::Error));
        assert_eq!(events[5], LiveEvent::Closed);
    }
}
