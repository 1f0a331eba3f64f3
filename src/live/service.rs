use super::devices::{AudioCapture, AudioDevices, AudioSink};
use super::events::{LiveEvent, LiveEventStream, Reporter};
use super::pcm::{self, INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE};
use super::scheduler::PlaybackScheduler;
use super::state::{LiveState, SpeakingTracker};
use super::transport::{LiveConnector, LiveTransport, WsConnector};
use super::volume::{VolumeMeter, rms};
use crate::config::Settings;
use crate::protocol::live::{ClientMessage, LiveSetup, RealtimeInput, ServerMessage};
use crate::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

const EVENT_CHANNEL_CAPACITY: usize = 128;
const PLAYBACK_TICK: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct LiveConfig {
    pub model: String,
    pub voice: String,
    pub system_instruction: String,
    pub input_sample_rate: u32,
    pub output_sample_rate: u32,
}

impl From<&Settings> for LiveConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            model: settings.live_model.clone(),
            voice: settings.voice.clone(),
            system_instruction: settings.live_instruction.clone(),
            input_sample_rate: INPUT_SAMPLE_RATE,
            output_sample_rate: OUTPUT_SAMPLE_RATE,
        }
    }
}

enum Command {
    Disconnect { done: oneshot::Sender<()> },
}

struct ActiveCall {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

/// Real-time voice call with the live model.
///
/// One call at a time. The call runs in a spawned task that owns the
/// transport, the microphone and the speaker; this handle drives it with
/// commands and observes it through [`LiveEvent`]s and a state watch.
pub struct LiveService {
    connector: Arc<dyn LiveConnector>,
    devices: Arc<dyn AudioDevices>,
    config: LiveConfig,
    reporter: Reporter,
    state_rx: watch::Receiver<LiveState>,
    event_rx: mpsc::Receiver<LiveEvent>,
    active: Option<ActiveCall>,
}

impl LiveService {
    #[must_use]
    pub fn new(
        connector: Arc<dyn LiveConnector>,
        devices: Arc<dyn AudioDevices>,
        config: LiveConfig,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(LiveState::Idle);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            connector,
            devices,
            config,
            reporter: Reporter::new(Arc::new(state_tx), event_tx),
            state_rx,
            event_rx,
            active: None,
        }
    }

    /// Live service over the Gemini Live WebSocket with the given devices.
    #[must_use]
    pub fn from_settings(settings: &Settings, devices: Arc<dyn AudioDevices>) -> Self {
        let connector = WsConnector::new(settings.live_url.clone(), settings.api_key.clone());
        Self::new(Arc::new(connector), devices, LiveConfig::from(settings))
    }

    #[must_use]
    pub fn state(&self) -> LiveState {
        *self.state_rx.borrow()
    }

    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<LiveState> {
        self.state_rx.clone()
    }

    pub async fn next_event(&mut self) -> Option<LiveEvent> {
        self.event_rx.recv().await
    }

    #[must_use]
    pub fn events(&mut self) -> LiveEventStream<'_> {
        LiveEventStream::new(&mut self.event_rx)
    }

    /// Open a call: speaker at the output rate, the live session, then the
    /// microphone at the input rate.
    ///
    /// A microphone failure does not fail the call; it is reported as
    /// [`LiveEvent::MicrophoneUnavailable`] and the call runs without input.
    /// Any call still open is torn down first, so this also serves as retry.
    ///
    /// # Errors
    /// Returns an error if the speaker cannot be opened or the session cannot
    /// be established. The state is then [`LiveState::Error`] and everything
    /// opened so far has been released.
    pub async fn connect(&mut self) -> Result<()> {
        if self.state().is_connected() {
            self.disconnect().await;
        } else {
            self.stop_active().await;
        }
        self.reporter.set_state(LiveState::Connecting);

        match self.open_call().await {
            Ok(call) => {
                self.active = Some(call);
                Ok(())
            }
            Err(err) => {
                tracing::error!("Live connect failed: {err}");
                self.reporter.set_state(LiveState::Error);
                Err(err)
            }
        }
    }

    /// Retry after an error. Same as [`Self::connect`].
    ///
    /// # Errors
    /// See [`Self::connect`].
    pub async fn retry(&mut self) -> Result<()> {
        tracing::info!("Retrying live connection");
        self.connect().await
    }

    /// End the call and release every resource. Safe in any state.
    pub async fn disconnect(&mut self) {
        let had_call = self.active.is_some();
        self.stop_active().await;
        if (had_call || self.state() != LiveState::Idle)
            && self.reporter.set_state(LiveState::Closed)
        {
            self.reporter.emit(LiveEvent::Closed);
            tracing::info!("Live call closed");
        }
    }

    async fn open_call(&self) -> Result<ActiveCall> {
        let mut sink = self.devices.open_output(self.config.output_sample_rate).await?;

        let setup = LiveSetup::audio(
            &self.config.model,
            &self.config.voice,
            Some(&self.config.system_instruction),
        );
        let transport = match self.connector.connect(setup).await {
            Ok(transport) => transport,
            Err(err) => {
                close_quietly(sink.as_mut()).await;
                return Err(err);
            }
        };
        tracing::info!(model = %self.config.model, "Live session open");

        let capture = match self.devices.open_capture(self.config.input_sample_rate).await {
            Ok(capture) => Some(capture),
            Err(err) => {
                tracing::warn!("Microphone unavailable, continuing without input: {err}");
                self.reporter.emit(LiveEvent::MicrophoneUnavailable {
                    message: err.to_string(),
                });
                None
            }
        };

        self.reporter.set_state(LiveState::Listening);

        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let call = CallTask {
            transport,
            capture,
            sink,
            scheduler: PlaybackScheduler::new(),
            speaking: SpeakingTracker::default(),
            meter: VolumeMeter::new(),
            output_sample_rate: self.config.output_sample_rate,
            reporter: self.reporter.clone(),
        };
        let task = tokio::spawn(call.run(cmd_rx));
        Ok(ActiveCall {
            commands: cmd_tx,
            task,
        })
    }

    async fn stop_active(&mut self) {
        let Some(call) = self.active.take() else {
            return;
        };
        let (done_tx, done_rx) = oneshot::channel();
        if call.commands.send(Command::Disconnect { done: done_tx }).await.is_ok() {
            let _ = done_rx.await;
        }
        if let Err(err) = call.task.await {
            tracing::debug!("Live task ended abnormally: {err}");
        }
    }
}

struct CallTask {
    transport: Box<dyn LiveTransport>,
    capture: Option<Box<dyn AudioCapture>>,
    sink: Box<dyn AudioSink>,
    scheduler: PlaybackScheduler,
    speaking: SpeakingTracker,
    meter: VolumeMeter,
    output_sample_rate: u32,
    reporter: Reporter,
}

impl CallTask {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut tick = tokio::time::interval(PLAYBACK_TICK);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let failure = loop {
            tokio::select! {
                cmd = commands.recv() => {
                    match cmd {
                        Some(Command::Disconnect { done }) => {
                            self.teardown().await;
                            let _ = done.send(());
                            return;
                        }
                        None => break None,
                    }
                }
                frame = next_frame(&mut self.capture) => {
                    match frame {
                        Some(samples) => {
                            if let Err(err) = self.send_frame(&samples).await {
                                break Some(err);
                            }
                        }
                        None => {
                            tracing::warn!("Microphone capture ended");
                            self.capture = None;
                        }
                    }
                }
                msg = self.transport.next_message() => {
                    match msg {
                        Ok(Some(msg)) => {
                            if let Err(err) = self.handle_message(msg) {
                                break Some(err);
                            }
                        }
                        Ok(None) => break Some(Error::ConnectionClosed),
                        Err(err) => break Some(err),
                    }
                }
                _ = tick.tick() => {
                    let now = self.sink.current_time();
                    self.scheduler.reap(now);
                    self.sync_speaking();
                }
            }
        };

        self.teardown().await;
        if let Some(err) = failure {
            tracing::error!("Live session failed: {err}");
            self.reporter.set_state(LiveState::Error);
        }
    }

    async fn send_frame(&mut self, samples: &[f32]) -> Result<()> {
        let level = rms(samples);
        let smoothed = self.meter.update(level);
        self.reporter.emit(LiveEvent::InputVolume {
            rms: level,
            smoothed,
        });

        let data = pcm::encode_pcm16_base64(samples);
        self.transport
            .send(ClientMessage::RealtimeInput(RealtimeInput::pcm16k(data)))
            .await
    }

    #[allow(clippy::result_large_err)]
    fn handle_message(&mut self, mut msg: ServerMessage) -> Result<()> {
        if let Some(err) = msg.error.take() {
            return Err(Error::Api(err));
        }
        if let Some(go_away) = &msg.go_away {
            tracing::info!(time_left = ?go_away.time_left, "Server will end the live session");
        }

        for blob in msg.audio_blobs() {
            let bytes = match general_purpose::STANDARD.decode(&blob.data) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!("Skipping undecodable audio chunk: {err}");
                    continue;
                }
            };
            let samples = pcm::decode_pcm16(&bytes);
            if samples.is_empty() {
                continue;
            }
            let duration = pcm::duration_secs(samples.len(), self.output_sample_rate);
            let slot = self.scheduler.schedule(self.sink.current_time(), duration);
            self.sink.play(samples, slot.start)?;
        }

        if msg.interrupted() {
            tracing::debug!("Reply interrupted, flushing playback");
            self.sink.stop_all();
            self.scheduler.flush(self.sink.current_time());
        }
        if msg.turn_complete() {
            self.reporter.emit(LiveEvent::TurnComplete);
        }

        self.sync_speaking();
        Ok(())
    }

    fn sync_speaking(&mut self) {
        if let Some(speaking) = self.speaking.update(self.scheduler.is_active()) {
            self.reporter.emit(LiveEvent::SpeakingChanged(speaking));
            let state = if speaking { LiveState::Speaking } else { LiveState::Listening };
            self.reporter.set_state(state);
        }
    }

    async fn teardown(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            capture.stop();
        }
        self.sink.stop_all();
        self.scheduler.flush(self.sink.current_time());
        if let Some(speaking) = self.speaking.update(false) {
            self.reporter.emit(LiveEvent::SpeakingChanged(speaking));
        }
        close_quietly(self.sink.as_mut()).await;
        if let Err(err) = self.transport.close().await {
            tracing::debug!("Ignoring live transport close error: {err}");
        }
    }
}

async fn next_frame(capture: &mut Option<Box<dyn AudioCapture>>) -> Option<Vec<f32>> {
    match capture {
        Some(capture) => capture.next_frame().await,
        None => std::future::pending().await,
    }
}

async fn close_quietly(sink: &mut dyn AudioSink) {
    if let Err(err) = sink.close().await {
        tracing::debug!("Ignoring audio output close error: {err}");
    }
}
