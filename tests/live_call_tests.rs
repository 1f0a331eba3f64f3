use base64::Engine as _;
use base64::engine::general_purpose;
use parking_lot::Mutex;
use rumo_rs::app::{CallAction, LiveCall};
use rumo_rs::live::LiveConfig;
use rumo_rs::live::pcm::{INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE};
use rumo_rs::prompts::{LIVE_CONNECT_FAILED, LIVE_RETRY_FAILED};
use rumo_rs::protocol::live::{ClientMessage, LiveSetup, ServerMessage};
use rumo_rs::transport::BoxFuture;
use rumo_rs::{
    AudioCapture, AudioDevices, AudioSink, Error, LiveConnector, LiveEvent, LiveService,
    LiveState, LiveTransport, Result,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

struct Sink(Arc<Mutex<f64>>);

impl AudioSink for Sink {
    fn current_time(&self) -> f64 {
        *self.0.lock()
    }

    fn play(&mut self, _samples: Vec<f32>, _start_at: f64) -> Result<()> {
        Ok(())
    }

    fn stop_all(&mut self) {}

    fn close(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

struct Mic(mpsc::Receiver<Vec<f32>>);

impl AudioCapture for Mic {
    fn next_frame(&mut self) -> BoxFuture<'_, Option<Vec<f32>>> {
        Box::pin(self.0.recv())
    }

    fn stop(&mut self) {
        self.0.close();
    }
}

struct Devices {
    clock: Arc<Mutex<f64>>,
    mic: Mutex<Option<mpsc::Receiver<Vec<f32>>>>,
}

impl AudioDevices for Devices {
    fn open_capture(&self, _sample_rate: u32) -> BoxFuture<'_, Result<Box<dyn AudioCapture>>> {
        let mic = self.mic.lock().take();
        Box::pin(async move {
            let mic = mic.ok_or_else(|| Error::AudioDevice("no input device".to_string()))?;
            Ok(Box::new(Mic(mic)) as Box<dyn AudioCapture>)
        })
    }

    fn open_output(&self, _sample_rate: u32) -> BoxFuture<'_, Result<Box<dyn AudioSink>>> {
        let sink = Sink(Arc::clone(&self.clock));
        Box::pin(async move { Ok(Box::new(sink) as Box<dyn AudioSink>) })
    }
}

struct Socket {
    incoming: mpsc::Receiver<ServerMessage>,
}

impl LiveTransport for Socket {
    fn send(&mut self, _message: ClientMessage) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    fn next_message(&mut self) -> BoxFuture<'_, Result<Option<ServerMessage>>> {
        Box::pin(async move {
            match self.incoming.recv().await {
                Some(message) => Ok(Some(message)),
                None => std::future::pending().await,
            }
        })
    }

    fn close(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Hands out queued sockets; an empty queue refuses the connection.
#[derive(Default)]
struct Connector {
    sockets: Mutex<Vec<Socket>>,
}

impl LiveConnector for Connector {
    fn connect(&self, _setup: LiveSetup) -> BoxFuture<'_, Result<Box<dyn LiveTransport>>> {
        let socket = self.sockets.lock().pop();
        Box::pin(async move {
            let socket = socket.ok_or(Error::ConnectionClosed)?;
            Ok(Box::new(socket) as Box<dyn LiveTransport>)
        })
    }
}

struct Rig {
    call: LiveCall,
    connector: Arc<Connector>,
    clock: Arc<Mutex<f64>>,
}

impl Rig {
    fn new(mic: Option<mpsc::Receiver<Vec<f32>>>) -> Self {
        let clock = Arc::new(Mutex::new(0.0));
        let connector = Arc::new(Connector::default());
        let devices = Devices {
            clock: Arc::clone(&clock),
            mic: Mutex::new(mic),
        };
        let config = LiveConfig {
            model: "live-test".to_string(),
            voice: "Zephyr".to_string(),
            system_instruction: "fala".to_string(),
            input_sample_rate: INPUT_SAMPLE_RATE,
            output_sample_rate: OUTPUT_SAMPLE_RATE,
        };
        let service = LiveService::new(
            Arc::clone(&connector) as Arc<dyn LiveConnector>,
            Arc::new(devices),
            config,
        );
        Self {
            call: LiveCall::new(service),
            connector,
            clock,
        }
    }

    fn add_socket(&self) -> mpsc::Sender<ServerMessage> {
        let (tx, incoming) = mpsc::channel(8);
        self.connector.sockets.lock().push(Socket { incoming });
        tx
    }

    async fn until(&mut self, done: impl Fn(&LiveCall, &LiveEvent) -> bool) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while let Some(event) = self.call.next_event().await {
                if done(&self.call, &event) {
                    return;
                }
            }
            panic!("event stream ended");
        })
        .await
        .expect("event in time");
    }
}

fn speech(samples: usize) -> ServerMessage {
    let data = general_purpose::STANDARD.encode(vec![0_u8; samples * 2]);
    let blob = json!({ "mimeType": "audio/pcm;rate=24000", "data": data });
    serde_json::from_value(json!({
        "serverContent": { "modelTurn": { "parts": [{ "inlineData": blob }] } }
    }))
    .expect("valid server message")
}

#[tokio::test]
async fn call_follows_model_speech() {
    let (_mic_tx, mic) = mpsc::channel(8);
    let mut rig = Rig::new(Some(mic));
    let server = rig.add_socket();

    rig.call.open().await;
    assert_eq!(rig.call.error(), None);
    assert_eq!(rig.call.state(), LiveState::Listening);
    assert_eq!(rig.call.status_label(), "A Ouvir");
    assert_eq!(rig.call.actions(), &[CallAction::HangUp]);

    server.send(speech(24_000)).await.expect("server open");
    rig.until(|_, e| *e == LiveEvent::SpeakingChanged(true)).await;
    assert!(rig.call.is_speaking());
    assert_eq!(rig.call.status_label(), "A Falar");

    *rig.clock.lock() = 10.0;
    rig.until(|_, e| *e == LiveEvent::SpeakingChanged(false)).await;
    assert_eq!(rig.call.status_label(), "A Ouvir");

    rig.call.close().await;
    assert_eq!(rig.call.state(), LiveState::Closed);
}

#[tokio::test]
async fn loud_microphone_counts_as_voice() {
    let (mic_tx, mic) = mpsc::channel(8);
    let mut rig = Rig::new(Some(mic));
    let _server = rig.add_socket();
    rig.call.open().await;
    assert!(!rig.call.voice_detected());

    mic_tx.send(vec![0.5; 256]).await.expect("mic open");
    rig.until(|_, e| matches!(e, LiveEvent::InputVolume { .. })).await;
    assert!(rig.call.voice_detected());

    rig.call.close().await;
}

#[tokio::test]
async fn failed_connect_offers_retry() {
    let (_mic_tx, mic) = mpsc::channel(8);
    let mut rig = Rig::new(Some(mic));

    rig.call.open().await;
    assert_eq!(rig.call.error(), Some(LIVE_CONNECT_FAILED));
    assert_eq!(rig.call.state(), LiveState::Error);
    assert_eq!(rig.call.actions(), &[CallAction::Retry, CallAction::Exit]);

    rig.call.retry().await;
    assert_eq!(rig.call.error(), Some(LIVE_RETRY_FAILED));

    let _server = rig.add_socket();
    rig.call.retry().await;
    assert_eq!(rig.call.error(), None);
    assert_eq!(rig.call.state(), LiveState::Listening);

    rig.call.close().await;
    assert_eq!(rig.call.state(), LiveState::Closed);
}

#[tokio::test]
async fn missing_microphone_surfaces_error() {
    let mut rig = Rig::new(None);
    let _server = rig.add_socket();

    rig.call.open().await;
    rig.until(|call, _| call.error().is_some()).await;
    assert_eq!(rig.call.error(), Some(LIVE_CONNECT_FAILED));
    assert!(rig.call.actions().contains(&CallAction::Retry));

    rig.call.close().await;
}

#[tokio::test]
async fn server_drop_surfaces_error() {
    let (_mic_tx, mic) = mpsc::channel(8);
    let mut rig = Rig::new(Some(mic));
    let server = rig.add_socket();
    rig.call.open().await;

    let error: ServerMessage = serde_json::from_value(json!({
        "error": { "code": 503, "message": "unavailable", "status": "UNAVAILABLE" }
    }))
    .expect("valid error message");
    server.send(error).await.expect("server open");
    rig.until(|_, e| *e == LiveEvent::StateChanged(LiveState::Error)).await;
    assert_eq!(rig.call.error(), Some(LIVE_CONNECT_FAILED));
    assert!(!rig.call.is_speaking());

    rig.call.close().await;
    assert_eq!(rig.call.state(), LiveState::Closed);
}

#[tokio::test]
async fn server_error_after_busy_microphone_still_offers_retry() {
    let (mic_tx, mic) = mpsc::channel(256);
    let mut rig = Rig::new(Some(mic));
    let server = rig.add_socket();
    rig.call.open().await;

    for _ in 0..200 {
        mic_tx.try_send(vec![0.3; 256]).expect("mic has room");
    }
    let error: ServerMessage = serde_json::from_value(json!({
        "error": { "code": 500, "message": "internal", "status": "INTERNAL" }
    }))
    .expect("valid error message");
    server.send(error).await.expect("server open");

    tokio::time::timeout(Duration::from_secs(1), async {
        while rig.call.state() != LiveState::Error {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("call fails in time");
    assert_eq!(rig.call.error(), Some(LIVE_CONNECT_FAILED));
    assert_eq!(rig.call.actions(), &[CallAction::Retry, CallAction::Exit]);

    let mut drained = Vec::new();
    while let Ok(Some(event)) =
        tokio::time::timeout(Duration::from_millis(50), rig.call.next_event()).await
    {
        drained.push(event);
    }
    assert!(drained.len() <= 128);
    assert!(drained.contains(&LiveEvent::StateChanged(LiveState::Error)));
    assert_eq!(rig.call.error(), Some(LIVE_CONNECT_FAILED));
    assert_eq!(rig.call.actions(), &[CallAction::Retry, CallAction::Exit]);
    assert!(!rig.call.is_speaking());

    rig.call.close().await;
    assert_eq!(rig.call.state(), LiveState::Closed);
}
