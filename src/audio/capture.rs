use super::resample::AudioResampler;
use crate::live::AudioCapture;
use crate::transport::BoxFuture;
use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc as std_mpsc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Samples per frame handed to the live session.
pub const FRAME_SAMPLES: usize = 4096;
const FRAME_QUEUE: usize = 32;

/// Default input device, downmixed to mono and resampled to the target rate.
///
/// The cpal stream lives on its own thread and is dropped when the capture
/// is stopped or dropped.
pub struct CpalCapture {
    frames: mpsc::Receiver<Vec<f32>>,
    stop: Option<std_mpsc::Sender<()>>,
}

impl CpalCapture {
    /// # Errors
    /// Returns `Error::AudioDevice` if there is no input device or the stream
    /// cannot be started.
    pub async fn open(sample_rate: u32) -> Result<Self> {
        let (frame_tx, frames) = mpsc::channel(FRAME_QUEUE);
        let (stop, stop_rx) = std_mpsc::channel::<()>();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();

        std::thread::Builder::new()
            .name("rumo-capture".to_string())
            .spawn(move || {
                let stream = match build_stream(sample_rate, frame_tx) {
                    Ok(stream) => stream,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                let _ = stop_rx.recv();
                drop(stream);
                info!("Stopped audio capture");
            })?;

        ready_rx
            .await
            .map_err(|_| Error::AudioDevice("capture thread exited".to_string()))??;
        Ok(Self {
            frames,
            stop: Some(stop),
        })
    }
}

fn build_stream(sample_rate: u32, frame_tx: mpsc::Sender<Vec<f32>>) -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| Error::AudioDevice("No input device available".into()))?;
    info!("Using input device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));

    let config: cpal::StreamConfig = device
        .default_input_config()
        .map_err(|e| Error::AudioDevice(format!("Failed to get input config: {e}")))?
        .into();
    let channels = usize::from(config.channels);
    let mut resampler = AudioResampler::new(config.sample_rate.0, sample_rate)?;
    let mut pending = Vec::with_capacity(FRAME_SAMPLES * 2);
    let mut mono = Vec::new();

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                mono.clear();
                if channels == 1 {
                    mono.extend_from_slice(data);
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let scale = 1.0 / channels as f32;
                    mono.extend(data.chunks(channels).map(|f| f.iter().sum::<f32>() * scale));
                }
                if let Err(e) = resampler.process(&mono, &mut pending) {
                    error!("Dropping captured audio: {e}");
                    resampler.reset();
                }
                while pending.len() >= FRAME_SAMPLES {
                    let frame: Vec<f32> = pending.drain(..FRAME_SAMPLES).collect();
                    if let Err(e) = frame_tx.try_send(frame) {
                        debug!("Dropping captured frame: {e}");
                    }
                }
            },
            |err| error!("Audio input stream error: {err}"),
            None,
        )
        .map_err(|e| Error::AudioDevice(format!("Failed to build input stream: {e}")))?;

    stream
        .play()
        .map_err(|e| Error::AudioDevice(format!("Failed to start input stream: {e}")))?;
    info!(device_rate = config.sample_rate.0, sample_rate, "Started audio capture");
    Ok(stream)
}

impl AudioCapture for CpalCapture {
    fn next_frame(&mut self) -> BoxFuture<'_, Option<Vec<f32>>> {
        Box::pin(self.frames.recv())
    }

    fn stop(&mut self) {
        self.stop.take();
        self.frames.close();
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
