use super::resample::resample;
use crate::live::AudioSink;
use crate::transport::BoxFuture;
use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc as std_mpsc;
use tokio::sync::oneshot;
use tracing::{error, info};

struct Queued {
    start: u64,
    samples: Vec<f32>,
}

/// Output timeline in device frames.
#[derive(Default)]
struct Timeline {
    played: u64,
    queue: VecDeque<Queued>,
}

impl Timeline {
    #[allow(clippy::cast_possible_truncation)]
    fn render(&mut self, out: &mut [f32], channels: usize) {
        for (i, frame) in out.chunks_mut(channels).enumerate() {
            let t = self.played + i as u64;
            let mut sample = 0.0;
            for buffer in &self.queue {
                if t < buffer.start {
                    continue;
                }
                if let Some(s) = buffer.samples.get((t - buffer.start) as usize) {
                    sample += s;
                }
            }
            frame.fill(sample);
        }
        self.played += (out.len() / channels.max(1)) as u64;
        let played = self.played;
        self.queue.retain(|b| b.start + b.samples.len() as u64 > played);
    }
}

/// Default output device with a frame clock and start-time scheduling.
pub struct CpalSink {
    timeline: Arc<Mutex<Timeline>>,
    device_rate: u32,
    source_rate: u32,
    stop: Option<std_mpsc::Sender<()>>,
}

impl CpalSink {
    /// Open the output for audio arriving at `source_rate`.
    ///
    /// # Errors
    /// Returns `Error::AudioDevice` if there is no output device or the
    /// stream cannot be started.
    pub async fn open(source_rate: u32) -> Result<Self> {
        let timeline = Arc::new(Mutex::new(Timeline::default()));
        let (stop, stop_rx) = std_mpsc::channel::<()>();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<u32>>();

        let shared = Arc::clone(&timeline);
        std::thread::Builder::new()
            .name("rumo-playback".to_string())
            .spawn(move || {
                let (stream, rate) = match build_stream(shared) {
                    Ok(opened) => opened,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(rate));
                let _ = stop_rx.recv();
                drop(stream);
                info!("Stopped audio playback");
            })?;

        let device_rate = ready_rx
            .await
            .map_err(|_| Error::AudioDevice("playback thread exited".to_string()))??;
        Ok(Self {
            timeline,
            device_rate,
            source_rate,
            stop: Some(stop),
        })
    }
}

fn build_stream(timeline: Arc<Mutex<Timeline>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::AudioDevice("No output device available".into()))?;
    info!("Using output device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));

    let config: cpal::StreamConfig = device
        .default_output_config()
        .map_err(|e| Error::AudioDevice(format!("Failed to get output config: {e}")))?
        .into();
    let channels = usize::from(config.channels);

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                timeline.lock().render(data, channels);
            },
            |err| error!("Audio output stream error: {err}"),
            None,
        )
        .map_err(|e| Error::AudioDevice(format!("Failed to build output stream: {e}")))?;

    stream
        .play()
        .map_err(|e| Error::AudioDevice(format!("Failed to start output stream: {e}")))?;
    info!(device_rate = config.sample_rate.0, "Started audio playback");
    Ok((stream, config.sample_rate.0))
}

impl AudioSink for CpalSink {
    #[allow(clippy::cast_precision_loss)]
    fn current_time(&self) -> f64 {
        self.timeline.lock().played as f64 / f64::from(self.device_rate)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn play(&mut self, samples: Vec<f32>, start_at: f64) -> Result<()> {
        if self.stop.is_none() {
            return Err(Error::AudioDevice("output is closed".to_string()));
        }
        let samples = resample(&samples, self.source_rate, self.device_rate)?;
        let start = (start_at * f64::from(self.device_rate)).round().max(0.0) as u64;
        self.timeline.lock().queue.push_back(Queued { start, samples });
        Ok(())
    }

    fn stop_all(&mut self) {
        self.timeline.lock().queue.clear();
    }

    fn close(&mut self) -> BoxFuture<'_, Result<()>> {
        self.stop_all();
        self.stop.take();
        Box::pin(async { Ok(()) })
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        self.stop.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_plays_buffers_at_their_start_frame() {
        let mut timeline = Timeline::default();
        timeline.queue.push_back(Queued {
            start: 2,
            samples: vec![0.5, 0.25],
        });

        let mut out = [1.0_f32; 6];
        timeline.render(&mut out, 1);
        assert_eq!(out, [0.0, 0.0, 0.5, 0.25, 0.0, 0.0]);
        assert_eq!(timeline.played, 6);
        assert!(timeline.queue.is_empty());
    }

    #[test]
    fn timeline_duplicates_mono_across_channels() {
        let mut timeline = Timeline::default();
        timeline.queue.push_back(Queued {
            start: 0,
            samples: vec![0.5, 0.5, 0.5],
        });

        let mut out = [0.0_f32; 4];
        timeline.render(&mut out, 2);
        assert_eq!(out, [0.5, 0.5, 0.5, 0.5]);
        assert_eq!(timeline.played, 2);
        assert_eq!(timeline.queue.len(), 1);
    }
}
