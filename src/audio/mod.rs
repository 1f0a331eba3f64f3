//! Microphone and speaker access through cpal.

pub mod capture;
pub mod output;
pub mod resample;

pub use capture::CpalCapture;
pub use output::CpalSink;

use crate::Result;
use crate::live::{AudioCapture, AudioDevices, AudioSink};
use crate::transport::BoxFuture;

/// The host's default input and output devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpalDevices;

impl AudioDevices for CpalDevices {
    fn open_capture(&self, sample_rate: u32) -> BoxFuture<'_, Result<Box<dyn AudioCapture>>> {
        Box::pin(async move {
            let capture = CpalCapture::open(sample_rate).await?;
            Ok(Box::new(capture) as Box<dyn AudioCapture>)
        })
    }

    fn open_output(&self, sample_rate: u32) -> BoxFuture<'_, Result<Box<dyn AudioSink>>> {
        Box::pin(async move {
            let sink = CpalSink::open(sample_rate).await?;
            Ok(Box::new(sink) as Box<dyn AudioSink>)
        })
    }
}
