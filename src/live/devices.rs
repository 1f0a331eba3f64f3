use crate::Result;
use crate::transport::BoxFuture;

/// Opens the microphone and the speaker for a call.
pub trait AudioDevices: Send + Sync {
    fn open_capture(&self, sample_rate: u32) -> BoxFuture<'_, Result<Box<dyn AudioCapture>>>;
    fn open_output(&self, sample_rate: u32) -> BoxFuture<'_, Result<Box<dyn AudioSink>>>;
}

/// Mono float frames from the microphone.
pub trait AudioCapture: Send {
    /// Next captured frame, or `None` once capture has ended.
    fn next_frame(&mut self) -> BoxFuture<'_, Option<Vec<f32>>>;
    fn stop(&mut self);
}

/// Mono output with its own clock, in seconds.
pub trait AudioSink: Send {
    fn current_time(&self) -> f64;

    /// Queue `samples` to start at `start_at` on the sink clock.
    ///
    /// # Errors
    /// Returns an error if the device can no longer accept audio.
    #[allow(clippy::result_large_err)]
    fn play(&mut self, samples: Vec<f32>, start_at: f64) -> Result<()>;

    /// Silence everything queued or playing.
    fn stop_all(&mut self);

    fn close(&mut self) -> BoxFuture<'_, Result<()>>;
}
