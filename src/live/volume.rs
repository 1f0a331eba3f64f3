/// Weight of the newest reading in the smoothed level.
pub const SMOOTHING: f32 = 0.2;

/// Smoothed level above which the caller is considered to be talking.
pub const VOICE_THRESHOLD: f32 = 0.02;

/// Root-mean-square level of one captured frame. An empty frame is silent.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f32 = frame.iter().map(|s| s * s).sum();
    (sum / frame.len() as f32).sqrt()
}

/// Exponential moving average of frame levels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VolumeMeter {
    smoothed: f32,
}

impl VolumeMeter {
    #[must_use]
    pub const fn new() -> Self {
        Self { smoothed: 0.0 }
    }

    /// Fold in a new reading and return the smoothed level.
    pub fn update(&mut self, level: f32) -> f32 {
        self.smoothed = self.smoothed.mul_add(1.0 - SMOOTHING, level * SMOOTHING);
        self.smoothed
    }

    #[must_use]
    pub const fn smoothed(&self) -> f32 {
        self.smoothed
    }

    #[must_use]
    pub fn voice_detected(&self) -> bool {
        self.smoothed > VOICE_THRESHOLD
    }

    pub fn reset(&mut self) {
        self.smoothed = 0.0;
    }
}
