use crate::{Error, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

/// Input frames handed to the sinc resampler per call.
pub const CHUNK_FRAMES: usize = 1024;

fn sinc_params() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// Streaming mono resampler over rubato's `SincFixedIn`.
///
/// Input is buffered until a full chunk is available, so callers may push
/// frames of any size. Equal rates pass samples through untouched.
pub struct AudioResampler {
    inner: Option<SincFixedIn<f32>>,
    input_rate: u32,
    output_rate: u32,
    pending: Vec<f32>,
}

impl AudioResampler {
    /// # Errors
    /// Returns `Error::AudioDevice` if a rate is zero or rubato rejects the ratio.
    #[allow(clippy::result_large_err)]
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(Error::AudioDevice("sample rates must be greater than 0".into()));
        }
        let inner = if input_rate == output_rate {
            None
        } else {
            let ratio = f64::from(output_rate) / f64::from(input_rate);
            let resampler = SincFixedIn::<f32>::new(ratio, 1.0, sinc_params(), CHUNK_FRAMES, 1)
                .map_err(|e| Error::AudioDevice(format!("Failed to create resampler: {e}")))?;
            debug!(input_rate, output_rate, "Created resampler");
            Some(resampler)
        };
        Ok(Self {
            inner,
            input_rate,
            output_rate,
            pending: Vec::with_capacity(CHUNK_FRAMES),
        })
    }

    #[must_use]
    pub const fn is_passthrough(&self) -> bool {
        self.inner.is_none()
    }

    #[must_use]
    pub const fn input_rate(&self) -> u32 {
        self.input_rate
    }

    #[must_use]
    pub const fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Push `input` and append every sample that is ready to `out`.
    ///
    /// # Errors
    /// Returns `Error::AudioDevice` if rubato fails on a chunk.
    #[allow(clippy::result_large_err)]
    pub fn process(&mut self, input: &[f32], out: &mut Vec<f32>) -> Result<()> {
        let Some(resampler) = self.inner.as_mut() else {
            out.extend_from_slice(input);
            return Ok(());
        };
        self.pending.extend_from_slice(input);
        loop {
            let needed = resampler.input_frames_next();
            if self.pending.len() < needed {
                return Ok(());
            }
            let chunk: Vec<f32> = self.pending.drain(..needed).collect();
            let output = resampler
                .process(&[chunk], None)
                .map_err(|e| Error::AudioDevice(format!("Resampling failed: {e}")))?;
            out.extend_from_slice(&output[0]);
        }
    }

    /// Flush buffered input, zero-padded to a full chunk, and keep only the
    /// output that corresponds to real samples.
    ///
    /// # Errors
    /// Returns `Error::AudioDevice` if rubato fails on the last chunk.
    #[allow(
        clippy::result_large_err,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn finish(&mut self, out: &mut Vec<f32>) -> Result<()> {
        let Some(resampler) = self.inner.as_mut() else {
            return Ok(());
        };
        if self.pending.is_empty() {
            return Ok(());
        }
        let real = self.pending.len();
        let mut chunk = std::mem::take(&mut self.pending);
        chunk.resize(resampler.input_frames_next(), 0.0);
        let output = resampler
            .process(&[chunk], None)
            .map_err(|e| Error::AudioDevice(format!("Resampling failed: {e}")))?;
        let ratio = f64::from(self.output_rate) / f64::from(self.input_rate);
        let keep = ((real as f64) * ratio).ceil() as usize;
        out.extend_from_slice(&output[0][..keep.min(output[0].len())]);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        if let Some(resampler) = self.inner.as_mut() {
            resampler.reset();
        }
    }
}

/// Resample a complete mono buffer in one go.
///
/// # Errors
/// Returns `Error::AudioDevice` if the resampler cannot be built or fails.
#[allow(clippy::result_large_err)]
pub fn resample(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate {
        return Ok(input.to_vec());
    }
    let mut resampler = AudioResampler::new(input_rate, output_rate)?;
    let mut out = Vec::new();
    resampler.process(input, &mut out)?;
    resampler.finish(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss)]
    fn tone(len: usize, rate: u32) -> Vec<f32> {
        (0..len)
            .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn same_rate_is_identity() {
        assert_eq!(resample(&[0.1, 0.2, 0.3], 16_000, 16_000).unwrap(), vec![0.1, 0.2, 0.3]);
        assert!(AudioResampler::new(24_000, 24_000).unwrap().is_passthrough());
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(matches!(AudioResampler::new(0, 16_000), Err(Error::AudioDevice(_))));
        assert!(AudioResampler::new(48_000, 0).is_err());
    }

    #[test]
    fn microphone_rate_down_to_sixteen_khz() {
        let input = tone(48_000, 48_000);
        let output = resample(&input, 48_000, 16_000).unwrap();
        assert!(output.len().abs_diff(16_000) <= 2, "got {}", output.len());
        let peak = output.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.4 && peak < 0.6, "peak {peak}");
    }

    #[test]
    fn reply_audio_up_from_twenty_four_khz() {
        let input = tone(24_000, 24_000);
        let output = resample(&input, 24_000, 48_000).unwrap();
        assert!(output.len().abs_diff(48_000) <= 2, "got {}", output.len());
    }

    #[test]
    fn streaming_small_frames_buffers_until_a_chunk_is_ready() {
        let mut resampler = AudioResampler::new(44_100, 16_000).unwrap();
        let input = tone(CHUNK_FRAMES * 4, 44_100);
        let mut out = Vec::new();

        resampler.process(&input[..100], &mut out).unwrap();
        assert!(out.is_empty());

        for frame in input[100..].chunks(333) {
            resampler.process(frame, &mut out).unwrap();
        }
        let expected = CHUNK_FRAMES * 4 * 16_000 / 44_100;
        assert!(out.len().abs_diff(expected) <= 2, "got {} want {expected}", out.len());
    }
}
