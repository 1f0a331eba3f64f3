//! 16-bit little-endian PCM conversion for the live audio paths.

use base64::Engine as _;
use base64::engine::general_purpose;

/// Microphone capture rate expected by the live model.
pub const INPUT_SAMPLE_RATE: u32 = 16_000;
/// Rate of the audio the live model sends back.
pub const OUTPUT_SAMPLE_RATE: u32 = 24_000;

/// Convert one float sample to PCM16.
///
/// The sample is clamped to `[-1, 1]`; negative values scale by 32768 and
/// positive values by 32767, truncating toward zero. NaN maps to silence.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn sample_to_i16(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 { (s * 32_768.0) as i16 } else { (s * 32_767.0) as i16 }
}

#[must_use]
pub fn encode_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        buf.extend_from_slice(&sample_to_i16(*sample).to_le_bytes());
    }
    buf
}

/// Encode a captured frame as the base64 payload of a realtime input message.
#[must_use]
pub fn encode_pcm16_base64(samples: &[f32]) -> String {
    general_purpose::STANDARD.encode(encode_pcm16(samples))
}

/// Decode PCM16 LE bytes into floats in `[-1, 1)`. A trailing odd byte is ignored.
#[must_use]
pub fn decode_pcm16(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32_768.0)
        .collect()
}

/// Playback length of `frames` mono samples at `sample_rate`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn duration_secs(frames: usize, sample_rate: u32) -> f64 {
    frames as f64 / f64::from(sample_rate)
}
