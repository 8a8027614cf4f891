//! Sample-rate conversion, channel mixing and PCM quantisation.
//!
//! The canonical encoding is integer PCM at a fixed rate and channel count.
//! This module provides the conversion steps applied to decoded `f32` audio:
//!
//! 1. [`stereo_to_mono`] : downmix any number of interleaved channels to mono.
//! 2. [`resample`] : resample from any source rate to the target rate with
//!    `rubato` (`FastFixedIn`, septic polynomial).
//! 3. [`mono_to_channels`] : duplicate mono into `n` interleaved channels.
//! 4. [`quantize`] : scale a `[-1.0, 1.0]` sample to a signed integer.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use super::toolkit::ToolkitError;

// ---------------------------------------------------------------------------
// stereo_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging all channels.
///
/// The output length is `samples.len() / channels`.
///
/// * If `channels == 1` the input slice is returned as an owned `Vec`.
/// * If `channels == 0` an empty vector is returned.
///
/// ```rust
/// use corpus_importer::audio::stereo_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, -0.2]; // L R L R
/// let mono = stereo_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.0).abs() < 1e-6);
/// ```
pub fn stereo_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// mono_to_channels
// ---------------------------------------------------------------------------

/// Interleave `mono` into `channels` identical channels.
pub fn mono_to_channels(mono: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => mono.to_vec(),
        n => mono
            .iter()
            .flat_map(|&s| std::iter::repeat(s).take(n as usize))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// resample
// ---------------------------------------------------------------------------

/// Resample mono `samples` from `source_rate` Hz to `target_rate` Hz.
///
/// * Equal rates return the input unchanged.
/// * Empty input returns an empty vector.
///
/// The whole clip is processed as a single chunk, so the output length is
/// approximately `samples.len() * target_rate / source_rate`.
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>, ToolkitError> {
    if source_rate == target_rate {
        return Ok(samples.to_vec());
    }

    if samples.is_empty() {
        return Ok(Vec::new());
    }

    if source_rate == 0 {
        return Err(ToolkitError::Resample("source sample rate is zero".into()));
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        1.0,
        PolynomialDegree::Septic,
        samples.len(),
        1,
    )
    .map_err(|e| ToolkitError::Resample(format!("failed to create resampler: {e}")))?;

    let mut planar = resampler
        .process(&[samples], None)
        .map_err(|e| ToolkitError::Resample(e.to_string()))?;

    Ok(planar.pop().unwrap_or_default())
}

// ---------------------------------------------------------------------------
// quantize
// ---------------------------------------------------------------------------

/// Scale a float sample to a signed integer of `bit_depth` bits, clamping
/// out-of-range input.
///
/// ```rust
/// use corpus_importer::audio::quantize;
///
/// assert_eq!(quantize(1.0, 16), i16::MAX as i32);
/// assert_eq!(quantize(-2.0, 16), -(i16::MAX as i32));
/// assert_eq!(quantize(0.0, 24), 0);
/// ```
pub fn quantize(sample: f32, bit_depth: u16) -> i32 {
    let max = ((1_i64 << (bit_depth.clamp(2, 32) - 1)) - 1) as f64;
    let clamped = (sample as f64).clamp(-1.0, 1.0);
    (clamped * max).round() as i32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
