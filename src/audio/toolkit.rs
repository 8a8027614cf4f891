//! Audio toolkit trait and the symphonia/rubato/hound implementation.
//!
//! # Overview
//!
//! [`AudioToolkit`] is the interface the normalizer and evaluator use for the
//! two operations they need from an audio library: convert a file to the
//! canonical encoding, and measure a file's duration.  It is object-safe and
//! `Send + Sync` so it can be held behind an `Arc<dyn AudioToolkit>` and
//! called from every conversion worker.
//!
//! [`SymphoniaToolkit`] is the production implementation:
//!
//! ```text
//! source file → symphonia probe/decode → interleaved f32
//!             → stereo_to_mono → rubato resample → mono_to_channels
//!             → quantize → hound WavWriter (<target>.part) → rename
//! ```
//!
//! [`MockToolkit`] (available under `#[cfg(test)]`) writes a placeholder file
//! and reports pre-configured durations, so the pipeline can be tested
//! without real audio.

use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use super::format::CanonicalFormat;
use super::resample::{mono_to_channels, quantize, resample, stereo_to_mono};

// ---------------------------------------------------------------------------
// ToolkitError
// ---------------------------------------------------------------------------

/// Failures reported by an [`AudioToolkit`].
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// The file could not be opened, read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The container or codec is not supported, or no audio track exists.
    #[error("unsupported audio in {path}: {reason}")]
    Unsupported { path: PathBuf, reason: String },

    /// Decoding produced an error or no samples.
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// Sample-rate conversion failed.
    #[error("resampling failed: {0}")]
    Resample(String),

    /// Writing the WAV output failed.
    #[error("failed to write {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
}

impl ToolkitError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioToolkit trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface to an audio conversion library.
///
/// # Contract
///
/// - `convert` writes `target` encoded in `format`.  On error `target` must
///   not exist afterwards.
/// - `duration_secs` returns the playable length of any supported file.
pub trait AudioToolkit: Send + Sync {
    /// Convert `source` into `target` using the canonical `format`.
    fn convert(&self, source: &Path, target: &Path, format: &CanonicalFormat) -> Result<(), ToolkitError>;

    /// Measure the duration of `path` in seconds.
    fn duration_secs(&self, path: &Path) -> Result<f64, ToolkitError>;
}

// Compile-time assertion: Box<dyn AudioToolkit> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioToolkit>) {}
};

// ---------------------------------------------------------------------------
// SymphoniaToolkit
// ---------------------------------------------------------------------------

/// Production toolkit: symphonia decoding, rubato resampling, hound encoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaToolkit;

/// Decoded interleaved audio with its native parameters.
struct DecodedAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl SymphoniaToolkit {
    pub fn new() -> Self {
        Self
    }

    fn decode(path: &Path) -> Result<DecodedAudio, ToolkitError> {
        let file = File::open(path).map_err(|e| ToolkitError::io(path, e))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| ToolkitError::Unsupported {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| ToolkitError::Unsupported {
                path: path.to_path_buf(),
                reason: "no supported audio track".into(),
            })?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track.codec_params.channels.map(|c| c.count() as u16);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| ToolkitError::Unsupported {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                // End of stream.
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => {
                    return Err(ToolkitError::Decode {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    })
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                // Corrupt frames are skipped, as players do.
                Err(SymphoniaError::DecodeError(msg)) => {
                    log::debug!("toolkit: skipping corrupt frame in {}: {msg}", path.display());
                    continue;
                }
                Err(e) => {
                    return Err(ToolkitError::Decode {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    })
                }
            };

            let spec = *decoded.spec();
            sample_rate.get_or_insert(spec.rate);
            channels.get_or_insert(spec.channels.count() as u16);

            let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }

        let decode_err = |reason: &str| ToolkitError::Decode {
            path: path.to_path_buf(),
            reason: reason.into(),
        };
        let sample_rate = sample_rate.ok_or_else(|| decode_err("unknown sample rate"))?;
        let channels = channels.ok_or_else(|| decode_err("unknown channel count"))?;
        if samples.is_empty() {
            return Err(decode_err("decoded audio was empty"));
        }

        Ok(DecodedAudio {
            samples,
            sample_rate,
            channels,
        })
    }

    fn write_wav(path: &Path, samples: &[f32], format: &CanonicalFormat) -> Result<(), ToolkitError> {
        let encode_err = |e: hound::Error| ToolkitError::Encode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let mut writer = hound::WavWriter::create(path, format.wav_spec()).map_err(encode_err)?;
        for &s in samples {
            writer
                .write_sample(quantize(s, format.bit_depth))
                .map_err(encode_err)?;
        }
        writer.finalize().map_err(encode_err)
    }
}

impl AudioToolkit for SymphoniaToolkit {
    fn convert(&self, source: &Path, target: &Path, format: &CanonicalFormat) -> Result<(), ToolkitError> {
        let decoded = Self::decode(source)?;

        let mono = stereo_to_mono(&decoded.samples, decoded.channels);
        let resampled = resample(&mono, decoded.sample_rate, format.sample_rate)?;
        let output = mono_to_channels(&resampled, format.channels);

        // Encode next to the target, then rename so a failed or interrupted
        // conversion never leaves a truncated canonical file behind.
        let partial = target.with_extension("wav.part");
        if let Err(e) = Self::write_wav(&partial, &output, format) {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
        std::fs::rename(&partial, target).map_err(|e| {
            let _ = std::fs::remove_file(&partial);
            ToolkitError::io(target, e)
        })
    }

    fn duration_secs(&self, path: &Path) -> Result<f64, ToolkitError> {
        // Canonical outputs are WAV; read the header directly.
        if let Ok(reader) = hound::WavReader::open(path) {
            let spec = reader.spec();
            if spec.sample_rate > 0 {
                return Ok(reader.duration() as f64 / spec.sample_rate as f64);
            }
        }

        let file = File::open(path).map_err(|e| ToolkitError::io(path, e))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }
        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| ToolkitError::Unsupported {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let params = probed
            .format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .map(|t| t.codec_params.clone())
            .ok_or_else(|| ToolkitError::Unsupported {
                path: path.to_path_buf(),
                reason: "no supported audio track".into(),
            })?;

        match (params.n_frames, params.sample_rate) {
            (Some(frames), Some(rate)) if rate > 0 => Ok(frames as f64 / rate as f64),
            _ => {
                // No frame count in the container header: decode fully.
                let decoded = Self::decode(path)?;
                let frames = decoded.samples.len() / decoded.channels.max(1) as usize;
                Ok(frames as f64 / decoded.sample_rate as f64)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MockToolkit (test double)
// ---------------------------------------------------------------------------

/// Test toolkit that writes a fixed-size placeholder instead of real audio.
///
/// Durations are looked up by the *target* file stem; unknown stems use
/// `default_secs`.  Sources whose stem is listed in `failing` report a
/// conversion error and write nothing.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockToolkit {
    pub default_secs: f64,
    pub durations: std::collections::HashMap<String, f64>,
    pub failing: std::collections::HashSet<String>,
    pub conversions: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockToolkit {
    pub fn with_default(secs: f64) -> Self {
        Self {
            default_secs: secs,
            ..Default::default()
        }
    }

    pub fn duration(mut self, stem: &str, secs: f64) -> Self {
        self.durations.insert(stem.into(), secs);
        self
    }

    pub fn fail(mut self, stem: &str) -> Self {
        self.failing.insert(stem.into());
        self
    }

    pub fn conversion_count(&self) -> usize {
        self.conversions.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn stem(path: &Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl AudioToolkit for MockToolkit {
    fn convert(&self, source: &Path, target: &Path, _format: &CanonicalFormat) -> Result<(), ToolkitError> {
        self.conversions
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.failing.contains(&Self::stem(source)) {
            return Err(ToolkitError::Decode {
                path: source.to_path_buf(),
                reason: "mock failure".into(),
            });
        }
        std::fs::write(target, [0u8; 44]).map_err(|e| ToolkitError::io(target, e))
    }

    fn duration_secs(&self, path: &Path) -> Result<f64, ToolkitError> {
        Ok(self
            .durations
            .get(&Self::stem(path))
            .copied()
            .unwrap_or(self.default_secs))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_tone(path: &Path, sample_rate: u32, channels: u16, secs: f64) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (secs * sample_rate as f64) as usize;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let s = (0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() * i16::MAX as f32) as i16;
            for _ in 0..channels {
                writer.write_sample(s).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn converts_stereo_44k_to_canonical_wav() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.wav");
        let target = dir.path().join("target.wav");
        write_tone(&source, 44_100, 2, 1.0);

        SymphoniaToolkit::new()
            .convert(&source, &target, &CanonicalFormat::default())
            .expect("conversion");

        let reader = hound::WavReader::open(&target).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert!(reader.duration().abs_diff(16_000) <= 160, "frames: {}", reader.duration());
        assert!(!dir.path().join("target.wav.part").exists());
    }

    #[test]
    fn measures_wav_duration() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("two_secs.wav");
        write_tone(&path, 16_000, 1, 2.0);

        let secs = SymphoniaToolkit::new().duration_secs(&path).unwrap();
        assert!((secs - 2.0).abs() < 1e-6, "{secs}");
    }

    #[test]
    fn garbage_input_fails_and_leaves_no_target() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("broken.mp3");
        let target = dir.path().join("broken.wav");
        std::fs::write(&source, b"definitely not audio").unwrap();

        let result = SymphoniaToolkit::new().convert(&source, &target, &CanonicalFormat::default());

        assert!(result.is_err());
        assert!(!target.exists());
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = tempdir().unwrap();
        let err = SymphoniaToolkit::new()
            .convert(
                &dir.path().join("absent.mp3"),
                &dir.path().join("absent.wav"),
                &CanonicalFormat::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ToolkitError::Io { .. }), "{err}");
    }
}
