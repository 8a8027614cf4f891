//! Canonical output encoding and path helpers.

use std::path::{Path, PathBuf};

use crate::config::AudioConfig;

/// Extension of every converted sample.
pub const CANONICAL_EXTENSION: &str = "wav";

/// Extensions recognised as audio input (compared case-insensitively).
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg"];

// ---------------------------------------------------------------------------
// CanonicalFormat
// ---------------------------------------------------------------------------

/// Fixed encoding shared by all converted samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalFormat {
    pub sample_rate: u32,
    pub bit_depth: u16,
    pub channels: u16,
}

impl Default for CanonicalFormat {
    /// 16 kHz, 16-bit, mono.
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            bit_depth: 16,
            channels: 1,
        }
    }
}

impl From<&AudioConfig> for CanonicalFormat {
    fn from(cfg: &AudioConfig) -> Self {
        Self {
            sample_rate: cfg.sample_rate,
            bit_depth: cfg.bit_depth,
            channels: cfg.channels,
        }
    }
}

impl CanonicalFormat {
    /// Matching `hound` spec for writing integer PCM.
    pub fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bit_depth,
            sample_format: hound::SampleFormat::Int,
        }
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Canonical output path for `source`: the same path with its extension
/// replaced by [`CANONICAL_EXTENSION`].
///
/// ```rust
/// use std::path::Path;
/// use corpus_importer::audio::canonical_path;
///
/// assert_eq!(canonical_path(Path::new("/data/a/clip.mp3")), Path::new("/data/a/clip.wav"));
/// assert_eq!(canonical_path(Path::new("/data/a/clip.wav")), Path::new("/data/a/clip.wav"));
/// ```
pub fn canonical_path(source: &Path) -> PathBuf {
    source.with_extension(CANONICAL_EXTENSION)
}

/// `true` when `path` carries one of the [`AUDIO_EXTENSIONS`].
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
}
