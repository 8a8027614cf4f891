//! Audio conversion: decode → downmix → resample → canonical WAV.
//!
//! # Pipeline
//!
//! ```text
//! source (.mp3/.wav/.flac/.ogg) ──AudioNormalizer::normalize──▶ <stem>.wav
//!                                      │
//!                                      └─ AudioToolkit (SymphoniaToolkit)
//!                                           symphonia → stereo_to_mono
//!                                           → resample (rubato) → hound
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use corpus_importer::audio::{canonical_path, AudioNormalizer, CanonicalFormat, SymphoniaToolkit};
//!
//! let normalizer = AudioNormalizer::new(Arc::new(SymphoniaToolkit::new()), CanonicalFormat::default());
//! let source = Path::new("/data/corpus/origin/clip.mp3");
//! let outcome = normalizer.normalize(source, &canonical_path(source));
//! println!("{outcome:?}");
//! ```

pub mod format;
pub mod normalizer;
pub mod resample;
pub mod toolkit;

pub use format::{canonical_path, is_audio_file, CanonicalFormat, AUDIO_EXTENSIONS, CANONICAL_EXTENSION};
pub use normalizer::{AudioNormalizer, NormalizeOutcome};
pub use resample::{mono_to_channels, quantize, resample, stereo_to_mono};
pub use toolkit::{AudioToolkit, SymphoniaToolkit, ToolkitError};

// test-only re-export so pipeline tests can import MockToolkit directly.
#[cfg(test)]
pub use toolkit::MockToolkit;
