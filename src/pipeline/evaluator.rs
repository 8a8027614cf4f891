//! Per-sample validity rules.
//!
//! [`SampleEvaluator::evaluate`] normalizes one source sample and classifies
//! it into exactly one [`SampleOutcome`].  Decision order, first match wins:
//!
//! ```text
//! normalize(source → <stem>.wav)
//!   ├─ failed / target absent / duration unreadable → RejectedConversionFailed
//!   ├─ label validator rejects                       → RejectedInvalidLabel
//!   ├─ duration cannot fit the transcript            → RejectedTooShort
//!   ├─ duration > max_secs                           → RejectedTooLong
//!   └─ otherwise                                     → Accepted
//! ```
//!
//! Conversion is the only side effect; everything after it is computed from
//! the file already on disk.  The evaluator holds no mutable state and is
//! shared by every conversion worker behind an `Arc`.

use std::path::Path;
use std::sync::Arc;

use crate::audio::{canonical_path, AudioNormalizer, NormalizeOutcome};
use crate::config::FilterConfig;

use super::outcome::{OutcomeKind, RunCounters, SampleOutcome};

// ---------------------------------------------------------------------------
// LabelValidator
// ---------------------------------------------------------------------------

/// Pluggable transcript check applied before the duration rules.
pub trait LabelValidator: Send + Sync {
    fn is_valid(&self, transcript: &str) -> bool;
}

/// Default validator: every transcript is valid.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl LabelValidator for AcceptAll {
    fn is_valid(&self, _transcript: &str) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// FilterRules
// ---------------------------------------------------------------------------

/// Duration thresholds, see [`FilterConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterRules {
    pub max_secs: f64,
    pub ms_per_char: f64,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self::from(&FilterConfig::default())
    }
}

impl From<&FilterConfig> for FilterRules {
    fn from(cfg: &FilterConfig) -> Self {
        Self {
            max_secs: cfg.max_secs,
            ms_per_char: cfg.ms_per_char,
        }
    }
}

impl FilterRules {
    /// `true` when `frames` of audio are too few to speak `transcript` at
    /// `ms_per_char` milliseconds per character.
    pub fn is_too_short(&self, frames: u64, sample_rate: u32, transcript: &str) -> bool {
        let budget = (frames as f64 / sample_rate as f64 * 1000.0 / self.ms_per_char).floor();
        budget < transcript.chars().count() as f64
    }

    pub fn is_too_long(&self, duration_secs: f64) -> bool {
        duration_secs > self.max_secs
    }
}

// ---------------------------------------------------------------------------
// SampleReport
// ---------------------------------------------------------------------------

/// Self-contained result of evaluating one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleReport {
    pub outcome: SampleOutcome,
    pub counters: RunCounters,
}

impl SampleReport {
    fn new(outcome: SampleOutcome, frames: u64) -> Self {
        let counters = RunCounters::for_sample(outcome.kind(), frames);
        Self { outcome, counters }
    }

    fn conversion_failed() -> Self {
        Self::new(SampleOutcome::RejectedConversionFailed, 0)
    }

    /// Report used when the worker evaluating a sample never returned.
    pub fn worker_lost() -> Self {
        Self::conversion_failed()
    }
}

// ---------------------------------------------------------------------------
// SampleEvaluator
// ---------------------------------------------------------------------------

pub struct SampleEvaluator {
    normalizer: AudioNormalizer,
    rules: FilterRules,
    validator: Arc<dyn LabelValidator>,
}

impl SampleEvaluator {
    pub fn new(normalizer: AudioNormalizer, rules: FilterRules) -> Self {
        Self {
            normalizer,
            rules,
            validator: Arc::new(AcceptAll),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn LabelValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.normalizer.format().sample_rate
    }

    /// Normalize `source` and classify it.  Never fails; every problem is a
    /// rejection carried in the returned report.
    pub fn evaluate(&self, source: &Path, transcript: &str) -> SampleReport {
        let target = canonical_path(source);

        if let NormalizeOutcome::Failed(e) = self.normalizer.normalize(source, &target) {
            log::warn!("convert: {} failed: {e}", source.display());
            return SampleReport::conversion_failed();
        }

        let byte_size = match std::fs::metadata(&target) {
            Ok(meta) => meta.len(),
            Err(e) => {
                log::warn!("convert: {} missing after conversion: {e}", target.display());
                return SampleReport::conversion_failed();
            }
        };

        let duration = match self.normalizer.toolkit().duration_secs(&target) {
            Ok(secs) => secs,
            Err(e) => {
                log::warn!("convert: cannot measure {}: {e}", target.display());
                return SampleReport::conversion_failed();
            }
        };

        let sample_rate = self.sample_rate();
        let frames = (duration * sample_rate as f64).round().max(0.0) as u64;

        if !self.validator.is_valid(transcript) {
            log::debug!("convert: {} has an invalid label", source.display());
            return SampleReport::new(SampleOutcome::RejectedInvalidLabel, frames);
        }

        if self.rules.is_too_short(frames, sample_rate, transcript) {
            log::debug!(
                "convert: {} too short for its transcript ({duration:.2}s, {} chars)",
                source.display(),
                transcript.chars().count()
            );
            return SampleReport::new(SampleOutcome::RejectedTooShort, frames);
        }

        if self.rules.is_too_long(duration) {
            log::info!(
                "convert: {} too long ({duration:.2}s > {}s)",
                source.display(),
                self.rules.max_secs
            );
            return SampleReport::new(SampleOutcome::RejectedTooLong, frames);
        }

        SampleReport::new(
            SampleOutcome::Accepted {
                wav_path: target,
                byte_size,
                transcript: transcript.to_string(),
            },
            frames,
        )
    }

    /// Kind-only shorthand used in logs and tests.
    pub fn classify(&self, source: &Path, transcript: &str) -> OutcomeKind {
        self.evaluate(source, transcript).outcome.kind()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
