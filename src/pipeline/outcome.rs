//! Per-sample outcomes and the run-wide counters they fold into.
//!
//! Every evaluated sample yields one [`SampleOutcome`].  Its
//! [`RunCounters`] contribution is a self-contained value; the conversion
//! driver combines contributions with [`RunCounters::merge`], which is
//! associative and commutative, so the totals do not depend on the order in
//! which workers finish.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

// ---------------------------------------------------------------------------
// OutcomeKind
// ---------------------------------------------------------------------------

/// Counter bucket of a [`SampleOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Accepted,
    Failed,
    InvalidLabel,
    TooShort,
    TooLong,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 5] = [
        OutcomeKind::Accepted,
        OutcomeKind::Failed,
        OutcomeKind::InvalidLabel,
        OutcomeKind::TooShort,
        OutcomeKind::TooLong,
    ];

    /// Stable counter name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            OutcomeKind::Accepted => "accepted",
            OutcomeKind::Failed => "failed",
            OutcomeKind::InvalidLabel => "invalid_label",
            OutcomeKind::TooShort => "too_short",
            OutcomeKind::TooLong => "too_long",
        }
    }
}

// ---------------------------------------------------------------------------
// SampleOutcome
// ---------------------------------------------------------------------------

/// Mutually exclusive classification of one evaluated sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    Accepted {
        wav_path: PathBuf,
        byte_size: u64,
        transcript: String,
    },
    RejectedConversionFailed,
    RejectedInvalidLabel,
    RejectedTooShort,
    RejectedTooLong,
}

impl SampleOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            SampleOutcome::Accepted { .. } => OutcomeKind::Accepted,
            SampleOutcome::RejectedConversionFailed => OutcomeKind::Failed,
            SampleOutcome::RejectedInvalidLabel => OutcomeKind::InvalidLabel,
            SampleOutcome::RejectedTooShort => OutcomeKind::TooShort,
            SampleOutcome::RejectedTooLong => OutcomeKind::TooLong,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, SampleOutcome::Accepted { .. })
    }
}

// ---------------------------------------------------------------------------
// RunCounters
// ---------------------------------------------------------------------------

/// Outcome counts plus imported/total audio length, in frames at the
/// canonical sample rate.  Used for reporting only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    /// Count per outcome kind; kinds never seen are absent.
    pub counts: BTreeMap<OutcomeKind, u64>,
    /// Every evaluated sample.
    pub all: u64,
    /// Frames of accepted samples.
    pub imported_time: u64,
    /// Frames of every sample that produced a measurable output.
    pub total_time: u64,
}

impl RunCounters {
    /// Contribution of a single evaluated sample.
    pub fn for_sample(kind: OutcomeKind, frames: u64) -> Self {
        let mut counts = BTreeMap::new();
        counts.insert(kind, 1);
        Self {
            counts,
            all: 1,
            imported_time: if kind == OutcomeKind::Accepted { frames } else { 0 },
            total_time: frames,
        }
    }

    /// Additive combination of two counter sets.
    pub fn merge(mut self, other: RunCounters) -> RunCounters {
        self.merge_from(&other);
        self
    }

    pub fn merge_from(&mut self, other: &RunCounters) {
        for (kind, n) in &other.counts {
            *self.counts.entry(*kind).or_insert(0) += n;
        }
        self.all += other.all;
        self.imported_time += other.imported_time;
        self.total_time += other.total_time;
    }

    pub fn count(&self, kind: OutcomeKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Sum of all rejection buckets.
    pub fn rejected(&self) -> u64 {
        self.counts
            .iter()
            .filter(|(k, _)| **k != OutcomeKind::Accepted)
            .map(|(_, n)| n)
            .sum()
    }

    pub fn imported_secs(&self, sample_rate: u32) -> f64 {
        self.imported_time as f64 / sample_rate.max(1) as f64
    }

    pub fn total_secs(&self, sample_rate: u32) -> f64 {
        self.total_time as f64 / sample_rate.max(1) as f64
    }

    /// Display adapter with durations expressed in seconds.
    pub fn summary(&self, sample_rate: u32) -> CountersSummary<'_> {
        CountersSummary {
            counters: self,
            sample_rate,
        }
    }
}

impl std::iter::Sum for RunCounters {
    fn sum<I: Iterator<Item = RunCounters>>(iter: I) -> Self {
        iter.fold(RunCounters::default(), RunCounters::merge)
    }
}

/// Human-readable rendering of [`RunCounters`].
pub struct CountersSummary<'a> {
    counters: &'a RunCounters,
    sample_rate: u32,
}

impl fmt::Display for CountersSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.counters;
        write!(f, "all={}", c.all)?;
        for kind in OutcomeKind::ALL {
            write!(f, " {}={}", kind.name(), c.count(kind))?;
        }
        write!(
            f,
            " imported_time={:.1}s total_time={:.1}s",
            c.imported_secs(self.sample_rate),
            c.total_secs(self.sample_rate)
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sample_contribution() {
        let accepted = RunCounters::for_sample(OutcomeKind::Accepted, 32_000);
        assert_eq!(accepted.all, 1);
        assert_eq!(accepted.count(OutcomeKind::Accepted), 1);
        assert_eq!(accepted.imported_time, 32_000);
        assert_eq!(accepted.total_time, 32_000);

        let long = RunCounters::for_sample(OutcomeKind::TooLong, 320_000);
        assert_eq!(long.imported_time, 0);
        assert_eq!(long.total_time, 320_000);
        assert_eq!(long.rejected(), 1);
    }

    #[test]
    fn merge_is_order_independent() {
        let parts = vec![
            RunCounters::for_sample(OutcomeKind::Accepted, 10),
            RunCounters::for_sample(OutcomeKind::TooShort, 20),
            RunCounters::for_sample(OutcomeKind::Failed, 0),
            RunCounters::for_sample(OutcomeKind::Accepted, 40),
        ];

        let forward: RunCounters = parts.clone().into_iter().sum();
        let backward: RunCounters = parts.into_iter().rev().sum();

        assert_eq!(forward, backward);
        assert_eq!(forward.all, 4);
        assert_eq!(forward.count(OutcomeKind::Accepted), 2);
        assert_eq!(forward.rejected(), 2);
        assert_eq!(forward.imported_time, 50);
        assert_eq!(forward.total_time, 70);
    }

    #[test]
    fn merge_is_associative() {
        let a = RunCounters::for_sample(OutcomeKind::Accepted, 1);
        let b = RunCounters::for_sample(OutcomeKind::InvalidLabel, 2);
        let c = RunCounters::for_sample(OutcomeKind::TooLong, 3);

        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = a.merge(b.merge(c));
        assert_eq!(left, right);
    }

    #[test]
    fn summary_lists_every_bucket() {
        let counters = RunCounters::for_sample(OutcomeKind::Accepted, 16_000);
        let text = counters.summary(16_000).to_string();
        assert!(text.contains("all=1"), "{text}");
        assert!(text.contains("too_long=0"), "{text}");
        assert!(text.contains("imported_time=1.0s"), "{text}");
    }

    #[test]
    fn outcome_kind_mapping() {
        assert_eq!(SampleOutcome::RejectedTooLong.kind(), OutcomeKind::TooLong);
        assert_eq!(SampleOutcome::RejectedConversionFailed.kind().name(), "failed");
        assert!(!SampleOutcome::RejectedInvalidLabel.is_accepted());
    }
}
