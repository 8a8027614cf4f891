//! Final per-run summary, printed and saved as JSON.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::ImportError;
use crate::manifest::DatasetSplit;
use crate::pipeline::{OutcomeKind, RunCounters};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub corpus: String,
    /// Samples listed by the corpus source.
    pub indexed: usize,
    /// `false` when resampling was bypassed or nothing was indexed.
    pub converted: bool,
    pub sample_rate: u32,
    pub counters: RunCounters,
    pub imported_secs: f64,
    pub total_secs: f64,
    pub train_full: usize,
    pub train: usize,
    pub dev: usize,
    pub test: usize,
    pub manifests: Vec<PathBuf>,
}

impl ImportReport {
    pub fn new(corpus: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            corpus: corpus.into(),
            sample_rate,
            ..Self::default()
        }
    }

    pub fn record_counters(&mut self, counters: RunCounters, converted: bool) {
        self.imported_secs = counters.imported_secs(self.sample_rate);
        self.total_secs = counters.total_secs(self.sample_rate);
        self.counters = counters;
        self.converted = converted;
    }

    pub fn record_split(&mut self, split: &DatasetSplit, manifests: Vec<PathBuf>) {
        self.train_full = split.train_full.len();
        self.train = split.train.len();
        self.dev = split.dev.len();
        self.test = split.test.len();
        self.manifests = manifests;
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ImportError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ImportError::Report {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Corpus {}: {} samples indexed", self.corpus, self.indexed)?;
        if self.converted {
            let c = &self.counters;
            writeln!(f, "  processed: {}", c.all)?;
            for kind in OutcomeKind::ALL {
                writeln!(f, "  {:<13} {}", format!("{}:", kind.name()), c.count(kind))?;
            }
        } else {
            writeln!(f, "  conversion skipped, samples written as listed")?;
        }
        writeln!(
            f,
            "  imported audio: {:.1}s of {:.1}s",
            self.imported_secs, self.total_secs
        )?;
        write!(
            f,
            "  manifests: train_full={} train={} dev={} test={}",
            self.train_full, self.train, self.dev, self.test
        )
    }
}
