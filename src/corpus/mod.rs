//! Corpus data model and the pluggable corpus-parsing interface.
//!
//! A [`Corpus`] is one dataset's in-memory index: transcripts keyed by
//! absolute audio path, the ordered audio list, and the split
//! configuration.  It is produced by a [`CorpusSource`] once the archive has
//! been extracted, replaced by the conversion driver with accepted samples
//! only, and consumed by the manifest writer.
//!
//! Adding support for a new dataset format means implementing
//! [`CorpusSource`]; [`ListingCorpus`] covers the common
//! `path<delim>transcript` listing layout.

pub mod listing;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

pub use listing::ListingCorpus;

// ---------------------------------------------------------------------------
// CorpusError
// ---------------------------------------------------------------------------

/// Errors raised while building a corpus index.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed listing {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// An audio path is listed without a transcript entry.
    #[error("audio path {0} has no transcript")]
    MissingTranscript(PathBuf),
}

// ---------------------------------------------------------------------------
// SplitRatios
// ---------------------------------------------------------------------------

/// Train/test/dev proportions.  They need not sum to one; only the train and
/// test fractions size their partitions, dev receives the remainder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub test: f64,
    pub dev: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.8,
            test: 0.1,
            dev: 0.1,
        }
    }
}

impl From<[f64; 3]> for SplitRatios {
    fn from([train, test, dev]: [f64; 3]) -> Self {
        Self { train, test, dev }
    }
}

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

/// One dataset's index of audio files and transcripts.
///
/// Invariant: every element of `audio_paths` is a key of
/// `utterance_by_path`.  Construct through [`Corpus::new`] to have it
/// checked.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub utterance_by_path: HashMap<PathBuf, String>,
    pub audio_paths: Vec<PathBuf>,
    pub split_ratios: SplitRatios,
    pub resample_requested: bool,
}

impl Corpus {
    pub fn new(
        utterance_by_path: HashMap<PathBuf, String>,
        audio_paths: Vec<PathBuf>,
        split_ratios: SplitRatios,
        resample_requested: bool,
    ) -> Result<Self, CorpusError> {
        if let Some(orphan) = audio_paths.iter().find(|p| !utterance_by_path.contains_key(*p)) {
            return Err(CorpusError::MissingTranscript(orphan.clone()));
        }
        Ok(Self {
            utterance_by_path,
            audio_paths,
            split_ratios,
            resample_requested,
        })
    }

    pub fn len(&self) -> usize {
        self.audio_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.audio_paths.is_empty()
    }

    pub fn transcript(&self, path: &Path) -> Option<&str> {
        self.utterance_by_path.get(path).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// CorpusSource trait
// ---------------------------------------------------------------------------

/// Corpus-format adapter injected into the import orchestrator.
///
/// Implementors must be `Send + Sync` so they can be held as
/// `Arc<dyn CorpusSource>`.
///
/// # Arguments
/// * `extracted_root` – directory the archive was extracted into
///   (`<origin>/<archive name>`).
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Build the corpus index from the extracted archive.
    async fn load(&self, extracted_root: &Path) -> Result<Corpus, CorpusError>;
}
