//! Dataset splitting and manifest output.
//!
//! ```text
//! Corpus (accepted) ──build_rows──▶ Vec<ManifestRow>
//!                   ──split_rows(seed)──▶ DatasetSplit
//!                   ──ManifestWriter::write──▶ train_full.csv / train.csv / dev.csv / test.csv
//! ```
//!
//! Split sizes are validated before any file is opened, so an impossible
//! split never leaves a partial manifest set on disk.

pub mod row;
pub mod split;
pub mod writer;

use std::path::PathBuf;

use thiserror::Error;

pub use row::{build_rows, relative_manifest_path, ManifestRow};
pub use split::{split_rows, split_sizes, DatasetSplit, SplitError};
pub use writer::{ManifestKind, ManifestWriter, MANIFEST_HEADER};

/// Errors raised while building rows or writing manifest files.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV to {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} is not inside the origin directory {origin}")]
    OutsideOrigin { path: PathBuf, origin: PathBuf },
}
