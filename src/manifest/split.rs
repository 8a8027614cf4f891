//! Seeded shuffle and positional train/test/dev partition.
//!
//! ```text
//! rows ──shuffle(StdRng::seed_from_u64(seed))──▶ train_full
//!        [0, train_len)                      → train
//!        [train_len, train_len + test_len)   → test
//!        [train_len + test_len, N)           → dev
//! ```
//!
//! `train_len = floor(N × train)` and `test_len = floor(N × test)`; the dev
//! ratio is not used, dev receives whatever remains.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use super::row::ManifestRow;
use crate::corpus::SplitRatios;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("train ({train_len}) and test ({test_len}) rows exceed the {total} accepted samples")]
    Oversized {
        train_len: usize,
        test_len: usize,
        total: usize,
    },
}

/// The four manifests of one import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetSplit {
    pub train_full: Vec<ManifestRow>,
    pub train: Vec<ManifestRow>,
    pub test: Vec<ManifestRow>,
    pub dev: Vec<ManifestRow>,
}

/// `(train_len, test_len)` for `total` rows.
pub fn split_sizes(total: usize, ratios: &SplitRatios) -> Result<(usize, usize), SplitError> {
    let train_len = (total as f64 * ratios.train).floor() as usize;
    let test_len = (total as f64 * ratios.test).floor() as usize;
    if train_len + test_len > total {
        return Err(SplitError::Oversized {
            train_len,
            test_len,
            total,
        });
    }
    Ok((train_len, test_len))
}

/// Shuffle `rows` with a generator seeded from `seed` and partition them.
pub fn split_rows(
    mut rows: Vec<ManifestRow>,
    ratios: &SplitRatios,
    seed: u64,
) -> Result<DatasetSplit, SplitError> {
    let (train_len, test_len) = split_sizes(rows.len(), ratios)?;

    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);

    let train = rows[..train_len].to_vec();
    let test = rows[train_len..train_len + test_len].to_vec();
    let dev = rows[train_len + test_len..].to_vec();

    log::info!(
        "manifest: split {} rows into train={} test={} dev={}",
        rows.len(),
        train.len(),
        test.len(),
        dev.len()
    );

    Ok(DatasetSplit {
        train_full: rows,
        train,
        test,
        dev,
    })
}
