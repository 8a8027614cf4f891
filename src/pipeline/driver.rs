//! Parallel conversion driver.
//!
//! Fans every sample of a [`Corpus`] out to a fixed-size pool of blocking
//! workers, folds the per-sample [`RunCounters`] as results complete, and
//! rebuilds the corpus from accepted samples only.
//!
//! ```text
//! Corpus ──(duplicate-target check)──▶ JoinSet
//!                                        │  each task: acquire permit
//!                                        │             spawn_blocking(evaluate)
//!                                        ▼
//!                           join_next() in completion order
//!                                        │  counters.merge(report.counters)
//!                                        ▼
//!                Corpus { accepted canonical paths, input order }
//! ```
//!
//! When the corpus does not request resampling the driver is bypassed: the
//! corpus is returned untouched with zeroed counters.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::corpus::Corpus;

use super::evaluator::{SampleEvaluator, SampleReport};
use super::outcome::{RunCounters, SampleOutcome};

// ---------------------------------------------------------------------------
// ConversionError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConversionError {
    /// The pool was configured with zero workers.
    #[error("conversion needs at least one worker")]
    NoWorkers,

    /// Two listed samples would be written to the same canonical file.
    #[error("{first} and {second} both convert to {target}")]
    DuplicateTarget {
        target: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// ConversionResult
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ConversionResult {
    /// Accepted samples only, keyed by canonical WAV path.
    pub corpus: Corpus,
    pub counters: RunCounters,
    /// `false` when resampling was bypassed.
    pub converted: bool,
}

// ---------------------------------------------------------------------------
// ConversionDriver
// ---------------------------------------------------------------------------

pub struct ConversionDriver {
    evaluator: Arc<SampleEvaluator>,
    workers: usize,
    show_progress: bool,
}

impl ConversionDriver {
    pub fn new(evaluator: Arc<SampleEvaluator>, workers: usize) -> Self {
        Self {
            evaluator,
            workers,
            show_progress: true,
        }
    }

    /// Enable or disable the terminal progress bar.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Convert and filter every sample of `corpus`.
    pub async fn run(&self, corpus: Corpus) -> Result<ConversionResult, ConversionError> {
        if !corpus.resample_requested {
            log::info!(
                "convert: resampling not requested, passing {} samples through",
                corpus.len()
            );
            return Ok(ConversionResult {
                corpus,
                counters: RunCounters::default(),
                converted: false,
            });
        }

        if self.workers == 0 {
            return Err(ConversionError::NoWorkers);
        }
        check_distinct_targets(&corpus)?;

        let total = corpus.len();
        log::info!("convert: {total} samples on {} workers", self.workers);

        let progress = self.progress_bar(total as u64);
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks: JoinSet<(usize, SampleReport)> = JoinSet::new();

        for (index, source) in corpus.audio_paths.iter().enumerate() {
            let transcript = corpus.transcript(source).unwrap_or_default().to_string();
            let source = source.clone();
            let evaluator = Arc::clone(&self.evaluator);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only waits.
                let _permit = semaphore.acquire_owned().await.ok();
                let worker_source = source.clone();
                let report = tokio::task::spawn_blocking(move || {
                    evaluator.evaluate(&worker_source, &transcript)
                })
                .await
                .unwrap_or_else(|e| {
                    log::error!("convert: worker for {} died: {e}", source.display());
                    SampleReport::worker_lost()
                });
                (index, report)
            });
        }

        let mut counters = RunCounters::default();
        let mut accepted: Vec<Option<(PathBuf, String)>> = vec![None; total];

        while let Some(joined) = tasks.join_next().await {
            progress.inc(1);
            let (index, report) = match joined {
                Ok(done) => done,
                Err(e) => {
                    log::error!("convert: conversion task lost: {e}");
                    counters.merge_from(&SampleReport::worker_lost().counters);
                    continue;
                }
            };
            counters.merge_from(&report.counters);
            if let SampleOutcome::Accepted {
                wav_path, transcript, ..
            } = report.outcome
            {
                accepted[index] = Some((wav_path, transcript));
            }
        }
        progress.finish_and_clear();

        let corpus = rebuild_accepted(corpus, accepted);
        log::info!(
            "convert: {} of {total} samples accepted ({})",
            corpus.len(),
            counters.summary(self.evaluator.sample_rate())
        );

        Ok(ConversionResult {
            corpus,
            counters,
            converted: true,
        })
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        bar.set_message("converting");
        bar
    }
}

/// Every sample must own its canonical output, otherwise two workers could
/// write the same file and one transcript would silently win.
fn check_distinct_targets(corpus: &Corpus) -> Result<(), ConversionError> {
    let mut owners: HashMap<PathBuf, &PathBuf> = HashMap::with_capacity(corpus.len());
    for source in &corpus.audio_paths {
        let target = crate::audio::canonical_path(source);
        if let Some(first) = owners.get(&target) {
            return Err(ConversionError::DuplicateTarget {
                target,
                first: (*first).clone(),
                second: source.clone(),
            });
        }
        owners.insert(target, source);
    }
    Ok(())
}

/// Fresh corpus holding accepted samples in their original order.
fn rebuild_accepted(original: Corpus, accepted: Vec<Option<(PathBuf, String)>>) -> Corpus {
    let mut utterance_by_path = HashMap::new();
    let mut audio_paths = Vec::new();
    for (wav_path, transcript) in accepted.into_iter().flatten() {
        audio_paths.push(wav_path.clone());
        utterance_by_path.insert(wav_path, transcript);
    }
    Corpus {
        utterance_by_path,
        audio_paths,
        split_ratios: original.split_ratios,
        resample_requested: original.resample_requested,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
