//! Import orchestrator: download → extract → parse → convert → split/write.
//!
//! # Flow
//!
//! ```text
//! ImportOrchestrator::run()
//!   ├─ DatasetLayout::create_dirs
//!   ├─ fetch::maybe_download   (<origin>/<archive>.zip, skipped if present)
//!   ├─ fetch::maybe_extract    (<origin>/<archive name>/, skipped if present)
//!   ├─ CorpusSource::load      → Corpus
//!   ├─ ConversionDriver::run   → accepted Corpus + RunCounters
//!   ├─ manifest::build_rows → split_rows(seed) → ManifestWriter::write
//!   └─ ImportReport            (logged, saved as import_report.json)
//! ```
//!
//! The corpus format and the audio library are injected as
//! `Arc<dyn CorpusSource>` and `Arc<dyn AudioToolkit>`.

pub mod layout;
pub mod report;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::audio::{AudioNormalizer, AudioToolkit, CanonicalFormat};
use crate::config::ImporterConfig;
use crate::corpus::{CorpusError, CorpusSource};
use crate::fetch::{self, FetchError};
use crate::manifest::{self, ManifestError, ManifestWriter, SplitError};
use crate::pipeline::{ConversionDriver, ConversionError, FilterRules, LabelValidator, SampleEvaluator};

pub use layout::{DatasetLayout, REPORT_FILE};
pub use report::ImportReport;

// ---------------------------------------------------------------------------
// ImportError
// ---------------------------------------------------------------------------

/// Fatal import failures.  Per-sample problems never surface here.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot derive an archive file name from {0}")]
    ArchiveUrl(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Split(#[from] SplitError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialise report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// ImportOrchestrator
// ---------------------------------------------------------------------------

pub struct ImportOrchestrator {
    config: ImporterConfig,
    source: Arc<dyn CorpusSource>,
    toolkit: Arc<dyn AudioToolkit>,
    validator: Option<Arc<dyn LabelValidator>>,
    client: reqwest::Client,
    show_progress: bool,
}

impl ImportOrchestrator {
    pub fn new(config: ImporterConfig, source: Arc<dyn CorpusSource>, toolkit: Arc<dyn AudioToolkit>) -> Self {
        let client = fetch::http_client(&config.download);
        Self {
            config,
            source,
            toolkit,
            validator: None,
            client,
            show_progress: true,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn LabelValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn layout(&self) -> Result<DatasetLayout, ImportError> {
        DatasetLayout::from_config(&self.config.corpus)
    }

    /// Run the whole import and return its report.
    pub async fn run(&self) -> Result<ImportReport, ImportError> {
        let corpus_cfg = &self.config.corpus;
        let layout = self.layout()?;
        layout.create_dirs().await?;

        let archive_file = fetch::archive_file_name(&corpus_cfg.archive_url)
            .ok_or_else(|| ImportError::ArchiveUrl(corpus_cfg.archive_url.clone()))?;
        let archive =
            fetch::maybe_download(&self.client, &archive_file, &layout.origin, &corpus_cfg.archive_url).await?;
        let extracted_root =
            fetch::maybe_extract(&archive, &layout.origin, fetch::archive_stem(&archive_file)).await?;

        log::info!("import: parsing {} corpus in {}", self.source.name(), extracted_root.display());
        let corpus = self.source.load(&extracted_root).await?;

        let format = CanonicalFormat::from(&self.config.audio);
        let mut report = ImportReport::new(&corpus_cfg.name, format.sample_rate);
        report.indexed = corpus.len();

        if corpus.is_empty() {
            log::warn!("import: corpus {} has no samples, nothing to write", corpus_cfg.name);
            log::info!("import: {}", report.to_string().replace('\n', " |"));
            return Ok(report);
        }

        let conversion = self.driver(format).run(corpus).await?;
        report.record_counters(conversion.counters, conversion.converted);

        let corpus = conversion.corpus;
        let rows = manifest::build_rows(&corpus, &layout.origin)?;
        let split = manifest::split_rows(rows, &corpus.split_ratios, self.config.split.seed)?;

        let writer = ManifestWriter::new(&layout.output_dir, corpus_cfg.csv_append_mode);
        let written = writer.write(&split)?;
        report.record_split(&split, written);

        report.save_to(&layout.report_path())?;
        log::info!("import: {}", report.to_string().replace('\n', " |"));
        Ok(report)
    }

    fn driver(&self, format: CanonicalFormat) -> ConversionDriver {
        let normalizer = AudioNormalizer::new(Arc::clone(&self.toolkit), format);
        let mut evaluator = SampleEvaluator::new(normalizer, FilterRules::from(&self.config.filter));
        if let Some(validator) = &self.validator {
            evaluator = evaluator.with_validator(Arc::clone(validator));
        }
        ConversionDriver::new(Arc::new(evaluator), self.config.conversion.workers).with_progress(self.show_progress)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
