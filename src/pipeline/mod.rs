//! Conversion-and-filtering pipeline.
//!
//! # Architecture
//!
//! ```text
//! Corpus (source paths)
//!        │
//!        ▼
//! ConversionDriver::run()  ← async, fixed-size worker pool
//!        │
//!        ├─ spawn_blocking(SampleEvaluator::evaluate)  × N
//!        │     ├─ AudioNormalizer::normalize  (source → <stem>.wav)
//!        │     └─ validity rules               → SampleOutcome
//!        │
//!        ├─ RunCounters::merge  (completion order)
//!        └─ fresh Corpus of accepted canonical paths (input order)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use corpus_importer::audio::{AudioNormalizer, CanonicalFormat, SymphoniaToolkit};
//! use corpus_importer::corpus::Corpus;
//! use corpus_importer::pipeline::{ConversionDriver, FilterRules, SampleEvaluator};
//!
//! # async fn example(corpus: Corpus) {
//! let normalizer = AudioNormalizer::new(Arc::new(SymphoniaToolkit::new()), CanonicalFormat::default());
//! let evaluator = SampleEvaluator::new(normalizer, FilterRules::default());
//! let driver = ConversionDriver::new(Arc::new(evaluator), 8);
//!
//! let result = driver.run(corpus).await.unwrap();
//! println!("{}", result.counters.summary(16_000));
//! # }
//! ```

pub mod driver;
pub mod evaluator;
pub mod outcome;

pub use driver::{ConversionDriver, ConversionError, ConversionResult};
pub use evaluator::{AcceptAll, FilterRules, LabelValidator, SampleEvaluator, SampleReport};
pub use outcome::{CountersSummary, OutcomeKind, RunCounters, SampleOutcome};
