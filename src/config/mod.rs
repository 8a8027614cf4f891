//! Configuration module for the corpus importer.
//!
//! Provides `ImporterConfig` (top-level settings), sub-configs for each
//! pipeline stage, `AppPaths` for the platform settings location, and TOML
//! persistence via `ImporterConfig::load_from` / `ImporterConfig::save_to`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AudioConfig, ConversionConfig, CorpusConfig, DownloadConfig, FilterConfig, ImporterConfig,
    ListingConfig, SplitConfig,
};
