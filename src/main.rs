//! Command-line entry point.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`ImporterConfig`] from the path given as the first argument, or
//!    from the platform settings file (defaults when absent).
//! 3. Validate the configuration.
//! 4. Create the [`tokio`] runtime.
//! 5. Build the listing corpus source and the symphonia toolkit.
//! 6. Run the import and print the report.
//!
//! ```text
//! corpus-importer [settings.toml]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use corpus_importer::{
    audio::SymphoniaToolkit,
    config::{AppPaths, ImporterConfig},
    corpus::{ListingCorpus, SplitRatios},
    import::ImportOrchestrator,
};

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Configuration
    let settings = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| AppPaths::new().settings_file);
    log::info!("corpus-importer starting, settings {}", settings.display());
    let config = ImporterConfig::load_from(&settings)
        .with_context(|| format!("failed to load {}", settings.display()))?;

    // 3. Validation
    config.validate().context("invalid configuration")?;

    // 4. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 5. Collaborators
    let source = ListingCorpus::new(
        config.corpus.name.clone(),
        config.listing.clone(),
        SplitRatios::from(config.corpus.split_ratios),
        config.corpus.resample,
    );
    let orchestrator = ImportOrchestrator::new(config, Arc::new(source), Arc::new(SymphoniaToolkit::new()));

    // 6. Import
    let report = rt.block_on(orchestrator.run())?;
    println!("{report}");
    Ok(())
}
