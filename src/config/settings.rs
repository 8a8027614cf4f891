//! Importer settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across worker
//! threads.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use std::path::{Path, PathBuf};

use super::AppPaths;

// ---------------------------------------------------------------------------
// CorpusConfig
// ---------------------------------------------------------------------------

/// Which corpus to import and where it lives on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Corpus name, also the dataset directory name under `data_dir`.
    pub name: String,
    /// URL of the ZIP archive distributing the corpus.
    pub archive_url: String,
    /// Parent directory of the dataset root.
    pub data_dir: PathBuf,
    /// Directory receiving the manifests.  `None` means the dataset root.
    pub output_dir: Option<PathBuf>,
    /// Append rows to existing manifests instead of truncating them.
    pub csv_append_mode: bool,
    /// Run the conversion stage.  When `false` every listed sample is written
    /// to the manifests as-is.
    pub resample: bool,
    /// `[train, test, dev]` proportions applied to the accepted samples.
    pub split_ratios: [f64; 3],
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            name: "corpus".into(),
            archive_url: String::new(),
            data_dir: PathBuf::from("."),
            output_dir: None,
            csv_append_mode: false,
            resample: true,
            split_ratios: [0.8, 0.1, 0.1],
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Canonical encoding every converted sample must share.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Target sample rate in Hz.
    pub sample_rate: u32,
    /// Integer PCM bit depth of the written WAV files.
    pub bit_depth: u16,
    /// Output channel count.
    pub channels: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            bit_depth: 16,
            channels: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterConfig
// ---------------------------------------------------------------------------

/// Validity thresholds applied by the sample evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Samples strictly longer than this are rejected as too long.
    pub max_secs: f64,
    /// Assumed milliseconds of speech per transcript character.  A sample
    /// whose duration cannot fit its transcript at this rate is too short.
    pub ms_per_char: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_secs: 15.0,
            ms_per_char: 20.0,
        }
    }
}

// ---------------------------------------------------------------------------
// SplitConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Seed of the shuffle applied before partitioning.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { seed: 76_528 }
    }
}

// ---------------------------------------------------------------------------
// ConversionConfig
// ---------------------------------------------------------------------------

/// Worker pool sizing for the conversion stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Number of samples converted concurrently.
    pub workers: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

// ---------------------------------------------------------------------------
// ListingConfig
// ---------------------------------------------------------------------------

/// Layout of the transcript listing read by [`ListingCorpus`].
///
/// [`ListingCorpus`]: crate::corpus::ListingCorpus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Listing file, relative to the extracted archive directory.
    pub listing_file: PathBuf,
    /// Field delimiter (single ASCII character).
    pub delimiter: char,
    /// Directory holding the audio files, relative to the extracted archive.
    pub audio_dir: PathBuf,
    /// Extension appended to listed names that carry none.
    pub default_extension: String,
    /// Zero-based column holding the transcript.
    pub transcript_column: usize,
    /// Whether the first listing line is a header.
    pub has_headers: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            listing_file: PathBuf::from("metadata.csv"),
            delimiter: '|',
            audio_dir: PathBuf::from("wavs"),
            default_extension: "wav".into(),
            transcript_column: 1,
            has_headers: false,
        }
    }
}

// ---------------------------------------------------------------------------
// DownloadConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Overall timeout for the archive download in seconds.
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self { timeout_secs: 3_600 }
    }
}

// ---------------------------------------------------------------------------
// ImporterConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level importer configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use corpus_importer::config::ImporterConfig;
///
/// let config = ImporterConfig::load().unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    pub corpus: CorpusConfig,
    pub audio: AudioConfig,
    pub filter: FilterConfig,
    pub split: SplitConfig,
    pub conversion: ConversionConfig,
    pub listing: ListingConfig,
    pub download: DownloadConfig,
}

impl ImporterConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(ImporterConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the importer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.corpus.name.trim().is_empty() {
            bail!("corpus.name must not be empty");
        }
        if self.corpus.archive_url.trim().is_empty() {
            bail!("corpus.archive_url must not be empty");
        }
        if self.corpus.split_ratios.iter().any(|r| !r.is_finite() || *r < 0.0) {
            bail!(
                "corpus.split_ratios must be non-negative, got {:?}",
                self.corpus.split_ratios
            );
        }
        if self.audio.sample_rate == 0 {
            bail!("audio.sample_rate must be positive");
        }
        if self.audio.channels == 0 {
            bail!("audio.channels must be positive");
        }
        if !(8..=32).contains(&self.audio.bit_depth) {
            bail!("audio.bit_depth must be within 8..=32, got {}", self.audio.bit_depth);
        }
        if self.filter.max_secs <= 0.0 || self.filter.ms_per_char <= 0.0 {
            bail!("filter.max_secs and filter.ms_per_char must be positive");
        }
        if !self.listing.delimiter.is_ascii() {
            bail!("listing.delimiter must be an ASCII character");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn valid_config() -> ImporterConfig {
        let mut cfg = ImporterConfig::default();
        cfg.corpus.archive_url = "https://example.org/speech/corpus-v1.zip".into();
        cfg
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = ImporterConfig::load_from(&path).expect("should not error");

        assert_eq!(config.corpus.name, "corpus");
        assert_eq!(config.audio.sample_rate, 16_000);
        assert_eq!(config.split.seed, 76_528);
    }

    #[test]
    fn default_values() {
        let cfg = ImporterConfig::default();

        assert_eq!(cfg.audio.sample_rate, 16_000);
        assert_eq!(cfg.audio.bit_depth, 16);
        assert_eq!(cfg.audio.channels, 1);
        assert_eq!(cfg.filter.max_secs, 15.0);
        assert_eq!(cfg.filter.ms_per_char, 20.0);
        assert_eq!(cfg.corpus.split_ratios, [0.8, 0.1, 0.1]);
        assert!(cfg.corpus.resample);
        assert!(!cfg.corpus.csv_append_mode);
        assert!(cfg.conversion.workers >= 1);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = valid_config();
        cfg.corpus.name = "mls_italian".into();
        cfg.corpus.csv_append_mode = true;
        cfg.corpus.output_dir = Some(PathBuf::from("/srv/manifests"));
        cfg.filter.max_secs = 20.0;
        cfg.conversion.workers = 3;
        cfg.listing.delimiter = '\t';

        cfg.save_to(&path).expect("save");
        let loaded = ImporterConfig::load_from(&path).expect("load");

        assert_eq!(loaded.corpus.name, "mls_italian");
        assert!(loaded.corpus.csv_append_mode);
        assert_eq!(loaded.corpus.output_dir, Some(PathBuf::from("/srv/manifests")));
        assert_eq!(loaded.filter.max_secs, 20.0);
        assert_eq!(loaded.conversion.workers, 3);
        assert_eq!(loaded.listing.delimiter, '\t');
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[corpus]\nname = \"siwis\"\narchive_url = \"https://example.org/siwis.zip\"\n",
        )
        .unwrap();

        let cfg = ImporterConfig::load_from(&path).expect("load");

        assert_eq!(cfg.corpus.name, "siwis");
        assert_eq!(cfg.corpus.split_ratios, [0.8, 0.1, 0.1]);
        assert_eq!(cfg.audio.sample_rate, 16_000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_url() {
        let cfg = ImporterConfig::default();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_ratio() {
        let mut cfg = valid_config();
        cfg.corpus.split_ratios = [0.8, -0.1, 0.3];
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("split_ratios"), "{err}");
    }

    #[test]
    fn validate_rejects_odd_bit_depth() {
        let mut cfg = valid_config();
        cfg.audio.bit_depth = 64;
        assert!(cfg.validate().is_err());
    }
}
