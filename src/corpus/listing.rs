//! Generic corpus adapter for `path<delim>transcript` listing files.
//!
//! Reads a listing such as LJSpeech's `metadata.csv`
//! (`LJ001-0001|Printing, in the only sense...`) and resolves each entry to
//! `<extracted_root>/<audio_dir>/<name>[.<default_extension>]`.
//!
//! Entries are skipped (with a warning) when the transcript is blank, the
//! file is not audio, the file is missing on disk, or the path was already
//! listed.  The listing order is preserved in `Corpus::audio_paths`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{Corpus, CorpusError, CorpusSource, SplitRatios};
use crate::audio::is_audio_file;
use crate::config::ListingConfig;

pub struct ListingCorpus {
    name: String,
    config: ListingConfig,
    split_ratios: SplitRatios,
    resample_requested: bool,
}

impl ListingCorpus {
    pub fn new(
        name: impl Into<String>,
        config: ListingConfig,
        split_ratios: SplitRatios,
        resample_requested: bool,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            split_ratios,
            resample_requested,
        }
    }

    fn resolve_audio_path(&self, extracted_root: &Path, listed: &str) -> PathBuf {
        let mut path = extracted_root.join(&self.config.audio_dir).join(listed);
        if path.extension().is_none() && !self.config.default_extension.is_empty() {
            path.set_extension(&self.config.default_extension);
        }
        path
    }

    /// Parse listing bytes into a corpus; file existence is checked here.
    fn parse(&self, listing_path: &Path, data: &[u8], extracted_root: &Path) -> Result<Corpus, CorpusError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter as u8)
            .has_headers(self.config.has_headers)
            .quoting(false)
            .flexible(true)
            .from_reader(data);

        let mut utterances: HashMap<PathBuf, String> = HashMap::new();
        let mut paths: Vec<PathBuf> = Vec::new();
        let mut skipped = 0usize;

        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| CorpusError::Malformed {
                path: listing_path.to_path_buf(),
                reason: format!("record {}: {e}", line + 1),
            })?;

            let Some(listed) = record.get(0).map(str::trim).filter(|s| !s.is_empty()) else {
                continue;
            };
            let transcript = record
                .get(self.config.transcript_column)
                .map(str::trim)
                .unwrap_or_default();

            if transcript.is_empty() {
                log::warn!("listing: {listed} has an empty transcript, skipping");
                skipped += 1;
                continue;
            }

            let path = self.resolve_audio_path(extracted_root, listed);
            if !is_audio_file(&path) {
                log::warn!("listing: {} is not an audio file, skipping", path.display());
                skipped += 1;
                continue;
            }
            if !path.exists() {
                log::warn!("listing: {} does not exist, skipping", path.display());
                skipped += 1;
                continue;
            }
            if utterances.contains_key(&path) {
                log::warn!("listing: {} listed twice, keeping the first entry", path.display());
                skipped += 1;
                continue;
            }

            utterances.insert(path.clone(), transcript.to_string());
            paths.push(path);
        }

        log::info!(
            "listing: {} samples indexed from {} ({skipped} skipped)",
            paths.len(),
            listing_path.display()
        );

        Corpus::new(utterances, paths, self.split_ratios, self.resample_requested)
    }
}

#[async_trait]
impl CorpusSource for ListingCorpus {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self, extracted_root: &Path) -> Result<Corpus, CorpusError> {
        let listing_path = extracted_root.join(&self.config.listing_file);
        let data = tokio::fs::read(&listing_path)
            .await
            .map_err(|source| CorpusError::Io {
                path: listing_path.clone(),
                source,
            })?;
        self.parse(&listing_path, &data, extracted_root)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn source(config: ListingConfig) -> ListingCorpus {
        ListingCorpus::new("test", config, SplitRatios::default(), true)
    }

    fn touch(dir: &Path, name: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[tokio::test]
    async fn loads_entries_in_listing_order() {
        let root = tempdir().unwrap();
        let wavs = root.path().join("wavs");
        touch(&wavs, "b.wav");
        touch(&wavs, "a.wav");
        std::fs::write(
            root.path().join("metadata.csv"),
            "b|buongiorno a tutti|buongiorno a tutti\na|come stai|come stai\n",
        )
        .unwrap();

        let corpus = source(ListingConfig::default()).load(root.path()).await.unwrap();

        assert_eq!(corpus.audio_paths, vec![wavs.join("b.wav"), wavs.join("a.wav")]);
        assert_eq!(corpus.transcript(&wavs.join("a.wav")), Some("come stai"));
        assert!(corpus.resample_requested);
    }

    #[tokio::test]
    async fn skips_missing_blank_and_duplicate_entries() {
        let root = tempdir().unwrap();
        let wavs = root.path().join("wavs");
        touch(&wavs, "keep.wav");
        touch(&wavs, "blank.wav");
        std::fs::write(
            root.path().join("metadata.csv"),
            "keep|uno\nblank|   \ngone|due\nkeep|tre\n",
        )
        .unwrap();

        let corpus = source(ListingConfig::default()).load(root.path()).await.unwrap();

        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.transcript(&wavs.join("keep.wav")), Some("uno"));
    }

    #[tokio::test]
    async fn honours_header_delimiter_and_extension() {
        let root = tempdir().unwrap();
        let clips = root.path().join("clips");
        touch(&clips, "x1.mp3");
        std::fs::write(root.path().join("list.tsv"), "path\tsentence\nx1.mp3\tsalve\n").unwrap();

        let config = ListingConfig {
            listing_file: PathBuf::from("list.tsv"),
            delimiter: '\t',
            audio_dir: PathBuf::from("clips"),
            default_extension: "mp3".into(),
            transcript_column: 1,
            has_headers: true,
        };
        let corpus = source(config).load(root.path()).await.unwrap();

        assert_eq!(corpus.audio_paths, vec![clips.join("x1.mp3")]);
    }

    #[tokio::test]
    async fn missing_listing_is_io_error() {
        let root = tempdir().unwrap();
        let err = source(ListingConfig::default()).load(root.path()).await.unwrap_err();
        assert!(matches!(err, CorpusError::Io { .. }), "{err}");
    }
}
