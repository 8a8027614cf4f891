//! Manifest rows and origin-relative paths.

use std::path::{Component, Path};

use serde::Serialize;

use super::ManifestError;
use crate::corpus::Corpus;

/// One manifest line: `wav_filename,wav_filesize,transcript`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRow {
    pub wav_filename: String,
    pub wav_filesize: u64,
    pub transcript: String,
}

/// Path of `path` relative to `origin`, joined with `/` on every platform.
///
/// ```rust
/// use std::path::Path;
/// use corpus_importer::manifest::relative_manifest_path;
///
/// let rel = relative_manifest_path(
///     Path::new("/data/siwis/origin/siwis/wavs/a.wav"),
///     Path::new("/data/siwis/origin"),
/// ).unwrap();
/// assert_eq!(rel, "siwis/wavs/a.wav");
/// ```
pub fn relative_manifest_path(path: &Path, origin: &Path) -> Result<String, ManifestError> {
    let relative = path
        .strip_prefix(origin)
        .map_err(|_| ManifestError::OutsideOrigin {
            path: path.to_path_buf(),
            origin: origin.to_path_buf(),
        })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().replace('\\', "/")),
            _ => None,
        })
        .collect();
    Ok(parts.join("/"))
}

/// One row per corpus sample, in corpus order.  Sizes are read from disk.
pub fn build_rows(corpus: &Corpus, origin: &Path) -> Result<Vec<ManifestRow>, ManifestError> {
    corpus
        .audio_paths
        .iter()
        .map(|path| {
            let meta = std::fs::metadata(path).map_err(|source| ManifestError::Io {
                path: path.clone(),
                source,
            })?;
            Ok(ManifestRow {
                wav_filename: relative_manifest_path(path, origin)?,
                wav_filesize: meta.len(),
                transcript: corpus.transcript(path).unwrap_or_default().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SplitRatios;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn strips_origin_and_uses_forward_slashes() {
        let origin = Path::new("/srv/mls/origin");
        let path = origin.join("mls").join("audio").join("x.wav");
        assert_eq!(relative_manifest_path(&path, origin).unwrap(), "mls/audio/x.wav");
    }

    #[test]
    fn path_outside_origin_is_error() {
        let err = relative_manifest_path(Path::new("/elsewhere/a.wav"), Path::new("/srv/origin"))
            .unwrap_err();
        assert!(matches!(err, ManifestError::OutsideOrigin { .. }), "{err}");
    }

    #[test]
    fn rows_carry_size_and_transcript() {
        let dir = tempdir().unwrap();
        let origin = dir.path().join("origin");
        std::fs::create_dir_all(origin.join("wavs")).unwrap();
        let wav = origin.join("wavs").join("a.wav");
        std::fs::write(&wav, [0u8; 128]).unwrap();

        let mut utterances = HashMap::new();
        utterances.insert(wav.clone(), "buonasera".to_string());
        let corpus = Corpus::new(utterances, vec![wav], SplitRatios::default(), true).unwrap();

        let rows = build_rows(&corpus, &origin).unwrap();
        assert_eq!(
            rows,
            vec![ManifestRow {
                wav_filename: "wavs/a.wav".into(),
                wav_filesize: 128,
                transcript: "buonasera".into(),
            }]
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("gone.wav");
        let mut utterances = HashMap::new();
        utterances.insert(wav.clone(), "ciao".to_string());
        let corpus = Corpus::new(utterances, vec![wav], SplitRatios::default(), true).unwrap();

        let err = build_rows(&corpus, dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Io { path, .. } if path == dir.path().join("gone.wav")));
    }
}
