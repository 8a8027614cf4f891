//! Skip-if-present ZIP extraction.

use std::fs::File;
use std::path::{Path, PathBuf};

use super::FetchError;

/// Extract `archive` into `target_dir` unless `target_dir/extracted_name`
/// already exists.
///
/// Returns the directory the corpus should be read from:
/// `target_dir/extracted_name`, or `target_dir` itself when the archive did
/// not unpack into a directory of that name.
pub async fn maybe_extract(
    archive: &Path,
    target_dir: &Path,
    extracted_name: &str,
) -> Result<PathBuf, FetchError> {
    let extracted = target_dir.join(extracted_name);
    if extracted.is_dir() {
        log::info!("fetch: {} already extracted, skipping", extracted.display());
        return Ok(extracted);
    }

    log::info!("fetch: extracting {} to {}", archive.display(), target_dir.display());
    let archive_owned = archive.to_path_buf();
    let target_owned = target_dir.to_path_buf();
    tokio::task::spawn_blocking(move || extract_zip(&archive_owned, &target_owned))
        .await
        .map_err(|e| FetchError::Join(e.to_string()))??;

    if extracted.is_dir() {
        Ok(extracted)
    } else {
        log::warn!(
            "fetch: archive has no top-level {extracted_name}/ directory, reading from {}",
            target_dir.display()
        );
        Ok(target_dir.to_path_buf())
    }
}

fn extract_zip(archive: &Path, target_dir: &Path) -> Result<(), FetchError> {
    let archive_err = |reason: String| FetchError::Archive {
        path: archive.to_path_buf(),
        reason,
    };

    let file = File::open(archive).map_err(|source| FetchError::Io {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| archive_err(e.to_string()))?;
    let entries = zip.len();
    zip.extract(target_dir).map_err(|e| archive_err(e.to_string()))?;

    log::info!("fetch: extracted {entries} entries from {}", archive.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[tokio::test]
    async fn extracts_into_named_directory() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("siwis.zip");
        write_zip(
            &archive,
            &[("siwis/metadata.csv", b"a|ciao\n"), ("siwis/wavs/a.wav", b"RIFF")],
        );

        let root = maybe_extract(&archive, dir.path(), "siwis").await.unwrap();

        assert_eq!(root, dir.path().join("siwis"));
        assert_eq!(std::fs::read(root.join("metadata.csv")).unwrap(), b"a|ciao\n");
        assert!(root.join("wavs").join("a.wav").exists());
    }

    #[tokio::test]
    async fn existing_directory_skips_extraction() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("siwis")).unwrap();

        // The archive does not exist; extraction would fail if attempted.
        let root = maybe_extract(&dir.path().join("siwis.zip"), dir.path(), "siwis")
            .await
            .unwrap();

        assert_eq!(root, dir.path().join("siwis"));
    }

    #[tokio::test]
    async fn flat_archive_reads_from_target_dir() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("flat.zip");
        write_zip(&archive, &[("metadata.csv", b"x|y\n")]);

        let root = maybe_extract(&archive, dir.path(), "flat").await.unwrap();

        assert_eq!(root, dir.path());
        assert!(dir.path().join("metadata.csv").exists());
    }

    #[tokio::test]
    async fn corrupt_archive_is_error() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bad.zip");
        std::fs::write(&archive, b"not a zip").unwrap();

        let err = maybe_extract(&archive, dir.path(), "bad").await.unwrap_err();
        assert!(matches!(err, FetchError::Archive { .. }), "{err}");
    }
}
