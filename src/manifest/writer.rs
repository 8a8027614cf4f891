//! Writes the four manifest files of a [`DatasetSplit`].
//!
//! Overwrite mode truncates each file and writes the header.  Append mode
//! adds rows to existing files and writes the header only when a file is new
//! or empty.  Writes are not transactional: an interrupted run leaves a
//! partially written manifest behind.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use super::row::ManifestRow;
use super::split::DatasetSplit;
use super::ManifestError;

/// Column header of every manifest.
pub const MANIFEST_HEADER: [&str; 3] = ["wav_filename", "wav_filesize", "transcript"];

/// The four manifests produced by an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    TrainFull,
    Train,
    Dev,
    Test,
}

impl ManifestKind {
    pub const ALL: [ManifestKind; 4] = [
        ManifestKind::TrainFull,
        ManifestKind::Train,
        ManifestKind::Dev,
        ManifestKind::Test,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestKind::TrainFull => "train_full.csv",
            ManifestKind::Train => "train.csv",
            ManifestKind::Dev => "dev.csv",
            ManifestKind::Test => "test.csv",
        }
    }

    fn rows<'a>(&self, split: &'a DatasetSplit) -> &'a [ManifestRow] {
        match self {
            ManifestKind::TrainFull => &split.train_full,
            ManifestKind::Train => &split.train,
            ManifestKind::Dev => &split.dev,
            ManifestKind::Test => &split.test,
        }
    }
}

pub struct ManifestWriter {
    output_dir: PathBuf,
    append: bool,
}

impl ManifestWriter {
    pub fn new(output_dir: impl Into<PathBuf>, append: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            append,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_of(&self, kind: ManifestKind) -> PathBuf {
        self.output_dir.join(kind.file_name())
    }

    /// Write every manifest of `split`; returns the written paths.
    pub fn write(&self, split: &DatasetSplit) -> Result<Vec<PathBuf>, ManifestError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ManifestError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let mut written = Vec::with_capacity(ManifestKind::ALL.len());
        for kind in ManifestKind::ALL {
            let path = self.path_of(kind);
            self.write_file(&path, kind.rows(split))?;
            written.push(path);
        }

        log::info!(
            "manifest: wrote {} entries to {}",
            split.train_full.len(),
            self.output_dir.display()
        );
        Ok(written)
    }

    fn write_file(&self, path: &Path, rows: &[ManifestRow]) -> Result<(), ManifestError> {
        let io_err = |source: std::io::Error| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        };

        let opened = if self.append {
            OpenOptions::new().create(true).append(true).open(path)
        } else {
            File::create(path)
        };
        let file = opened.map_err(io_err)?;
        let needs_header = file.metadata().map_err(io_err)?.len() == 0;

        let csv_err = |source: csv::Error| ManifestError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);

        if needs_header {
            writer.write_record(MANIFEST_HEADER).map_err(csv_err)?;
        }
        for row in rows {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(io_err)?;

        log::debug!("manifest: {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(name: &str, transcript: &str) -> ManifestRow {
        ManifestRow {
            wav_filename: format!("wavs/{name}.wav"),
            wav_filesize: 44,
            transcript: transcript.into(),
        }
    }

    fn split() -> DatasetSplit {
        let a = row("a", "uno");
        let b = row("b", "due");
        let c = row("c", "tre");
        DatasetSplit {
            train_full: vec![a.clone(), b.clone(), c.clone()],
            train: vec![a],
            test: vec![b],
            dev: vec![c],
        }
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn overwrite_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let writer = ManifestWriter::new(dir.path(), false);

        let written = writer.write(&split()).unwrap();

        assert_eq!(written.len(), 4);
        assert_eq!(
            read(&dir.path().join("train_full.csv")),
            "wav_filename,wav_filesize,transcript\nwavs/a.wav,44,uno\nwavs/b.wav,44,due\nwavs/c.wav,44,tre\n"
        );
        assert_eq!(
            read(&dir.path().join("test.csv")),
            "wav_filename,wav_filesize,transcript\nwavs/b.wav,44,due\n"
        );
        assert_eq!(
            read(&dir.path().join("dev.csv")),
            "wav_filename,wav_filesize,transcript\nwavs/c.wav,44,tre\n"
        );
    }

    #[test]
    fn overwrite_truncates_previous_content() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("train.csv"), "stale\nstale\n").unwrap();

        ManifestWriter::new(dir.path(), false).write(&split()).unwrap();

        assert_eq!(
            read(&dir.path().join("train.csv")),
            "wav_filename,wav_filesize,transcript\nwavs/a.wav,44,uno\n"
        );
    }

    #[test]
    fn append_keeps_single_header() {
        let dir = tempdir().unwrap();
        let writer = ManifestWriter::new(dir.path(), true);

        writer.write(&split()).unwrap();
        writer.write(&split()).unwrap();

        let train = read(&dir.path().join("train.csv"));
        assert_eq!(
            train,
            "wav_filename,wav_filesize,transcript\nwavs/a.wav,44,uno\nwavs/a.wav,44,uno\n"
        );
        assert_eq!(train.matches("wav_filename").count(), 1);
    }

    #[test]
    fn append_to_existing_file_adds_no_header() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("dev.csv"), "wav_filename,wav_filesize,transcript\nold.wav,1,vecchio\n")
            .unwrap();

        ManifestWriter::new(dir.path(), true).write(&split()).unwrap();

        assert_eq!(
            read(&dir.path().join("dev.csv")),
            "wav_filename,wav_filesize,transcript\nold.wav,1,vecchio\nwavs/c.wav,44,tre\n"
        );
    }

    #[test]
    fn transcripts_with_commas_are_quoted() {
        let dir = tempdir().unwrap();
        let mut s = DatasetSplit::default();
        s.train_full.push(row("q", "sì, grazie"));

        ManifestWriter::new(dir.path(), false).write(&s).unwrap();

        let text = read(&dir.path().join("train_full.csv"));
        assert!(text.ends_with("wavs/q.wav,44,\"sì, grazie\"\n"), "{text}");
        assert_eq!(read(&dir.path().join("train.csv")), "wav_filename,wav_filesize,transcript\n");
    }

    #[test]
    fn creates_missing_output_dir() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested").join("manifests");

        ManifestWriter::new(&out, false).write(&split()).unwrap();

        for kind in ManifestKind::ALL {
            assert!(out.join(kind.file_name()).exists());
        }
    }
}
