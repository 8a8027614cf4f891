//! On-disk layout of one imported dataset.
//!
//! ```text
//! <data_dir>/<corpus>/                 dataset root, default manifest dir
//! <data_dir>/<corpus>/origin/          downloaded archive + extracted data
//! <output_dir>/{train_full,train,dev,test}.csv, import_report.json
//! ```

use std::path::{Path, PathBuf};

use super::ImportError;
use crate::config::CorpusConfig;

/// Name of the JSON run report written next to the manifests.
pub const REPORT_FILE: &str = "import_report.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    pub dataset_root: PathBuf,
    pub origin: PathBuf,
    pub output_dir: PathBuf,
}

impl DatasetLayout {
    pub fn new(data_dir: &Path, corpus_name: &str, output_dir: Option<&Path>) -> Self {
        let dataset_root = data_dir.join(corpus_name);
        let origin = dataset_root.join("origin");
        let output_dir = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dataset_root.clone());
        Self {
            dataset_root,
            origin,
            output_dir,
        }
    }

    /// Layout for `cfg`, with relative directories resolved against the
    /// current working directory.
    pub fn from_config(cfg: &CorpusConfig) -> Result<Self, ImportError> {
        let data_dir = absolute(&cfg.data_dir)?;
        let output_dir = cfg.output_dir.as_deref().map(absolute).transpose()?;
        Ok(Self::new(&data_dir, &cfg.name, output_dir.as_deref()))
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE)
    }

    pub async fn create_dirs(&self) -> Result<(), ImportError> {
        for dir in [&self.dataset_root, &self.origin, &self.output_dir] {
            if !dir.exists() {
                log::info!("import: creating {}", dir.display());
            }
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| ImportError::Io {
                    path: dir.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ImportError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_is_dataset_root() {
        let layout = DatasetLayout::new(Path::new("/data"), "siwis", None);
        assert_eq!(layout.dataset_root, Path::new("/data/siwis"));
        assert_eq!(layout.origin, Path::new("/data/siwis/origin"));
        assert_eq!(layout.output_dir, Path::new("/data/siwis"));
        assert_eq!(layout.report_path(), Path::new("/data/siwis/import_report.json"));
    }

    #[test]
    fn explicit_output_dir_wins() {
        let layout = DatasetLayout::new(Path::new("/data"), "siwis", Some(Path::new("/manifests")));
        assert_eq!(layout.output_dir, Path::new("/manifests"));
        assert_eq!(layout.origin, Path::new("/data/siwis/origin"));
    }

    #[test]
    fn relative_data_dir_becomes_absolute() {
        let cfg = CorpusConfig {
            data_dir: PathBuf::from("datasets"),
            ..CorpusConfig::default()
        };
        let layout = DatasetLayout::from_config(&cfg).unwrap();
        assert!(layout.dataset_root.is_absolute());
        assert!(layout.dataset_root.ends_with("datasets/corpus"));
    }
}
