//! Archive download and extraction, both skipped when their output exists.
//!
//! ```text
//! archive_url ──maybe_download──▶ <origin>/<file name>.zip
//!             ──maybe_extract ──▶ <origin>/<archive name>/
//! ```

pub mod download;
pub mod extract;

use std::path::PathBuf;

use thiserror::Error;

pub use download::{http_client, maybe_download};
pub use extract::maybe_extract;

// ---------------------------------------------------------------------------
// FetchError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport or connection error.
    #[error("download of {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("download of {url} timed out")]
    Timeout { url: String },

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive is missing, corrupt, or not a ZIP file.
    #[error("cannot extract {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    #[error("extraction task failed: {0}")]
    Join(String),
}

impl FetchError {
    fn request(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout { url: url.into() }
        } else {
            FetchError::Request {
                url: url.into(),
                reason: e.to_string(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Naming helpers
// ---------------------------------------------------------------------------

/// Last path segment of `url`, ignoring any query string or fragment.
///
/// ```rust
/// use corpus_importer::fetch::archive_file_name;
///
/// assert_eq!(archive_file_name("https://host/data/siwis.zip?dl=1"), Some("siwis.zip".into()));
/// assert_eq!(archive_file_name("https://host/"), None);
/// ```
pub fn archive_file_name(url: &str) -> Option<String> {
    let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && !name.contains(':'))
        .map(str::to_string)
}

/// Archive file name without its final extension; the directory the
/// archive is expected to unpack into.
pub fn archive_stem(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}
