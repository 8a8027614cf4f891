//! Skip-if-present archive download.
//!
//! The body is streamed into `<file>.part` and renamed once complete, so a
//! file under the final name is always a finished download.  There is no
//! resume: an interrupted download starts over on the next run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;

use super::FetchError;
use crate::config::DownloadConfig;

/// HTTP client with the configured overall timeout.
pub fn http_client(config: &DownloadConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Return `dir/filename`, downloading it from `url` first if absent.
pub async fn maybe_download(
    client: &reqwest::Client,
    filename: &str,
    dir: &Path,
    url: &str,
) -> Result<PathBuf, FetchError> {
    let target = dir.join(filename);
    if tokio::fs::try_exists(&target).await.unwrap_or(false) {
        log::info!("fetch: {} already present, skipping download", target.display());
        return Ok(target);
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| FetchError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    log::info!("fetch: downloading {url}");
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::request(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.into(),
            status: status.as_u16(),
        });
    }

    let partial = dir.join(format!("{filename}.part"));
    let io_err = |path: &Path, source: std::io::Error| FetchError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(&partial)
        .await
        .map_err(|e| io_err(&partial, e))?;
    let mut received: u64 = 0;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| FetchError::request(url, e))?
    {
        file.write_all(&chunk).await.map_err(|e| io_err(&partial, e))?;
        received += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| io_err(&partial, e))?;
    drop(file);

    tokio::fs::rename(&partial, &target)
        .await
        .map_err(|e| io_err(&target, e))?;

    log::info!("fetch: saved {received} bytes to {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port; returns the base URL.
    async fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn existing_file_is_not_downloaded() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("corpus.zip"), b"cached").unwrap();

        // Unroutable URL: any request attempt would fail the test.
        let path = maybe_download(&client(), "corpus.zip", dir.path(), "http://127.0.0.1:9/corpus.zip")
            .await
            .unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"cached");
    }

    #[tokio::test]
    async fn downloads_into_directory() {
        let dir = tempdir().unwrap();
        let base = serve_once("200 OK", b"zip bytes").await;
        let origin = dir.path().join("origin");

        let path = maybe_download(&client(), "corpus.zip", &origin, &format!("{base}/corpus.zip"))
            .await
            .unwrap();

        assert_eq!(path, origin.join("corpus.zip"));
        assert_eq!(std::fs::read(&path).unwrap(), b"zip bytes");
        assert!(!origin.join("corpus.zip.part").exists());
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let dir = tempdir().unwrap();
        let base = serve_once("404 Not Found", b"").await;

        let err = maybe_download(&client(), "missing.zip", dir.path(), &format!("{base}/missing.zip"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }), "{err}");
        assert!(!dir.path().join("missing.zip").exists());
    }
}
