//! Asset download for asset-mirror
//!
//! One call per asset URL: skip when the target already exists, otherwise
//! fetch the whole body into memory and write it to a freshly created file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use log::{info, warn};
use reqwest::Client;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::core::error::{serialize_error, Error, Result};
use crate::core::fetch::build_client;
use crate::core::sanitize::sanitize_filename;

/// Result of resolving one asset URL
#[derive(Debug, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum DownloadOutcome {
    /// Target file was already present, no request made
    Skipped,

    /// Asset written, with the number of bytes
    Success(u64),

    /// Asset could not be fetched or written
    Failed(#[serde(serialize_with = "serialize_error")] Error),
}

impl DownloadOutcome {
    /// Whether this outcome wrote a new file
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success(_))
    }
}

/// Check whether a regular file exists at `path`
async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Create `path` (failing if it exists) and write `body` to it
///
/// A file left half-written by a failed write is removed.
async fn write_new_file(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    let written = match file.write_all(body).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        drop(file);
        let _ = tokio::fs::remove_file(path).await;
        return Err(e);
    }

    Ok(())
}

/// Downloads assets into an output directory, at most once per target file
pub struct Downloader {
    client: Client,
}

impl Downloader {
    /// Create a downloader whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(Some(timeout))?,
        })
    }

    /// Local path an asset URL is stored at
    pub fn target_path(asset_url: &str, output_dir: &Path) -> Result<PathBuf> {
        let filename = sanitize_filename(asset_url).to_lowercase();
        if filename.is_empty() {
            return Err(Error::InvalidUrl(asset_url.to_string()));
        }
        Ok(output_dir.join(filename))
    }

    /// Skip, or fetch and store, one asset
    pub async fn resolve(&self, asset_url: &str, output_dir: &Path) -> DownloadOutcome {
        let target = match Self::target_path(asset_url, output_dir) {
            Ok(target) => target,
            Err(e) => {
                warn!("Cannot derive a filename for {asset_url}: {e}");
                return DownloadOutcome::Failed(e);
            }
        };

        if is_regular_file(&target).await {
            info!("File already exists, skipping: {}", target.display());
            return DownloadOutcome::Skipped;
        }

        let body = match self.fetch_body(asset_url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to download {asset_url}: {e}");
                return DownloadOutcome::Failed(e);
            }
        };

        match write_new_file(&target, &body).await {
            Ok(()) => {
                let written = body.len() as u64;
                info!(
                    "Successfully downloaded {written} bytes: {asset_url} → {}",
                    target.display()
                );
                DownloadOutcome::Success(written)
            }
            Err(e) => {
                // Another writer created the file between the check and the open
                if e.kind() == std::io::ErrorKind::AlreadyExists && is_regular_file(&target).await {
                    info!("File appeared while downloading, skipping: {}", target.display());
                    return DownloadOutcome::Skipped;
                }
                warn!("Failed to write {} for {asset_url}: {e}", target.display());
                DownloadOutcome::Failed(Error::IoError(e))
            }
        }
    }

    /// Single GET, returning the full non-empty body
    async fn fetch_body(&self, url: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::BadStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::ReadError(e.to_string()))?;

        if body.is_empty() {
            return Err(Error::EmptyBody);
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn downloader() -> Downloader {
        Downloader::new(Duration::from_secs(5)).unwrap()
    }

    async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.map(|r| r.len()).unwrap_or(0)
    }

    #[test]
    fn test_target_path() {
        let dir = Path::new("Assets");
        let target = Downloader::target_path("https://example.com/Docs/Sheet.PDF", dir).unwrap();
        assert_eq!(target, PathBuf::from("Assets/sheet.pdf"));
    }

    #[test]
    fn test_target_path_empty_name() {
        let result = Downloader::target_path("https://example.com/???", Path::new("Assets"));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_download_then_skip() {
        let mock_server = MockServer::start().await;
        let content = b"%PDF-1.4 test document".to_vec();
        Mock::given(method("GET"))
            .and(path("/files/report.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let url = format!("{}/files/report.pdf", mock_server.uri());
        let downloader = downloader();

        let first = downloader.resolve(&url, dir.path()).await;
        assert!(matches!(first, DownloadOutcome::Success(n) if n == content.len() as u64));
        assert_eq!(std::fs::read(dir.path().join("report.pdf")).unwrap(), content);

        let second = downloader.resolve(&url, dir.path()).await;
        assert!(matches!(second, DownloadOutcome::Skipped));
        assert_eq!(request_count(&mock_server).await, 1);
    }

    #[tokio::test]
    async fn test_existing_file_never_overwritten() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("photo.jpg"), b"old").unwrap();

        let url = format!("{}/img/Photo.JPG", mock_server.uri());
        let outcome = downloader().resolve(&url, dir.path()).await;

        assert!(matches!(outcome, DownloadOutcome::Skipped));
        assert_eq!(std::fs::read(dir.path().join("photo.jpg")).unwrap(), b"old");
        assert_eq!(request_count(&mock_server).await, 0);
    }

    #[tokio::test]
    async fn test_empty_body_creates_no_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let url = format!("{}/empty.zip", mock_server.uri());
        let outcome = downloader().resolve(&url, dir.path()).await;

        assert!(matches!(outcome, DownloadOutcome::Failed(Error::EmptyBody)));
        assert!(!dir.path().join("empty.zip").exists());
    }

    #[tokio::test]
    async fn test_not_found_creates_no_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let url = format!("{}/gone.pdf", mock_server.uri());
        let outcome = downloader().resolve(&url, dir.path()).await;

        assert!(matches!(outcome, DownloadOutcome::Failed(Error::BadStatus(404))));
        assert!(!dir.path().join("gone.pdf").exists());
    }

    #[tokio::test]
    async fn test_timeout_is_transport_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"slow".to_vec())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let url = format!("{}/slow.txt", mock_server.uri());
        let downloader = Downloader::new(Duration::from_millis(200)).unwrap();
        let outcome = downloader.resolve(&url, dir.path()).await;

        assert!(matches!(outcome, DownloadOutcome::Failed(Error::NetworkError(_))));
        assert!(!dir.path().join("slow.txt").exists());
    }

    #[tokio::test]
    async fn test_truncated_body_is_read_error() {
        use tokio::io::AsyncReadExt;

        // Promise 100 bytes, send 10, then hang up
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n0123456789")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let dir = tempdir().unwrap();
        let url = format!("http://{addr}/partial.pdf");
        let outcome = downloader().resolve(&url, dir.path()).await;
        server.await.unwrap();

        assert!(matches!(outcome, DownloadOutcome::Failed(Error::ReadError(_))));
        assert!(!dir.path().join("partial.pdf").exists());
    }

    #[tokio::test]
    async fn test_missing_output_dir_is_io_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"{}".to_vec()))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let url = format!("{}/data.json", mock_server.uri());
        let outcome = downloader().resolve(&url, &missing).await;

        assert!(matches!(outcome, DownloadOutcome::Failed(Error::IoError(_))));
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn test_directory_at_target_is_not_skipped() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("notes.txt")).unwrap();

        let url = format!("{}/notes.txt", mock_server.uri());
        let outcome = downloader().resolve(&url, dir.path()).await;

        assert!(matches!(outcome, DownloadOutcome::Failed(Error::IoError(_))));
        assert_eq!(request_count(&mock_server).await, 1);
    }
}
