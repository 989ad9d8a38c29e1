//! Library index download.

use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use url::Url;

use crate::util::fs::ensure_dir;

/// Refreshes the on-disk library index.
pub trait IndexFetcher: Send + Sync {
    /// Replace the index file at `dest` with a fresh copy.
    fn fetch(&self, dest: &Path) -> Result<()>;
}

/// Downloads the index over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIndexFetcher {
    url: Url,
    timeout: Duration,
}

impl HttpIndexFetcher {
    /// Create a fetcher for `url`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("invalid index URL: {}", url))?;
        Ok(HttpIndexFetcher { url, timeout })
    }

    /// Whether the download is gzip-compressed.
    fn is_gzipped(&self) -> bool {
        self.url.path().ends_with(".gz")
    }

    fn download(&self) -> Result<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("failed to build HTTP client")?;

        let response = client
            .get(self.url.clone())
            .send()
            .with_context(|| format!("failed to download library index from {}", self.url))?;

        if !response.status().is_success() {
            bail!(
                "failed to download library index from {}: HTTP {}",
                self.url,
                response.status()
            );
        }

        let bytes = response
            .bytes()
            .context("failed to read library index response body")?;

        if self.is_gzipped() {
            gunzip(&bytes)
        } else {
            Ok(bytes.to_vec())
        }
    }
}

impl IndexFetcher for HttpIndexFetcher {
    fn fetch(&self, dest: &Path) -> Result<()> {
        tracing::info!("Fetching library index from {}", self.url);

        let contents = self.download()?;
        write_atomic(dest, &contents)?;

        tracing::info!(
            "Wrote library index to {} ({} bytes)",
            dest.display(),
            contents.len()
        );
        Ok(())
    }
}

/// Fetcher used in offline mode; every refresh fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

impl IndexFetcher for OfflineFetcher {
    fn fetch(&self, dest: &Path) -> Result<()> {
        bail!(
            "offline mode is enabled; cannot download library index to {}",
            dest.display()
        )
    }
}

/// Decompress gzip data.
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::read::GzDecoder;

    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .context("failed to decompress library index")?;
    Ok(out)
}

/// Write `contents` to `dest` through a temp file in the same directory.
///
/// Readers never observe a half-written index.
pub fn write_atomic(dest: &Path, contents: &[u8]) -> Result<()> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_dir(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(contents)
        .context("failed to write library index")?;
    tmp.persist(dest)
        .with_context(|| format!("failed to write {}", dest.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    #[test]
    fn test_gunzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"libraries":[]}"#).unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(gunzip(&compressed).unwrap(), br#"{"libraries":[]}"#);
        assert!(gunzip(b"plain text").is_err());
    }

    #[test]
    fn test_write_atomic_creates_parent() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("nested").join("library_index.json");

        write_atomic(&dest, b"first").unwrap();
        write_atomic(&dest, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "second");
    }

    #[test]
    fn test_http_fetcher_url_handling() {
        let gz = HttpIndexFetcher::new(
            "https://downloads.arduino.cc/libraries/library_index.json.gz",
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(gz.is_gzipped());

        let plain =
            HttpIndexFetcher::new("https://example.com/library_index.json", Duration::from_secs(5))
                .unwrap();
        assert!(!plain.is_gzipped());

        assert!(HttpIndexFetcher::new("not a url", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_offline_fetcher_fails() {
        let tmp = TempDir::new().unwrap();
        let err = OfflineFetcher
            .fetch(&tmp.path().join("library_index.json"))
            .unwrap_err();
        assert!(err.to_string().contains("offline"));
    }
}
