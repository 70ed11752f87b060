//! Downloading raw claim photographs.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use crate::error::{Result, WcaError};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw image bytes. The pipeline is generic over this seam so
/// tests can serve fixtures without touching the network.
pub trait ImageFetcher: Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// HTTP fetcher backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(WcaError::Network)?;
        Ok(Self { http })
    }
}

impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await.map_err(WcaError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(WcaError::fetch(
                Some(status),
                format!("failed to download image (status {})", status.as_u16()),
            ));
        }

        let bytes = response.bytes().await.map_err(WcaError::Network)?;
        if bytes.is_empty() {
            return Err(WcaError::fetch(Some(status), "empty response body"));
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetcher_builds_with_custom_timeout() {
        let fetcher = HttpFetcher::with_timeout(Duration::from_secs(5));
        assert!(fetcher.is_ok());
    }

    #[tokio::test]
    async fn fetch_fails_for_unreachable_host() {
        let fetcher = HttpFetcher::with_timeout(Duration::from_secs(2)).expect("build fetcher");
        // Port 9 (discard) is not listening locally; the connection is refused.
        let result = fetcher.fetch("http://127.0.0.1:9/photo.jpg").await;
        assert!(result.is_err());
    }
}
