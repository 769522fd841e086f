//! HTTP payload fetcher
//!
//! Preloading wants the next item's bytes pulled through the network
//! stack so the OS/proxy cache is warm when playback reaches it. The
//! fetch drains the body and discards it.

use crate::playback::ports::{FetchError, PayloadFetcher};
use async_trait::async_trait;
use tracing::debug;

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PayloadFetcher for HttpFetcher {
    async fn fetch(&self, source: &str) -> Result<(), FetchError> {
        let response = self
            .client
            .get(source)
            .send()
            .await
            .map_err(|e| FetchError::Failed(e.to_string()))?
            .error_for_status()
            .map_err(|e| FetchError::Failed(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Failed(e.to_string()))?;
        debug!("warmed {} bytes from {}", bytes.len(), source);
        Ok(())
    }
}
