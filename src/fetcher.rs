use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use crate::error::{ConfigError, FetchError};

/// Source of raw document bytes for the check cycle.
///
/// The scheduler only depends on this trait, so tests can drive cycles
/// with scripted responses instead of a live server.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Perform one fetch. No retries; a failure is reported as-is and the
    /// next scheduled tick is the retry.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTP fetcher with cache-busting and a bounded request timeout.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let request_url = cache_busting_url(url);
        debug!("Fetching {}", request_url);

        let response = self
            .client
            .get(&request_url)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify)?;
        debug!("Fetched {} bytes from {}", body.len(), url);

        Ok(body.to_vec())
    }
}

/// Append a query parameter derived from the current time, so intermediate
/// caches never serve a stale copy.
fn cache_busting_url(url: &str) -> String {
    let timestamp = Utc::now().timestamp();
    if url.contains('?') {
        format!("{}&v={}", url, timestamp)
    } else {
        format!("{}?v={}", url, timestamp)
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_connect() {
        FetchError::Connection(err.to_string())
    } else {
        FetchError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_buster_appends_query_parameter() {
        let busted = cache_busting_url("https://example.com/menu");
        assert!(busted.starts_with("https://example.com/menu?v="));
    }

    #[test]
    fn cache_buster_extends_existing_query() {
        let busted = cache_busting_url("https://example.com/menu?lang=pt");
        assert!(busted.starts_with("https://example.com/menu?lang=pt&v="));
    }
}
