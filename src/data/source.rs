//! Feed Sources
//!
//! Where the CSV text comes from. The server uses [`HttpFeed`]; files and
//! in-memory text are handy offline and in tests.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use super::error::{LoadError, LoadResult};
use crate::config::FeedConfig;

/// Common trait for all feed sources
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable description (URL, path, ...)
    fn describe(&self) -> String;

    /// Retrieve the whole CSV body
    async fn fetch(&self) -> LoadResult<String>;
}

/// CSV feed fetched with a single HTTP GET
pub struct HttpFeed {
    client: reqwest::Client,
    url: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpFeed {
    /// Create a feed from configuration
    pub fn new(config: &FeedConfig) -> LoadResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("covid-dash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LoadError::fetch(config.url.clone(), e))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    async fn fetch_once(&self) -> LoadResult<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "request timed out".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    e.to_string()
                };
                LoadError::fetch(self.url.clone(), message)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::fetch(
                self.url.clone(),
                format!("HTTP status {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| LoadError::fetch(self.url.clone(), e))
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> LoadResult<String> {
        let mut attempt = 0;
        loop {
            match self.fetch_once().await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.max_retries => {
                    let delay = self.retry_backoff * 2u32.saturating_pow(attempt);
                    tracing::warn!(
                        url = %self.url,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Feed fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// CSV feed read from a local file
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for FileFeed {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> LoadResult<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| LoadError::fetch(self.describe(), e))
    }
}

/// CSV feed held in memory
pub struct StaticFeed {
    text: String,
}

impl StaticFeed {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    fn describe(&self) -> String {
        format!("static ({} bytes)", self.text.len())
    }

    async fn fetch(&self) -> LoadResult<String> {
        Ok(self.text.clone())
    }
}

/// Pick a source for a configured location
///
/// `http://` and `https://` URLs are fetched over HTTP, `file://` URLs and
/// plain paths are read from disk.
pub fn from_config(config: &FeedConfig) -> LoadResult<Box<dyn FeedSource>> {
    let url = config.url.as_str();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(Box::new(HttpFeed::new(config)?))
    } else {
        let path = url.strip_prefix("file://").unwrap_or(url);
        Ok(Box::new(FileFeed::new(path)))
    }
}
