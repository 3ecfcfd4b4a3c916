pub mod error;
pub mod github;
pub mod hacker_news;
pub mod reddit;
pub mod rss;
pub mod types;

use crate::config::{EndpointsConfig, HttpConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use error::SourceFetchError;
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;
use types::{FeedItem, Source};

/// Items requested per page from every source that takes a size.
pub const PAGE_SIZE: usize = 30;

/// Per-cycle inputs. Each source reads only the fields it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchParams {
    /// Zero-based page cursor; only Hacker News consumes it.
    pub page: u32,
    pub rss_url: Option<String>,
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    fn source(&self) -> Source;
    async fn fetch(&self, params: &FetchParams) -> Result<Vec<FeedItem>, SourceFetchError>;
}

/// Build the HTTP client shared by every source.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .build()
        .context("failed to build HTTP client")
}

/// One adapter per source, in canonical order.
pub fn build_sources(client: &Client, endpoints: &EndpointsConfig) -> Vec<Arc<dyn FeedSource>> {
    vec![
        Arc::new(hacker_news::HackerNews::new(client.clone(), &endpoints.hn_base_url)),
        Arc::new(reddit::Reddit::new(client.clone(), &endpoints.reddit_base_url)),
        Arc::new(github::GithubEvents::new(client.clone(), &endpoints.github_base_url)),
        Arc::new(rss::RssFeed::new(client.clone(), &endpoints.rss2json_base_url)),
    ]
}

/// Send `req` and return the body bytes. Transport errors and non-2xx statuses
/// are failures of `origin` only.
pub(crate) async fn fetch_body(origin: Source, req: RequestBuilder) -> Result<Vec<u8>, SourceFetchError> {
    let resp = req.send().await.map_err(|e| SourceFetchError::new(origin, e))?;

    let status = resp.status();
    if !status.is_success() {
        tracing::debug!(source = %origin, %status, "non-success response");
        return Err(SourceFetchError::status(origin, status));
    }

    let body = resp.bytes().await.map_err(|e| SourceFetchError::new(origin, e))?;
    Ok(body.to_vec())
}

/// Parse an RFC 3339 timestamp into epoch milliseconds.
pub(crate) fn rfc3339_millis(ts: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(ts.trim())
        .ok()
        .map(|dt| dt.timestamp_millis())
}
