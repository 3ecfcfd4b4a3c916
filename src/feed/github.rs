use super::error::SourceFetchError;
use super::types::*;
use super::{fetch_body, rfc3339_millis, FeedSource, FetchParams};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_WEB: &str = "https://github.com/";

/// Public GitHub event stream. Fixed size, no pagination.
pub struct GithubEvents {
    client: Client,
    base_url: String,
}

impl GithubEvents {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

pub fn parse_github_events(body: &[u8]) -> serde_json::Result<Vec<FeedItem>> {
    let events: Vec<GithubEvent> = serde_json::from_slice(body)?;
    Ok(events.into_iter().map(event_to_item).collect())
}

fn event_to_item(ev: GithubEvent) -> FeedItem {
    let repo = ev
        .repo
        .and_then(|r| r.name)
        .unwrap_or_default();
    let author = ev
        .actor
        .and_then(|a| a.login)
        .filter(|login| !login.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    FeedItem {
        id: format!("{}{}", Source::Github.id_prefix(), ev.id),
        source: Source::Github,
        author,
        title: format!("{} — {}", ev.event_type, repo),
        url: format!("{}{}", GITHUB_WEB, repo),
        ts: ev.created_at.as_deref().and_then(rfc3339_millis).unwrap_or(0),
        meta: ItemMeta::Github {
            event_type: ev.event_type,
        },
    }
}

#[async_trait]
impl FeedSource for GithubEvents {
    fn source(&self) -> Source {
        Source::Github
    }

    async fn fetch(&self, _params: &FetchParams) -> Result<Vec<FeedItem>, SourceFetchError> {
        let url = format!("{}/events", self.base_url);
        let req = self.client.get(&url).header(ACCEPT, GITHUB_ACCEPT);

        let body = fetch_body(Source::Github, req).await?;
        parse_github_events(&body).map_err(|e| SourceFetchError::new(Source::Github, e))
    }
}
