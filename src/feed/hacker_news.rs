use super::error::SourceFetchError;
use super::types::*;
use super::{fetch_body, rfc3339_millis, FeedSource, FetchParams, PAGE_SIZE};
use async_trait::async_trait;
use reqwest::Client;

const HN_ITEM_URL: &str = "https://news.ycombinator.com/item?id=";

/// Hacker News stories via the Algolia search-by-date API. The only paginated source.
pub struct HackerNews {
    client: Client,
    base_url: String,
}

impl HackerNews {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_url(&self, page: u32) -> String {
        format!(
            "{}/api/v1/search_by_date?tags=story&hitsPerPage={}&page={}",
            self.base_url, PAGE_SIZE, page
        )
    }
}

pub fn parse_hn_hits(body: &[u8]) -> serde_json::Result<Vec<FeedItem>> {
    let resp: HnSearchResponse = serde_json::from_slice(body)?;
    Ok(resp.hits.into_iter().map(hit_to_item).collect())
}

fn hit_to_item(hit: HnHit) -> FeedItem {
    let title = non_empty(hit.title.as_deref())
        .or_else(|| non_empty(hit.story_title.as_deref()))
        .unwrap_or("HN Story")
        .to_string();

    let url = non_empty(hit.url.as_deref())
        .or_else(|| non_empty(hit.story_url.as_deref()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}{}", HN_ITEM_URL, hit.object_id));

    let ts = hit
        .created_at
        .as_deref()
        .and_then(rfc3339_millis)
        .or_else(|| hit.created_at_i.map(|secs| secs.saturating_mul(1000)))
        .unwrap_or(0);

    FeedItem {
        id: format!("{}{}", Source::Hn.id_prefix(), hit.object_id),
        source: Source::Hn,
        author: hit.author.unwrap_or_default(),
        title,
        url,
        ts,
        meta: ItemMeta::Hn {
            points: hit.points.unwrap_or(0),
            comments: hit.num_comments.unwrap_or(0),
        },
    }
}

#[async_trait]
impl FeedSource for HackerNews {
    fn source(&self) -> Source {
        Source::Hn
    }

    async fn fetch(&self, params: &FetchParams) -> Result<Vec<FeedItem>, SourceFetchError> {
        let url = self.build_url(params.page);
        tracing::debug!(page = params.page, "fetching hacker news");

        let body = fetch_body(Source::Hn, self.client.get(&url)).await?;
        parse_hn_hits(&body).map_err(|e| SourceFetchError::new(Source::Hn, e))
    }
}
