use super::error::SourceFetchError;
use super::types::*;
use super::{fetch_body, FeedSource, FetchParams, PAGE_SIZE};
use async_trait::async_trait;
use reqwest::Client;

const REDDIT_PERMALINK_BASE: &str = "https://reddit.com";

/// Newest posts across r/all. Always the first page; ignores the cursor.
pub struct Reddit {
    client: Client,
    base_url: String,
}

impl Reddit {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

pub fn parse_reddit_listing(body: &[u8]) -> serde_json::Result<Vec<FeedItem>> {
    let listing: RedditListing = serde_json::from_slice(body)?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| post_to_item(child.data))
        .collect())
}

fn post_to_item(post: RedditPost) -> FeedItem {
    let url = non_empty(post.url_overridden_by_dest.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}{}", REDDIT_PERMALINK_BASE, post.permalink));

    FeedItem {
        id: format!("{}{}", Source::Reddit.id_prefix(), post.id),
        source: Source::Reddit,
        author: post.author,
        title: post.title,
        url,
        // created_utc is fractional seconds
        ts: (post.created_utc * 1000.0) as i64,
        meta: ItemMeta::Reddit {
            subreddit: post.subreddit,
            score: post.score,
            comments: post.num_comments,
        },
    }
}

#[async_trait]
impl FeedSource for Reddit {
    fn source(&self) -> Source {
        Source::Reddit
    }

    async fn fetch(&self, _params: &FetchParams) -> Result<Vec<FeedItem>, SourceFetchError> {
        let url = format!("{}/r/all/new.json?limit={}", self.base_url, PAGE_SIZE);

        let body = fetch_body(Source::Reddit, self.client.get(&url)).await?;
        parse_reddit_listing(&body).map_err(|e| SourceFetchError::new(Source::Reddit, e))
    }
}
