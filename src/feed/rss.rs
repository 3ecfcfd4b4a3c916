use super::error::{FetchFailure, SourceFetchError};
use super::types::*;
use super::{fetch_body, rfc3339_millis, FeedSource, FetchParams, PAGE_SIZE};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, Url};

/// Longest id suffix taken from guid/link/title.
const MAX_ID_LEN: usize = 64;

/// Any RSS/Atom feed, converted to JSON by rss2json.
pub struct RssFeed {
    client: Client,
    base_url: String,
}

impl RssFeed {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_url(&self, feed_url: &str) -> String {
        format!(
            "{}/v1/api.json?rss_url={}",
            self.base_url,
            urlencoding::encode(feed_url)
        )
    }
}

/// Accept only absolute http(s) URLs as feed locations.
pub fn parse_feed_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("not a URL: {}", raw.trim()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => anyhow::bail!("unsupported feed scheme: {}", other),
    }
}

/// Normalize an rss2json body. `now_ms` stands in for entries without a usable date.
pub fn parse_rss2json(body: &[u8], now_ms: i64) -> Result<Vec<FeedItem>, FetchFailure> {
    let resp: Rss2JsonResponse = serde_json::from_slice(body)?;

    if resp.status.as_deref() == Some("error") {
        return Err(FetchFailure::Upstream(
            resp.message.unwrap_or_else(|| "rss2json reported an error".to_string()),
        ));
    }

    let feed_title = resp
        .feed
        .and_then(|f| f.title)
        .filter(|t| !t.trim().is_empty());

    Ok(resp
        .items
        .unwrap_or_default()
        .into_iter()
        .take(PAGE_SIZE)
        .filter_map(|entry| entry_to_item(entry, feed_title.as_deref(), now_ms))
        .collect())
}

fn entry_to_item(entry: Rss2JsonItem, feed_title: Option<&str>, now_ms: i64) -> Option<FeedItem> {
    let url = non_empty(entry.link.as_deref())?.to_string();

    let key = non_empty(entry.guid.as_deref())
        .or_else(|| non_empty(entry.link.as_deref()))
        .or_else(|| non_empty(entry.title.as_deref()))
        .unwrap_or_default();
    let id: String = key.chars().take(MAX_ID_LEN).collect();

    let author = non_empty(entry.author.as_deref())
        .or(feed_title)
        .unwrap_or_default()
        .to_string();

    Some(FeedItem {
        id: format!("{}{}", Source::Rss.id_prefix(), id),
        source: Source::Rss,
        author,
        title: entry.title.unwrap_or_default(),
        url,
        ts: entry.pub_date.as_deref().and_then(pub_date_millis).unwrap_or(now_ms),
        meta: ItemMeta::Rss {
            feed: feed_title.unwrap_or("RSS").to_string(),
        },
    })
}

/// rss2json emits `YYYY-MM-DD HH:MM:SS` in UTC; raw feeds sometimes leak through
/// as RFC 3339 or RFC 2822.
fn pub_date_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    rfc3339_millis(raw)
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc().timestamp_millis())
        })
        .or_else(|| DateTime::parse_from_rfc2822(raw).ok().map(|dt| dt.timestamp_millis()))
}

#[async_trait]
impl FeedSource for RssFeed {
    fn source(&self) -> Source {
        Source::Rss
    }

    async fn fetch(&self, params: &FetchParams) -> Result<Vec<FeedItem>, SourceFetchError> {
        let Some(feed_url) = non_empty(params.rss_url.as_deref()) else {
            tracing::debug!("no feed URL configured; skipping rss");
            return Ok(Vec::new());
        };

        let url = self.build_url(feed_url.trim());
        let body = fetch_body(Source::Rss, self.client.get(&url)).await?;
        parse_rss2json(&body, Utc::now().timestamp_millis())
            .map_err(|kind| SourceFetchError::new(Source::Rss, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_800_000_000_000;

    const FIXTURE: &str = r#"{
        "status": "ok",
        "feed": { "title": "This Week in Rust", "url": "https://this-week-in-rust.org/" },
        "items": [
            {
                "title": "This Week in Rust 540",
                "pubDate": "2024-03-01 12:00:00",
                "link": "https://this-week-in-rust.org/blog/2024/03/01/this-week-in-rust-540/",
                "guid": "https://this-week-in-rust.org/blog/2024/03/01/this-week-in-rust-540/",
                "author": "TWiR Contributors"
            },
            {
                "title": "No date, no author",
                "pubDate": "",
                "link": "https://example.com/undated",
                "guid": "",
                "author": ""
            },
            {
                "title": "No link at all",
                "pubDate": "2024-03-01 12:00:00",
                "guid": "orphan"
            }
        ]
    }"#;

    #[test]
    fn test_parse_rss_primary_fields() {
        let items = parse_rss2json(FIXTURE.as_bytes(), NOW).unwrap();
        assert_eq!(items.len(), 2);
        let first = &items[0];
        assert_eq!(
            first.id,
            "rss_https://this-week-in-rust.org/blog/2024/03/01/this-week-in-rust-540/"
        );
        assert_eq!(first.author, "TWiR Contributors");
        assert_eq!(first.ts, 1_709_294_400_000);
        assert_eq!(first.meta, ItemMeta::Rss { feed: "This Week in Rust".to_string() });
    }

    #[test]
    fn test_parse_rss_fallbacks() {
        let items = parse_rss2json(FIXTURE.as_bytes(), NOW).unwrap();
        let second = &items[1];
        // guid blank, so the link becomes the id
        assert_eq!(second.id, "rss_https://example.com/undated");
        assert_eq!(second.author, "This Week in Rust");
        assert_eq!(second.ts, NOW);
    }

    #[test]
    fn test_parse_rss_truncates_id() {
        let long = "x".repeat(100);
        let body = format!(
            r#"{{"items":[{{"guid":"{}","link":"https://example.com/a","title":"t"}}]}}"#,
            long
        );
        let items = parse_rss2json(body.as_bytes(), NOW).unwrap();
        assert_eq!(items[0].id.len(), "rss_".len() + MAX_ID_LEN);
        assert_eq!(items[0].meta, ItemMeta::Rss { feed: "RSS".to_string() });
        assert_eq!(items[0].author, "");
    }

    #[test]
    fn test_parse_rss_caps_at_page_size() {
        let entries: Vec<String> = (0..45)
            .map(|i| format!(r#"{{"guid":"g{}","link":"https://example.com/{}"}}"#, i, i))
            .collect();
        let body = format!(r#"{{"status":"ok","items":[{}]}}"#, entries.join(","));
        let items = parse_rss2json(body.as_bytes(), NOW).unwrap();
        assert_eq!(items.len(), PAGE_SIZE);
    }

    #[test]
    fn test_parse_rss_missing_items_is_empty() {
        let items = parse_rss2json(br#"{"status":"ok","feed":{}}"#, NOW).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_parse_rss_upstream_error() {
        let body = br#"{"status":"error","message":"Cannot download this RSS feed"}"#;
        match parse_rss2json(body, NOW) {
            Err(FetchFailure::Upstream(msg)) => assert!(msg.contains("Cannot download")),
            other => panic!("expected upstream failure, got {:?}", other),
        }
    }

    #[test]
    fn test_pub_date_formats() {
        assert_eq!(pub_date_millis("2024-03-01T12:00:00Z"), Some(1_709_294_400_000));
        assert_eq!(pub_date_millis("Fri, 01 Mar 2024 12:00:00 +0000"), Some(1_709_294_400_000));
        assert_eq!(pub_date_millis("soon"), None);
    }

    #[test]
    fn test_parse_feed_url() {
        assert!(parse_feed_url("https://blog.rust-lang.org/feed.xml").is_ok());
        assert!(parse_feed_url("  http://example.com/rss  ").is_ok());
        assert!(parse_feed_url("ftp://example.com/rss").is_err());
        assert!(parse_feed_url("example.com/rss").is_err());
    }

    #[test]
    fn test_build_url_encodes_feed() {
        let rss = RssFeed::new(Client::new(), "https://api.rss2json.com/");
        assert_eq!(
            rss.build_url("https://example.com/feed?a=1&b=2"),
            "https://api.rss2json.com/v1/api.json?rss_url=https%3A%2F%2Fexample.com%2Ffeed%3Fa%3D1%26b%3D2"
        );
    }

    #[tokio::test]
    async fn test_no_feed_url_yields_nothing() {
        // Unroutable base: any request would fail, so Ok proves none was sent.
        let rss = RssFeed::new(Client::new(), "http://127.0.0.1:9");
        let params = FetchParams { page: 0, rss_url: Some("   ".to_string()) };
        assert!(rss.fetch(&params).await.unwrap().is_empty());
        assert!(rss.fetch(&FetchParams::default()).await.unwrap().is_empty());
    }
}
