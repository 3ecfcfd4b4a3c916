use crate::feed::types::{FeedItem, ItemMeta};

/// Relative age of `ts_ms` as seen from `now_ms`. Future timestamps read as "0s ago".
pub fn time_ago(ts_ms: i64, now_ms: i64) -> String {
    let secs = (now_ms.saturating_sub(ts_ms) / 1000).max(0);
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

pub fn byline(item: &FeedItem, now_ms: i64) -> String {
    let author = if item.author.trim().is_empty() {
        "unknown"
    } else {
        item.author.as_str()
    };
    format!("by {} • {}", author, time_ago(item.ts, now_ms))
}

pub fn display_title(item: &FeedItem) -> &str {
    if item.title.trim().is_empty() {
        "Untitled"
    } else {
        &item.title
    }
}

pub fn meta_line(meta: &ItemMeta) -> String {
    match meta {
        ItemMeta::Hn { points, comments } => format!("{} points • {} comments", points, comments),
        ItemMeta::Reddit { subreddit, score, comments } => {
            format!("r/{} • {} points • {} comments", subreddit, score, comments)
        }
        ItemMeta::Github { event_type } => event_type.clone(),
        ItemMeta::Rss { feed } => {
            if feed.trim().is_empty() {
                "RSS".to_string()
            } else {
                feed.clone()
            }
        }
    }
}

/// Plain-text card used by `--once`.
pub fn plain_card(item: &FeedItem, now_ms: i64) -> String {
    format!(
        "[{}] {}\n  {}\n  {}\n  {}",
        item.source.label(),
        byline(item, now_ms),
        display_title(item),
        item.url,
        meta_line(&item.meta)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::Source;

    const NOW: i64 = 1_709_294_400_000;

    #[test]
    fn test_time_ago_units() {
        assert_eq!(time_ago(NOW - 5_000, NOW), "5s ago");
        assert_eq!(time_ago(NOW - 59_999, NOW), "59s ago");
        assert_eq!(time_ago(NOW - 60_000, NOW), "1m ago");
        assert_eq!(time_ago(NOW - 2 * 3_600_000, NOW), "2h ago");
        assert_eq!(time_ago(NOW - 3 * 86_400_000, NOW), "3d ago");
        assert_eq!(time_ago(NOW + 10_000, NOW), "0s ago");
    }

    #[test]
    fn test_meta_lines() {
        assert_eq!(
            meta_line(&ItemMeta::Hn { points: 42, comments: 7 }),
            "42 points • 7 comments"
        );
        assert_eq!(
            meta_line(&ItemMeta::Reddit { subreddit: "rust".to_string(), score: -3, comments: 1 }),
            "r/rust • -3 points • 1 comments"
        );
        assert_eq!(meta_line(&ItemMeta::Github { event_type: "ForkEvent".to_string() }), "ForkEvent");
        assert_eq!(meta_line(&ItemMeta::Rss { feed: String::new() }), "RSS");
    }

    #[test]
    fn test_plain_card_fallbacks() {
        let item = FeedItem {
            id: "rss_x".to_string(),
            source: Source::Rss,
            author: String::new(),
            title: " ".to_string(),
            url: "https://example.com/x".to_string(),
            ts: NOW - 120_000,
            meta: ItemMeta::Rss { feed: "Blog".to_string() },
        };
        assert_eq!(
            plain_card(&item, NOW),
            "[RSS] by unknown • 2m ago\n  Untitled\n  https://example.com/x\n  Blog"
        );
    }
}
