use crate::feed::types::FeedItem;

/// Items whose title or author contains `query` (trimmed, case-insensitive).
/// A blank query keeps every item.
pub fn filter_items<'a>(items: &'a [FeedItem], query: &str) -> Vec<&'a FeedItem> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            item.title.to_lowercase().contains(&needle)
                || item.author.to_lowercase().contains(&needle)
        })
        .collect()
}
