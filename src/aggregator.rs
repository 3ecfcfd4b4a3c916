use crate::feed::types::{EnabledSources, FeedItem, Source};
use crate::feed::{FeedSource, FetchParams};
use futures_util::future::join_all;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Instant;

/// Banner text shown when any source failed during a cycle.
pub const FETCH_WARNING: &str = "Some sources failed to load. Try refreshing.";

/// Result of one aggregation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    /// Sorted newest first.
    pub items: Vec<FeedItem>,
    pub failed_sources: Vec<Source>,
    pub warning: Option<String>,
    /// Page cursor the cycle was run with.
    pub page: u32,
}

/// Fans out to every enabled source, waits for all of them, and merges.
/// At most one cycle runs at a time.
pub struct Aggregator {
    sources: Vec<Arc<dyn FeedSource>>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the cycle ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, AtomicOrdering::Release);
    }
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn FeedSource>>) -> Self {
        Self {
            sources,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(AtomicOrdering::Acquire)
    }

    /// Run one cycle. Returns `None` if another cycle is already in flight.
    pub async fn run_cycle(&self, enabled: EnabledSources, params: &FetchParams) -> Option<CycleOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, AtomicOrdering::AcqRel, AtomicOrdering::Acquire)
            .is_err()
        {
            tracing::debug!("aggregation already in flight; trigger dropped");
            return None;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let started = Instant::now();
        let active: Vec<&Arc<dyn FeedSource>> = self
            .sources
            .iter()
            .filter(|s| enabled.contains(s.source()))
            .collect();

        let results = join_all(active.iter().map(|s| s.fetch(params))).await;

        let mut items = Vec::new();
        let mut failed_sources = Vec::new();
        for (source, result) in active.iter().zip(results) {
            match result {
                Ok(batch) => {
                    tracing::debug!(source = %source.source(), count = batch.len(), "source loaded");
                    items.extend(batch);
                }
                Err(e) => {
                    tracing::warn!(source = %e.origin, error = %e, "source failed");
                    failed_sources.push(source.source());
                }
            }
        }

        sort_newest_first(&mut items);

        tracing::info!(
            page = params.page,
            items = items.len(),
            failed = failed_sources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "aggregation cycle complete"
        );

        let warning = (!failed_sources.is_empty()).then(|| FETCH_WARNING.to_string());
        Some(CycleOutcome {
            items,
            failed_sources,
            warning,
            page: params.page,
        })
    }
}

/// Descending by `ts`; ties broken by source name then id so output is deterministic.
fn newest_first(a: &FeedItem, b: &FeedItem) -> Ordering {
    b.ts.cmp(&a.ts)
        .then_with(|| a.source.as_str().cmp(b.source.as_str()))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_newest_first(items: &mut [FeedItem]) {
    items.sort_by(newest_first);
}

/// True when `items` is in cycle order.
pub fn is_sorted_newest_first(items: &[FeedItem]) -> bool {
    items
        .windows(2)
        .all(|w| newest_first(&w[0], &w[1]) != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::ItemMeta;

    fn item(source: Source, id: &str, ts: i64) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            source,
            author: String::new(),
            title: id.to_string(),
            url: String::new(),
            ts,
            meta: ItemMeta::Github { event_type: "PushEvent".to_string() },
        }
    }

    #[test]
    fn test_sort_is_descending() {
        let mut items = vec![
            item(Source::Hn, "hn_1", 1000),
            item(Source::Hn, "hn_3", 3000),
            item(Source::Reddit, "reddit_2", 2000),
        ];
        sort_newest_first(&mut items);
        let ts: Vec<i64> = items.iter().map(|i| i.ts).collect();
        assert_eq!(ts, vec![3000, 2000, 1000]);
        assert!(is_sorted_newest_first(&items));
    }

    #[test]
    fn test_tie_break_by_source_then_id() {
        let mut items = vec![
            item(Source::Rss, "rss_a", 5),
            item(Source::Github, "gh_b", 5),
            item(Source::Github, "gh_a", 5),
        ];
        sort_newest_first(&mut items);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["gh_a", "gh_b", "rss_a"]);
    }

    #[test]
    fn test_unsorted_detected() {
        let items = vec![item(Source::Hn, "hn_1", 1), item(Source::Hn, "hn_2", 2)];
        assert!(!is_sorted_newest_first(&items));
    }

    #[tokio::test]
    async fn test_no_sources_enabled_is_empty_cycle() {
        let agg = Aggregator::new(Vec::new());
        let outcome = agg
            .run_cycle(EnabledSources::none(), &FetchParams::default())
            .await
            .unwrap();
        assert!(outcome.items.is_empty());
        assert!(outcome.warning.is_none());
        assert!(!agg.is_running());
    }
}
