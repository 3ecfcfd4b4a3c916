use crate::aggregator::{CycleOutcome, FETCH_WARNING};
use crate::feed::rss::parse_feed_url;
use crate::feed::types::{EnabledSources, FeedItem, Source};
use crate::feed::FetchParams;
use crate::filter::filter_items;
use crate::pager::{Pager, ScrollPosition};
use anyhow::Result;

/// Terminal rows one feed card occupies, including its separator.
pub const CARD_ROWS: u32 = 5;

/// Everything needed to run one aggregation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRequest {
    pub enabled: EnabledSources,
    pub params: FetchParams,
}

/// Owns the session state around the aggregator: source selection, feed URL,
/// search query, page cursor, the current list, and the loading flag.
///
/// Every operation that wants a fetch returns `Some(CycleRequest)`; while a
/// cycle is in flight those triggers are dropped and `None` comes back.
#[derive(Debug, Clone)]
pub struct FeedController {
    enabled: EnabledSources,
    rss_url: Option<String>,
    query: String,
    pager: Pager,
    items: Vec<FeedItem>,
    loading: bool,
    warning: Option<String>,
    scroll_offset: u32,
}

impl FeedController {
    pub fn new(enabled: EnabledSources, rss_url: Option<String>, near_bottom_threshold: u32) -> Self {
        Self {
            enabled,
            rss_url,
            query: String::new(),
            pager: Pager::new(near_bottom_threshold),
            items: Vec::new(),
            loading: false,
            warning: None,
            scroll_offset: 0,
        }
    }

    pub fn enabled(&self) -> EnabledSources {
        self.enabled
    }

    pub fn rss_url(&self) -> Option<&str> {
        self.rss_url.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.pager.page()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    /// Scroll offset in terminal rows.
    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    /// Mark a cycle as dispatched. `None` if one is already in flight.
    pub fn begin_cycle(&mut self) -> Option<CycleRequest> {
        if self.loading {
            tracing::debug!("cycle already in flight; trigger dropped");
            return None;
        }
        self.loading = true;
        Some(CycleRequest {
            enabled: self.enabled,
            params: FetchParams {
                page: self.pager.page(),
                rss_url: self.rss_url.clone(),
            },
        })
    }

    /// Replace the list with a finished cycle's items.
    pub fn finish_cycle(&mut self, outcome: CycleOutcome) {
        self.loading = false;
        self.items = outcome.items;
        self.warning = outcome.warning;
        self.scroll_offset = 0;
    }

    /// The cycle died before producing an outcome. The previous list stays.
    pub fn abort_cycle(&mut self) {
        self.loading = false;
        self.warning = Some(FETCH_WARNING.to_string());
    }

    /// The aggregator declined to run. Nothing changes except the loading flag.
    pub fn skip_cycle(&mut self) {
        self.loading = false;
    }

    pub fn toggle_source(&mut self, source: Source) -> Option<CycleRequest> {
        self.enabled = self.enabled.toggled(source);
        tracing::info!(%source, on = self.enabled.contains(source), "source toggled");
        self.begin_cycle()
    }

    /// Set or clear the feed URL. Blank clears it. An invalid URL is rejected
    /// and leaves the current value alone.
    pub fn set_rss_url(&mut self, text: &str) -> Result<Option<CycleRequest>> {
        let trimmed = text.trim();
        let next = if trimmed.is_empty() {
            None
        } else {
            parse_feed_url(trimmed)?;
            Some(trimmed.to_string())
        };

        if next == self.rss_url {
            return Ok(None);
        }
        tracing::info!(rss_url = next.as_deref().unwrap_or(""), "feed URL changed");
        self.rss_url = next;
        Ok(self.begin_cycle())
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
        self.scroll_offset = 0;
    }

    /// Move the list by `delta` rows. Near the bottom (and not loading) this
    /// advances the page cursor and asks for the next cycle.
    /// A scroll that leaves the offset where it was never pages.
    pub fn scroll(&mut self, delta: i32, viewport_rows: u32) -> Option<CycleRequest> {
        let before = self.scroll_offset;
        self.scroll_offset = if delta >= 0 {
            before.saturating_add(delta.unsigned_abs())
        } else {
            before.saturating_sub(delta.unsigned_abs())
        };
        self.clamp_offset(viewport_rows);

        if self.items.is_empty() || self.scroll_offset == before {
            return None;
        }

        let pos = ScrollPosition::from_rows(viewport_rows, self.scroll_offset, self.content_rows());
        if self.pager.on_scroll(pos, self.loading) {
            tracing::info!(page = self.pager.page(), "near bottom; loading next page");
            self.begin_cycle()
        } else {
            None
        }
    }

    /// Reset the page cursor and reload. Ignored entirely while loading.
    pub fn refresh(&mut self) -> Option<CycleRequest> {
        if self.loading {
            tracing::debug!("refresh ignored; cycle in flight");
            return None;
        }
        self.pager.reset();
        self.begin_cycle()
    }

    pub fn visible_items(&self) -> Vec<&FeedItem> {
        filter_items(&self.items, &self.query)
    }

    fn content_rows(&self) -> u32 {
        let count = u32::try_from(self.visible_items().len()).unwrap_or(u32::MAX);
        count.saturating_mul(CARD_ROWS)
    }

    fn clamp_offset(&mut self, viewport_rows: u32) {
        let max = self.content_rows().saturating_sub(viewport_rows);
        self.scroll_offset = self.scroll_offset.min(max);
    }
}

impl Default for FeedController {
    fn default() -> Self {
        Self::new(EnabledSources::default(), None, crate::pager::NEAR_BOTTOM_THRESHOLD)
    }
}
