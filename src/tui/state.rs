use crate::controller::FeedController;
use crate::feed::types::{EnabledSources, FeedItem};
use std::collections::VecDeque;

const MAX_LOGS: usize = 200;

/// Snapshot the engine publishes to the TUI after every change.
#[derive(Debug, Clone)]
pub struct AppState {
    pub enabled: EnabledSources,
    pub rss_url: Option<String>,
    pub query: String,
    pub page: u32,
    pub loading: bool,
    pub warning: Option<String>,
    /// Already filtered by `query`.
    pub items: Vec<FeedItem>,
    pub total_items: usize,
    pub scroll_offset: u32,
    pub logs: VecDeque<LogEntry>,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub message: String,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            enabled: EnabledSources::default(),
            rss_url: None,
            query: String::new(),
            page: 0,
            loading: false,
            warning: None,
            items: Vec::new(),
            total_items: 0,
            scroll_offset: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
        }
    }

    /// Copy the controller's view into this snapshot. Logs are kept.
    pub fn sync(&mut self, ctl: &FeedController) {
        self.enabled = ctl.enabled();
        self.rss_url = ctl.rss_url().map(str::to_string);
        self.query = ctl.query().to_string();
        self.page = ctl.page();
        self.loading = ctl.is_loading();
        self.warning = ctl.warning().map(str::to_string);
        self.items = ctl.visible_items().into_iter().cloned().collect();
        self.total_items = ctl.items().len();
        self.scroll_offset = ctl.scroll_offset();
    }

    pub fn push_log(&mut self, level: &str, message: String) {
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            time,
            level: level.to_string(),
            message,
        });
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::CycleOutcome;
    use crate::feed::types::{ItemMeta, Source};

    #[test]
    fn test_sync_copies_filtered_view() {
        let mut ctl = FeedController::default();
        ctl.begin_cycle();
        ctl.finish_cycle(CycleOutcome {
            items: vec![
                FeedItem {
                    id: "hn_1".to_string(),
                    source: Source::Hn,
                    author: "pg".to_string(),
                    title: "Rust 2.0 released".to_string(),
                    url: "https://example.com/1".to_string(),
                    ts: 2,
                    meta: ItemMeta::Hn { points: 1, comments: 0 },
                },
                FeedItem {
                    id: "hn_2".to_string(),
                    source: Source::Hn,
                    author: "rob".to_string(),
                    title: "Go concurrency".to_string(),
                    url: "https://example.com/2".to_string(),
                    ts: 1,
                    meta: ItemMeta::Hn { points: 1, comments: 0 },
                },
            ],
            failed_sources: vec![Source::Reddit],
            warning: Some("warn".to_string()),
            page: 0,
        });
        ctl.set_query("rust");

        let mut state = AppState::new();
        state.sync(&ctl);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.total_items, 2);
        assert_eq!(state.warning.as_deref(), Some("warn"));
        assert!(!state.loading);
    }

    #[test]
    fn test_push_log_is_bounded() {
        let mut state = AppState::new();
        for i in 0..(MAX_LOGS + 5) {
            state.push_log("INFO", format!("line {}", i));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert_eq!(state.logs.front().map(|l| l.message.as_str()), Some("line 5"));
    }
}
