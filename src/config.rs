use crate::feed::rss::parse_feed_url;
use crate::feed::types::{EnabledSources, Source};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Every section is optional; a missing file section falls back to defaults.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    #[serde(default = "default_enabled")]
    pub enabled: Vec<String>,
    #[serde(default)]
    pub rss_url: Option<String>,
}

fn default_enabled() -> Vec<String> {
    EnabledSources::default()
        .iter()
        .map(|s| s.as_str().to_string())
        .collect()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            rss_url: None,
        }
    }
}

impl SourcesConfig {
    /// Resolve the configured names into a source set. Unknown names are an error.
    pub fn enabled_sources(&self) -> Result<EnabledSources> {
        let sources = self
            .enabled
            .iter()
            .map(|name| name.parse::<Source>())
            .collect::<Result<Vec<_>>>()
            .context("invalid [sources].enabled entry")?;
        Ok(EnabledSources::from_sources(sources))
    }

    /// The configured feed URL, treating a blank string as unset.
    pub fn rss_url(&self) -> Option<&str> {
        self.rss_url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_ms: u64,
}

fn default_user_agent() -> String {
    format!("vibefeed/{} (terminal feed reader)", env!("CARGO_PKG_VERSION"))
}
fn default_timeout() -> u64 { 10_000 }

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_ms: default_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EndpointsConfig {
    #[serde(default = "default_hn_base")]
    pub hn_base_url: String,
    #[serde(default = "default_reddit_base")]
    pub reddit_base_url: String,
    #[serde(default = "default_github_base")]
    pub github_base_url: String,
    #[serde(default = "default_rss2json_base")]
    pub rss2json_base_url: String,
}

fn default_hn_base() -> String { "https://hn.algolia.com".to_string() }
fn default_reddit_base() -> String { "https://www.reddit.com".to_string() }
fn default_github_base() -> String { "https://api.github.com".to_string() }
fn default_rss2json_base() -> String { "https://api.rss2json.com".to_string() }

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            hn_base_url: default_hn_base(),
            reddit_base_url: default_reddit_base(),
            github_base_url: default_github_base(),
            rss2json_base_url: default_rss2json_base(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    /// Distance from the bottom (in scroll units) that advances the page cursor.
    #[serde(default = "default_near_bottom")]
    pub near_bottom_threshold: u32,
}

fn default_near_bottom() -> u32 { crate::pager::NEAR_BOTTOM_THRESHOLD }

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            near_bottom_threshold: default_near_bottom(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: String,
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_file() -> String { "vibefeed.log".to_string() }
fn default_log_filter() -> String { "vibefeed=info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Load `path` if it exists, otherwise run with built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.sources.enabled_sources()?;
        if let Some(url) = self.sources.rss_url() {
            parse_feed_url(url).context("invalid [sources].rss_url")?;
        }
        if self.http.request_timeout_ms == 0 {
            anyhow::bail!("[http].request_timeout_ms must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        let enabled = config.sources.enabled_sources().unwrap();
        assert!(enabled.contains(Source::Hn));
        assert!(!enabled.contains(Source::Rss));
        assert_eq!(config.pagination.near_bottom_threshold, 200);
        assert_eq!(config.endpoints.hn_base_url, "https://hn.algolia.com");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.sources.enabled_sources().unwrap(), EnabledSources::default());
        assert_eq!(config.sources.rss_url(), None);
        assert_eq!(config.http.request_timeout_ms, 10_000);
        assert_eq!(config.logging.file, "vibefeed.log");
    }

    #[test]
    fn test_blank_rss_url_is_unset() {
        let config = Config::parse("[sources]\nrss_url = \"   \"\n").unwrap();
        assert_eq!(config.sources.rss_url(), None);
    }

    #[test]
    fn test_unknown_source_rejected() {
        let err = Config::parse("[sources]\nenabled = [\"hn\", \"mastodon\"]\n").unwrap_err();
        assert!(format!("{:#}", err).contains("mastodon"));
    }

    #[test]
    fn test_invalid_rss_url_rejected() {
        assert!(Config::parse("[sources]\nrss_url = \"not a url\"\n").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Config::parse("[http]\nrequest_timeout_ms = 0\n").is_err());
    }
}
