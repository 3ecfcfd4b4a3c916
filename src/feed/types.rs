use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

// Normalized internal types shared by every source (provider-agnostic).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Hn,
    Reddit,
    Github,
    Rss,
}

impl Source {
    pub const ALL: [Source; 4] = [Source::Hn, Source::Reddit, Source::Github, Source::Rss];

    /// Lowercase identifier used in config files and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Hn => "hn",
            Source::Reddit => "reddit",
            Source::Github => "github",
            Source::Rss => "rss",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Source::Hn => "HN",
            Source::Reddit => "REDDIT",
            Source::Github => "GITHUB",
            Source::Rss => "RSS",
        }
    }

    /// Prefix that namespaces item ids so they never collide across sources.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Source::Hn => "hn_",
            Source::Reddit => "reddit_",
            Source::Github => "gh_",
            Source::Rss => "rss_",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Source::Hn => 1,
            Source::Reddit => 1 << 1,
            Source::Github => 1 << 2,
            Source::Rss => 1 << 3,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hn" => Ok(Source::Hn),
            "reddit" => Ok(Source::Reddit),
            "github" => Ok(Source::Github),
            "rss" => Ok(Source::Rss),
            other => anyhow::bail!("unknown source: {}", other),
        }
    }
}

/// Set of enabled sources. A toggle returns a new set instead of mutating in
/// place, so a cycle that captured the old value never sees it change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledSources(u8);

impl EnabledSources {
    pub fn none() -> Self {
        Self(0)
    }

    pub fn from_sources<I: IntoIterator<Item = Source>>(sources: I) -> Self {
        Self(sources.into_iter().fold(0, |acc, s| acc | s.bit()))
    }

    pub fn contains(self, source: Source) -> bool {
        self.0 & source.bit() != 0
    }

    #[must_use]
    pub fn toggled(self, source: Source) -> Self {
        Self(self.0 ^ source.bit())
    }

    pub fn iter(self) -> impl Iterator<Item = Source> {
        Source::ALL.into_iter().filter(move |s| self.contains(*s))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for EnabledSources {
    fn default() -> Self {
        Self::from_sources([Source::Hn, Source::Reddit, Source::Github])
    }
}

/// Display-only fields that differ per source. Never used for ordering or filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemMeta {
    Hn { points: u64, comments: u64 },
    Reddit { subreddit: String, score: i64, comments: u64 },
    Github { event_type: String },
    Rss { feed: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub id: String,
    pub source: Source,
    pub author: String,
    pub title: String,
    pub url: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
    pub meta: ItemMeta,
}

/// hn.algolia.com search_by_date response.
#[derive(Debug, Deserialize)]
pub struct HnSearchResponse {
    #[serde(default)]
    pub hits: Vec<HnHit>,
}

#[derive(Debug, Deserialize)]
pub struct HnHit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub story_title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub story_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_at_i: Option<i64>,
    #[serde(default)]
    pub points: Option<u64>,
    #[serde(default)]
    pub num_comments: Option<u64>,
}

/// reddit.com listing: `{ data: { children: [{ data: {...} }] } }`
#[derive(Debug, Deserialize)]
pub struct RedditListing {
    pub data: RedditListingData,
}

#[derive(Debug, Deserialize)]
pub struct RedditListingData {
    #[serde(default)]
    pub children: Vec<RedditChild>,
}

#[derive(Debug, Deserialize)]
pub struct RedditChild {
    pub data: RedditPost,
}

#[derive(Debug, Deserialize)]
pub struct RedditPost {
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url_overridden_by_dest: Option<String>,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
}

/// api.github.com/events: top-level array of events.
#[derive(Debug, Deserialize)]
pub struct GithubEvent {
    pub id: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub actor: Option<GithubActor>,
    #[serde(default)]
    pub repo: Option<GithubRepo>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GithubActor {
    #[serde(default)]
    pub login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GithubRepo {
    #[serde(default)]
    pub name: Option<String>,
}

/// api.rss2json.com conversion response.
#[derive(Debug, Deserialize)]
pub struct Rss2JsonResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub feed: Option<Rss2JsonFeed>,
    #[serde(default)]
    pub items: Option<Vec<Rss2JsonItem>>,
}

#[derive(Debug, Deserialize)]
pub struct Rss2JsonFeed {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Rss2JsonItem {
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, rename = "pubDate")]
    pub pub_date: Option<String>,
}

/// Treat `Some("")` like `None`, matching how the upstream APIs leave fields blank.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
