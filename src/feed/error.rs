use super::types::Source;
use thiserror::Error;

/// A single source failed this cycle. Siblings are unaffected.
#[derive(Debug, Error)]
#[error("{origin} fetch failed: {kind}")]
pub struct SourceFetchError {
    pub origin: Source,
    #[source]
    pub kind: FetchFailure,
}

#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("upstream error: {0}")]
    Upstream(String),
}

impl SourceFetchError {
    pub fn new(origin: Source, kind: impl Into<FetchFailure>) -> Self {
        Self {
            origin,
            kind: kind.into(),
        }
    }

    pub fn status(origin: Source, status: reqwest::StatusCode) -> Self {
        Self::new(origin, FetchFailure::Status(status))
    }
}
