use serde::Serialize;
use thiserror::Error;

/// Canonical, provider-agnostic description of a resolved video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedMedia {
    pub title: String,
    pub thumbnail: String,
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub author: Author,
    pub stats: Stats,
    pub alternative_urls: Vec<AlternativeUrl>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Stats {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

/// Every usable URL found during the flat field scan, tagged with the field
/// it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeUrl {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub has_ssl: bool,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ExtractionFailed(String),
    #[error("every extraction provider is unreachable or returned nothing")]
    AllProvidersOffline,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
