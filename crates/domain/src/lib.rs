use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Value used for `VideoSummary::duration` when no duration could be determined
pub const DURATION_UNAVAILABLE: &str = "N/A";

/// Base of the canonical watch URL for a video
pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Opaque channel identifier extracted from a channel URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    /// Wraps `id`, returning `None` when it is empty or only whitespace
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordering requested from the platform's search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    /// Newest uploads first
    Date,
}

impl SearchOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchOrder::Date => "date",
        }
    }
}

/// Parameters of a single search call against the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub channel_id: ChannelId,
    pub order: SearchOrder,
    pub max_results: u32,
}

/// Lightweight video metadata returned by a search call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    pub video_id: String,
    pub title: String,
    /// Medium resolution thumbnail
    pub thumbnail_url: String,
    pub published_at: DateTime<FixedOffset>,
}

/// Extended per-video metadata returned by a detail call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    /// Raw ISO 8601 duration, e.g. `PT4M13S`
    pub duration: String,
}

/// One entry of the channel videos response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub title: String,
    /// Canonical watch URL
    pub link: String,
    pub thumbnail_url: String,
    #[schema(value_type = String, format = DateTime)]
    pub published_at: DateTime<FixedOffset>,
    /// `HH:MM:SS`, or [`DURATION_UNAVAILABLE`]
    pub duration: String,
}

impl VideoSummary {
    /// Builds the summary for a search result with an already formatted duration
    pub fn from_search_item(item: SearchItem, duration: String) -> Self {
        Self {
            link: watch_url(&item.video_id),
            title: item.title,
            thumbnail_url: item.thumbnail_url,
            published_at: item.published_at,
            duration,
        }
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{video_id}")
}
