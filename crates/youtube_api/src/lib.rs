//! Access to the video platform backing the channel videos endpoint.
//!
//! [`VideoPlatform`] is the seam the rest of the workspace talks to. The
//! production implementation is [`YouTubeDataApi`]. The `test-util` feature
//! adds `StaticPlatform`, which serves canned data for tests.

mod client;
#[cfg(any(test, feature = "test-util"))]
mod static_platform;

pub use client::{DEFAULT_BASE_URL, YouTubeDataApi};
#[cfg(any(test, feature = "test-util"))]
pub use static_platform::{DetailOutcome, StaticPlatform};

use async_trait::async_trait;
use domain::{SearchItem, SearchQuery, VideoDetails};

/// Upstream operations needed to build a channel's video feed
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Lists the channel's videos matching `query`, in the order the platform returns them
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchItem>, PlatformError>;

    /// Fetches content details for one video. `Ok(None)` means the platform
    /// answered but returned no item for the id.
    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>, PlatformError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("request to {endpoint} failed")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("could not decode {endpoint} response")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} did not answer within {timeout:?}")]
    TimedOut {
        endpoint: &'static str,
        timeout: std::time::Duration,
    },
    #[error("platform unavailable: {0}")]
    Unavailable(String),
}
