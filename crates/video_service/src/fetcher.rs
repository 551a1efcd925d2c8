use crate::error::FeedError;
use crate::{channel_id, duration};
use domain::{DURATION_UNAVAILABLE, SearchItem, SearchOrder, SearchQuery, VideoSummary};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use youtube_api::{PlatformError, VideoPlatform};

/// Number of videos requested from the search call
pub const PAGE_SIZE: u32 = 10;

/// Upper bound on detail calls in flight for one request
pub const DETAIL_CONCURRENCY: usize = 5;

/// Default bound on a single upstream call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the most recent uploads of a channel from its URL.
#[derive(Clone)]
pub struct VideoFeedFetcher {
    platform: Arc<dyn VideoPlatform>,
    call_timeout: Duration,
}

impl VideoFeedFetcher {
    pub fn new(platform: Arc<dyn VideoPlatform>) -> Self {
        Self {
            platform,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Bound each search and detail call by `call_timeout`
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Resolves the channel, lists its latest videos and attaches a formatted
    /// duration to each, newest first.
    ///
    /// A failed or timed out detail call only degrades that video's duration
    /// to `"N/A"`. A failed or timed out search call fails the whole feed.
    #[instrument(skip(self))]
    pub async fn fetch(&self, channel_url: &str) -> Result<Vec<VideoSummary>, FeedError> {
        if channel_url.trim().is_empty() {
            return Err(FeedError::BadInput(
                "The channel URL must not be empty.".to_string(),
            ));
        }

        let Some(channel_id) = channel_id::resolve(channel_url)? else {
            tracing::debug!("no channel id found in URL");
            return Err(FeedError::BadInput("The channel URL is invalid.".to_string()));
        };

        let query = SearchQuery {
            channel_id,
            order: SearchOrder::Date,
            max_results: PAGE_SIZE,
        };
        let mut items = bounded("search", self.call_timeout, self.platform.search(&query)).await?;
        items.truncate(PAGE_SIZE as usize);
        tracing::debug!(count = items.len(), channel_id = %query.channel_id, "channel search done");

        let platform = &self.platform;
        let call_timeout = self.call_timeout;
        let mut videos: Vec<VideoSummary> = stream::iter(items)
            .map(|item| summarize(Arc::clone(platform), call_timeout, item))
            .buffered(DETAIL_CONCURRENCY)
            .collect()
            .await;

        videos.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(videos)
    }
}

/// Runs `call`, turning expiry of `timeout` into [`PlatformError::TimedOut`]
async fn bounded<T>(
    endpoint: &'static str,
    timeout: Duration,
    call: impl Future<Output = Result<T, PlatformError>>,
) -> Result<T, PlatformError> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| PlatformError::TimedOut { endpoint, timeout })?
}

async fn summarize(
    platform: Arc<dyn VideoPlatform>,
    call_timeout: Duration,
    item: SearchItem,
) -> VideoSummary {
    let duration = duration_of(platform.as_ref(), call_timeout, &item.video_id).await;
    VideoSummary::from_search_item(item, duration)
}

/// Formatted duration of one video; any failure yields `"N/A"`
async fn duration_of(platform: &dyn VideoPlatform, call_timeout: Duration, video_id: &str) -> String {
    match bounded("videos", call_timeout, platform.video_details(video_id)).await {
        Ok(Some(details)) => duration::format(&details.duration),
        Ok(None) => {
            tracing::warn!(video_id, "no content details returned for video");
            DURATION_UNAVAILABLE.to_string()
        }
        Err(err) => {
            tracing::warn!(
                video_id,
                error = %crate::error::error_chain(&err),
                "failed to fetch video details"
            );
            DURATION_UNAVAILABLE.to_string()
        }
    }
}
