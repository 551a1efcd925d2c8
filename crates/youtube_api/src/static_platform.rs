use crate::{PlatformError, VideoPlatform};
use async_trait::async_trait;
use domain::{SearchItem, SearchQuery, VideoDetails};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// What a detail call for a given video should produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    /// The platform reports this raw ISO 8601 duration
    Duration(String),
    /// The platform answers with an empty item list
    Empty,
    /// The call fails with [`PlatformError::Unavailable`]
    Failure(String),
}

#[derive(Debug, Clone)]
struct DetailEntry {
    outcome: DetailOutcome,
    delay: Duration,
}

/// In-memory [`VideoPlatform`] serving canned data for tests.
///
/// Search results come back in insertion order, capped at the query's
/// `max_results`, so callers can check that they apply their own ordering.
#[derive(Debug, Clone, Default)]
pub struct StaticPlatform {
    items: Arc<RwLock<Vec<SearchItem>>>,
    details: Arc<RwLock<HashMap<String, DetailEntry>>>,
    search_failure: Arc<RwLock<Option<String>>>,
    search_delay: Arc<RwLock<Duration>>,
    searches: Arc<RwLock<Vec<SearchQuery>>>,
}

impl StaticPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a search result
    pub fn add_item(&self, item: SearchItem) {
        self.items
            .write()
            .expect("Failed to acquire write lock on items")
            .push(item);
    }

    /// Set the detail outcome for a video, keeping any configured delay
    pub fn set_detail(&self, video_id: impl Into<String>, outcome: DetailOutcome) {
        self.details
            .write()
            .expect("Failed to acquire write lock on details")
            .entry(video_id.into())
            .and_modify(|entry| entry.outcome = outcome.clone())
            .or_insert(DetailEntry {
                outcome,
                delay: Duration::ZERO,
            });
    }

    /// Delay the detail call for a video before it answers
    pub fn set_detail_delay(&self, video_id: impl Into<String>, delay: Duration) {
        self.details
            .write()
            .expect("Failed to acquire write lock on details")
            .entry(video_id.into())
            .and_modify(|entry| entry.delay = delay)
            .or_insert(DetailEntry {
                outcome: DetailOutcome::Empty,
                delay,
            });
    }

    /// Make every subsequent search call fail with `message`
    pub fn fail_search(&self, message: impl Into<String>) {
        *self
            .search_failure
            .write()
            .expect("Failed to acquire write lock on search_failure") = Some(message.into());
    }

    /// Delay every subsequent search call before it answers
    pub fn set_search_delay(&self, delay: Duration) {
        *self
            .search_delay
            .write()
            .expect("Failed to acquire write lock on search_delay") = delay;
    }

    /// Queries received by [`VideoPlatform::search`] so far
    pub fn recorded_searches(&self) -> Vec<SearchQuery> {
        self.searches
            .read()
            .expect("Failed to acquire read lock on searches")
            .clone()
    }
}

#[async_trait]
impl VideoPlatform for StaticPlatform {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchItem>, PlatformError> {
        self.searches
            .write()
            .expect("Failed to acquire write lock on searches")
            .push(query.clone());

        let delay = *self
            .search_delay
            .read()
            .expect("Failed to acquire read lock on search_delay");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self
            .search_failure
            .read()
            .expect("Failed to acquire read lock on search_failure")
            .clone()
        {
            return Err(PlatformError::Unavailable(message));
        }

        let limit = usize::try_from(query.max_results).unwrap_or(usize::MAX);
        Ok(self
            .items
            .read()
            .expect("Failed to acquire read lock on items")
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>, PlatformError> {
        let entry = self
            .details
            .read()
            .expect("Failed to acquire read lock on details")
            .get(video_id)
            .cloned();

        let Some(entry) = entry else {
            return Ok(None);
        };

        if !entry.delay.is_zero() {
            tokio::time::sleep(entry.delay).await;
        }

        match entry.outcome {
            DetailOutcome::Duration(duration) => Ok(Some(VideoDetails { duration })),
            DetailOutcome::Empty => Ok(None),
            DetailOutcome::Failure(message) => Err(PlatformError::Unavailable(message)),
        }
    }
}
