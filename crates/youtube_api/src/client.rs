//! YouTube Data API v3 implementation of [`VideoPlatform`].

use crate::{PlatformError, VideoPlatform};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use domain::{SearchItem, SearchQuery, VideoDetails};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// API-key authenticated client for the public YouTube Data API.
///
/// The [`reqwest::Client`] is shared so connections are reused across
/// requests; any timeout configured on it bounds every call made here.
#[derive(Clone)]
pub struct YouTubeDataApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for YouTubeDataApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeDataApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl YouTubeDataApi {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Points the client at another deployment of the API, e.g. a mock server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues a GET against `endpoint` and decodes the JSON body.
    ///
    /// The API key is appended here so it never shows up in spans; URLs are
    /// stripped from transport errors for the same reason.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        params: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| PlatformError::Request {
                endpoint,
                source: source.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(PlatformError::Status {
                endpoint,
                status,
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| PlatformError::Decode {
                endpoint,
                source: source.without_url(),
            })
    }
}

#[async_trait]
impl VideoPlatform for YouTubeDataApi {
    #[instrument(skip(self), fields(channel_id = %query.channel_id))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchItem>, PlatformError> {
        let max_results = query.max_results.to_string();
        let response: SearchListResponse = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "video"),
                    ("channelId", query.channel_id.as_str()),
                    ("order", query.order.as_str()),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;

        tracing::debug!(count = response.items.len(), "search returned items");

        Ok(response
            .items
            .into_iter()
            .filter_map(|result| {
                let Some(video_id) = result.id.video_id else {
                    tracing::warn!(kind = ?result.id.kind, "skipping search result without a video id");
                    return None;
                };
                Some(SearchItem {
                    video_id,
                    thumbnail_url: result.snippet.thumbnails.preferred_url(),
                    title: result.snippet.title,
                    published_at: result.snippet.published_at,
                })
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>, PlatformError> {
        let response: VideoListResponse = self
            .get_json("videos", &[("part", "contentDetails"), ("id", video_id)])
            .await?;

        Ok(response
            .items
            .into_iter()
            .next()
            .and_then(|video| video.content_details)
            .map(|details| VideoDetails {
                duration: details.duration,
            }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: ResourceId,
    snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    published_at: DateTime<FixedOffset>,
    title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    high: Option<Thumbnail>,
}

impl Thumbnails {
    /// Medium resolution when available, otherwise the closest size
    fn preferred_url(self) -> String {
        self.medium
            .or(self.high)
            .or(self.default)
            .map(|thumbnail| thumbnail.url)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<Video>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Video {
    #[serde(default)]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}
