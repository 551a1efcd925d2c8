pub mod channel_id;
pub mod duration;
pub mod error;
pub mod fetcher;

pub use error::{ErrorBody, FeedError};
pub use fetcher::VideoFeedFetcher;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use domain::VideoSummary;
use futures::FutureExt;
use serde::Deserialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};
use youtube_api::VideoPlatform;

pub const CHANNEL_VIDEOS_PATH: &str = "/api/youtube/GetChannelVideos";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChannelVideosParams {
    /// Channel URL in the `/c/<id>`, `/channel/<id>` or `?channel_id=<id>` form
    #[serde(default, rename = "channelUrl")]
    pub channel_url: Option<String>,
}

/// OpenAPI description of the channel videos API
#[derive(OpenApi)]
#[openapi(
    info(title = "Channel Videos API", version = "v1"),
    paths(get_channel_videos),
    components(schemas(VideoSummary, ErrorBody))
)]
pub struct ApiDoc;

/// Latest uploads of a channel, newest first
#[utoipa::path(
    get,
    path = "/api/youtube/GetChannelVideos",
    params(ChannelVideosParams),
    responses(
        (status = 200, description = "Up to 10 videos, newest first", body = [VideoSummary]),
        (status = 400, description = "Missing, blank or unresolvable channel URL", body = ErrorBody),
        (status = 500, description = "Upstream or unexpected failure", body = ErrorBody)
    )
)]
async fn get_channel_videos(
    State(fetcher): State<VideoFeedFetcher>,
    Query(params): Query<ChannelVideosParams>,
) -> Result<Json<Vec<VideoSummary>>, FeedError> {
    let channel_url = params.channel_url.unwrap_or_default();

    let result = match AssertUnwindSafe(fetcher.fetch(&channel_url))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(panic) => Err(FeedError::Unexpected(panic_message(panic.as_ref()))),
    };

    match result {
        Ok(videos) => {
            tracing::info!(channel_url = %channel_url, count = videos.len(), "served channel videos");
            Ok(Json(videos))
        }
        Err(err @ FeedError::BadInput(_)) => {
            tracing::info!(channel_url = %channel_url, error = %err, "rejected channel videos request");
            Err(err)
        }
        Err(err) => {
            tracing::error!(
                channel_url = %channel_url,
                error = %error::error_chain(&err),
                "failed to get channel videos"
            );
            Err(err)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Create the router for the channel videos API
pub fn create_router(platform: Arc<dyn VideoPlatform>) -> Router {
    create_router_with_fetcher(VideoFeedFetcher::new(platform))
}

/// Same as [`create_router`], with a preconfigured fetcher
pub fn create_router_with_fetcher(fetcher: VideoFeedFetcher) -> Router {
    Router::new()
        .route(CHANNEL_VIDEOS_PATH, get(get_channel_videos))
        .with_state(fetcher)
}
