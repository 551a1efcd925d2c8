use crate::channel_id::ResolveError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;
use youtube_api::PlatformError;

/// Body text returned for every 5xx response. Details only go to the log.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error. See the server logs for details.";

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The caller supplied a channel URL we cannot work with
    #[error("{0}")]
    BadInput(String),
    /// The channel URL could not be parsed at all
    #[error("invalid channel URL")]
    MalformedUrl(#[from] ResolveError),
    /// The channel search call failed
    #[error("channel search failed")]
    Upstream(#[from] PlatformError),
    /// A fault that escaped the feed pipeline
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl FeedError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadInput(_) => StatusCode::BAD_REQUEST,
            Self::MalformedUrl(_) | Self::Upstream(_) | Self::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for FeedError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error = match self {
            Self::BadInput(message) => message,
            Self::MalformedUrl(_) | Self::Upstream(_) | Self::Unexpected(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

/// `err` followed by each of its sources, separated by `: `
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            FeedError::BadInput("nope".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            FeedError::Upstream(PlatformError::Unavailable("down".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            FeedError::MalformedUrl(ResolveError::MalformedUrl(url::ParseError::RelativeUrlWithoutBase))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            FeedError::Unexpected("panic".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn chain_includes_sources() {
        let err = FeedError::Upstream(PlatformError::Unavailable("quota exceeded".to_string()));
        assert_eq!(
            error_chain(&err),
            "channel search failed: platform unavailable: quota exceeded"
        );
    }
}
