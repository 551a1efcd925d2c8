//! Channel identifier extraction from user supplied channel URLs.
//!
//! Three shapes are recognised, checked in this order:
//!
//! 1. `https://www.youtube.com/c/<id>/...`
//! 2. `https://www.youtube.com/channel/<id>/...`
//! 3. `https://...?channel_id=<id>` (key matched case-insensitively)
//!
//! Only the first shape whose marker appears in the URL is tried. A URL such
//! as `https://www.youtube.com/c/?channel_id=UC1` has an empty segment after
//! `c` and therefore resolves to nothing, even though the query would match.

use domain::ChannelId;
use url::Url;

const CUSTOM_URL_MARKER: &str = "c";
const CHANNEL_MARKER: &str = "channel";
const CHANNEL_ID_PARAM: &str = "channel_id";

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("channel URL could not be parsed")]
    MalformedUrl(#[from] url::ParseError),
}

/// Extracts the channel identifier from `channel_url`.
///
/// Returns `Ok(None)` when the URL has no recognisable identifier, and an
/// error only when the query string fallback is reached and the input is not
/// an absolute URL.
pub fn resolve(channel_url: &str) -> Result<Option<ChannelId>, ResolveError> {
    if channel_url.contains("/c/") {
        return Ok(segment_after(channel_url, CUSTOM_URL_MARKER));
    }

    if channel_url.contains("/channel/") {
        return Ok(segment_after(channel_url, CHANNEL_MARKER));
    }

    let url = Url::parse(channel_url)?;
    Ok(url
        .query_pairs()
        .find(|(key, _)| key.eq_ignore_ascii_case(CHANNEL_ID_PARAM))
        .and_then(|(_, value)| ChannelId::new(value.into_owned())))
}

/// The `/`-separated segment following the first segment equal to `marker`,
/// cut at any query or fragment.
fn segment_after(channel_url: &str, marker: &str) -> Option<ChannelId> {
    let mut segments = channel_url.split('/');
    segments.find(|segment| *segment == marker)?;
    let segment = segments.next()?;
    let path_part = segment.split(['?', '#']).next().unwrap_or_default();
    ChannelId::new(path_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDS: &[&str] = &["UC_x5XG1OV2P6uZZ5FSM9Ttw", "GoogleDevelopers", "abc-123"];

    fn resolved(url: &str) -> Option<String> {
        resolve(url).unwrap().map(ChannelId::into_inner)
    }

    #[test]
    fn custom_url_segment() {
        for id in IDS {
            for url in [
                format!("https://www.youtube.com/c/{id}"),
                format!("https://www.youtube.com/c/{id}/videos"),
                format!("http://youtube.com/c/{id}/featured?view=0"),
            ] {
                assert_eq!(resolved(&url).as_deref(), Some(*id), "{url}");
            }
        }
    }

    #[test]
    fn channel_segment() {
        for id in IDS {
            for url in [
                format!("https://www.youtube.com/channel/{id}"),
                format!("https://www.youtube.com/channel/{id}/videos"),
                format!("https://m.youtube.com/channel/{id}?sub_confirmation=1"),
            ] {
                assert_eq!(resolved(&url).as_deref(), Some(*id), "{url}");
            }
        }
    }

    #[test]
    fn query_parameter_is_case_insensitive() {
        for id in IDS {
            for key in ["channel_id", "CHANNEL_ID", "Channel_Id"] {
                let url = format!("https://www.youtube.com/feeds/videos.xml?{key}={id}&other=1");
                assert_eq!(resolved(&url).as_deref(), Some(*id), "{url}");
            }
        }
    }

    #[test]
    fn query_parameter_after_other_parameters() {
        assert_eq!(
            resolved("https://example.com/watch?a=1&channel_id=UC42").as_deref(),
            Some("UC42")
        );
    }

    #[test]
    fn custom_marker_with_nothing_after_does_not_fall_back() {
        assert_eq!(resolved("https://www.youtube.com/c/"), None);
        assert_eq!(resolved("https://www.youtube.com/c/?channel_id=UC42"), None);
    }

    #[test]
    fn channel_marker_with_nothing_after_does_not_fall_back() {
        assert_eq!(resolved("https://www.youtube.com/channel/"), None);
        assert_eq!(
            resolved("https://www.youtube.com/channel/#top?channel_id=UC42"),
            None
        );
    }

    #[test]
    fn custom_marker_wins_over_channel_marker() {
        assert_eq!(
            resolved("https://www.youtube.com/c/Custom/channel/UC42").as_deref(),
            Some("Custom")
        );
    }

    #[test]
    fn no_identifier_is_absent() {
        assert_eq!(resolved("https://www.youtube.com/@GoogleDevelopers"), None);
        assert_eq!(resolved("https://www.youtube.com/results?q=rust"), None);
        assert_eq!(resolved("https://www.youtube.com/?channel_id="), None);
    }

    #[test]
    fn not_a_url_is_an_error() {
        assert!(matches!(
            resolve("youtube channel please"),
            Err(ResolveError::MalformedUrl(_))
        ));
    }
}
