use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::{Error, Result};

/// Extract the video identifier from a link.
///
/// Two URL shapes are recognized: the short host (`youtu.be/<id>`), where
/// the id is the final path segment, and the long host
/// (`youtube.com/watch?v=<id>`), where the id is the `v` query parameter.
/// Anything else is rejected before any network call is made.
pub fn extract_video_id(link: &str) -> Result<String> {
    let parsed = Url::parse(link).map_err(|_| Error::InvalidLinkFormat(link.to_string()))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| Error::InvalidLinkFormat(link.to_string()))?;

    let video_id = if host == "youtu.be" || host == "www.youtu.be" {
        parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string())
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty())
    } else {
        None
    };

    video_id.ok_or_else(|| Error::InvalidLinkFormat(link.to_string()))
}

/// Resolves a video link to its display title
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResolveTitle: Send + Sync {
    async fn resolve_title(&self, link: &str) -> Result<String>;
}

/// oEmbed response; only the title is consumed
#[derive(Debug, Deserialize)]
struct OembedResponse {
    title: String,
}

/// Title resolver backed by the keyless oEmbed endpoint
pub struct OembedTitleResolver {
    http: reqwest::Client,
    oembed_url: String,
}

impl OembedTitleResolver {
    pub fn new(http: reqwest::Client, oembed_url: String) -> Self {
        Self { http, oembed_url }
    }
}

#[async_trait]
impl ResolveTitle for OembedTitleResolver {
    async fn resolve_title(&self, link: &str) -> Result<String> {
        let video_id = extract_video_id(link)?;

        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        let request_url = format!(
            "{}?url={}&format=json",
            self.oembed_url,
            urlencoding::encode(&watch_url)
        );

        tracing::debug!(%video_id, "fetching video title");

        let response = self
            .http
            .get(&request_url)
            .send()
            .await
            .map_err(|e| Error::MetadataFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::MetadataFetch(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: OembedResponse = response
            .json()
            .await
            .map_err(|e| Error::MetadataFetch(format!("malformed oEmbed response: {}", e)))?;

        Ok(body.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_host_uses_final_path_segment() {
        assert_eq!(
            extract_video_id("https://youtu.be/abc123").unwrap(),
            "abc123"
        );
    }

    #[test]
    fn short_host_strips_query_string() {
        assert_eq!(
            extract_video_id("https://youtu.be/abc123?t=42").unwrap(),
            "abc123"
        );
    }

    #[test]
    fn long_host_uses_v_parameter() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://m.youtube.com/watch?app=m&v=xyz789").unwrap(),
            "xyz789"
        );
    }

    #[test]
    fn unrecognized_hosts_are_rejected() {
        assert!(matches!(
            extract_video_id("https://vimeo.com/12345"),
            Err(Error::InvalidLinkFormat(_))
        ));
        assert!(matches!(
            extract_video_id("not a url"),
            Err(Error::InvalidLinkFormat(_))
        ));
    }

    #[test]
    fn long_host_without_v_parameter_is_rejected() {
        assert!(matches!(
            extract_video_id("https://www.youtube.com/feed/subscriptions"),
            Err(Error::InvalidLinkFormat(_))
        ));
    }

    #[test]
    fn oembed_response_requires_title() {
        let ok: std::result::Result<OembedResponse, _> =
            serde_json::from_str(r#"{"title": "Demo Video", "author_name": "someone"}"#);
        assert_eq!(ok.unwrap().title, "Demo Video");

        let missing: std::result::Result<OembedResponse, _> =
            serde_json::from_str(r#"{"author_name": "someone"}"#);
        assert!(missing.is_err());
    }
}
