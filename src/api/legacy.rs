// src/api/legacy.rs
//! The legacy v1 read endpoint.
//!
//! `https://{blog}.tumblr.com/api/read/json?id={id}` answers with a script,
//! `var tumblr_api_read = {...};`, rather than plain JSON. It is the only
//! endpoint reporting where a reblog was reblogged from, so the enricher
//! depends on it despite the odd wrapping.

use crate::constants::{LEGACY_PAYLOAD_FOOTER, LEGACY_PAYLOAD_HEADER};
use crate::error::AppError;
use crate::types::PostId;
use serde::Deserialize;

/// The fields of a legacy post the archive uses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegacyPost {
    pub id: PostId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "reblogged-from-url")]
    pub reblogged_from_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyPayload {
    #[serde(default)]
    posts: Vec<LegacyPost>,
}

/// The legacy endpoint URL for one post.
pub fn legacy_post_url(blog: &str, id: &PostId) -> String {
    format!("https://{}.tumblr.com/api/read/json?id={}", blog, id)
}

/// Unwraps the script payload and returns its first post.
pub fn parse_legacy_payload(body: &str) -> Result<Option<LegacyPost>, AppError> {
    let json = body
        .trim()
        .strip_prefix(LEGACY_PAYLOAD_HEADER)
        .and_then(|rest| rest.strip_suffix(LEGACY_PAYLOAD_FOOTER))
        .ok_or_else(|| {
            AppError::MalformedResponse(
                "legacy payload is not wrapped in `var tumblr_api_read = ...;`".to_string(),
            )
        })?;

    let payload: LegacyPayload = serde_json::from_str(json)?;
    Ok(payload.posts.into_iter().next())
}

impl LegacyPost {
    /// The ID of the post this one was reblogged from: the first purely
    /// numeric path segment of `reblogged-from-url`.
    ///
    /// `Ok(None)` when the post names no source (it is an original post).
    pub fn reblog_parent_post_id(&self) -> Result<Option<PostId>, AppError> {
        let Some(source) = self.reblogged_from_url.as_deref() else {
            return Ok(None);
        };

        let parsed = url::Url::parse(source)
            .map_err(|e| AppError::MalformedLink(format!("{}: {}", source, e)))?;

        let segment = parsed
            .path_segments()
            .into_iter()
            .flatten()
            .find(|segment| !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(|| {
                AppError::MalformedLink(format!("no post ID in reblog source {}", source))
            })?;

        Ok(Some(PostId::parse(segment)?))
    }
}
