// src/model/post.rs
//! A post as the v2 API reports it.

use crate::types::PostId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The commentary a reblog added, from the v2 `reblog` object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReblogComment {
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_html: Option<String>,
}

/// A post summary. Fields the archive does not interpret are kept verbatim
/// in `extra` so the snapshot carries everything upstream reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub blog_name: String,
    #[serde(rename = "id_string")]
    pub id: PostId,
    pub timestamp: i64,
    #[serde(default)]
    pub note_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reblog: Option<ReblogComment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    /// The reblog commentary, when the post is a reblog that added any.
    pub fn reblog_comment(&self) -> Option<&str> {
        self.reblog.as_ref().map(|r| r.comment.as_str())
    }
}
