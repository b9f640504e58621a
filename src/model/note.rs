// src/model/note.rs
//! Notes: the replies and reblogs attached to a post.
//!
//! The notes endpoint returns loosely shaped records whose fields vary by
//! listing mode. Records stay raw ([`NoteRecord`]) until the classifier has
//! merged the two listings, then become typed [`Note`]s.

use crate::error::AppError;
use crate::types::PostId;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// A note exactly as the API returned it.
pub type NoteRecord = Map<String, Value>;

/// Reads a record's `post_id`, which arrives as a string or a number.
pub fn record_post_id(record: &NoteRecord) -> Option<PostId> {
    match record.get("post_id")? {
        Value::String(s) => PostId::parse(s).ok(),
        Value::Number(n) => PostId::parse(&n.to_string()).ok(),
        _ => None,
    }
}

/// Reads a record's `type`.
pub fn record_type(record: &NoteRecord) -> Option<&str> {
    record.get("type").and_then(Value::as_str)
}

/// A blog referenced from a formatting span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One inline span of reply text (bold, link, mention, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingSpan {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog: Option<BlogRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl FormattingSpan {
    /// The mentioned blog, if this span is a mention.
    pub fn mentioned_blog(&self) -> Option<&str> {
        if self.kind == "mention" {
            self.blog.as_ref().map(|b| b.name.as_str())
        } else {
            None
        }
    }
}

/// Whether a reblog is visible to the public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Privacy {
    #[default]
    Unknown,
    Private,
    Public,
}

impl Privacy {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Privacy::Unknown)
    }
}

// Snapshots carry `"private": true|false`, and omit the key while unknown.
impl Serialize for Privacy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Privacy::Private => serializer.serialize_bool(true),
            Privacy::Public => serializer.serialize_bool(false),
            Privacy::Unknown => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReplyDetail {
    pub reply_text: String,
    pub formatting: Vec<FormattingSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReblogDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reblog_parent_post_id: Option<PostId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reblog_parent_blog_name: Option<String>,
    #[serde(skip_serializing_if = "Privacy::is_unknown")]
    pub private: Privacy,
}

impl ReblogDetail {
    /// Whether added text may have been truncated by the summary listing.
    pub fn has_added_text(&self) -> bool {
        self.added_text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoteDetail {
    Reply(ReplyDetail),
    Reblog(ReblogDetail),
}

/// A reply or reblog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub blog_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<PostId>,
    pub timestamp: i64,
    pub is_response: bool,
    #[serde(flatten)]
    pub detail: NoteDetail,
}

/// The typed view of a raw record.
#[derive(Debug, Deserialize)]
struct WireNote {
    #[serde(rename = "type")]
    note_type: String,
    blog_name: String,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    post_id: Option<PostId>,
    #[serde(default)]
    reply_text: Option<String>,
    #[serde(default)]
    formatting: Vec<FormattingSpan>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    added_text: Option<String>,
    #[serde(default)]
    reblog_parent_blog_name: Option<String>,
    #[serde(default)]
    reblog_parent_post_id: Option<PostId>,
}

impl Note {
    /// Converts a raw record. Note kinds the archive does not keep
    /// (likes, the original "posted" note) yield `Ok(None)`.
    pub fn from_record(record: &NoteRecord) -> Result<Option<Note>, AppError> {
        let wire: WireNote = serde_json::from_value(Value::Object(record.clone()))
            .map_err(|e| AppError::MalformedResponse(format!("unreadable note: {}", e)))?;

        let detail = match wire.note_type.as_str() {
            "reply" => NoteDetail::Reply(ReplyDetail {
                reply_text: wire.reply_text.unwrap_or_default(),
                formatting: wire.formatting,
            }),
            "reblog" => NoteDetail::Reblog(ReblogDetail {
                tags: wire.tags,
                added_text: wire.added_text,
                reblog_parent_blog_name: wire.reblog_parent_blog_name,
                reblog_parent_post_id: wire.reblog_parent_post_id,
                ..ReblogDetail::default()
            }),
            _ => return Ok(None),
        };

        Ok(Some(Note {
            blog_name: wire.blog_name,
            post_id: wire.post_id,
            timestamp: wire.timestamp,
            is_response: false,
            detail,
        }))
    }

    pub fn is_reply(&self) -> bool {
        matches!(self.detail, NoteDetail::Reply(_))
    }

    pub fn is_reblog(&self) -> bool {
        matches!(self.detail, NoteDetail::Reblog(_))
    }

    pub fn as_reblog(&self) -> Option<&ReblogDetail> {
        match &self.detail {
            NoteDetail::Reblog(r) => Some(r),
            NoteDetail::Reply(_) => None,
        }
    }

    pub fn as_reblog_mut(&mut self) -> Option<&mut ReblogDetail> {
        match &mut self.detail {
            NoteDetail::Reblog(r) => Some(r),
            NoteDetail::Reply(_) => None,
        }
    }

    /// The blog named by the first mention span of a reply.
    pub fn first_mention(&self) -> Option<&str> {
        match &self.detail {
            NoteDetail::Reply(reply) => reply
                .formatting
                .iter()
                .find(|span| span.kind == "mention")
                .and_then(FormattingSpan::mentioned_blog),
            NoteDetail::Reblog(_) => None,
        }
    }
}
