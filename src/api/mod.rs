// src/api/mod.rs
//! Tumblr API interaction: the ability to read posts and their notes.
//!
//! Two seams keep I/O swappable. [`Transport`] is the raw HTTP GET;
//! [`TumblrRepository`] is the set of typed lookups the archive pipeline
//! needs. Business logic depends on the latter, never on HTTP details.

pub mod cache;
pub mod client;
pub mod legacy;
pub mod paginated;
pub mod params;
pub mod responses;
mod tumblr;

use crate::error::AppError;
use crate::model::{NoteRecord, Post};
use crate::types::{BlogName, PostId};

pub use client::{ApiResponse, HttpTransport};
pub use legacy::LegacyPost;
pub use paginated::{ClientSettings, PaginatedClient};
pub use params::{ParamValue, QueryParams};
pub use responses::Page;
pub use tumblr::TumblrApi;

/// A raw HTTP GET.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<ApiResponse<String>, AppError>;
}

/// Listing modes of the notes endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesMode {
    /// Reblogs only, with their tags; omits some notes deliberately.
    ReblogsWithTags,
    /// Replies and reblogs with added text.
    Conversation,
    /// Everything, including likes; carries longer added text for private reblogs.
    All,
}

impl NotesMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotesMode::ReblogsWithTags => "reblogs_with_tags",
            NotesMode::Conversation => "conversation",
            NotesMode::All => "all",
        }
    }
}

/// The ability to read posts and notes from one Tumblr account.
///
/// Absent resources (deleted or private) are `Ok(None)`, never errors.
#[async_trait::async_trait]
pub trait TumblrRepository: Send + Sync {
    /// Every post matching `params`, across all pages.
    async fn posts(&self, blog: &BlogName, params: QueryParams) -> Result<Vec<Post>, AppError>;

    /// One post summary by ID.
    async fn post(&self, blog: &str, id: &PostId) -> Result<Option<Post>, AppError>;

    /// Every note of a post in the given listing mode, across all pages.
    async fn notes(
        &self,
        blog: &BlogName,
        id: &PostId,
        mode: NotesMode,
    ) -> Result<Vec<NoteRecord>, AppError>;

    /// One post from the legacy read endpoint.
    async fn legacy_post(&self, blog: &str, id: &PostId) -> Result<Option<LegacyPost>, AppError>;

    /// Network requests made so far.
    fn request_count(&self) -> u64;
}
