// src/api/tumblr.rs
//! Typed endpoints on top of the request layer.

use super::legacy::{legacy_post_url, parse_legacy_payload, LegacyPost};
use super::paginated::PaginatedClient;
use super::params::QueryParams;
use super::responses::Page;
use super::{NotesMode, TumblrRepository};
use crate::error::AppError;
use crate::model::{NoteRecord, Post};
use crate::types::{BlogName, PostId};
use futures::{Stream, TryStreamExt};
use serde::de::DeserializeOwned;

/// The production [`TumblrRepository`].
pub struct TumblrApi {
    client: PaginatedClient,
}

impl TumblrApi {
    pub fn new(client: PaginatedClient) -> Self {
        Self { client }
    }
}

/// Drains a page stream, flattening the list stored under `field`.
async fn collect_records<T, S>(pages: S, field: &str) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Page, AppError>>,
{
    futures::pin_mut!(pages);
    let mut records = Vec::new();
    while let Some(page) = pages.try_next().await? {
        records.extend(page.records::<T>(field)?);
    }
    Ok(records)
}

#[async_trait::async_trait]
impl TumblrRepository for TumblrApi {
    async fn posts(&self, blog: &BlogName, params: QueryParams) -> Result<Vec<Post>, AppError> {
        let path = format!("/v2/blog/{}/posts", blog);
        collect_records(self.client.fetch_all(&path, params), "posts").await
    }

    async fn post(&self, blog: &str, id: &PostId) -> Result<Option<Post>, AppError> {
        let path = format!("/v2/blog/{}/posts", blog);
        let params = QueryParams::new().with("id", id.as_str());
        self.client.fetch_single(&path, &params, "posts").await
    }

    async fn notes(
        &self,
        blog: &BlogName,
        id: &PostId,
        mode: NotesMode,
    ) -> Result<Vec<NoteRecord>, AppError> {
        let path = format!("/v2/blog/{}/notes", blog);
        let params = QueryParams::new()
            .with("id", id.as_str())
            .with("mode", mode.as_str());
        collect_records(self.client.fetch_all(&path, params), "notes").await
    }

    async fn legacy_post(&self, blog: &str, id: &PostId) -> Result<Option<LegacyPost>, AppError> {
        let url = legacy_post_url(blog, id);
        match self.client.get_body(&url).await? {
            Some(body) => parse_legacy_payload(&body),
            None => Ok(None),
        }
    }

    fn request_count(&self) -> u64 {
        self.client.request_count()
    }
}
