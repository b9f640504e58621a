// src/notes/enrich.rs
//! Fills in what the notes listings leave out of a reblog.
//!
//! Listings omit the post a reblog came from, may lack tags, and silently
//! truncate added text. Each reblog is completed with:
//!   1. a legacy lookup for tags, URL and the reblogged-from post; when the
//!      reblog is private the lookup is absent and enrichment stops there,
//!   2. a v2 lookup for the full added text; when that is absent the text is
//!      taken from the post's `all` listing instead, which still carries it.

use crate::api::{NotesMode, TumblrRepository};
use crate::error::AppError;
use crate::model::{record_post_id, Note, Privacy, ReblogDetail};
use crate::types::{BlogName, PostId};
use std::collections::HashMap;

/// Counters for one post's enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentStats {
    pub looked_up: usize,
    pub private: usize,
    pub text_completed: usize,
}

/// Completes the reblogs of one post. Create one per archive pass: the
/// `all` listing is fetched at most once per enricher.
pub struct ReblogEnricher<'a> {
    api: &'a dyn TumblrRepository,
    blog: &'a BlogName,
    post_id: &'a PostId,
    all_listing: Option<HashMap<PostId, Option<String>>>,
}

/// The view URL of a reblog that cannot be fetched.
pub fn private_view_url(blog: &str, post_id: &PostId) -> String {
    format!("https://www.tumblr.com/blog/view/{}/{}", blog, post_id)
}

impl<'a> ReblogEnricher<'a> {
    pub fn new(api: &'a dyn TumblrRepository, blog: &'a BlogName, post_id: &'a PostId) -> Self {
        Self {
            api,
            blog,
            post_id,
            all_listing: None,
        }
    }

    /// Enriches every reblog in place. Replies are left untouched.
    pub async fn enrich_all(&mut self, notes: &mut [Note]) -> Result<EnrichmentStats, AppError> {
        let mut stats = EnrichmentStats::default();

        for note in notes.iter_mut() {
            let Some(reblog_id) = note.post_id.clone() else {
                continue;
            };
            let blog = note.blog_name.clone();
            let Some(reblog) = note.as_reblog_mut() else {
                continue;
            };

            if needs_lookup(reblog) {
                stats.looked_up += 1;
                if !self.lookup_source(&blog, &reblog_id, reblog).await? {
                    stats.private += 1;
                    continue;
                }
            }

            if reblog.has_added_text() && reblog.private != Privacy::Private {
                if self.complete_added_text(&blog, &reblog_id, reblog).await? {
                    stats.text_completed += 1;
                }
                if reblog.private == Privacy::Private {
                    stats.private += 1;
                }
            }
        }

        log::info!(
            "Enriched reblogs of {}: {} looked up, {} private, {} texts completed",
            self.post_id,
            stats.looked_up,
            stats.private,
            stats.text_completed
        );
        Ok(stats)
    }

    /// Legacy lookup. Returns `false` when the reblog turned out private.
    async fn lookup_source(
        &self,
        blog: &str,
        reblog_id: &PostId,
        reblog: &mut ReblogDetail,
    ) -> Result<bool, AppError> {
        match self.api.legacy_post(blog, reblog_id).await? {
            None => {
                reblog.private = Privacy::Private;
                reblog.url = Some(private_view_url(blog, reblog_id));
                Ok(false)
            }
            Some(fetched) => {
                reblog.private = Privacy::Public;
                reblog.reblog_parent_post_id = fetched.reblog_parent_post_id()?;
                reblog.tags = Some(fetched.tags);
                reblog.url = fetched.url;
                Ok(true)
            }
        }
    }

    /// Replaces possibly truncated added text. Returns whether text was found.
    async fn complete_added_text(
        &mut self,
        blog: &str,
        reblog_id: &PostId,
        reblog: &mut ReblogDetail,
    ) -> Result<bool, AppError> {
        if let Some(full) = self.api.post(blog, reblog_id).await? {
            return Ok(match full.reblog_comment() {
                Some(comment) => {
                    reblog.added_text = Some(comment.to_string());
                    true
                }
                None => false,
            });
        }

        reblog.private = Privacy::Private;
        match self.added_text_from_all_listing(reblog_id).await? {
            Some(text) => {
                reblog.added_text = Some(text);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn added_text_from_all_listing(
        &mut self,
        reblog_id: &PostId,
    ) -> Result<Option<String>, AppError> {
        if self.all_listing.is_none() {
            let records = self
                .api
                .notes(self.blog, self.post_id, NotesMode::All)
                .await?;
            let mut listing = HashMap::new();
            for record in &records {
                if let Some(id) = record_post_id(record) {
                    let text = record
                        .get("added_text")
                        .and_then(|v| v.as_str())
                        .map(str::to_string);
                    listing.entry(id).or_insert(text);
                }
            }
            self.all_listing = Some(listing);
        }

        Ok(self
            .all_listing
            .as_ref()
            .and_then(|listing| listing.get(reblog_id))
            .cloned()
            .flatten())
    }
}

fn needs_lookup(reblog: &ReblogDetail) -> bool {
    reblog.private != Privacy::Private
        && (reblog.tags.is_none() || reblog.reblog_parent_post_id.is_none())
}
