// src/pipeline.rs
//! The per-post archive pipeline.
//!
//! For each candidate: staleness gate → post summary → note listings →
//! classify → enrich → link → snapshot. Posts are independent units; a
//! failing post is recorded and the run moves on unless told to stop.

use crate::api::{NotesMode, TumblrRepository};
use crate::clock::Clock;
use crate::config::ArchiveOptions;
use crate::constants::NOTES_PAGE_SIZE;
use crate::error::AppError;
use crate::model::Post;
use crate::notes::{classify_notes, EnrichmentStats, NoteForest, ReblogEnricher};
use crate::output::{Snapshot, SnapshotStore};
use crate::selection::Candidate;
use crate::staleness::{FreshReason, StalenessPolicy, StaleReason, Verdict};
use crate::types::{BlogName, PostId};
use std::fmt;

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Archived { notes: usize, private_reblogs: usize },
    Fresh(FreshReason),
    /// Too many notes to page through.
    Overlarge { note_count: u64 },
    /// Deleted or private.
    Missing,
}

/// Totals for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub archived: usize,
    pub fresh: usize,
    pub skipped: usize,
    pub missing: usize,
    /// Reblogs across archived posts that could not be fetched.
    pub private_reblogs: usize,
    pub failed: Vec<(PostId, String)>,
    pub requests: u64,
}

impl RunReport {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Archived {
                private_reblogs, ..
            } => {
                self.archived += 1;
                self.private_reblogs += private_reblogs;
            }
            Outcome::Fresh(_) => self.fresh += 1,
            Outcome::Overlarge { .. } => self.skipped += 1,
            Outcome::Missing => self.missing += 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} archived, {} fresh, {} skipped, {} missing, {} failed ({} private reblogs)",
            self.archived,
            self.fresh,
            self.skipped,
            self.missing,
            self.failed.len(),
            self.private_reblogs
        )
    }
}

/// Archives posts of one blog into a snapshot store.
pub struct Archiver<'a> {
    api: &'a dyn TumblrRepository,
    clock: &'a dyn Clock,
    store: &'a SnapshotStore,
    blog: &'a BlogName,
    policy: StalenessPolicy,
    options: ArchiveOptions,
}

impl<'a> Archiver<'a> {
    pub fn new(
        api: &'a dyn TumblrRepository,
        clock: &'a dyn Clock,
        store: &'a SnapshotStore,
        blog: &'a BlogName,
    ) -> Self {
        Self {
            api,
            clock,
            store,
            blog,
            policy: StalenessPolicy::default(),
            options: ArchiveOptions::default(),
        }
    }

    pub fn with_policy(mut self, policy: StalenessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_options(mut self, options: ArchiveOptions) -> Self {
        self.options = options;
        self
    }

    /// Processes every candidate in order.
    pub async fn run(&self, candidates: Vec<Candidate>) -> Result<RunReport, AppError> {
        let mut report = RunReport::default();

        for candidate in candidates {
            let id = candidate.id().clone();
            match self.process(candidate).await {
                Ok(outcome) => report.record(&outcome),
                Err(e) if self.options.fail_fast => return Err(e),
                Err(e) => {
                    log::error!("Failed to archive {}: {}", id, e);
                    report.failed.push((id, e.to_string()));
                }
            }
        }

        report.requests = self.api.request_count();
        Ok(report)
    }

    /// Archives one candidate if its snapshot is stale.
    pub async fn process(&self, candidate: Candidate) -> Result<Outcome, AppError> {
        let id = candidate.id().clone();

        let verdict = if self.options.force {
            Verdict::Stale(StaleReason::Forced)
        } else {
            let header = self.store.load_header(&id)?;
            self.policy.evaluate(header.as_ref(), self.clock.now())
        };
        if let Verdict::Fresh(reason) = verdict {
            log::info!("{}: fresh ({})", id, reason);
            return Ok(Outcome::Fresh(reason));
        }

        let post = match candidate {
            Candidate::Listed(post) => post,
            Candidate::ById(id) => match self.api.post(self.blog.as_str(), &id).await? {
                Some(post) => post,
                None => {
                    log::warn!("{}: post not found, skipping", id);
                    return Ok(Outcome::Missing);
                }
            },
        };

        if post.note_count / NOTES_PAGE_SIZE > self.options.max_note_pages {
            println!(
                "::warning:: Skipping {} because it has too many notes ({})",
                post.id, post.note_count
            );
            return Ok(Outcome::Overlarge {
                note_count: post.note_count,
            });
        }

        if let Verdict::CheckNoteCount { archived } = verdict {
            if let Verdict::Fresh(reason) = self.policy.settle(archived, post.note_count) {
                log::info!("{}: fresh ({})", post.id, reason);
                return Ok(Outcome::Fresh(reason));
            }
            log::info!(
                "{}: archiving (note count {} -> {})",
                post.id,
                archived,
                post.note_count
            );
        } else if let Verdict::Stale(reason) = verdict {
            log::info!("{}: archiving ({})", post.id, reason);
        }

        self.archive_post(&post).await
    }

    /// Fetches, reconstructs and stores the notes of a post.
    pub async fn archive_post(&self, post: &Post) -> Result<Outcome, AppError> {
        let (forest, stats) = self.reconstruct(post).await?;
        let retrieved_at = self.clock.now().timestamp();
        self.store
            .save(&post.id, &Snapshot::new(post, &forest, retrieved_at))?;
        Ok(Outcome::Archived {
            notes: forest.len(),
            private_reblogs: stats.private,
        })
    }

    /// Builds the conversation forest of a post from its note listings.
    pub async fn reconstruct(
        &self,
        post: &Post,
    ) -> Result<(NoteForest, EnrichmentStats), AppError> {
        let tagged = self
            .api
            .notes(self.blog, &post.id, NotesMode::ReblogsWithTags)
            .await?;
        let conversation = self
            .api
            .notes(self.blog, &post.id, NotesMode::Conversation)
            .await?;

        let mut classified = classify_notes(&tagged, &conversation)?;
        log::info!(
            "{}: {} replies, {} reblogs",
            post.id,
            classified.replies.len(),
            classified.reblogs.len()
        );

        let stats = ReblogEnricher::new(self.api, self.blog, &post.id)
            .enrich_all(&mut classified.reblogs)
            .await?;

        Ok((NoteForest::build(classified.replies, classified.reblogs), stats))
    }
}
