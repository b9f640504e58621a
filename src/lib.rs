// src/lib.rs
//! tumblr-archive library — archives the replies and reblogs of Tumblr posts
//! as per-post JSON snapshots with reconstructed conversation threads.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** — `AppError`, `UpstreamStatus`, `ValidationError`
//! - **Configuration** — `CommandLineInput`, `ArchiveConfig`
//! - **Domain model** — `Post`, `Note`, `NoteDetail`, `ReblogDetail`, etc.
//! - **Domain types** — `PostId`, `BlogName`, `ApiKey`
//! - **API client** — `PaginatedClient`, `TumblrApi`, `HttpTransport`
//! - **Notes** — `classify_notes`, `ReblogEnricher`, `NoteForest`
//! - **Archive** — `StalenessPolicy`, `SnapshotStore`, `Archiver`

pub mod api;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod error_recovery;
pub mod model;
pub mod notes;
pub mod output;
pub mod pipeline;
pub mod selection;
pub mod staleness;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, UpstreamStatus};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{ArchiveConfig, ArchiveOptions, CommandLineInput};

// --- Domain Model ---
pub use crate::model::{
    FormattingSpan, Note, NoteDetail, NoteRecord, Post, Privacy, ReblogDetail, ReplyDetail,
};

// --- Domain Types ---
pub use crate::types::{ApiKey, BlogName, PostId};

// --- API Client ---
pub use crate::api::{
    ClientSettings, HttpTransport, NotesMode, PaginatedClient, QueryParams, Transport,
    TumblrApi, TumblrRepository,
};
pub use crate::clock::{Clock, SystemClock};
pub use crate::error_recovery::BackoffPolicy;

// --- Notes ---
pub use crate::notes::{classify_notes, ClassifiedNotes, NoteForest, ReblogEnricher};

// --- Archive ---
pub use crate::output::{Snapshot, SnapshotHeader, SnapshotStore};
pub use crate::pipeline::{Archiver, Outcome, RunReport};
pub use crate::selection::{select_candidates, Candidate, Selection};
pub use crate::staleness::{StalenessPolicy, Verdict};
