// src/output/snapshot.rs
//! The persisted form of one archived post.

use crate::model::{Note, Post};
use crate::notes::NoteForest;
use crate::types::PostId;
use serde::{Deserialize, Serialize};

/// A note with every response to it nested beneath.
#[derive(Debug, Serialize)]
pub struct SnapshotNote<'a> {
    #[serde(flatten)]
    pub note: &'a Note,
    pub replies: Vec<SnapshotNote<'a>>,
}

impl<'a> SnapshotNote<'a> {
    fn nested(forest: &'a NoteForest, index: usize) -> Self {
        Self {
            note: &forest.notes()[index],
            replies: forest
                .children_of(index)
                .iter()
                .map(|&child| Self::nested(forest, child))
                .collect(),
        }
    }
}

/// A post, its notes and when they were retrieved.
///
/// `notes` lists every note oldest first; each carries its own responses
/// under `replies`, so a response appears both at the top level and nested
/// under the note it answers.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    #[serde(flatten)]
    pub post: &'a Post,
    pub notes: Vec<SnapshotNote<'a>>,
    pub retrieved_at: i64,
}

impl<'a> Snapshot<'a> {
    pub fn new(post: &'a Post, forest: &'a NoteForest, retrieved_at: i64) -> Self {
        Self {
            post,
            notes: (0..forest.len())
                .map(|index| SnapshotNote::nested(forest, index))
                .collect(),
            retrieved_at,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// The fields of a stored snapshot the staleness policy reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnapshotHeader {
    #[serde(rename = "id_string")]
    pub id: PostId,
    pub timestamp: i64,
    #[serde(default)]
    pub note_count: u64,
    pub retrieved_at: i64,
}
