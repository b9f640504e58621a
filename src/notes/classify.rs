// src/notes/classify.rs
//! Splits a post's note listings into replies and reblogs.
//!
//! Two listings overlap. `reblogs_with_tags` carries tags but only reblogs,
//! and leaves some out on purpose. `conversation` carries replies and the
//! added text of reblogs, but no tags. Reblogs are taken from the tagged
//! listing and completed from the conversation listing; a conversation reblog
//! without a tagged counterpart is dropped so it is not counted twice.

use crate::error::AppError;
use crate::model::{record_post_id, record_type, Note, NoteRecord};
use crate::types::PostId;
use std::collections::{HashMap, HashSet};

/// A post's notes, split by kind, each list in listing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedNotes {
    pub replies: Vec<Note>,
    pub reblogs: Vec<Note>,
}

/// Merges two records of the same note. Fields of `overlay` win over fields
/// of `base` with the same name; fields present in only one are kept.
pub fn merge_records(base: &NoteRecord, overlay: &NoteRecord) -> NoteRecord {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Classifies the two listings of one post.
pub fn classify_notes(
    tagged: &[NoteRecord],
    conversation: &[NoteRecord],
) -> Result<ClassifiedNotes, AppError> {
    let mut conversation_reblogs: HashMap<PostId, &NoteRecord> = HashMap::new();
    let mut classified = ClassifiedNotes::default();

    for record in conversation {
        match record_type(record) {
            Some("reply") => {
                if let Some(note) = Note::from_record(record)? {
                    classified.replies.push(note);
                }
            }
            Some("reblog") => {
                if let Some(id) = record_post_id(record) {
                    conversation_reblogs.entry(id).or_insert(record);
                }
            }
            _ => {}
        }
    }

    let mut seen: HashSet<PostId> = HashSet::new();
    for base in tagged {
        if record_type(base) != Some("reblog") {
            continue;
        }
        let id = record_post_id(base);
        if let Some(id) = &id {
            if !seen.insert(id.clone()) {
                continue;
            }
        }

        let merged = match id.as_ref().and_then(|id| conversation_reblogs.get(id)) {
            Some(overlay) => merge_records(base, overlay),
            None => base.clone(),
        };

        if let Some(note) = Note::from_record(&merged)? {
            classified.reblogs.push(note);
        }
    }

    let unmatched = conversation_reblogs
        .keys()
        .filter(|id| !seen.contains(*id))
        .count();
    if unmatched > 0 {
        log::debug!(
            "Ignoring {} conversation reblogs absent from the tagged listing",
            unmatched
        );
    }

    Ok(classified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoteDetail;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn records(value: Value) -> Vec<NoteRecord> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_merge_overlay_wins_and_fields_union() {
        let base = records(json!([{ "a": 1, "b": 2 }])).remove(0);
        let overlay = records(json!([{ "b": 3, "c": 4 }])).remove(0);
        let merged = merge_records(&base, &overlay);
        assert_eq!(Value::Object(merged), json!({ "a": 1, "b": 3, "c": 4 }));
    }

    #[test]
    fn test_reblogs_take_tags_from_tagged_and_text_from_conversation() {
        let tagged = records(json!([
            { "type": "reblog", "timestamp": 10, "blog_name": "a", "post_id": "1",
              "tags": ["art"], "added_text": "short" }
        ]));
        let conversation = records(json!([
            { "type": "reblog", "timestamp": 10, "blog_name": "a", "post_id": "1",
              "added_text": "short but longer" },
            { "type": "reply", "timestamp": 12, "blog_name": "b", "reply_text": "hi" }
        ]));

        let classified = classify_notes(&tagged, &conversation).unwrap();
        assert_eq!(classified.replies.len(), 1);
        assert_eq!(classified.reblogs.len(), 1);

        let reblog = classified.reblogs[0].as_reblog().unwrap();
        assert_eq!(reblog.tags, Some(vec!["art".to_string()]));
        assert_eq!(reblog.added_text.as_deref(), Some("short but longer"));
    }

    #[test]
    fn test_unmatched_conversation_reblog_is_not_counted() {
        let tagged = records(json!([]));
        let conversation = records(json!([
            { "type": "reblog", "timestamp": 10, "blog_name": "a", "post_id": "1" }
        ]));
        let classified = classify_notes(&tagged, &conversation).unwrap();
        assert!(classified.reblogs.is_empty());
        assert!(classified.replies.is_empty());
    }

    #[test]
    fn test_likes_and_duplicates_are_skipped() {
        let tagged = records(json!([
            { "type": "reblog", "timestamp": 10, "blog_name": "a", "post_id": "1" },
            { "type": "reblog", "timestamp": 10, "blog_name": "a", "post_id": "1" },
            { "type": "like", "timestamp": 11, "blog_name": "c" }
        ]));
        let classified = classify_notes(&tagged, &[]).unwrap();
        assert_eq!(classified.reblogs.len(), 1);
        assert!(matches!(classified.reblogs[0].detail, NoteDetail::Reblog(_)));
    }
}
