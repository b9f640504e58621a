// src/staleness.rs
//! Whether an archived post is worth fetching again.
//!
//! Evaluation is pure: it reads the stored snapshot header and the current
//! time, never the network. When the header alone cannot decide, the verdict
//! asks the caller to compare note counts and [`StalenessPolicy::settle`]
//! finishes the decision.

use crate::constants::{RECHECK_INTERVAL_DAYS, SNAPSHOT_MAX_AGE_DAYS, YOUNG_POST_DAYS};
use crate::output::SnapshotHeader;
use chrono::{DateTime, Duration, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    NeverArchived,
    SnapshotExpired,
    YoungPost,
    NoteCountChanged { archived: u64, current: u64 },
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshReason {
    RecentlyChecked,
    NoteCountUnchanged,
}

/// The outcome of evaluating one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Stale(StaleReason),
    Fresh(FreshReason),
    /// Fetch the post summary and [`settle`](StalenessPolicy::settle) with its note count.
    CheckNoteCount { archived: u64 },
}

impl Verdict {
    pub fn is_stale(&self) -> bool {
        matches!(self, Verdict::Stale(_))
    }
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::NeverArchived => write!(f, "not archived yet"),
            StaleReason::SnapshotExpired => write!(f, "snapshot expired"),
            StaleReason::YoungPost => write!(f, "post is young"),
            StaleReason::NoteCountChanged { archived, current } => {
                write!(f, "note count changed from {} to {}", archived, current)
            }
            StaleReason::Forced => write!(f, "forced"),
        }
    }
}

impl fmt::Display for FreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreshReason::RecentlyChecked => write!(f, "checked recently"),
            FreshReason::NoteCountUnchanged => write!(f, "note count unchanged"),
        }
    }
}

/// Age thresholds deciding whether to refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    pub max_age: Duration,
    pub young_post_age: Duration,
    pub recheck_interval: Duration,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::days(SNAPSHOT_MAX_AGE_DAYS),
            young_post_age: Duration::days(YOUNG_POST_DAYS),
            recheck_interval: Duration::days(RECHECK_INTERVAL_DAYS),
        }
    }
}

impl StalenessPolicy {
    /// Decides from the stored snapshot alone, where possible.
    pub fn evaluate(&self, snapshot: Option<&SnapshotHeader>, now: DateTime<Utc>) -> Verdict {
        let Some(snapshot) = snapshot else {
            return Verdict::Stale(StaleReason::NeverArchived);
        };

        let now = now.timestamp();
        let (Some(snapshot_age), Some(post_age)) =
            (age(now, snapshot.retrieved_at), age(now, snapshot.timestamp))
        else {
            return Verdict::Stale(StaleReason::SnapshotExpired);
        };

        if snapshot_age > self.max_age {
            Verdict::Stale(StaleReason::SnapshotExpired)
        } else if post_age < self.young_post_age {
            Verdict::Stale(StaleReason::YoungPost)
        } else if snapshot_age < self.recheck_interval {
            Verdict::Fresh(FreshReason::RecentlyChecked)
        } else {
            Verdict::CheckNoteCount {
                archived: snapshot.note_count,
            }
        }
    }

    /// Finishes a [`Verdict::CheckNoteCount`] with the current note count.
    pub fn settle(&self, archived: u64, current: u64) -> Verdict {
        if archived == current {
            Verdict::Fresh(FreshReason::NoteCountUnchanged)
        } else {
            Verdict::Stale(StaleReason::NoteCountChanged { archived, current })
        }
    }
}

/// Seconds from `then` to `now`, or `None` when out of range.
fn age(now: i64, then: i64) -> Option<Duration> {
    now.checked_sub(then).and_then(Duration::try_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PostId;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn header(retrieved_ago: Duration, posted_ago: Duration, note_count: u64) -> SnapshotHeader {
        SnapshotHeader {
            id: PostId::parse("1").unwrap(),
            timestamp: (now() - posted_ago).timestamp(),
            note_count,
            retrieved_at: (now() - retrieved_ago).timestamp(),
        }
    }

    #[test]
    fn test_missing_snapshot_is_stale() {
        let verdict = StalenessPolicy::default().evaluate(None, now());
        assert_eq!(verdict, Verdict::Stale(StaleReason::NeverArchived));
    }

    #[test]
    fn test_old_snapshot_is_stale_even_if_counts_match() {
        let snapshot = header(Duration::days(20), Duration::days(100), 5);
        let verdict = StalenessPolicy::default().evaluate(Some(&snapshot), now());
        assert_eq!(verdict, Verdict::Stale(StaleReason::SnapshotExpired));
    }

    #[test]
    fn test_young_post_is_stale() {
        let snapshot = header(Duration::days(1), Duration::hours(1), 5);
        let verdict = StalenessPolicy::default().evaluate(Some(&snapshot), now());
        assert_eq!(verdict, Verdict::Stale(StaleReason::YoungPost));
    }

    #[test]
    fn test_recent_snapshot_of_old_post_is_fresh() {
        let snapshot = header(Duration::days(1), Duration::days(30), 5);
        let verdict = StalenessPolicy::default().evaluate(Some(&snapshot), now());
        assert_eq!(verdict, Verdict::Fresh(FreshReason::RecentlyChecked));
    }

    #[test]
    fn test_middle_aged_snapshot_needs_note_count() {
        let policy = StalenessPolicy::default();
        let snapshot = header(Duration::days(5), Duration::days(30), 5);
        assert_eq!(
            policy.evaluate(Some(&snapshot), now()),
            Verdict::CheckNoteCount { archived: 5 }
        );
        assert_eq!(
            policy.settle(5, 5),
            Verdict::Fresh(FreshReason::NoteCountUnchanged)
        );
        assert!(policy.settle(5, 6).is_stale());
    }

    #[test]
    fn test_out_of_range_timestamps_are_stale() {
        let mut snapshot = header(Duration::days(1), Duration::days(30), 5);
        snapshot.retrieved_at = i64::MIN;
        let verdict = StalenessPolicy::default().evaluate(Some(&snapshot), now());
        assert_eq!(verdict, Verdict::Stale(StaleReason::SnapshotExpired));

        let mut snapshot = header(Duration::days(1), Duration::days(30), 5);
        snapshot.timestamp = i64::MIN;
        let verdict = StalenessPolicy::default().evaluate(Some(&snapshot), now());
        assert_eq!(verdict, Verdict::Stale(StaleReason::SnapshotExpired));
    }
}
