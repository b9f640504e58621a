//! From raw note listings to conversation trees.
//!
//! Three passes run per post, in order: [`classify_notes`] merges the two
//! listings into replies and reblogs, [`ReblogEnricher`] fills in what the
//! listings leave out, and [`NoteForest::build`] links the result.

mod classify;
mod enrich;
mod threads;

pub use classify::{classify_notes, merge_records, ClassifiedNotes};
pub use enrich::{private_view_url, EnrichmentStats, ReblogEnricher};
pub use threads::NoteForest;
