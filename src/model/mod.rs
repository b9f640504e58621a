//! Posts and the notes attached to them.

mod note;
mod post;

pub use note::{
    record_post_id, record_type, BlogRef, FormattingSpan, Note, NoteDetail, NoteRecord, Privacy,
    ReblogDetail, ReplyDetail,
};
pub use post::{Post, ReblogComment};
