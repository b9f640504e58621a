// src/notes/threads.rs
//! Rebuilds who-responded-to-whom from a flat note list.
//!
//! Notes live in an arena sorted by timestamp; links are parent/child
//! indices into it. A note gains at most one parent, and a link that would
//! make a note its own ancestor is refused, so the result is always a forest.

use crate::model::Note;

/// Replies and reblogs of one post, linked into conversation trees.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteForest {
    notes: Vec<Note>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl NoteForest {
    /// Sorts the notes by time and links every reply and reblog to the note
    /// it most plausibly responds to.
    pub fn build(replies: Vec<Note>, reblogs: Vec<Note>) -> Self {
        let mut notes = replies;
        notes.extend(reblogs);
        // Stable, so equal timestamps keep listing order.
        notes.sort_by_key(|note| note.timestamp);

        let len = notes.len();
        let mut forest = Self {
            notes,
            parents: vec![None; len],
            children: vec![Vec::new(); len],
        };

        for index in 0..len {
            if forest.notes[index].is_reply() {
                if let Some(parent) = forest.reply_parent(index) {
                    forest.attach(index, parent);
                }
            }
        }
        for index in 0..len {
            if forest.notes[index].is_reblog() {
                if let Some(parent) = forest.reblog_parent(index) {
                    forest.attach(index, parent);
                }
            }
        }

        for children in &mut forest.children {
            children.sort_unstable();
        }

        let linked = forest.parents.iter().filter(|p| p.is_some()).count();
        log::debug!("Linked {} of {} notes into threads", linked, len);
        forest
    }

    /// All notes, oldest first.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn parent_of(&self, index: usize) -> Option<usize> {
        self.parents.get(index).copied().flatten()
    }

    /// Direct responses to the note at `index`, oldest first.
    pub fn children_of(&self, index: usize) -> &[usize] {
        self.children.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Notes that respond to nothing.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.notes.len()).filter(move |&i| self.parents[i].is_none())
    }

    /// A reply responds to the latest earlier reply by the blog it mentions
    /// first, or failing that to the latest earlier reblog by that blog.
    fn reply_parent(&self, index: usize) -> Option<usize> {
        let note = &self.notes[index];
        let mentioned = note.first_mention()?;

        self.latest_before(index, mentioned, Note::is_reply)
            .or_else(|| self.latest_before(index, mentioned, Note::is_reblog))
    }

    /// A reblog hangs under the note it was reblogged from when that is known,
    /// otherwise under the latest earlier reblog by the blog it names as source.
    fn reblog_parent(&self, index: usize) -> Option<usize> {
        let reblog = self.notes[index].as_reblog()?;

        match &reblog.reblog_parent_post_id {
            Some(parent_id) => self.notes.iter().enumerate().find_map(|(i, candidate)| {
                (i != index
                    && candidate.is_reblog()
                    && candidate.post_id.as_ref() == Some(parent_id))
                .then_some(i)
            }),
            None => {
                let source = reblog.reblog_parent_blog_name.as_deref()?;
                self.latest_before(index, source, Note::is_reblog)
            }
        }
    }

    /// The last note in time order, strictly earlier than `index`, written by
    /// `blog` and accepted by `kind`.
    fn latest_before(&self, index: usize, blog: &str, kind: fn(&Note) -> bool) -> Option<usize> {
        let timestamp = self.notes[index].timestamp;
        self.notes
            .iter()
            .enumerate()
            .take_while(|(_, candidate)| candidate.timestamp < timestamp)
            .filter(|(_, candidate)| candidate.blog_name == blog && kind(candidate))
            .map(|(i, _)| i)
            .last()
    }

    fn attach(&mut self, child: usize, parent: usize) -> bool {
        if child == parent || self.notes[child].is_response || self.parents[child].is_some() {
            return false;
        }
        if self.is_ancestor(child, parent) {
            log::warn!(
                "Not linking note by {} under {}: it would form a cycle",
                self.notes[child].blog_name,
                self.notes[parent].blog_name
            );
            return false;
        }

        self.parents[child] = Some(parent);
        self.children[parent].push(child);
        self.notes[child].is_response = true;
        true
    }

    /// Whether `ancestor` is `node` or sits above it.
    fn is_ancestor(&self, ancestor: usize, node: usize) -> bool {
        let mut current = Some(node);
        while let Some(i) = current {
            if i == ancestor {
                return true;
            }
            current = self.parents[i];
        }
        false
    }
}
