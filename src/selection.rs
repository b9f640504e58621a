// src/selection.rs
//! Which posts a run archives.
//!
//! Explicit post IDs, when given, are the whole selection. Otherwise every
//! post of each tag set is taken, oldest first, followed by every post that a
//! master post links to.

use crate::api::{QueryParams, TumblrRepository};
use crate::error::AppError;
use crate::model::Post;
use crate::types::{BlogName, PostId};
use indexmap::IndexMap;
use regex::Regex;

/// A post to consider for archiving.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    /// Found through a listing; the summary is already at hand.
    Listed(Post),
    /// Known only by ID; its summary is fetched when needed.
    ById(PostId),
}

impl Candidate {
    pub fn id(&self) -> &PostId {
        match self {
            Candidate::Listed(post) => &post.id,
            Candidate::ById(id) => id,
        }
    }
}

/// What to archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub post_ids: Vec<PostId>,
    /// Each set lists posts carrying all of its tags.
    pub tag_sets: Vec<Vec<String>>,
    pub master_posts: Vec<PostId>,
}

/// Resolves a selection into candidates, each post at most once, in
/// first-seen order.
pub async fn select_candidates(
    api: &dyn TumblrRepository,
    blog: &BlogName,
    selection: &Selection,
) -> Result<Vec<Candidate>, AppError> {
    let mut candidates: IndexMap<PostId, Candidate> = IndexMap::new();

    if !selection.post_ids.is_empty() {
        for id in &selection.post_ids {
            candidates
                .entry(id.clone())
                .or_insert_with(|| Candidate::ById(id.clone()));
        }
        return Ok(candidates.into_values().collect());
    }

    for tags in &selection.tag_sets {
        let params = QueryParams::new()
            .with_list("tag", tags.iter().cloned())
            .with("sort", "asc");
        let posts = api.posts(blog, params).await?;
        log::info!("Tag set [{}]: {} posts", tags.join(", "), posts.len());

        for post in posts {
            candidates
                .entry(post.id.clone())
                .or_insert(Candidate::Listed(post));
        }
    }

    for master_id in &selection.master_posts {
        let Some(master) = api.post(blog.as_str(), master_id).await? else {
            log::warn!("Master post {} not found", master_id);
            continue;
        };
        let links = extract_post_links(&master, blog)?;
        log::info!("Master post {}: {} linked posts", master_id, links.len());

        for id in links {
            candidates
                .entry(id.clone())
                .or_insert(Candidate::ById(id));
        }
    }

    Ok(candidates.into_values().collect())
}

/// IDs of the blog's posts linked from `post`, deduplicated, excluding the
/// post itself.
pub fn extract_post_links(post: &Post, blog: &BlogName) -> Result<Vec<PostId>, AppError> {
    let name = regex::escape(blog.as_str());
    let pattern = Regex::new(&format!(
        r"https?://(?:{name}\.tumblr\.com/post/|(?:www\.)?tumblr\.com/{name}/)(\d+)"
    ))
    .map_err(|e| AppError::MalformedLink(e.to_string()))?;

    let content = serde_json::to_string(post)?;
    let mut ids: IndexMap<PostId, ()> = IndexMap::new();
    for capture in pattern.captures_iter(&content) {
        let id = PostId::parse(&capture[1])?;
        if id != post.id {
            ids.insert(id, ());
        }
    }

    Ok(ids.into_keys().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_extracts_links_to_own_blog_only() {
        let post: Post = serde_json::from_value(json!({
            "blog_name": "ferronickel",
            "id_string": "1",
            "timestamp": 0,
            "body": concat!(
                "<a href=\"https://ferronickel.tumblr.com/post/22/slug\">a</a>",
                "<a href=\"https://www.tumblr.com/ferronickel/33\">b</a>",
                "<a href=\"https://ferronickel.tumblr.com/post/22\">again</a>",
                "<a href=\"https://other.tumblr.com/post/44\">other</a>",
                "<a href=\"https://ferronickel.tumblr.com/post/1\">self</a>"
            )
        }))
        .unwrap();
        let blog = BlogName::new("ferronickel").unwrap();

        let ids = extract_post_links(&post, &blog).unwrap();
        assert_eq!(
            ids,
            vec![PostId::parse("22").unwrap(), PostId::parse("33").unwrap()]
        );
    }

    #[test]
    fn test_candidate_id() {
        let id = PostId::parse("5").unwrap();
        assert_eq!(Candidate::ById(id.clone()).id(), &id);
    }
}
