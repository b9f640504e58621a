use super::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Tumblr post ID.
///
/// Post IDs exceed the range JSON numbers can carry safely in most clients,
/// so the API reports them both as a number (`id`) and as a string
/// (`id_string`). This type always holds the decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostId(String);

static POST_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^/]+/(?:post/)?(?:[A-Za-z0-9-]+/)?(\d+)(?:[/?#]|$)")
        .expect("Failed to compile post URL regex - this is a bug in the code")
});

impl PostId {
    /// Parses a bare decimal ID or a post URL in either the
    /// `https://{blog}.tumblr.com/post/{id}` or `https://www.tumblr.com/{blog}/{id}` form.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let cleaned = input.trim();

        if is_numeric(cleaned) {
            return Ok(PostId(cleaned.to_string()));
        }

        if let Some(captures) = POST_URL_REGEX.captures(cleaned) {
            if let Some(id_match) = captures.get(1) {
                return Ok(PostId(id_match.as_str().to_string()));
            }
        }

        Err(ValidationError::InvalidPostId(input.to_string()))
    }

    /// Returns the ID as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for PostId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Notes report post_id as a string, the legacy API sometimes as a number.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(PostId(n.to_string())),
            Raw::Text(s) if is_numeric(&s) => Ok(PostId(s)),
            Raw::Text(s) => Err(serde::de::Error::custom(ValidationError::InvalidPostId(s))),
        }
    }
}

/// A blog's short name, as used in `{name}.tumblr.com` and API paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlogName(String);

impl BlogName {
    /// Validates a blog name. A full `{name}.tumblr.com` hostname is accepted
    /// and reduced to its short name.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim().to_lowercase();
        let short = trimmed.strip_suffix(".tumblr.com").unwrap_or(&trimmed);

        if short.is_empty() {
            return Err(ValidationError::EmptyField("blog name"));
        }

        if !short
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ValidationError::InvalidBlogName {
                name,
                reason: "only letters, digits and hyphens are allowed".to_string(),
            });
        }

        Ok(Self(short.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlogName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
