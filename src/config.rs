// src/config.rs
use crate::api::ClientSettings;
use crate::constants::{
    BACKOFF_BASE_SECS, DEFAULT_ARCHIVE_DIR, MAX_NOTE_PAGES, RECHECK_INTERVAL_DAYS,
    RESPONSE_CACHE_TTL_SECS, SNAPSHOT_MAX_AGE_DAYS, YOUNG_POST_DAYS,
};
use crate::error::AppError;
use crate::error_recovery::BackoffPolicy;
use crate::selection::Selection;
use crate::staleness::StalenessPolicy;
use crate::types::{ApiKey, BlogName, PostId, ValidationError};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the API consumer key.
pub const API_KEY_VAR: &str = "TUMBLR_CLIENT_KEY";

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Blog whose posts are archived (e.g. "ferronickel")
    pub blog: String,

    /// Archive every post tagged with all of these comma-separated tags (repeatable)
    #[arg(short = 't', long = "tag-set")]
    pub tag_sets: Vec<String>,

    /// Archive every post linked from this post (ID or URL, repeatable)
    #[arg(short = 'm', long = "master-post")]
    pub master_posts: Vec<String>,

    /// Archive only these posts (ID or URL, repeatable); overrides tag sets and master posts
    #[arg(short = 'p', long = "post-id")]
    pub post_ids: Vec<String>,

    /// Directory snapshots are written to
    #[arg(short = 'd', long, default_value = DEFAULT_ARCHIVE_DIR)]
    pub archive_dir: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Seconds an identical request is answered from memory (0 disables caching)
    #[arg(long, default_value_t = RESPONSE_CACHE_TTL_SECS)]
    pub cache_ttl: u64,

    /// Skip posts needing more than this many pages of notes
    #[arg(long, default_value_t = MAX_NOTE_PAGES)]
    pub max_note_pages: u64,

    /// Attempts at one request before rate limiting becomes fatal
    #[arg(long, default_value_t = crate::constants::MAX_RATE_LIMIT_ATTEMPTS,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,

    /// Longest single backoff pause, in seconds
    #[arg(long, default_value_t = crate::constants::BACKOFF_CEILING_SECS)]
    pub backoff_ceiling: u64,

    /// Snapshots older than this many days are always refetched
    #[arg(long, default_value_t = SNAPSHOT_MAX_AGE_DAYS)]
    pub max_snapshot_age: i64,

    /// Posts younger than this many days are always refetched
    #[arg(long, default_value_t = YOUNG_POST_DAYS)]
    pub young_post_age: i64,

    /// Snapshots retrieved within this many days are not rechecked
    #[arg(long, default_value_t = RECHECK_INTERVAL_DAYS)]
    pub recheck_interval: i64,

    /// Refetch every selected post, ignoring snapshot age
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Stop at the first post that fails instead of moving on
    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,
}

/// How each post is archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOptions {
    pub max_note_pages: u64,
    pub force: bool,
    pub fail_fast: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            max_note_pages: MAX_NOTE_PAGES,
            force: false,
            fail_fast: false,
        }
    }
}

/// Resolved run configuration.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub blog: BlogName,
    pub api_key: ApiKey,
    pub selection: Selection,
    pub archive_dir: PathBuf,
    pub verbose: bool,
    pub cache_ttl: chrono::Duration,
    pub max_attempts: u32,
    pub backoff_ceiling: u64,
    pub staleness: StalenessPolicy,
    pub options: ArchiveOptions,
}

impl ArchiveConfig {
    /// Resolves a complete configuration from CLI input and environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        Self::from_parts(cli, std::env::var(API_KEY_VAR).ok())
    }

    /// Resolves a configuration with an explicitly supplied key.
    pub fn from_parts(cli: CommandLineInput, api_key: Option<String>) -> Result<Self, AppError> {
        let api_key = api_key.ok_or_else(|| {
            AppError::MissingConfiguration(format!("{} environment variable not set", API_KEY_VAR))
        })?;
        let api_key = ApiKey::new(api_key)?;
        let blog = BlogName::new(cli.blog)?;

        let selection = Selection {
            post_ids: parse_ids(&cli.post_ids)?,
            tag_sets: cli
                .tag_sets
                .iter()
                .map(|set| parse_tag_set(set))
                .filter(|tags| !tags.is_empty())
                .collect(),
            master_posts: parse_ids(&cli.master_posts)?,
        };

        if selection.post_ids.is_empty()
            && selection.tag_sets.is_empty()
            && selection.master_posts.is_empty()
        {
            return Err(AppError::MissingConfiguration(
                "nothing to archive: pass --post-id, --tag-set or --master-post".to_string(),
            ));
        }

        Ok(ArchiveConfig {
            blog,
            api_key,
            selection,
            archive_dir: cli.archive_dir,
            verbose: cli.verbose,
            cache_ttl: seconds("--cache-ttl", cli.cache_ttl)?,
            max_attempts: cli.max_attempts,
            backoff_ceiling: cli.backoff_ceiling,
            staleness: StalenessPolicy {
                max_age: days("--max-snapshot-age", cli.max_snapshot_age)?,
                young_post_age: days("--young-post-age", cli.young_post_age)?,
                recheck_interval: days("--recheck-interval", cli.recheck_interval)?,
            },
            options: ArchiveOptions {
                max_note_pages: cli.max_note_pages,
                force: cli.force,
                fail_fast: cli.fail_fast,
            },
        })
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            cache_ttl: self.cache_ttl,
            backoff: BackoffPolicy {
                base_secs: BACKOFF_BASE_SECS,
                ceiling: Duration::from_secs(self.backoff_ceiling),
                max_attempts: self.max_attempts,
            },
            ..ClientSettings::default()
        }
    }

    pub fn staleness_policy(&self) -> StalenessPolicy {
        self.staleness
    }
}

fn out_of_range(field: &'static str, value: impl ToString) -> AppError {
    ValidationError::OutOfRange {
        field,
        value: value.to_string(),
    }
    .into()
}

fn seconds(field: &'static str, value: u64) -> Result<chrono::Duration, AppError> {
    i64::try_from(value)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| out_of_range(field, value))
}

/// A non-negative whole number of days.
fn days(field: &'static str, value: i64) -> Result<chrono::Duration, AppError> {
    if value < 0 {
        return Err(out_of_range(field, value));
    }
    chrono::Duration::try_days(value).ok_or_else(|| out_of_range(field, value))
}

fn parse_tag_set(set: &str) -> Vec<String> {
    set.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_ids(inputs: &[String]) -> Result<Vec<PostId>, AppError> {
    inputs
        .iter()
        .map(|input| PostId::parse(input).map_err(AppError::from))
        .collect()
}
