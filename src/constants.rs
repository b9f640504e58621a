// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains. Most of them
//! are defaults that `ArchiveConfig` lets the command line override.

// ---------------------------------------------------------------------------
// Tumblr API boundaries
// ---------------------------------------------------------------------------

/// Base URL of the v2 API.
pub const TUMBLR_API_BASE_URL: &str = "https://api.tumblr.com";

/// How many notes the notes endpoint returns per page.
pub const NOTES_PAGE_SIZE: u64 = 50;

/// Posts needing more note pages than this are skipped with a warning.
pub const MAX_NOTE_PAGES: u64 = 10;

/// Prefix the legacy read endpoint wraps its JSON payload in.
pub const LEGACY_PAYLOAD_HEADER: &str = "var tumblr_api_read = ";

/// Suffix of the legacy payload, after trailing whitespace is removed.
pub const LEGACY_PAYLOAD_FOOTER: &str = ";";

// ---------------------------------------------------------------------------
// Request budget
// ---------------------------------------------------------------------------

/// How long an identical request is answered from memory.
pub const RESPONSE_CACHE_TTL_SECS: u64 = 15 * 60;

/// Base of the exponential backoff: the n-th rate-limited attempt waits `5^n` seconds.
pub const BACKOFF_BASE_SECS: u64 = 5;

/// Upper bound on a single backoff pause.
pub const BACKOFF_CEILING_SECS: u64 = 60 * 60;

/// Attempts made at one request before rate limiting becomes fatal.
pub const MAX_RATE_LIMIT_ATTEMPTS: u32 = 8;

// ---------------------------------------------------------------------------
// Staleness
// ---------------------------------------------------------------------------

/// Snapshots older than this are always refetched.
///
/// Deliberately not a multiple of the weekly posting cadence, so rechecks
/// drift across weekdays instead of always landing on release day.
pub const SNAPSHOT_MAX_AGE_DAYS: i64 = 18;

/// Posts younger than this are always refetched; they are still gathering notes.
pub const YOUNG_POST_DAYS: i64 = 2;

/// Snapshots retrieved more recently than this are not rechecked at all.
pub const RECHECK_INTERVAL_DAYS: i64 = 2;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Directory snapshots are written to when none is configured.
pub const DEFAULT_ARCHIVE_DIR: &str = "_site";
