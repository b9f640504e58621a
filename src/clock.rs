// src/clock.rs
//! Time as a capability.
//!
//! The cache, the backoff loop and the staleness policy all ask a [`Clock`]
//! for the time instead of reading it directly, so a run can be replayed
//! against a scripted clock.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// The ability to read the current time and to wait.
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

/// Wall-clock time with real tokio sleeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait::async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
