// src/error_recovery.rs
//! Retry with exponential backoff for rate-limited API operations.

use crate::clock::Clock;
use crate::constants::{BACKOFF_BASE_SECS, BACKOFF_CEILING_SECS, MAX_RATE_LIMIT_ATTEMPTS};
use crate::error::AppError;
use std::time::Duration;

/// How long to wait after each rate-limited attempt, and how many to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_secs: u64,
    pub ceiling: Duration,
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_secs: BACKOFF_BASE_SECS,
            ceiling: Duration::from_secs(BACKOFF_CEILING_SECS),
            max_attempts: MAX_RATE_LIMIT_ATTEMPTS,
        }
    }
}

impl BackoffPolicy {
    /// The pause after the given (1-based) attempt: `base^attempt` seconds, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let secs = self
            .base_secs
            .checked_pow(attempt)
            .unwrap_or(u64::MAX);
        Duration::from_secs(secs).min(self.ceiling)
    }
}

/// Outcome of one attempt at a rate-limited operation.
#[derive(Debug)]
pub enum Attempt<T> {
    Done(T),
    RateLimited,
}

/// Repeats `operation` while it reports [`Attempt::RateLimited`], sleeping
/// between attempts. Errors from the operation propagate immediately.
pub async fn retry_rate_limited<F, T, Fut>(
    policy: &BackoffPolicy,
    clock: &dyn Clock,
    uri: &str,
    mut operation: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<Attempt<T>, AppError>>,
{
    for attempt in 1..=policy.max_attempts {
        match operation().await? {
            Attempt::Done(result) => return Ok(result),
            Attempt::RateLimited if attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                log::warn!("\tBack off for {}s ({})", delay.as_secs(), uri);
                clock.sleep(delay).await;
            }
            Attempt::RateLimited => {}
        }
    }

    Err(AppError::RateLimitExhausted {
        attempts: policy.max_attempts,
        uri: uri.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_grow_by_powers_of_five() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(5));
        assert_eq!(policy.delay_for(2), Duration::from_secs(25));
        assert_eq!(policy.delay_for(3), Duration::from_secs(125));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = BackoffPolicy {
            ceiling: Duration::from_secs(100),
            ..BackoffPolicy::default()
        };
        assert_eq!(policy.delay_for(3), Duration::from_secs(100));
        assert_eq!(policy.delay_for(90), Duration::from_secs(100));
    }
}
