// src/api/paginated.rs
//! The request layer every API call goes through.
//!
//! One [`PaginatedClient`] owns, for the length of a run, the response cache
//! and the request counter. Each call is:
//!   1. answered from the cache when an identical URI succeeded recently,
//!   2. otherwise sent, counted, and retried with backoff while rate limited,
//!   3. classified: 404 becomes `None`, other error statuses become errors.

use super::cache::ResponseCache;
use super::params::QueryParams;
use super::responses::{Envelope, Page};
use super::Transport;
use crate::clock::Clock;
use crate::constants::{RESPONSE_CACHE_TTL_SECS, TUMBLR_API_BASE_URL};
use crate::error::{AppError, UpstreamStatus};
use crate::error_recovery::{retry_rate_limited, Attempt, BackoffPolicy};
use futures::Stream;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Tunables for the request layer.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub cache_ttl: chrono::Duration,
    pub backoff: BackoffPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: TUMBLR_API_BASE_URL.to_string(),
            cache_ttl: chrono::Duration::seconds(RESPONSE_CACHE_TTL_SECS as i64),
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Authenticated, cached, rate-limit-aware access to the API.
pub struct PaginatedClient {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    cache: ResponseCache,
    settings: ClientSettings,
    requests: AtomicU64,
}

impl PaginatedClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        settings: ClientSettings,
    ) -> Self {
        Self {
            transport,
            clock,
            cache: ResponseCache::new(settings.cache_ttl),
            settings,
            requests: AtomicU64::new(0),
        }
    }

    /// Network calls made so far; cache hits are not counted.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Builds the full URI for an API path.
    pub fn uri(&self, path: &str, params: &QueryParams) -> String {
        if params.is_empty() {
            format!("{}{}", self.settings.base_url, path)
        } else {
            format!("{}{}?{}", self.settings.base_url, path, params.encode())
        }
    }

    /// GETs a URI and returns its body, or `None` when the resource is absent.
    ///
    /// Successful bodies are cached; the envelope is not inspected here, so
    /// this also serves the legacy endpoint.
    pub async fn get_body(&self, uri: &str) -> Result<Option<String>, AppError> {
        if let Some(cached) = self.cache.get(uri, self.clock.now()) {
            log::debug!("Cache hit: {}", uri);
            return Ok(Some(cached));
        }

        let response = retry_rate_limited(&self.settings.backoff, self.clock.as_ref(), uri, || {
            self.send_once(uri)
        })
        .await?;

        match UpstreamStatus::from_code(response.status.as_u16()) {
            UpstreamStatus::Success => {
                self.cache.set(uri, &response.data, self.clock.now());
                Ok(Some(response.data))
            }
            UpstreamStatus::NotFound => {
                log::debug!("Not found: {}", uri);
                Ok(None)
            }
            UpstreamStatus::Fault(status) => Err(upstream_fault(status, &response.data)),
            UpstreamStatus::RateLimited => Err(AppError::RateLimitExhausted {
                attempts: self.settings.backoff.max_attempts,
                uri: uri.to_string(),
            }),
        }
    }

    async fn send_once(
        &self,
        uri: &str,
    ) -> Result<Attempt<super::client::ApiResponse<String>>, AppError> {
        log::info!("GET {}", uri);
        self.requests.fetch_add(1, Ordering::Relaxed);
        let response = self.transport.get(uri).await?;

        if UpstreamStatus::from_code(response.status.as_u16()).is_retryable() {
            Ok(Attempt::RateLimited)
        } else {
            Ok(Attempt::Done(response))
        }
    }

    /// Fetches one page of a v2 endpoint.
    pub async fn fetch(&self, path: &str, params: &QueryParams) -> Result<Option<Page>, AppError> {
        let uri = self.uri(path, params);
        let Some(body) = self.get_body(&uri).await? else {
            return Ok(None);
        };

        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| {
            AppError::MalformedResponse(format!("{}: not a v2 envelope: {}", uri, e))
        })?;

        match UpstreamStatus::from_code(envelope.meta.status) {
            UpstreamStatus::Success => Ok(Some(Page::new(envelope.response))),
            UpstreamStatus::NotFound => Ok(None),
            _ => Err(AppError::Upstream {
                status: envelope.meta.status,
                message: envelope.error_message(),
            }),
        }
    }

    /// Lazily walks every page of a paginated endpoint.
    ///
    /// Each page is requested only when the stream is polled for it, and the
    /// stream ends after the first page without a next link (or when a page
    /// turns out to be absent). Accumulating records is up to the caller.
    pub fn fetch_all<'a>(
        &'a self,
        path: &'a str,
        params: QueryParams,
    ) -> impl Stream<Item = Result<Page, AppError>> + 'a {
        futures::stream::try_unfold(Some(params), move |next| async move {
            let Some(params) = next else {
                return Ok::<_, AppError>(None);
            };
            let Some(page) = self.fetch(path, &params).await? else {
                return Ok(None);
            };
            let following = page.next_params()?;
            Ok(Some((page, following)))
        })
    }

    /// Fetches the first record of the list under `field`, if any.
    pub async fn fetch_single<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
        field: &str,
    ) -> Result<Option<T>, AppError> {
        let Some(page) = self.fetch(path, params).await? else {
            return Ok(None);
        };
        Ok(page.records::<T>(field)?.into_iter().next())
    }
}

/// Builds the fatal error for a non-retryable status, reading the envelope
/// when the body has one.
fn upstream_fault(status: u16, body: &str) -> AppError {
    let message = match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => envelope.error_message(),
        Err(_) => reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown error")
            .to_string(),
    };
    AppError::Upstream { status, message }
}
