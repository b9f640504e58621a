// src/api/client.rs
//! Pure HTTP client wrapper for the Tumblr API.
//!
//! A thin wrapper around reqwest. It authenticates v2 requests and returns
//! status plus body, without interpreting either: classification, retry and
//! caching happen in [`PaginatedClient`](super::PaginatedClient).

use super::Transport;
use crate::constants::TUMBLR_API_BASE_URL;
use crate::error::AppError;
use crate::types::ApiKey;
use reqwest::{header, Client, Response};

const USER_AGENT: &str = concat!("tumblr-archive/", env!("CARGO_PKG_VERSION"));

/// A thin wrapper around reqwest Client for Tumblr requests.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    api_key: ApiKey,
}

impl HttpTransport {
    /// Creates a new HTTP client that signs v2 requests with the consumer key.
    pub fn new(api_key: &ApiKey) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers())
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.clone(),
        })
    }

    /// Creates the default headers for every request.
    fn create_headers() -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json, text/javascript"),
        );
        headers
    }

    /// Whether the URL targets the v2 API, which needs the consumer key.
    fn needs_api_key(url: &str) -> bool {
        url.starts_with(TUMBLR_API_BASE_URL)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<ApiResponse<String>, AppError> {
        let mut request = self.client.get(url);
        if Self::needs_api_key(url) {
            request = request.query(&[("api_key", self.api_key.as_str())]);
        }

        let response = request.send().await?;
        log::debug!("{} -> {}", url, response.status());
        extract_response_text(response, url).await
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

impl ApiResponse<String> {
    /// Builds a response from parts; used by alternative transports.
    pub fn new(status: u16, data: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            status: reqwest::StatusCode::from_u16(status)
                .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            url: url.into(),
        }
    }
}

/// Extracts the response body as text with metadata.
///
/// The URL recorded is the one requested, without the api key the
/// transport appended.
pub async fn extract_response_text(
    response: Response,
    requested_url: &str,
) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url: requested_url.to_string(),
    })
}
