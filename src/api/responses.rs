// src/api/responses.rs
//! Response envelope and page types for the v2 API.
//!
//! Every v2 response is wrapped as `{ "meta": {...}, "response": {...} }`,
//! with an `errors` array on failure. Pages keep the `response` object as
//! raw JSON because list field names differ per endpoint (`posts`, `notes`);
//! callers pull out the field they need.

use super::params::QueryParams;
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// The `meta` block of the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub status: u16,
    #[serde(default)]
    pub msg: String,
}

/// One entry of the envelope's `errors` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// The full response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub meta: Meta,
    #[serde(default)]
    pub response: Value,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

impl Envelope {
    /// Joins `meta.msg` with every reported error detail.
    pub fn error_message(&self) -> String {
        let details: Vec<&str> = self
            .errors
            .iter()
            .filter_map(|e| e.detail.as_deref().or(e.title.as_deref()))
            .collect();

        if details.is_empty() {
            self.meta.msg.clone()
        } else {
            format!("{}: {}", self.meta.msg, details.join("; "))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Links {
    #[serde(default)]
    next: Option<NextLink>,
}

#[derive(Debug, Clone, Deserialize)]
struct NextLink {
    #[serde(default)]
    query_params: Option<Map<String, Value>>,
}

/// One page of a (possibly paginated) response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    response: Value,
}

impl Page {
    pub fn new(response: Value) -> Self {
        Self { response }
    }

    /// Deserializes the list stored under `field`. A missing field is an empty list.
    pub fn records<T: DeserializeOwned>(&self, field: &str) -> Result<Vec<T>, AppError> {
        match self.response.get(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                AppError::MalformedResponse(format!("field '{}' did not parse: {}", field, e))
            }),
        }
    }

    /// Parameters for the next page, if the response links one.
    pub fn next_params(&self) -> Result<Option<QueryParams>, AppError> {
        let Some(links) = self.response.get("_links") else {
            return Ok(None);
        };
        if links.is_null() {
            return Ok(None);
        }

        let links: Links = serde_json::from_value(links.clone())
            .map_err(|e| AppError::MalformedLink(format!("unreadable _links: {}", e)))?;

        match links.next {
            None => Ok(None),
            Some(NextLink {
                query_params: Some(query),
            }) => QueryParams::from_link(&query).map(Some),
            Some(NextLink { query_params: None }) => Err(AppError::MalformedLink(
                "next link carries no query_params".to_string(),
            )),
        }
    }
}
