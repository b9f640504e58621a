// src/api/params.rs
//! Query parameters with the API's array convention.
//!
//! The v2 API expects array parameters as indexed keys (`tag[0]=a&tag[1]=b`).
//! The encoded form doubles as the response cache key, so encoding must be
//! deterministic: parameters keep their insertion order.

use crate::error::AppError;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

/// Ordered query parameters for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(IndexMap<String, ParamValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a scalar parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), ParamValue::Single(value.into()));
        self
    }

    /// Adds (or replaces) an array parameter.
    pub fn with_list<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.0.insert(key.into(), ParamValue::List(values));
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encodes as a query string, expanding arrays into `key[i]` pairs.
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            match value {
                ParamValue::Single(v) => {
                    serializer.append_pair(key, v);
                }
                ParamValue::List(values) => {
                    for (index, v) in values.iter().enumerate() {
                        serializer.append_pair(&format!("{}[{}]", key, index), v);
                    }
                }
            }
        }
        serializer.finish()
    }

    /// Builds parameters from a pagination link's `query_params` object.
    ///
    /// Scalars become single values and arrays of scalars become lists.
    /// Cursor parameters the API documents as numeric must parse as numbers.
    pub fn from_link(query_params: &Map<String, Value>) -> Result<Self, AppError> {
        let mut params = QueryParams::new();

        for (key, value) in query_params {
            let parsed = match value {
                Value::Array(items) => ParamValue::List(
                    items
                        .iter()
                        .map(|item| scalar_to_string(key, item))
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                other => ParamValue::Single(scalar_to_string(key, other)?),
            };

            if NUMERIC_CURSOR_KEYS.contains(&key.as_str()) {
                if let ParamValue::Single(v) = &parsed {
                    if v.parse::<u64>().is_err() {
                        return Err(AppError::MalformedLink(format!(
                            "next link parameter {} is not numeric: {}",
                            key, v
                        )));
                    }
                }
            }

            params.0.insert(key.clone(), parsed);
        }

        Ok(params)
    }
}

const NUMERIC_CURSOR_KEYS: &[&str] = &["before_timestamp", "offset", "before_id"];

fn scalar_to_string(key: &str, value: &Value) -> Result<String, AppError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(AppError::MalformedLink(format!(
            "next link parameter {} has unsupported value {}",
            key, other
        ))),
    }
}
