// tests/common/mod.rs
//! Shared test doubles: a scripted transport and a manual clock.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tumblr_archive::api::ApiResponse;
use tumblr_archive::{AppError, Clock, QueryParams, Transport};

pub const API: &str = "https://api.tumblr.com";

/// Answers GETs from a script keyed by exact URL. Each URL plays its queued
/// responses in order and then keeps repeating the last one; unscripted URLs
/// answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<HashMap<String, VecDeque<(u16, String)>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.script
            .lock()
            .entry(url.into())
            .or_default()
            .push_back((status, body.into()));
    }

    /// Scripts a 200 v2 envelope around `response`.
    pub fn respond_ok(&self, url: impl Into<String>, response: Value) {
        self.respond(url, 200, envelope(response));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|r| *r == url).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<ApiResponse<String>, AppError> {
        self.requests.lock().push(url.to_string());

        let mut script = self.script.lock();
        let (status, body) = match script.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or((404, String::new())),
            Some(queue) => queue.front().cloned().unwrap_or((404, String::new())),
            None => (404, String::new()),
        };
        Ok(ApiResponse::new(status, body, url))
    }
}

/// A clock that only moves when told to, or when something sleeps on it.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock() += by;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        let step = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
        *self.now.lock() += step;
    }
}

/// A fixed point in time tests start from.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn envelope(response: Value) -> String {
    json!({ "meta": { "status": 200, "msg": "OK" }, "response": response }).to_string()
}

/// The URL the client requests for a v2 path.
pub fn api_url(path: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        format!("{}{}", API, path)
    } else {
        format!("{}{}?{}", API, path, params.encode())
    }
}

pub fn legacy_url(blog: &str, id: &str) -> String {
    format!("https://{}.tumblr.com/api/read/json?id={}", blog, id)
}

/// A legacy endpoint body for one post.
pub fn legacy_body(id: &str, blog: &str, reblogged_from: Option<&str>, tags: &[&str]) -> String {
    let mut post = json!({
        "id": id,
        "url": format!("https://{}.tumblr.com/post/{}", blog, id),
        "tags": tags,
    });
    if let Some(from) = reblogged_from {
        post["reblogged-from-url"] = json!(from);
    }
    format!("var tumblr_api_read = {};\n", json!({ "posts": [post] }))
}
