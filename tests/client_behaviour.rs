// tests/client_behaviour.rs
//! Pagination, caching and rate-limit handling of the request layer.

mod common;

use common::{api_url, epoch, legacy_body, legacy_url, ManualClock, ScriptedTransport};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tumblr_archive::{
    AppError, BackoffPolicy, BlogName, ClientSettings, NotesMode, PaginatedClient, PostId,
    QueryParams, TumblrApi, TumblrRepository,
};

const NOTES: &str = "/v2/blog/owner/notes";

fn client(transport: &Arc<ScriptedTransport>, clock: &Arc<ManualClock>) -> PaginatedClient {
    PaginatedClient::new(transport.clone(), clock.clone(), ClientSettings::default())
}

fn first_params() -> QueryParams {
    QueryParams::new().with("id", "7").with("mode", "conversation")
}

fn link(before: u64) -> Map<String, Value> {
    json!({ "id": "7", "mode": "conversation", "before_timestamp": before.to_string() })
        .as_object()
        .cloned()
        .unwrap()
}

fn notes_page(count: usize, next: Option<u64>) -> Value {
    let notes: Vec<Value> = (0..count)
        .map(|i| json!({ "type": "reply", "blog_name": format!("b{i}"), "timestamp": i }))
        .collect();
    let mut page = json!({ "notes": notes, "total_notes": 6 });
    if let Some(before) = next {
        page["_links"] = json!({ "next": { "href": "/ignored", "query_params": link(before) } });
    }
    page
}

#[tokio::test]
async fn test_fetch_all_follows_next_links_in_order() {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::at(epoch()));

    let page2 = api_url(NOTES, &QueryParams::from_link(&link(300)).unwrap());
    let page3 = api_url(NOTES, &QueryParams::from_link(&link(200)).unwrap());
    transport.respond_ok(api_url(NOTES, &first_params()), notes_page(3, Some(300)));
    transport.respond_ok(&page2, notes_page(2, Some(200)));
    transport.respond_ok(&page3, notes_page(1, None));

    let client = client(&transport, &clock);
    let pages: Vec<_> = client
        .fetch_all(NOTES, first_params())
        .try_collect()
        .await
        .unwrap();

    let counts: Vec<usize> = pages
        .iter()
        .map(|p| p.records::<Value>("notes").unwrap().len())
        .collect();
    assert_eq!(counts, vec![3, 2, 1]);
    assert_eq!(counts.iter().sum::<usize>(), 6);
    assert_eq!(
        transport.requests(),
        vec![api_url(NOTES, &first_params()), page2, page3]
    );
    assert_eq!(client.request_count(), 3);
}

#[tokio::test]
async fn test_fetch_all_without_next_link_yields_one_page() {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::at(epoch()));
    transport.respond_ok(api_url(NOTES, &first_params()), notes_page(4, None));

    let client = client(&transport, &clock);
    let pages: Vec<_> = client
        .fetch_all(NOTES, first_params())
        .try_collect()
        .await
        .unwrap();

    assert_eq!(pages.len(), 1);
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn test_fetch_all_is_lazy() {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::at(epoch()));
    transport.respond_ok(api_url(NOTES, &first_params()), notes_page(1, Some(300)));

    let client = client(&transport, &clock);
    let stream = client.fetch_all(NOTES, first_params());
    futures::pin_mut!(stream);
    let first = stream.try_next().await.unwrap();

    assert!(first.is_some());
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn test_identical_requests_within_ttl_hit_the_network_once() {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::at(epoch()));
    let url = api_url(NOTES, &first_params());
    transport.respond_ok(&url, notes_page(1, None));

    let client = client(&transport, &clock);
    client.fetch(NOTES, &first_params()).await.unwrap();
    clock.advance(chrono::Duration::minutes(10));
    client.fetch(NOTES, &first_params()).await.unwrap();

    assert_eq!(transport.requests_to(&url), 1);
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn test_identical_requests_after_ttl_hit_the_network_twice() {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::at(epoch()));
    let url = api_url(NOTES, &first_params());
    transport.respond_ok(&url, notes_page(1, None));

    let client = client(&transport, &clock);
    client.fetch(NOTES, &first_params()).await.unwrap();
    clock.advance(chrono::Duration::minutes(16));
    client.fetch(NOTES, &first_params()).await.unwrap();

    assert_eq!(transport.requests_to(&url), 2);
    assert_eq!(client.request_count(), 2);
}

#[tokio::test]
async fn test_rate_limit_then_success_sleeps_once() {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::at(epoch()));
    let url = legacy_url("someone", "11");
    transport.respond(&url, 429, "");
    transport.respond(&url, 200, legacy_body("11", "someone", None, &["art"]));

    let api = TumblrApi::new(client(&transport, &clock));
    let post = api
        .legacy_post("someone", &PostId::parse("11").unwrap())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(post.tags, vec!["art".to_string()]);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(5)]);
    assert_eq!(api.request_count(), 2);
}

#[tokio::test]
async fn test_not_found_is_absent_not_an_error() {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::at(epoch()));
    let api = TumblrApi::new(client(&transport, &clock));

    let legacy = api
        .legacy_post("someone", &PostId::parse("12").unwrap())
        .await
        .unwrap();
    let post = api.post("someone", &PostId::parse("12").unwrap()).await.unwrap();

    assert_eq!(legacy, None);
    assert_eq!(post, None);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_other_errors_carry_status_and_details() {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::at(epoch()));
    let url = api_url(NOTES, &first_params());
    transport.respond(
        &url,
        401,
        json!({
            "meta": { "status": 401, "msg": "Unauthorized" },
            "response": [],
            "errors": [{ "title": "Unauthorized", "detail": "No user was found" },
                       { "title": "Unauthorized", "detail": "Check your key" }]
        })
        .to_string(),
    );

    let err = client(&transport, &clock)
        .fetch(NOTES, &first_params())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "401 Unauthorized: No user was found; Check your key"
    );
}

#[tokio::test]
async fn test_persistent_rate_limiting_is_fatal_after_the_attempt_budget() {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::at(epoch()));
    let url = api_url(NOTES, &first_params());
    transport.respond(&url, 429, "");

    let settings = ClientSettings {
        backoff: BackoffPolicy {
            max_attempts: 3,
            ..BackoffPolicy::default()
        },
        ..ClientSettings::default()
    };
    let client = PaginatedClient::new(transport.clone(), clock.clone(), settings);
    let err = client.fetch(NOTES, &first_params()).await.unwrap_err();

    assert!(matches!(err, AppError::RateLimitExhausted { attempts: 3, .. }));
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(5), Duration::from_secs(25)]
    );
    assert_eq!(client.request_count(), 3);
}

#[tokio::test]
async fn test_envelope_status_is_checked_even_on_http_success() {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::at(epoch()));
    let url = api_url(NOTES, &first_params());
    transport.respond(
        &url,
        200,
        json!({ "meta": { "status": 400, "msg": "Bad Request" }, "response": [] }).to_string(),
    );

    let err = client(&transport, &clock)
        .fetch(NOTES, &first_params())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Upstream { status: 400, .. }));
}

#[tokio::test]
async fn test_repository_flattens_note_pages() {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::at(epoch()));
    let page2 = api_url(NOTES, &QueryParams::from_link(&link(300)).unwrap());
    transport.respond_ok(api_url(NOTES, &first_params()), notes_page(3, Some(300)));
    transport.respond_ok(&page2, notes_page(2, None));

    let api = TumblrApi::new(client(&transport, &clock));
    let notes = api
        .notes(
            &BlogName::new("owner").unwrap(),
            &PostId::parse("7").unwrap(),
            NotesMode::Conversation,
        )
        .await
        .unwrap();

    assert_eq!(notes.len(), 5);
}
