use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use countdown_timer::{
    api::create_router,
    persistence::{KeyValueStore, MemoryStore, SnapshotStore},
    services::{FixedClock, Notifier},
    state::AppState,
    tasks::{timer_event_loop, TimerDriver},
    timer::{MachineFeatures, TimerMachine},
};

struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn play_start_sound(&self) {}
    fn play_completion_sound(&self) {}
}

fn spawn_app(store: Arc<MemoryStore>) -> Router {
    let snapshots = SnapshotStore::new(store);
    let machine = match snapshots.restore() {
        Some(context) => TimerMachine::restored(MachineFeatures::default(), context),
        None => TimerMachine::new(MachineFeatures::default()),
    };

    let (driver, commands, command_rx) = TimerDriver::new(
        machine,
        Arc::new(SilentNotifier),
        Some(snapshots),
        Arc::new(FixedClock(1_700_000_000_000)),
        Duration::from_secs(1),
    );
    let state = Arc::new(AppState::new(
        0,
        "127.0.0.1".to_string(),
        commands,
        driver.subscribe(),
    ));
    tokio::spawn(timer_event_loop(driver, command_rx));
    create_router(state)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(app: &Router, uri: &str) -> Value {
    let (status, body) = call(app, Method::POST, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    body
}

async fn put(app: &Router, uri: &str, json: &str) -> Value {
    let (status, body) = call(app, Method::PUT, uri, Some(json)).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn health_reports_ok() {
    let app = spawn_app(Arc::new(MemoryStore::new()));
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn field_updates_are_clamped() {
    let app = spawn_app(Arc::new(MemoryStore::new()));

    let body = put(&app, "/timer/hours", r#"{"value": 99}"#).await;
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["timer"]["hours"], 23);

    let body = put(&app, "/timer/minutes", r#"{"value": "oops"}"#).await;
    assert_eq!(body["timer"]["minutes"], 0);

    let body = put(&app, "/timer/seconds", r#"{"value": 30}"#).await;
    assert_eq!(body["timer"]["remaining_ms"], 23 * 3_600_000 + 30_000);
    assert_eq!(body["timer"]["remaining"], "23:00:30");
}

#[tokio::test]
async fn oversized_and_malformed_bodies_still_clamp() {
    let app = spawn_app(Arc::new(MemoryStore::new()));

    let body = put(&app, "/timer/hours", r#"{"value": 1e400}"#).await;
    assert_eq!(body["timer"]["hours"], 23);

    let body = put(&app, "/timer/minutes", "{not json").await;
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["timer"]["minutes"], 0);
}

#[tokio::test]
async fn start_without_duration_is_ignored() {
    let app = spawn_app(Arc::new(MemoryStore::new()));
    let body = post(&app, "/timer/start").await;
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["timer"]["state"], "idle");
}

#[tokio::test(start_paused = true)]
async fn countdown_runs_to_finished() {
    let store = Arc::new(MemoryStore::new());
    let app = spawn_app(store.clone());

    put(&app, "/timer/seconds", r#"{"value": 5}"#).await;
    let body = post(&app, "/timer/start").await;
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["timer"]["state"], "working");
    assert_eq!(body["timer"]["title"], "00:00:05 - Timer");
    assert_eq!(store.get("durationInMs").unwrap().as_deref(), Some("5000"));

    // Field edits are not accepted while counting down.
    let body = put(&app, "/timer/minutes", r#"{"value": 3}"#).await;
    assert_eq!(body["status"], "ignored");

    tokio::time::sleep(Duration::from_millis(5_500)).await;

    let (_, status) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(status["timer"]["state"], "finished");
    assert_eq!(status["timer"]["remaining_ms"], 0);
    assert_eq!(status["last_action"], "START");
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn stop_and_continue() {
    let app = spawn_app(Arc::new(MemoryStore::new()));

    put(&app, "/timer/seconds", r#"{"value": 5}"#).await;
    post(&app, "/timer/start").await;
    tokio::time::sleep(Duration::from_millis(2_500)).await;

    let body = post(&app, "/timer/stop").await;
    assert_eq!(body["timer"]["state"], "stopped");
    assert_eq!(body["timer"]["remaining_ms"], 3_000);

    tokio::time::sleep(Duration::from_secs(10)).await;
    let (_, status) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(status["timer"]["remaining_ms"], 3_000);

    let body = post(&app, "/timer/continue").await;
    assert_eq!(body["timer"]["state"], "working");

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let (_, status) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(status["timer"]["remaining_ms"], 2_000);
}

#[tokio::test]
async fn clear_resets_and_erases_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let app = spawn_app(store.clone());

    put(&app, "/timer/minutes", r#"{"value": 2}"#).await;
    post(&app, "/timer/start").await;
    assert!(!store.is_empty());

    let body = post(&app, "/timer/clear").await;
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["timer"]["state"], "idle");
    assert_eq!(body["timer"]["minutes"], 0);
    assert_eq!(body["timer"]["remaining_ms"], 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn restores_snapshot_without_resuming() {
    let store = Arc::new(MemoryStore::new());
    store.set("hours", "0").unwrap();
    store.set("minutes", "1").unwrap();
    store.set("seconds", "0").unwrap();
    store.set("durationInMs", "60000").unwrap();

    let app = spawn_app(store);
    let (_, status) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(status["timer"]["state"], "idle");
    assert_eq!(status["timer"]["minutes"], 1);
    assert_eq!(status["timer"]["remaining_ms"], 60_000);
}
