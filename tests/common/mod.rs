// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use activity_planner::config::Config;
use activity_planner::middleware::auth::create_jwt;
use activity_planner::models::{Activity, Priority, Status};
use activity_planner::repository::MemoryBackend;
use activity_planner::routes::create_router;
use activity_planner::time_utils::FixedClock;
use activity_planner::AppState;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN_ID: u64 = 1;
pub const ALICE_ID: u64 = 2;
pub const BOB_ID: u64 = 3;

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[allow(dead_code)]
pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Friday 15 March 2024; every test app runs at 10:00 on this day.
#[allow(dead_code)]
pub fn today() -> NaiveDate {
    date(2024, 3, 15)
}

/// Alice's week:
///
/// | id | title        | schedule                  | status     | priority |
/// |----|--------------|---------------------------|------------|----------|
/// | 1  | Standup      | 15/03 09:00-09:30         | fatta      | alta     |
/// | 2  | Write report | 15/03 14:00-16:00         | in-corso   | alta     |
/// | 3  | Conference   | 14/03 - 16/03 (all day)   | da-fare    | media    |
/// | 4  | Gym          | 12/03 18:00               | fatta      | bassa    |
/// | 5  | Dentist      | 05/03 (all day)           | rimandata  | media    |
/// | 6  | Old task     | 20/02 (all day)           | fatta      | media    |
#[allow(dead_code)]
pub fn alice_activities() -> Vec<Activity> {
    let mut standup = Activity::new(1, "Standup", today());
    standup.time = Some(time(9, 0));
    standup.end_time = Some(time(9, 30));
    standup.status = Status::Done;
    standup.priority = Priority::High;
    standup.category = Some("work".to_string());

    let mut report = Activity::new(2, "Write report", today());
    report.time = Some(time(14, 0));
    report.end_time = Some(time(16, 0));
    report.status = Status::InProgress;
    report.priority = Priority::High;
    report.category = Some("work".to_string());

    let mut conference = Activity::new(3, "Conference", date(2024, 3, 14));
    conference.end_date = Some(date(2024, 3, 16));
    conference.description = Some("RustConf EU".to_string());

    let mut gym = Activity::new(4, "Gym", date(2024, 3, 12));
    gym.time = Some(time(18, 0));
    gym.status = Status::Done;
    gym.priority = Priority::Low;
    gym.category = Some("health".to_string());

    let mut dentist = Activity::new(5, "Dentist", date(2024, 3, 5));
    dentist.status = Status::Postponed;
    dentist.category = Some("health".to_string());

    let mut old = Activity::new(6, "Old task", date(2024, 2, 20));
    old.status = Status::Done;

    vec![standup, report, conference, gym, dentist, old]
}

/// Backend with `admin` (1), `alice` (2) and `bob` (3); Alice owns
/// [`alice_activities`], Bob owns activity 7.
#[allow(dead_code)]
pub fn seeded_backend() -> MemoryBackend {
    let config = Config::test_default();
    let mut backend = MemoryBackend::new(config.jwt_signing_key.clone())
        .with_clock(Arc::new(FixedClock::at(today(), 10, 0)))
        .with_user("admin", "admin@example.com", "admin123", true)
        .with_user("alice", "alice@example.com", "secret1", false)
        .with_user("bob", "bob@example.com", "secret2", false);
    for activity in alice_activities() {
        backend = backend.with_activity(ALICE_ID, activity);
    }
    backend.with_activity(BOB_ID, Activity::new(7, "Bob's task", today()))
}

/// Create a test app on the seeded in-memory backend.
/// Returns the router, the shared state and the backend.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryBackend>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
) -> (axum::Router, Arc<AppState>, Arc<MemoryBackend>) {
    let backend = Arc::new(seeded_backend());
    let state = Arc::new(AppState::with_backend(
        config,
        backend.clone(),
        Arc::new(FixedClock::at(today(), 10, 0)),
    ));
    (create_router(state.clone()), state, backend)
}

/// Session token for `user_id`, signed with the test key.
#[allow(dead_code)]
pub fn token_for(user_id: u64) -> String {
    create_jwt(user_id, &Config::test_default().jwt_signing_key).unwrap()
}

/// Build a request authenticated as `user_id`, with an optional JSON body.
#[allow(dead_code)]
pub fn authed(method: &str, uri: &str, user_id: u64, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(user_id)));
    with_body(builder, body)
}

/// Build an unauthenticated request with an optional JSON body.
#[allow(dead_code)]
pub fn anonymous(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    with_body(Request::builder().method(method).uri(uri), body)
}

fn with_body(builder: axum::http::request::Builder, body: Option<serde_json::Value>) -> Request<Body> {
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON response body (`Null` if empty).
#[allow(dead_code)]
pub async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    into_json(response).await
}

#[allow(dead_code)]
pub async fn into_json(response: Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
