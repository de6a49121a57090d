// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity CRUD and status lifecycle through the router.

mod common;

use activity_planner::models::{ActivityId, Status};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_unauthenticated_requests_rejected() {
    let (app, _, _) = create_test_app();

    let (status, body) = send(&app, anonymous("GET", "/api/activities", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let request = axum::http::Request::builder()
        .uri("/api/activities")
        .header("Authorization", "Bearer not-a-token")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_list_returns_only_own_activities_newest_first() {
    let (app, _, _) = create_test_app();

    let (status, body) = send(&app, authed("GET", "/api/activities", ALICE_ID, None)).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 1, 3, 4, 5, 6]);

    let (_, body) = send(&app, authed("GET", "/api/activities", BOB_ID, None)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Bob's task");
}

#[tokio::test]
async fn test_list_filters_forwarded() {
    let (app, _, _) = create_test_app();

    let (status, body) = send(
        &app,
        authed("GET", "/api/activities?status=fatta&category=work", ALICE_ID, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Standup");
}

#[tokio::test]
async fn test_full_listing_refreshes_snapshot_but_filtered_does_not() {
    let (app, state, _) = create_test_app();

    send(&app, authed("GET", "/api/activities?status=fatta", ALICE_ID, None)).await;
    assert!(state.store.list(ALICE_ID).is_none());

    send(&app, authed("GET", "/api/activities", ALICE_ID, None)).await;
    assert_eq!(state.store.list(ALICE_ID).map(|l| l.len()), Some(6));
}

#[tokio::test]
async fn test_activity_json_shape() {
    let (app, _, _) = create_test_app();

    let (status, body) = send(&app, authed("GET", "/api/activities/2", ALICE_ID, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Write report");
    assert_eq!(body["date"], "2024-03-15");
    assert_eq!(body["time"], "14:00");
    assert_eq!(body["endTime"], "16:00");
    assert_eq!(body["status"], "in-corso");
    assert_eq!(body["priority"], "alta");
    assert_eq!(body["category"], "work");
}

#[tokio::test]
async fn test_other_users_activity_is_not_found() {
    let (app, _, _) = create_test_app();

    let (status, body) = send(&app, authed("GET", "/api/activities/7", ALICE_ID, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["activityId"], 7);
}

#[tokio::test]
async fn test_create_activity() {
    let (app, state, _) = create_test_app();
    send(&app, authed("GET", "/api/activities", ALICE_ID, None)).await;

    let (status, body) = send(
        &app,
        authed(
            "POST",
            "/api/activities",
            ALICE_ID,
            Some(json!({
                "title": "  Plan sprint  ",
                "date": "2024-03-18",
                "time": "10:00",
                "endTime": "11:30",
                "priority": "alta"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Plan sprint");
    assert_eq!(body["status"], "da-fare");
    assert_eq!(body["priority"], "alta");
    assert_eq!(body["id"], 8);

    // The confirmed snapshot learns about the new activity.
    let snapshot = state.store.list(ALICE_ID).unwrap();
    assert!(snapshot.iter().any(|a| a.id == ActivityId(8)));
}

#[tokio::test]
async fn test_create_rejects_invalid_drafts() {
    let (app, _, _) = create_test_app();

    let cases = [
        json!({"title": "   ", "date": "2024-03-18"}),
        json!({"title": "Span", "date": "2024-03-18", "endDate": "2024-03-17"}),
        json!({"title": "Times", "date": "2024-03-18", "time": "11:00", "endTime": "10:00"}),
        json!({"title": "x".repeat(201), "date": "2024-03-18"}),
    ];

    for draft in cases {
        let (status, body) = send(
            &app,
            authed("POST", "/api/activities", ALICE_ID, Some(draft.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "draft {} should be rejected", draft);
        assert_eq!(body["error"], "validation_error");
    }
}

#[tokio::test]
async fn test_update_activity_partial() {
    let (app, _, _) = create_test_app();

    let (status, body) = send(
        &app,
        authed(
            "PUT",
            "/api/activities/4",
            ALICE_ID,
            Some(json!({"title": "Gym (legs)", "category": null})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Gym (legs)");
    assert_eq!(body["category"], serde_json::Value::Null);
    assert_eq!(body["time"], "18:00");
    assert_eq!(body["status"], "fatta");
}

#[tokio::test]
async fn test_update_checks_span_against_merged_activity() {
    let (app, _, backend) = create_test_app();

    // Standup runs 09:00-09:30; a new start of 10:00 would end before it starts.
    let (status, body) = send(
        &app,
        authed("PUT", "/api/activities/1", ALICE_ID, Some(json!({"time": "10:00"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let user = activity_planner::middleware::auth::AuthUser {
        user_id: ALICE_ID,
        token: token_for(ALICE_ID),
    };
    use activity_planner::repository::ActivityRepository;
    let standup = backend.get(&user, ActivityId(1)).await.unwrap();
    assert_eq!(standup.time, Some(time(9, 0)));
}

#[tokio::test]
async fn test_update_missing_activity() {
    let (app, _, _) = create_test_app();

    let (status, body) = send(
        &app,
        authed("PUT", "/api/activities/99", ALICE_ID, Some(json!({"title": "Nope"}))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["activityId"], 99);
}

#[tokio::test]
async fn test_delete_activity() {
    let (app, state, _) = create_test_app();
    send(&app, authed("GET", "/api/activities", ALICE_ID, None)).await;

    let (status, body) = send(&app, authed("DELETE", "/api/activities/6", ALICE_ID, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Activity deleted");
    assert!(state.store.get(ALICE_ID, ActivityId(6)).is_none());

    let (status, _) = send(&app, authed("GET", "/api/activities/6", ALICE_ID, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, authed("DELETE", "/api/activities/6", ALICE_ID, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["activityId"], 6);
}

#[tokio::test]
async fn test_set_status() {
    let (app, state, _) = create_test_app();
    send(&app, authed("GET", "/api/activities", ALICE_ID, None)).await;

    let (status, body) = send(
        &app,
        authed(
            "PATCH",
            "/api/activities/3/status",
            ALICE_ID,
            Some(json!({"status": "rimandata"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rimandata");
    assert_eq!(
        state.store.get(ALICE_ID, ActivityId(3)).map(|a| a.status),
        Some(Status::Postponed)
    );
}

#[tokio::test]
async fn test_set_status_rejects_unknown_value() {
    let (app, _, _) = create_test_app();

    let (status, _) = send(
        &app,
        authed(
            "PATCH",
            "/api/activities/3/status",
            ALICE_ID,
            Some(json!({"status": "finished"})),
        ),
    )
    .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_malformed_input_gets_json_error_body() {
    let (app, _, _) = create_test_app();

    let (status, body) = send(
        &app,
        authed(
            "PATCH",
            "/api/activities/3/status",
            ALICE_ID,
            Some(json!({"status": "finished"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["details"].is_string());

    let (status, body) = send(&app, authed("GET", "/api/activities/abc", ALICE_ID, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = send(
        &app,
        authed("GET", "/api/activities?status=finished", ALICE_ID, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let truncated = Request::builder()
        .method("POST")
        .uri("/api/activities")
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(ALICE_ID)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"title": "Gym""#))
        .unwrap();
    let response = app.clone().oneshot(truncated).await.unwrap();
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let (status, body) = into_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_cycle_status_walks_the_lifecycle() {
    let (app, _, _) = create_test_app();

    let mut seen = Vec::new();
    for _ in 0..4 {
        let (status, body) = send(
            &app,
            authed("POST", "/api/activities/3/status/cycle", ALICE_ID, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        seen.push(body["status"].as_str().unwrap().to_string());
    }
    assert_eq!(seen, vec!["in-corso", "fatta", "rimandata", "da-fare"]);
}

#[tokio::test]
async fn test_failed_status_change_leaves_snapshot_untouched() {
    let (app, state, backend) = create_test_app();
    send(&app, authed("GET", "/api/activities", ALICE_ID, None)).await;

    backend.set_offline(true);
    let (status, body) = send(
        &app,
        authed(
            "PATCH",
            "/api/activities/2/status",
            ALICE_ID,
            Some(json!({"status": "fatta"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "backend_unavailable");
    assert_eq!(body["activityId"], 2);
    assert_eq!(
        state.store.get(ALICE_ID, ActivityId(2)).map(|a| a.status),
        Some(Status::InProgress)
    );
}

#[tokio::test]
async fn test_list_by_date_includes_spanning_activities() {
    let (app, _, _) = create_test_app();

    let (status, body) = send(
        &app,
        authed("GET", "/api/activities/date/2024-03-16", ALICE_ID, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Conference"]);

    let (status, _) = send(
        &app,
        authed("GET", "/api/activities/date/16-03-2024", ALICE_ID, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_by_status() {
    let (app, _, _) = create_test_app();

    let (status, body) = send(
        &app,
        authed("GET", "/api/activities/status/fatta", ALICE_ID, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = send(
        &app,
        authed("GET", "/api/activities/status/done", ALICE_ID, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_categories_and_server_stats() {
    let (app, _, _) = create_test_app();

    let (status, body) = send(
        &app,
        authed("GET", "/api/activities/categories", ALICE_ID, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["health", "work"]));

    let (status, body) = send(&app, authed("GET", "/api/activities/stats", ALICE_ID, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 6);
    assert_eq!(body["byStatus"]["fatta"], 3);
}
