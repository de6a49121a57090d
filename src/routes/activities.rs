// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity CRUD and status routes.
//!
//! Every mutation goes to the backend first; the snapshot only learns about
//! it once the backend has confirmed.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::activity::check_span;
use crate::models::{
    Activity, ActivityDraft, ActivityId, ActivityPatch, ServerStats, Status, StatusChange,
};
use crate::repository::ActivityFilter;
use crate::services::lifecycle;
use crate::time_utils::parse_date;
use crate::AppState;
use super::{JsonBody, PathParam, QueryParams};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

/// Activity routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(list_activities).post(create_activity))
        .route("/api/activities/categories", get(get_categories))
        .route("/api/activities/stats", get(get_server_stats))
        .route("/api/activities/date/{date}", get(list_by_date))
        .route("/api/activities/status/{status}", get(list_by_status))
        .route(
            "/api/activities/{id}",
            get(get_activity).put(update_activity).delete(delete_activity),
        )
        .route("/api/activities/{id}/status", patch(set_status))
        .route("/api/activities/{id}/status/cycle", post(cycle_status))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// List the user's activities, optionally filtered server-side.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(filter), _): QueryParams<ActivityFilter>,
) -> Result<Json<Vec<Activity>>> {
    tracing::debug!(user_id = user.user_id, filter = ?filter, "Listing activities");

    let activities = state.repository.list(&user, &filter).await?;
    if filter.is_empty() {
        // A full listing is a fresh confirmed snapshot.
        state
            .store
            .replace(user.user_id, activities.clone(), state.clock.now());
    }
    Ok(Json(activities))
}

async fn get_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParam<u64>,
) -> Result<Json<Activity>> {
    let id = ActivityId(id);
    if let Some(activity) = state.store.get(user.user_id, id) {
        return Ok(Json(activity));
    }
    let activity = state
        .repository
        .get(&user, id)
        .await
        .map_err(|err| AppError::for_activity(id, err))?;
    Ok(Json(activity))
}

async fn create_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(draft), _): JsonBody<ActivityDraft>,
) -> Result<(StatusCode, Json<Activity>)> {
    draft.validate()?;

    let created = state.repository.create(&user, &draft).await?;
    tracing::info!(
        user_id = user.user_id,
        activity_id = %created.id,
        "Activity created"
    );
    state.store.upsert(user.user_id, created.clone());
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParam<u64>,
    WithRejection(Json(patch), _): JsonBody<ActivityPatch>,
) -> Result<Json<Activity>> {
    let id = ActivityId(id);
    patch.validate()?;

    // Span rules apply to the activity as it will be after the update.
    let current = match state.store.get(user.user_id, id) {
        Some(activity) => activity,
        None => state
            .repository
            .get(&user, id)
            .await
            .map_err(|err| AppError::for_activity(id, err))?,
    };
    let merged = current.merged_with(&patch);
    check_span(merged.date, merged.time, merged.end_date, merged.end_time).map_err(|err| {
        AppError::BadRequest(
            err.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string()),
        )
    })?;

    let updated = state
        .repository
        .update(&user, id, &patch)
        .await
        .map_err(|err| AppError::for_activity(id, err))?;
    state.store.upsert(user.user_id, updated.clone());
    Ok(Json(updated))
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParam<u64>,
) -> Result<Json<MessageResponse>> {
    let id = ActivityId(id);
    state
        .repository
        .remove(&user, id)
        .await
        .map_err(|err| AppError::for_activity(id, err))?;
    state.store.remove(user.user_id, id);
    tracing::info!(user_id = user.user_id, activity_id = %id, "Activity deleted");

    Ok(Json(MessageResponse {
        message: "Activity deleted".to_string(),
    }))
}

async fn set_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParam<u64>,
    WithRejection(Json(change), _): JsonBody<StatusChange>,
) -> Result<Json<Activity>> {
    let activity = lifecycle::set_status(
        state.repository.as_ref(),
        &state.store,
        &user,
        ActivityId(id),
        change.status,
    )
    .await?;
    Ok(Json(activity))
}

async fn cycle_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParam<u64>,
) -> Result<Json<Activity>> {
    let activity = lifecycle::cycle_status(
        state.repository.as_ref(),
        &state.store,
        &user,
        ActivityId(id),
    )
    .await?;
    Ok(Json(activity))
}

async fn list_by_date(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(date), _): PathParam<String>,
) -> Result<Json<Vec<Activity>>> {
    let date = parse_date(&date)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid date '{}': use YYYY-MM-DD", date)))?;
    Ok(Json(state.repository.list_by_date(&user, date).await?))
}

async fn list_by_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(status), _): PathParam<String>,
) -> Result<Json<Vec<Activity>>> {
    let status = status
        .parse::<Status>()
        .map_err(|e| AppError::BadRequest(format!("Invalid status: {}", e)))?;
    Ok(Json(state.repository.list_by_status(&user, status).await?))
}

async fn get_categories(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<String>>> {
    Ok(Json(state.repository.categories(&user).await?))
}

/// The backend's own coarse statistics snapshot.
async fn get_server_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ServerStats>> {
    Ok(Json(state.repository.stats(&user).await?))
}
