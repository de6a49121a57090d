// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin panel routes. The backend enforces the admin role; these handlers
//! validate input and forward.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{AdminStats, User, UserActivities, UserPage, UserQuery, UserUpdate};
use crate::repository::ActivityFilter;
use crate::AppState;
use super::{JsonBody, PathParam, QueryParams};
use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

/// Admin routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}", put(update_user).delete(delete_user))
        .route("/api/admin/users/{id}/activities", get(user_activities))
        .route("/api/admin/stats", get(admin_stats))
}

#[derive(Serialize)]
pub struct UserUpdatedResponse {
    pub message: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    WithRejection(Query(query), _): QueryParams<UserQuery>,
) -> Result<Json<UserPage>> {
    let query = query.normalized();
    tracing::debug!(
        admin_id = admin.user_id,
        page = query.page,
        per_page = query.per_page,
        search = ?query.search,
        "Listing users"
    );
    Ok(Json(state.admin.list_users(&admin, &query).await?))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParam<u64>,
    WithRejection(Json(update), _): JsonBody<UserUpdate>,
) -> Result<Json<UserUpdatedResponse>> {
    update.validate()?;
    let user = state.admin.update_user(&admin, id, &update).await?;
    tracing::info!(admin_id = admin.user_id, user_id = id, "User updated");
    Ok(Json(UserUpdatedResponse {
        message: "User updated".to_string(),
        user,
    }))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParam<u64>,
) -> Result<Json<MessageResponse>> {
    state.admin.delete_user(&admin, id).await?;
    state.store.forget(id);
    tracing::info!(admin_id = admin.user_id, user_id = id, "User deleted");
    Ok(Json(MessageResponse {
        message: "User deleted".to_string(),
    }))
}

async fn user_activities(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    WithRejection(Path(id), _): PathParam<u64>,
    WithRejection(Query(filter), _): QueryParams<ActivityFilter>,
) -> Result<Json<UserActivities>> {
    Ok(Json(state.admin.user_activities(&admin, id, &filter).await?))
}

async fn admin_stats(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
) -> Result<Json<AdminStats>> {
    Ok(Json(state.admin.admin_stats(&admin).await?))
}
