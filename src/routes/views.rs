// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar and status views, computed from the confirmed snapshot.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::services::views::{
    build_daily, build_monthly, build_status_view, build_weekly, DailyView, MonthlyView,
    SlotSize, StatusFilter, StatusView, WeekSpan, WeeklyView,
};
use crate::services::Loaded;
use crate::AppState;
use super::QueryParams;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// View routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/views/daily", get(daily_view))
        .route("/api/views/weekly", get(weekly_view))
        .route("/api/views/monthly", get(monthly_view))
        .route("/api/views/status", get(status_view))
}

/// A view together with the freshness of the data behind it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse<T> {
    /// Served from the last snapshot because the backend was unreachable
    pub stale: bool,
    pub refreshed_at: NaiveDateTime,
    #[serde(flatten)]
    pub view: T,
}

impl<T> ViewResponse<T> {
    fn new(loaded: &Loaded, view: T) -> Json<Self> {
        Json(Self {
            stale: loaded.stale,
            refreshed_at: loaded.refreshed_at,
            view,
        })
    }
}

async fn load(state: &AppState, user: &AuthUser) -> Result<Loaded> {
    Ok(state
        .store
        .load(state.repository.as_ref(), user, state.clock.now())
        .await?)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DailyQuery {
    /// Defaults to today
    date: Option<NaiveDate>,
    slot: SlotSize,
}

async fn daily_view(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): QueryParams<DailyQuery>,
) -> Result<Json<ViewResponse<DailyView>>> {
    let loaded = load(&state, &user).await?;
    let now = state.clock.now();
    let date = query.date.unwrap_or(now.date());
    tracing::debug!(user_id = user.user_id, %date, stale = loaded.stale, "Daily view");

    let view = build_daily(&loaded.activities, date, query.slot, now);
    Ok(ViewResponse::new(&loaded, view))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WeeklyQuery {
    date: Option<NaiveDate>,
    span: WeekSpan,
}

async fn weekly_view(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): QueryParams<WeeklyQuery>,
) -> Result<Json<ViewResponse<WeeklyView>>> {
    let loaded = load(&state, &user).await?;
    let today = state.clock.today();
    let date = query.date.unwrap_or(today);
    tracing::debug!(
        user_id = user.user_id,
        %date,
        span = query.span.days(),
        stale = loaded.stale,
        "Weekly view"
    );

    let view = build_weekly(&loaded.activities, date, query.span, today);
    Ok(ViewResponse::new(&loaded, view))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MonthlyQuery {
    date: Option<NaiveDate>,
}

async fn monthly_view(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): QueryParams<MonthlyQuery>,
) -> Result<Json<ViewResponse<MonthlyView>>> {
    let loaded = load(&state, &user).await?;
    let today = state.clock.today();
    let date = query.date.unwrap_or(today);
    tracing::debug!(user_id = user.user_id, %date, stale = loaded.stale, "Monthly view");

    let view = build_monthly(&loaded.activities, date, today);
    Ok(ViewResponse::new(&loaded, view))
}

async fn status_view(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(filter), _): QueryParams<StatusFilter>,
) -> Result<Json<ViewResponse<StatusView>>> {
    let loaded = load(&state, &user).await?;
    tracing::debug!(user_id = user.user_id, filter = ?filter, stale = loaded.stale, "Status view");

    let view = build_status_view(&loaded.activities, &filter, state.clock.today());
    Ok(ViewResponse::new(&loaded, view))
}
