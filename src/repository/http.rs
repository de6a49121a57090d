// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! REST client for the planner backend.
//!
//! Every call forwards the caller's bearer token. Non-success statuses are
//! mapped onto [`RepositoryError`] from the backend's `{"detail": ...}`
//! error body.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    ActivityFilter, ActivityRepository, AdminRepository, AuthProvider, RepoResult,
    RepositoryError,
};
use crate::middleware::auth::AuthUser;
use crate::models::{
    Activity, ActivityDraft, ActivityId, ActivityPatch, AdminStats, AuthSession, LoginRequest,
    PasswordChange, RegisterRequest, ServerStats, Status, StatusChange, User, UserActivities,
    UserPage, UserQuery, UserUpdate,
};
use crate::time_utils::DATE_FORMAT;

/// HTTP implementation of all backend collaborators.
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

/// FastAPI-style error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Envelope used by the admin update endpoint.
#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: User,
}

impl HttpBackend {
    /// Create a client for `base_url` (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, user: Option<&AuthUser>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match user {
            Some(user) => builder.bearer_auth(&user.token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> RepoResult<reqwest::Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Planner backend request failed");
            RepositoryError::Transport(e.to_string())
        })?;
        check_response(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> RepoResult<T> {
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .map_err(|e| RepositoryError::Protocol(format!("JSON parse error: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, user: &AuthUser) -> RepoResult<T> {
        self.send_json(self.request(Method::GET, path, Some(user)))
            .await
    }
}

/// Map a non-success response onto a repository error.
async fn check_response(response: reqwest::Response) -> RepoResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body);

    Err(match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            RepositoryError::Validation(detail)
        }
        StatusCode::UNAUTHORIZED => RepositoryError::Unauthorized,
        StatusCode::FORBIDDEN => RepositoryError::Forbidden(detail),
        StatusCode::NOT_FOUND => RepositoryError::NotFound(detail),
        StatusCode::CONFLICT => RepositoryError::Conflict(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => {
            RepositoryError::Transport(format!("HTTP {}: {}", status, detail))
        }
        _ => {
            tracing::warn!(status = %status, body = %body, "Unexpected planner backend status");
            RepositoryError::Protocol(format!("HTTP {}: {}", status, detail))
        }
    })
}

/// Human-readable message from an error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Some(serde_json::Value::String(msg)),
            ..
        }) => msg,
        // Validation failures carry a list of field errors.
        Ok(ErrorBody {
            detail: Some(other),
            ..
        }) => other.to_string(),
        Ok(ErrorBody {
            error: Some(msg), ..
        }) => msg,
        _ => body.trim().to_string(),
    }
}

fn activity_path(id: ActivityId) -> String {
    format!("/activities/{}", id)
}

/// Attach the activity id to not-found errors that lack one.
fn scoped(err: RepositoryError, id: ActivityId) -> RepositoryError {
    match err {
        RepositoryError::NotFound(msg) if msg.is_empty() => {
            RepositoryError::NotFound(format!("activity {}", id))
        }
        other => other,
    }
}

#[async_trait]
impl ActivityRepository for HttpBackend {
    async fn list(&self, user: &AuthUser, filter: &ActivityFilter) -> RepoResult<Vec<Activity>> {
        let builder = self.request(Method::GET, "/activities", Some(user)).query(filter);
        self.send_json(builder).await
    }

    async fn get(&self, user: &AuthUser, id: ActivityId) -> RepoResult<Activity> {
        self.get_json(&activity_path(id), user)
            .await
            .map_err(|e| scoped(e, id))
    }

    async fn create(&self, user: &AuthUser, draft: &ActivityDraft) -> RepoResult<Activity> {
        let builder = self
            .request(Method::POST, "/activities", Some(user))
            .json(draft);
        self.send_json(builder).await
    }

    async fn update(
        &self,
        user: &AuthUser,
        id: ActivityId,
        patch: &ActivityPatch,
    ) -> RepoResult<Activity> {
        let builder = self
            .request(Method::PUT, &activity_path(id), Some(user))
            .json(patch);
        self.send_json(builder).await.map_err(|e| scoped(e, id))
    }

    async fn remove(&self, user: &AuthUser, id: ActivityId) -> RepoResult<()> {
        self.send(self.request(Method::DELETE, &activity_path(id), Some(user)))
            .await
            .map_err(|e| scoped(e, id))?;
        Ok(())
    }

    async fn set_status(
        &self,
        user: &AuthUser,
        id: ActivityId,
        status: Status,
    ) -> RepoResult<Activity> {
        let path = format!("{}/status", activity_path(id));
        let builder = self
            .request(Method::PATCH, &path, Some(user))
            .json(&StatusChange { status });
        self.send_json(builder).await.map_err(|e| scoped(e, id))
    }

    async fn list_by_date(&self, user: &AuthUser, date: NaiveDate) -> RepoResult<Vec<Activity>> {
        let path = format!("/activities/date/{}", date.format(DATE_FORMAT));
        self.get_json(&path, user).await
    }

    async fn list_by_status(&self, user: &AuthUser, status: Status) -> RepoResult<Vec<Activity>> {
        let path = format!("/activities/status/{}", urlencoding::encode(status.as_str()));
        self.get_json(&path, user).await
    }

    async fn stats(&self, user: &AuthUser) -> RepoResult<ServerStats> {
        self.get_json("/activities/stats", user).await
    }

    async fn categories(&self, user: &AuthUser) -> RepoResult<Vec<String>> {
        self.get_json("/activities/categories", user).await
    }
}

#[async_trait]
impl AuthProvider for HttpBackend {
    async fn login(&self, credentials: &LoginRequest) -> RepoResult<AuthSession> {
        let builder = self
            .request(Method::POST, "/auth/login", None)
            .json(credentials);
        self.send_json(builder).await
    }

    async fn register(&self, request: &RegisterRequest) -> RepoResult<AuthSession> {
        let builder = self
            .request(Method::POST, "/auth/register", None)
            .json(request);
        self.send_json(builder).await
    }

    async fn me(&self, user: &AuthUser) -> RepoResult<User> {
        self.get_json("/auth/me", user).await
    }

    async fn logout(&self, user: &AuthUser) -> RepoResult<()> {
        self.send(self.request(Method::POST, "/auth/logout", Some(user)))
            .await?;
        Ok(())
    }

    async fn change_password(&self, user: &AuthUser, change: &PasswordChange) -> RepoResult<()> {
        let builder = self
            .request(Method::PUT, "/auth/change-password", Some(user))
            .json(change);
        self.send(builder).await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct UserListParams<'a> {
    page: u32,
    per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
}

#[async_trait]
impl AdminRepository for HttpBackend {
    async fn list_users(&self, admin: &AuthUser, query: &UserQuery) -> RepoResult<UserPage> {
        let query = query.normalized();
        let params = UserListParams {
            page: query.page,
            per_page: query.per_page,
            search: query.search.as_deref(),
        };
        let builder = self
            .request(Method::GET, "/admin/users", Some(admin))
            .query(&params);
        self.send_json(builder).await
    }

    async fn update_user(&self, admin: &AuthUser, id: u64, update: &UserUpdate) -> RepoResult<User> {
        let builder = self
            .request(Method::PUT, &format!("/admin/users/{}", id), Some(admin))
            .json(update);
        let envelope: UserEnvelope = self.send_json(builder).await?;
        Ok(envelope.user)
    }

    async fn delete_user(&self, admin: &AuthUser, id: u64) -> RepoResult<()> {
        self.send(self.request(Method::DELETE, &format!("/admin/users/{}", id), Some(admin)))
            .await?;
        Ok(())
    }

    async fn user_activities(
        &self,
        admin: &AuthUser,
        id: u64,
        filter: &ActivityFilter,
    ) -> RepoResult<UserActivities> {
        let builder = self
            .request(
                Method::GET,
                &format!("/admin/users/{}/activities", id),
                Some(admin),
            )
            .query(filter);
        self.send_json(builder).await
    }

    async fn admin_stats(&self, admin: &AuthUser) -> RepoResult<AdminStats> {
        self.get_json("/admin/stats", admin).await
    }
}
