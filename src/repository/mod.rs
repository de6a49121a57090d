// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collaborator interfaces for the planner backend.
//!
//! The backend owns persistence, authentication and user management. This
//! crate talks to it through three traits so that the HTTP client can be
//! swapped for the in-memory implementation in tests and local development.

pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::middleware::auth::AuthUser;
use crate::models::{
    Activity, ActivityDraft, ActivityId, ActivityPatch, AdminStats, AuthSession, LoginRequest,
    PasswordChange, Priority, RegisterRequest, ServerStats, Status, User, UserActivities,
    UserPage, UserQuery, UserUpdate,
};

/// Failure reported by a backend collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// Network failure or timeout; the request may not have reached the backend.
    #[error("Planner backend unreachable: {0}")]
    Transport(String),

    /// Payload rejected by the backend.
    #[error("Rejected by planner backend: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Response the client could not make sense of.
    #[error("Unexpected backend response: {0}")]
    Protocol(String),
}

impl RepositoryError {
    pub fn is_transport(&self) -> bool {
        matches!(self, RepositoryError::Transport(_))
    }
}

pub type RepoResult<T> = std::result::Result<T, RepositoryError>;

/// Server-side list filters. Date bounds apply to the start date only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

impl ActivityFilter {
    pub fn is_empty(&self) -> bool {
        *self == ActivityFilter::default()
    }

    pub fn matches(&self, activity: &Activity) -> bool {
        self.status.map_or(true, |s| s == activity.status)
            && self.priority.map_or(true, |p| p == activity.priority)
            && self
                .category
                .as_deref()
                .map_or(true, |c| activity.category.as_deref() == Some(c))
            && self.date_from.map_or(true, |from| activity.date >= from)
            && self.date_to.map_or(true, |to| activity.date <= to)
    }
}

/// Activity persistence, scoped to the calling user.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn list(&self, user: &AuthUser, filter: &ActivityFilter) -> RepoResult<Vec<Activity>>;
    async fn get(&self, user: &AuthUser, id: ActivityId) -> RepoResult<Activity>;
    async fn create(&self, user: &AuthUser, draft: &ActivityDraft) -> RepoResult<Activity>;
    async fn update(
        &self,
        user: &AuthUser,
        id: ActivityId,
        patch: &ActivityPatch,
    ) -> RepoResult<Activity>;
    async fn remove(&self, user: &AuthUser, id: ActivityId) -> RepoResult<()>;
    async fn set_status(&self, user: &AuthUser, id: ActivityId, status: Status)
        -> RepoResult<Activity>;
    /// Activities occupying `date`, including spans that started earlier.
    async fn list_by_date(&self, user: &AuthUser, date: NaiveDate) -> RepoResult<Vec<Activity>>;
    async fn list_by_status(&self, user: &AuthUser, status: Status) -> RepoResult<Vec<Activity>>;
    async fn stats(&self, user: &AuthUser) -> RepoResult<ServerStats>;
    async fn categories(&self, user: &AuthUser) -> RepoResult<Vec<String>>;
}

/// Login, registration and session management.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> RepoResult<AuthSession>;
    async fn register(&self, request: &RegisterRequest) -> RepoResult<AuthSession>;
    async fn me(&self, user: &AuthUser) -> RepoResult<User>;
    async fn logout(&self, user: &AuthUser) -> RepoResult<()>;
    async fn change_password(&self, user: &AuthUser, change: &PasswordChange) -> RepoResult<()>;
}

/// Admin-only user management. The backend enforces the admin role.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn list_users(&self, admin: &AuthUser, query: &UserQuery) -> RepoResult<UserPage>;
    async fn update_user(&self, admin: &AuthUser, id: u64, update: &UserUpdate)
        -> RepoResult<User>;
    async fn delete_user(&self, admin: &AuthUser, id: u64) -> RepoResult<()>;
    async fn user_activities(
        &self,
        admin: &AuthUser,
        id: u64,
        filter: &ActivityFilter,
    ) -> RepoResult<UserActivities>;
    async fn admin_stats(&self, admin: &AuthUser) -> RepoResult<AdminStats>;
}
