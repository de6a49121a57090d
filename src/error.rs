// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::ValidationErrors;

use crate::models::ActivityId;
use crate::repository::RepositoryError;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend failure, naming the activity it concerned when there is one.
    #[error("{source}")]
    Repository {
        activity_id: Option<ActivityId>,
        #[source]
        source: RepositoryError,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Wrap a backend failure for an operation on `id`.
    pub fn for_activity(id: ActivityId, source: RepositoryError) -> Self {
        AppError::Repository {
            activity_id: Some(id),
            source,
        }
    }

    pub fn activity_id(&self) -> Option<ActivityId> {
        match self {
            AppError::Repository { activity_id, .. } => *activity_id,
            _ => None,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(source: RepositoryError) -> Self {
        AppError::Repository {
            activity_id: None,
            source,
        }
    }
}

// Extractor rejections, reached through `WithRejection<_, AppError>`.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// JSON error response body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activity_id: Option<ActivityId>,
}

fn repository_status(err: &RepositoryError) -> (StatusCode, &'static str, Option<String>) {
    match err {
        RepositoryError::Transport(msg) => {
            tracing::warn!(error = %msg, "Planner backend unavailable");
            (StatusCode::BAD_GATEWAY, "backend_unavailable", Some(msg.clone()))
        }
        RepositoryError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
        }
        RepositoryError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
        RepositoryError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
        RepositoryError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
        RepositoryError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),
        RepositoryError::Protocol(msg) => {
            tracing::error!(error = %msg, "Unexpected planner backend response");
            (StatusCode::BAD_GATEWAY, "backend_error", None)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                Some(errors.to_string()),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            AppError::Repository { source, .. } => repository_status(source),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            activity_id: self.activity_id(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_transport_failure_names_activity() {
        let err = AppError::for_activity(
            ActivityId(12),
            RepositoryError::Transport("timed out".to_string()),
        );
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"], "backend_unavailable");
        assert_eq!(json["activityId"], 12);
    }

    #[tokio::test]
    async fn test_plain_errors_have_no_activity_id() {
        let (status, json) = body_json(AppError::Conflict("dup".to_string())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(json.get("activityId").is_none());

        let (status, json) = body_json(RepositoryError::Unauthorized.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_protocol_details_are_hidden() {
        let (status, json) =
            body_json(RepositoryError::Protocol("secret stack".to_string()).into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json.get("details").is_none());
    }
}
