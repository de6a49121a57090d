// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication routes, proxied to the planner auth service.
//!
//! Login and registration hand the token back in the body and also set it
//! as an HttpOnly session cookie; the auth middleware accepts either.

use crate::error::{AppError, Result};
use crate::middleware::auth::{extract_token, verify_token, AuthUser, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::models::{AuthSession, LoginRequest, PasswordChange, RegisterRequest, User};
use crate::AppState;
use super::JsonBody;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Auth routes that do not need a session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/verify", post(verify))
        .route("/auth/logout", post(logout))
}

/// Auth routes that require a session (auth middleware applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/change-password", put(change_password))
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: User,
}

/// Secure cookies everywhere except plain-http local development.
fn use_secure_cookie(frontend_url: &str) -> bool {
    !frontend_url.starts_with("http://")
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

/// Expired cookie with the same attributes as the one that was set.
/// Always sent, even when the request authenticated with a bearer header.
fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

fn start_session(
    state: &AppState,
    jar: CookieJar,
    session: AuthSession,
    message: &str,
) -> (CookieJar, Json<SessionResponse>) {
    let secure = use_secure_cookie(&state.config.frontend_url);
    let jar = jar.add(session_cookie(session.token.clone(), secure));
    (
        jar,
        Json(SessionResponse {
            message: message.to_string(),
            token: session.token,
            user: session.user,
        }),
    )
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(credentials), _): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let session = state.auth.login(&credentials).await?;
    tracing::info!(user_id = session.user.id, "User logged in");
    Ok(start_session(&state, jar, session, "Login successful"))
}

async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(request), _): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>)> {
    request.validate()?;

    let session = state.auth.register(&request).await?;
    tracing::info!(user_id = session.user.id, "User registered");
    let (jar, body) = start_session(&state, jar, session, "Registration successful");
    Ok((StatusCode::CREATED, jar, body))
}

/// Check a token handed over by the UI and return its account.
async fn verify(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(request), _): JsonBody<VerifyRequest>,
) -> Result<Json<VerifyResponse>> {
    let user = verify_token(request.token.trim(), &state.config.jwt_signing_key)
        .ok_or(AppError::InvalidToken)?;
    let account = state.auth.me(&user).await?;
    Ok(Json(VerifyResponse {
        valid: true,
        user: account,
    }))
}

async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>> {
    Ok(Json(state.auth.me(&user).await?))
}

/// Clear the session cookie. Always succeeds, even without a session.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, Json<MessageResponse>) {
    let session = extract_token(&jar, &headers)
        .and_then(|token| verify_token(&token, &state.config.jwt_signing_key));

    if let Some(user) = session {
        if let Err(err) = state.auth.logout(&user).await {
            tracing::warn!(user_id = user.user_id, error = %err, "Auth service logout failed");
        }
        state.store.forget(user.user_id);
        tracing::info!(user_id = user.user_id, "User logged out");
    }

    let secure = use_secure_cookie(&state.config.frontend_url);
    (
        jar.add(removal_cookie(secure)),
        Json(MessageResponse {
            message: "Logout successful".to_string(),
        }),
    )
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(change), _): JsonBody<PasswordChange>,
) -> Result<Json<MessageResponse>> {
    change.validate()?;
    state.auth.change_password(&user, &change).await?;
    tracing::info!(user_id = user.user_id, "Password changed");
    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
    }))
}
