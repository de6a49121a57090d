// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod stats;
pub mod status;
pub mod user;

pub use activity::{Activity, ActivityDraft, ActivityId, ActivityPatch, StatusChange};
pub use stats::{AdminStats, ServerStats};
pub use status::{next_status, Priority, Status};
pub use user::{
    AuthSession, LoginRequest, PasswordChange, RegisterRequest, User, UserActivities, UserPage,
    UserQuery, UserUpdate,
};
