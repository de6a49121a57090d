// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity Planner: view backend for a personal activity planner
//!
//! This crate sits between the planner UI and the planner REST backend. It
//! decides which activities occupy which dates, aggregates them into daily,
//! weekly, monthly and status views, and proxies authentication and user
//! administration.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use repository::{ActivityRepository, AdminRepository, AuthProvider, HttpBackend, MemoryBackend};
use services::ActivityStore;
use std::sync::Arc;
use time_utils::{Clock, SystemClock};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub repository: Arc<dyn ActivityRepository>,
    pub auth: Arc<dyn AuthProvider>,
    pub admin: Arc<dyn AdminRepository>,
    pub store: ActivityStore,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// State backed by the REST backend at `config.planner_api_url`.
    pub fn with_http_backend(config: Config) -> anyhow::Result<Self> {
        let backend = Arc::new(HttpBackend::new(
            config.planner_api_url.clone(),
            config.request_timeout,
        )?);
        Ok(Self::with_backend(config, backend, Arc::new(SystemClock)))
    }

    /// State backed by a single implementation of all three collaborators.
    pub fn with_backend<B>(config: Config, backend: Arc<B>, clock: Arc<dyn Clock>) -> Self
    where
        B: ActivityRepository + AuthProvider + AdminRepository + 'static,
    {
        Self {
            config,
            repository: backend.clone(),
            auth: backend.clone(),
            admin: backend,
            store: ActivityStore::new(),
            clock,
        }
    }

    /// State backed by a seeded in-memory backend, for local development.
    pub fn with_dev_backend(config: Config) -> Self {
        let backend = MemoryBackend::new(config.jwt_signing_key.clone()).with_user(
            repository::memory::MAIN_ADMIN_USERNAME,
            "admin@localhost",
            "admin123",
            true,
        );
        Self::with_backend(config, Arc::new(backend), Arc::new(SystemClock))
    }
}
