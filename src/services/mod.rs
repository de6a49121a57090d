// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.
//!
//! `occupancy`, `statistics` and `views` are pure and synchronous; `store`
//! and `lifecycle` coordinate with the backend collaborators.

pub mod lifecycle;
pub mod occupancy;
pub mod statistics;
pub mod store;
pub mod views;

pub use store::{ActivityStore, Loaded};
