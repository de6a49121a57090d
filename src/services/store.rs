// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user snapshot of the confirmed activity collection.
//!
//! The snapshot only ever holds what the backend has acknowledged. Views
//! re-read it on every request; when the backend is unreachable the last
//! snapshot is served and flagged as stale.

use chrono::NaiveDateTime;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::middleware::auth::AuthUser;
use crate::models::{Activity, ActivityId};
use crate::repository::{ActivityFilter, ActivityRepository, RepoResult};

#[derive(Debug, Clone)]
struct Snapshot {
    activities: BTreeMap<ActivityId, Activity>,
    refreshed_at: NaiveDateTime,
}

/// Activities returned by [`ActivityStore::load`].
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub activities: Vec<Activity>,
    /// Served from the snapshot because the backend was unreachable
    pub stale: bool,
    pub refreshed_at: NaiveDateTime,
}

/// Shared map of user id to confirmed snapshot.
#[derive(Debug, Clone, Default)]
pub struct ActivityStore {
    snapshots: Arc<DashMap<u64, Snapshot>>,
}

impl ActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the user's snapshot with a full listing.
    pub fn replace(&self, user_id: u64, activities: Vec<Activity>, at: NaiveDateTime) {
        let activities = activities.into_iter().map(|a| (a.id, a)).collect();
        self.snapshots.insert(
            user_id,
            Snapshot {
                activities,
                refreshed_at: at,
            },
        );
    }

    /// Record a confirmed create or update. A user without a snapshot keeps
    /// none, since a partial collection must never be served.
    pub fn upsert(&self, user_id: u64, activity: Activity) {
        if let Some(mut snapshot) = self.snapshots.get_mut(&user_id) {
            snapshot.activities.insert(activity.id, activity);
        }
    }

    /// Record a confirmed delete.
    pub fn remove(&self, user_id: u64, id: ActivityId) -> Option<Activity> {
        self.snapshots
            .get_mut(&user_id)
            .and_then(|mut snapshot| snapshot.activities.remove(&id))
    }

    pub fn get(&self, user_id: u64, id: ActivityId) -> Option<Activity> {
        self.snapshots
            .get(&user_id)
            .and_then(|snapshot| snapshot.activities.get(&id).cloned())
    }

    /// The user's confirmed activities in id order, if a snapshot exists.
    pub fn list(&self, user_id: u64) -> Option<Vec<Activity>> {
        self.snapshots
            .get(&user_id)
            .map(|snapshot| snapshot.activities.values().cloned().collect())
    }

    /// Drop the user's snapshot (logout, account deletion).
    pub fn forget(&self, user_id: u64) {
        self.snapshots.remove(&user_id);
    }

    /// Fetch the full collection from the backend and refresh the snapshot.
    ///
    /// On a transport failure the existing snapshot is returned with
    /// `stale` set; any other failure, or a transport failure with no
    /// snapshot to fall back on, is returned as is.
    pub async fn load(
        &self,
        repository: &dyn ActivityRepository,
        user: &AuthUser,
        now: NaiveDateTime,
    ) -> RepoResult<Loaded> {
        match repository.list(user, &ActivityFilter::default()).await {
            Ok(activities) => {
                self.replace(user.user_id, activities, now);
                let activities = self.list(user.user_id).unwrap_or_default();
                Ok(Loaded {
                    activities,
                    stale: false,
                    refreshed_at: now,
                })
            }
            Err(err) if err.is_transport() => {
                let Some(snapshot) = self.snapshots.get(&user.user_id).map(|s| s.clone()) else {
                    return Err(err);
                };
                tracing::warn!(
                    user_id = user.user_id,
                    error = %err,
                    refreshed_at = %snapshot.refreshed_at,
                    "Serving stale activity snapshot"
                );
                Ok(Loaded {
                    activities: snapshot.activities.into_values().collect(),
                    stale: true,
                    refreshed_at: snapshot.refreshed_at,
                })
            }
            Err(err) => Err(err),
        }
    }
}
