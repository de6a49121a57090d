// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Status changes: persisted first, then reflected in the snapshot.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Activity, ActivityId, Status};
use crate::repository::ActivityRepository;
use crate::services::store::ActivityStore;

/// Jump directly to `target`.
///
/// The snapshot is only touched after the backend confirms the change; on
/// failure it keeps the previous status and the error names `id`.
pub async fn set_status(
    repository: &dyn ActivityRepository,
    store: &ActivityStore,
    user: &AuthUser,
    id: ActivityId,
    target: Status,
) -> Result<Activity> {
    let confirmed = repository
        .set_status(user, id, target)
        .await
        .map_err(|err| {
            tracing::warn!(
                user_id = user.user_id,
                activity_id = %id,
                status = target.as_str(),
                error = %err,
                "Status change rejected"
            );
            AppError::for_activity(id, err)
        })?;

    tracing::debug!(
        user_id = user.user_id,
        activity_id = %id,
        status = confirmed.status.as_str(),
        "Status changed"
    );
    store.upsert(user.user_id, confirmed.clone());
    Ok(confirmed)
}

/// Advance to the next status in the cycle, starting from the last
/// confirmed status.
pub async fn cycle_status(
    repository: &dyn ActivityRepository,
    store: &ActivityStore,
    user: &AuthUser,
    id: ActivityId,
) -> Result<Activity> {
    let current = match store.get(user.user_id, id) {
        Some(activity) => activity,
        None => repository
            .get(user, id)
            .await
            .map_err(|err| AppError::for_activity(id, err))?,
    };
    set_status(repository, store, user, id, current.status.next()).await
}
