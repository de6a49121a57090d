// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory planner backend for tests and local development.
//!
//! Mirrors the behaviour of the remote REST service: per-user activity
//! scoping, admin-only user management with a protected main `admin`
//! account, and JWT sessions signed with the shared key. Ids are assigned
//! in insertion order starting at 1.

use async_trait::async_trait;
use chrono::NaiveDate;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use validator::Validate;

use super::{
    ActivityFilter, ActivityRepository, AdminRepository, AuthProvider, RepoResult,
    RepositoryError,
};
use crate::middleware::auth::{create_jwt, AuthUser};
use crate::models::activity::check_span;
use crate::models::stats::{ActivityCounts, UserActivityCount, UserCounts};
use crate::models::{
    Activity, ActivityDraft, ActivityId, ActivityPatch, AdminStats, AuthSession, LoginRequest,
    PasswordChange, RegisterRequest, ServerStats, Status, User, UserActivities, UserPage,
    UserQuery, UserUpdate,
};
use crate::services::occupancy;
use crate::time_utils::{Clock, SystemClock};

type HmacSha256 = Hmac<Sha256>;

/// Username of the account that can be neither modified nor deleted.
pub const MAIN_ADMIN_USERNAME: &str = "admin";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

struct UserRecord {
    user: User,
    /// Hex HMAC-SHA256 of username and password under the signing key
    password_digest: String,
}

impl UserRecord {
    fn is_main_admin(&self) -> bool {
        self.user.username == MAIN_ADMIN_USERNAME && self.user.is_admin
    }
}

struct StoredActivity {
    owner: u64,
    activity: Activity,
}

pub struct MemoryBackend {
    signing_key: Vec<u8>,
    clock: Arc<dyn Clock>,
    users: RwLock<BTreeMap<u64, UserRecord>>,
    activities: RwLock<BTreeMap<u64, StoredActivity>>,
    next_user_id: AtomicU64,
    next_activity_id: AtomicU64,
    offline: AtomicBool,
}

impl MemoryBackend {
    pub fn new(signing_key: impl Into<Vec<u8>>) -> Self {
        Self {
            signing_key: signing_key.into(),
            clock: Arc::new(SystemClock),
            users: RwLock::new(BTreeMap::new()),
            activities: RwLock::new(BTreeMap::new()),
            next_user_id: AtomicU64::new(1),
            next_activity_id: AtomicU64::new(1),
            offline: AtomicBool::new(false),
        }
    }

    /// Use `clock` for timestamps and the "this week/month" counters.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Add an account.
    pub fn with_user(mut self, username: &str, email: &str, password: &str, is_admin: bool) -> Self {
        let id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
        let now = self.timestamp();
        let record = UserRecord {
            password_digest: self.password_digest(username, password),
            user: User {
                id,
                username: username.to_string(),
                email: email.to_lowercase(),
                is_active: true,
                is_admin,
                created_at: Some(now.clone()),
                updated_at: Some(now),
            },
        };
        self.users.get_mut().insert(id, record);
        self
    }

    /// Add an activity owned by `owner`, keeping its id.
    pub fn with_activity(mut self, owner: u64, activity: Activity) -> Self {
        let next = activity.id.0 + 1;
        self.next_activity_id.fetch_max(next, Ordering::SeqCst);
        self.activities
            .get_mut()
            .insert(activity.id.0, StoredActivity { owner, activity });
        self
    }

    /// Simulate a network outage: every activity call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn timestamp(&self) -> String {
        self.clock.now().format(TIMESTAMP_FORMAT).to_string()
    }

    fn password_mac(&self, username: &str, password: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key).ok()?;
        mac.update(username.as_bytes());
        mac.update(b"\0");
        mac.update(password.as_bytes());
        Some(mac)
    }

    fn password_digest(&self, username: &str, password: &str) -> String {
        self.password_mac(username, password)
            .map(|mac| hex::encode(mac.finalize().into_bytes()))
            .unwrap_or_default()
    }

    fn verify_password(&self, record: &UserRecord, password: &str) -> bool {
        let Ok(expected) = hex::decode(&record.password_digest) else {
            return false;
        };
        self.password_mac(&record.user.username, password)
            .is_some_and(|mac| mac.verify_slice(&expected).is_ok())
    }

    fn issue_session(&self, user: User) -> RepoResult<AuthSession> {
        let token = create_jwt(user.id, &self.signing_key)
            .map_err(|e| RepositoryError::Protocol(format!("Failed to sign token: {}", e)))?;
        Ok(AuthSession { token, user })
    }

    fn check_online(&self) -> RepoResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    /// The caller must be an existing, active account.
    async fn authenticate(&self, caller: &AuthUser) -> RepoResult<()> {
        self.check_online()?;
        match self.users.read().await.get(&caller.user_id) {
            Some(record) if record.user.is_active => Ok(()),
            _ => Err(RepositoryError::Unauthorized),
        }
    }

    async fn require_admin(&self, caller: &AuthUser) -> RepoResult<()> {
        self.authenticate(caller).await?;
        match self.users.read().await.get(&caller.user_id) {
            Some(record) if record.user.is_admin => Ok(()),
            _ => Err(RepositoryError::Forbidden(
                "Admin privileges required".to_string(),
            )),
        }
    }

    async fn owned_where<F>(&self, owner: u64, predicate: F) -> Vec<Activity>
    where
        F: Fn(&Activity) -> bool,
    {
        let mut found: Vec<Activity> = self
            .activities
            .read()
            .await
            .values()
            .filter(|stored| stored.owner == owner && predicate(&stored.activity))
            .map(|stored| stored.activity.clone())
            .collect();
        // Newest first, all-day entries after timed ones on the same date.
        found.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.time.cmp(&a.time)));
        found
    }
}

fn validation_message(errors: validator::ValidationErrors) -> RepositoryError {
    RepositoryError::Validation(errors.to_string())
}

fn not_found(id: ActivityId) -> RepositoryError {
    RepositoryError::NotFound(format!("activity {}", id))
}

#[async_trait]
impl ActivityRepository for MemoryBackend {
    async fn list(&self, user: &AuthUser, filter: &ActivityFilter) -> RepoResult<Vec<Activity>> {
        self.authenticate(user).await?;
        Ok(self.owned_where(user.user_id, |a| filter.matches(a)).await)
    }

    async fn get(&self, user: &AuthUser, id: ActivityId) -> RepoResult<Activity> {
        self.authenticate(user).await?;
        self.activities
            .read()
            .await
            .get(&id.0)
            .filter(|stored| stored.owner == user.user_id)
            .map(|stored| stored.activity.clone())
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, user: &AuthUser, draft: &ActivityDraft) -> RepoResult<Activity> {
        self.authenticate(user).await?;
        draft.validate().map_err(validation_message)?;

        let id = ActivityId(self.next_activity_id.fetch_add(1, Ordering::SeqCst));
        let now = self.timestamp();
        let mut activity = draft.clone().into_activity(id);
        activity.created_at = Some(now.clone());
        activity.updated_at = Some(now);

        self.activities.write().await.insert(
            id.0,
            StoredActivity {
                owner: user.user_id,
                activity: activity.clone(),
            },
        );
        tracing::debug!(user_id = user.user_id, activity_id = %id, "Created activity");
        Ok(activity)
    }

    async fn update(
        &self,
        user: &AuthUser,
        id: ActivityId,
        patch: &ActivityPatch,
    ) -> RepoResult<Activity> {
        self.authenticate(user).await?;
        patch.validate().map_err(validation_message)?;

        let mut activities = self.activities.write().await;
        let stored = activities
            .get_mut(&id.0)
            .filter(|stored| stored.owner == user.user_id)
            .ok_or_else(|| not_found(id))?;

        let mut merged = stored.activity.merged_with(patch);
        check_span(merged.date, merged.time, merged.end_date, merged.end_time).map_err(|e| {
            RepositoryError::Validation(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            )
        })?;
        merged.title = merged.title.trim().to_string();
        merged.updated_at = Some(self.timestamp());
        stored.activity = merged.clone();
        Ok(merged)
    }

    async fn remove(&self, user: &AuthUser, id: ActivityId) -> RepoResult<()> {
        self.authenticate(user).await?;
        let mut activities = self.activities.write().await;
        match activities.get(&id.0) {
            Some(stored) if stored.owner == user.user_id => {
                activities.remove(&id.0);
                Ok(())
            }
            _ => Err(not_found(id)),
        }
    }

    async fn set_status(
        &self,
        user: &AuthUser,
        id: ActivityId,
        status: Status,
    ) -> RepoResult<Activity> {
        self.authenticate(user).await?;
        let now = self.timestamp();
        let mut activities = self.activities.write().await;
        let stored = activities
            .get_mut(&id.0)
            .filter(|stored| stored.owner == user.user_id)
            .ok_or_else(|| not_found(id))?;
        stored.activity.status = status;
        stored.activity.updated_at = Some(now);
        Ok(stored.activity.clone())
    }

    async fn list_by_date(&self, user: &AuthUser, date: NaiveDate) -> RepoResult<Vec<Activity>> {
        self.authenticate(user).await?;
        Ok(self
            .owned_where(user.user_id, |a| occupancy::is_active_on_date(a, date))
            .await)
    }

    async fn list_by_status(&self, user: &AuthUser, status: Status) -> RepoResult<Vec<Activity>> {
        self.authenticate(user).await?;
        Ok(self.owned_where(user.user_id, |a| a.status == status).await)
    }

    async fn stats(&self, user: &AuthUser) -> RepoResult<ServerStats> {
        self.authenticate(user).await?;
        let activities = self.owned_where(user.user_id, |_| true).await;
        Ok(ServerStats::tally(&activities, self.clock.today()))
    }

    async fn categories(&self, user: &AuthUser) -> RepoResult<Vec<String>> {
        self.authenticate(user).await?;
        let categories: BTreeSet<String> = self
            .owned_where(user.user_id, |_| true)
            .await
            .into_iter()
            .filter_map(|a| a.category)
            .filter(|c| !c.is_empty())
            .collect();
        Ok(categories.into_iter().collect())
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn login(&self, credentials: &LoginRequest) -> RepoResult<AuthSession> {
        self.check_online()?;
        let login = credentials.username.trim();
        let users = self.users.read().await;
        let record = if login.contains('@') {
            let email = login.to_lowercase();
            users.values().find(|r| r.user.email == email)
        } else {
            users.values().find(|r| r.user.username == login)
        };

        let record = match record {
            Some(record) if self.verify_password(record, &credentials.password) => record,
            _ => {
                tracing::info!(login = %login, "Rejected login");
                return Err(RepositoryError::Unauthorized);
            }
        };
        if !record.user.is_active {
            return Err(RepositoryError::Unauthorized);
        }
        self.issue_session(record.user.clone())
    }

    async fn register(&self, request: &RegisterRequest) -> RepoResult<AuthSession> {
        self.check_online()?;
        request.validate().map_err(validation_message)?;

        let email = request.email.to_lowercase();
        let mut users = self.users.write().await;
        if users.values().any(|r| r.user.username == request.username) {
            return Err(RepositoryError::Conflict("Username already exists".to_string()));
        }
        if users.values().any(|r| r.user.email == email) {
            return Err(RepositoryError::Conflict("Email already exists".to_string()));
        }

        let id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
        let now = self.timestamp();
        let user = User {
            id,
            username: request.username.clone(),
            email,
            is_active: true,
            is_admin: false,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        users.insert(
            id,
            UserRecord {
                user: user.clone(),
                password_digest: self.password_digest(&request.username, &request.password),
            },
        );
        tracing::info!(user_id = id, "Registered user");
        self.issue_session(user)
    }

    async fn me(&self, user: &AuthUser) -> RepoResult<User> {
        self.authenticate(user).await?;
        self.users
            .read()
            .await
            .get(&user.user_id)
            .map(|r| r.user.clone())
            .ok_or(RepositoryError::Unauthorized)
    }

    async fn logout(&self, user: &AuthUser) -> RepoResult<()> {
        // Sessions are stateless JWTs; the client drops the token.
        self.authenticate(user).await
    }

    async fn change_password(&self, user: &AuthUser, change: &PasswordChange) -> RepoResult<()> {
        self.authenticate(user).await?;
        let mut users = self.users.write().await;
        let record = users
            .get(&user.user_id)
            .ok_or(RepositoryError::Unauthorized)?;
        if !self.verify_password(record, &change.current_password) {
            return Err(RepositoryError::Validation(
                "Current password is invalid".to_string(),
            ));
        }
        change.validate().map_err(validation_message)?;

        let digest = self.password_digest(&record.user.username, &change.new_password);
        let now = self.timestamp();
        if let Some(record) = users.get_mut(&user.user_id) {
            record.password_digest = digest;
            record.user.updated_at = Some(now);
        }
        Ok(())
    }
}

#[async_trait]
impl AdminRepository for MemoryBackend {
    async fn list_users(&self, admin: &AuthUser, query: &UserQuery) -> RepoResult<UserPage> {
        self.require_admin(admin).await?;
        let query = query.normalized();
        let needle = query.search.as_deref().map(str::to_lowercase);

        let users = self.users.read().await;
        // Newest accounts first.
        let matching: Vec<&User> = users
            .values()
            .rev()
            .map(|r| &r.user)
            .filter(|u| {
                needle.as_deref().map_or(true, |n| {
                    u.username.to_lowercase().contains(n) || u.email.to_lowercase().contains(n)
                })
            })
            .collect();

        let total = matching.len() as u64;
        let per_page = u64::from(query.per_page);
        let offset = u64::from(query.page - 1) * per_page;
        Ok(UserPage {
            users: matching
                .into_iter()
                .skip(offset as usize)
                .take(query.per_page as usize)
                .cloned()
                .collect(),
            total,
            pages: total.div_ceil(per_page),
            current_page: query.page,
            per_page: query.per_page,
        })
    }

    async fn update_user(&self, admin: &AuthUser, id: u64, update: &UserUpdate) -> RepoResult<User> {
        self.require_admin(admin).await?;
        update.validate().map_err(validation_message)?;

        let mut users = self.users.write().await;
        let record = users
            .get(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))?;
        if record.is_main_admin() {
            return Err(RepositoryError::Forbidden(
                "The main admin account cannot be modified".to_string(),
            ));
        }

        let email = update.email.as_deref().map(str::to_lowercase);
        if let Some(email) = &email {
            if users.values().any(|r| r.user.id != id && &r.user.email == email) {
                return Err(RepositoryError::Conflict("Email already exists".to_string()));
            }
        }

        let now = self.timestamp();
        let record = users
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))?;
        if let Some(email) = email {
            record.user.email = email;
        }
        if let Some(is_active) = update.is_active {
            record.user.is_active = is_active;
        }
        record.user.updated_at = Some(now);
        tracing::info!(admin_id = admin.user_id, user_id = id, "Updated user");
        Ok(record.user.clone())
    }

    async fn delete_user(&self, admin: &AuthUser, id: u64) -> RepoResult<()> {
        self.require_admin(admin).await?;
        let mut users = self.users.write().await;
        let record = users
            .get(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))?;
        if record.is_main_admin() {
            return Err(RepositoryError::Forbidden(
                "The main admin account cannot be deleted".to_string(),
            ));
        }
        if id == admin.user_id {
            return Err(RepositoryError::Forbidden(
                "You cannot delete your own account".to_string(),
            ));
        }

        let mut activities = self.activities.write().await;
        let before = activities.len();
        activities.retain(|_, stored| stored.owner != id);
        users.remove(&id);
        tracing::info!(
            admin_id = admin.user_id,
            user_id = id,
            activities_deleted = before - activities.len(),
            "Deleted user"
        );
        Ok(())
    }

    async fn user_activities(
        &self,
        admin: &AuthUser,
        id: u64,
        filter: &ActivityFilter,
    ) -> RepoResult<UserActivities> {
        self.require_admin(admin).await?;
        let user = self
            .users
            .read()
            .await
            .get(&id)
            .map(|r| r.user.clone())
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))?;
        let activities = self.owned_where(id, |a| filter.matches(a)).await;
        Ok(UserActivities { user, activities })
    }

    async fn admin_stats(&self, admin: &AuthUser) -> RepoResult<AdminStats> {
        self.require_admin(admin).await?;
        let users = self.users.read().await;
        let activities = self.activities.read().await;

        let mut by_status: HashMap<Status, u32> = Status::ALL.iter().map(|s| (*s, 0)).collect();
        let mut per_owner: HashMap<u64, u32> = HashMap::new();
        for stored in activities.values() {
            *by_status.entry(stored.activity.status).or_insert(0) += 1;
            *per_owner.entry(stored.owner).or_insert(0) += 1;
        }

        Ok(AdminStats {
            users: UserCounts {
                total: users.len() as u32,
                active: users.values().filter(|r| r.user.is_active).count() as u32,
                admins: users.values().filter(|r| r.user.is_admin).count() as u32,
            },
            activities: ActivityCounts {
                total: activities.len() as u32,
                by_status,
            },
            user_activity_counts: users
                .values()
                .map(|r| UserActivityCount {
                    username: r.user.username.clone(),
                    activity_count: per_owner.get(&r.user.id).copied().unwrap_or(0),
                })
                .collect(),
        })
    }
}
