//! Progress store: one reconciled snapshot per user.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing;

use practicehub_core::config::progress::ProgressConfig;
use practicehub_core::error::AppError;
use practicehub_core::result::AppResult;
use practicehub_core::traits::sweeper::Sweeper;
use practicehub_core::types::UserId;
use practicehub_entity::progress::{ProgressStats, UserProgress};

use crate::merge::merge_progress;

/// In-memory progress storage, isolated per user.
#[derive(Debug)]
pub struct ProgressStore {
    /// User ID → last reconciled snapshot
    entries: DashMap<UserId, UserProgress>,
    /// Stored users, reserved before a vacant entry is filled
    users: AtomicUsize,
    config: ProgressConfig,
}

impl ProgressStore {
    /// Create an empty store
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            entries: DashMap::new(),
            users: AtomicUsize::new(0),
            config,
        }
    }

    /// Stored snapshot for `user_id`, if any.
    pub fn get(&self, user_id: &UserId) -> Option<UserProgress> {
        self.entries.get(user_id).map(|r| r.value().clone())
    }

    /// Stored snapshot for `user_id`, read on behalf of `caller_id`.
    pub fn get_for(&self, user_id: &UserId, caller_id: &UserId) -> AppResult<Option<UserProgress>> {
        if user_id != caller_id {
            tracing::warn!(
                "Access denied: user '{}' read progress of user '{}'",
                caller_id,
                user_id
            );
            return Err(AppError::authorization(format!(
                "Progress of user {user_id} does not belong to the caller"
            )));
        }
        Ok(self.get(user_id))
    }

    /// Replace the stored snapshot. The record is re-stamped and its user
    /// id forced to `user_id`.
    pub fn set(&self, user_id: &UserId, progress: UserProgress) -> AppResult<UserProgress> {
        let mut progress = progress;
        progress.user_id = user_id.clone();
        progress.last_synced_at = now_millis();

        match self.entries.entry(user_id.clone()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(progress.clone());
            }
            Entry::Vacant(vacant) => {
                self.reserve_slot(user_id)?;
                vacant.insert(progress.clone());
            }
        }

        tracing::info!("Saved progress for user '{}'", user_id);
        Ok(progress)
    }

    /// Reconcile `client` with the stored snapshot, store the result and
    /// return it.
    pub fn merge(&self, user_id: &UserId, client: UserProgress) -> AppResult<UserProgress> {
        let now = now_millis();

        let merged = match self.entries.entry(user_id.clone()) {
            Entry::Occupied(mut occupied) => {
                let merged = merge_progress(Some(occupied.get()), client, user_id, now);
                occupied.insert(merged.clone());
                merged
            }
            Entry::Vacant(vacant) => {
                self.reserve_slot(user_id)?;
                let adopted = merge_progress(None, client, user_id, now);
                vacant.insert(adopted.clone());
                adopted
            }
        };

        tracing::info!(
            "Merged progress for user '{}' ({} solved)",
            user_id,
            merged.solved_problems.len()
        );
        Ok(merged)
    }

    /// Count a new user, or reject it once `max_users` records exist.
    /// Called while the user's vacant entry is locked.
    fn reserve_slot(&self, user_id: &UserId) -> AppResult<()> {
        let limit = self.config.max_users;
        let reserved = self
            .users
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (limit == 0 || n < limit).then_some(n + 1)
            });
        if reserved.is_ok() {
            return Ok(());
        }
        tracing::warn!("Rejected progress for new user '{}': {} users stored", user_id, limit);
        Err(AppError::service_unavailable(format!(
            "Progress store is full ({limit} users)"
        )))
    }

    /// Number of users and solved entries.
    pub fn get_stats(&self) -> ProgressStats {
        let mut stats = ProgressStats {
            total_users: self.entries.len(),
            ..ProgressStats::default()
        };
        for entry in self.entries.iter() {
            stats.total_solved += entry.solved_problems.len();
        }
        stats
    }

    /// Remove records whose last sync is strictly older than the configured
    /// TTL at `now` (milliseconds since the Unix epoch).
    pub fn sweep_at(&self, now: i64) -> usize {
        let horizon = i64::try_from(self.config.ttl().as_millis()).unwrap_or(i64::MAX);
        let mut removed = 0;
        self.entries.retain(|_, progress| {
            let keep = now.saturating_sub(progress.last_synced_at) <= horizon;
            if !keep {
                removed += 1;
            }
            keep
        });
        self.users.fetch_sub(removed, Ordering::SeqCst);
        removed
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[async_trait]
impl Sweeper for ProgressStore {
    fn name(&self) -> &'static str {
        "progress"
    }

    async fn sweep(&self) -> AppResult<usize> {
        let removed = self.sweep_at(now_millis());
        if removed > 0 {
            tracing::info!("Cleaned up {} stale progress entries", removed);
        }
        Ok(removed)
    }
}
