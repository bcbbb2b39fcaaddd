// ABOUTME: Dual-write progress persistence - local cache snapshot plus remote upsert
// ABOUTME: Retry with linear backoff, remote-first load, stale-plan guard, record-then-clear
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! In-progress workout persistence.
//!
//! Makes uncompleted workout state survive reloads and, best-effort, reach
//! the remote store for cross-device resume. The local cache write is the
//! source of truth until the remote confirms; a failed sync never rolls it
//! back. Both halves sit behind one repository so the retry/backoff policy
//! lives in a single place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::cache::{ProgressCache, ProgressKey};
use crate::constants::defaults;
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppResult;
use crate::models::ExerciseProgress;
use crate::notifications::{WorkoutEvent, WorkoutNotifier};

/// Message shown when remote sync gives up; the workout itself is safe
pub const SYNC_FAILED_MESSAGE: &str = "saved locally, not yet synced";

/// Retry policy for remote progress writes
#[derive(Debug, Clone)]
pub struct SyncRetryConfig {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Base backoff; retry N sleeps N times this (linear)
    pub backoff: Duration,
}

impl Default for SyncRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::SYNC_MAX_RETRIES,
            backoff: Duration::from_millis(defaults::SYNC_BACKOFF_MS),
        }
    }
}

/// Snapshot persisted to the local cache under
/// `workout_progress_{user}_{day}`.
///
/// The whole exercises-state map is captured on every write, so a reload
/// restores everything from one blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedWorkoutState {
    /// Exercise index -> progress
    pub exercises_state: BTreeMap<usize, ExerciseProgress>,
    /// Index the user was working on
    pub current_exercise_index: usize,
    /// Write timestamp
    pub saved_at: DateTime<Utc>,
}

/// Result of [`ProgressRepository::load_progress`]
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProgress {
    /// Per-exercise state, one entry per exercise in the live plan
    pub exercises_state: BTreeMap<usize, ExerciseProgress>,
    /// First index not yet completed; 0 when all complete or none found
    pub first_incomplete: usize,
}

/// Dual-write repository for in-progress workout state.
///
/// Writes go local-then-remote; reads go remote-then-local. The remote half
/// is fire-and-forget with retries so a slow backend never blocks the set
/// flow. Writes are not mutually exclusive across devices: the remote
/// upsert's natural key makes the last writer win, an accepted limitation.
pub struct ProgressRepository<C, D> {
    cache: C,
    database: D,
    notifier: Arc<dyn WorkoutNotifier>,
    retry: SyncRetryConfig,
    cache_ttl: Duration,
}

impl<C, D> ProgressRepository<C, D>
where
    C: ProgressCache + 'static,
    D: DatabaseProvider + 'static,
{
    /// Create a repository with the default retry policy
    pub fn new(cache: C, database: D, notifier: Arc<dyn WorkoutNotifier>) -> Self {
        Self {
            cache,
            database,
            notifier,
            retry: SyncRetryConfig::default(),
            cache_ttl: Duration::from_secs(defaults::CACHE_TTL_SECS),
        }
    }

    /// Override the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: SyncRetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Persist one exercise's progress.
    ///
    /// The local cache receives a snapshot of the entire exercises-state map
    /// immediately; the remote row for `exercise_index` is then upserted on
    /// a detached task with retries. The returned handle completes when the
    /// sync settles (tests await it; interactive callers drop it).
    ///
    /// # Errors
    ///
    /// Returns an error only when the local snapshot cannot be written;
    /// remote failures are reported through the notifier instead.
    pub async fn persist_exercise_progress(
        &self,
        user_id: Uuid,
        day: &str,
        exercise_index: usize,
        exercise_name: &str,
        exercises_state: &BTreeMap<usize, ExerciseProgress>,
        current_exercise_index: usize,
    ) -> AppResult<JoinHandle<()>> {
        let key = ProgressKey::new(user_id, day.to_owned());
        let snapshot = CachedWorkoutState {
            exercises_state: exercises_state.clone(),
            current_exercise_index,
            saved_at: Utc::now(),
        };
        // Local write first; never rolled back on sync failure
        self.cache.set(&key, &snapshot, self.cache_ttl).await?;

        let progress = exercises_state
            .get(&exercise_index)
            .cloned()
            .unwrap_or_default();
        let database = self.database.clone();
        let notifier = Arc::clone(&self.notifier);
        let retry = self.retry.clone();
        let day = day.to_owned();
        let exercise_name = exercise_name.to_owned();

        Ok(tokio::spawn(async move {
            sync_remote(
                &database,
                notifier.as_ref(),
                &retry,
                user_id,
                &day,
                exercise_index,
                &exercise_name,
                &progress,
            )
            .await;
        }))
    }

    /// Load resumable progress for (user, day, today).
    ///
    /// Remote rows win when present. Otherwise the local snapshot is used,
    /// but only when its exercise count matches the live plan's count: a
    /// plan edited between sessions invalidates the cached index space, and
    /// a stale snapshot is discarded rather than partially applied.
    ///
    /// # Errors
    ///
    /// Returns an error only on local cache failures; a failing remote read
    /// degrades to the local path.
    pub async fn load_progress(
        &self,
        user_id: Uuid,
        day: &str,
        plan_exercise_count: usize,
    ) -> AppResult<LoadedProgress> {
        let today = Utc::now().date_naive();
        let mut exercises_state: BTreeMap<usize, ExerciseProgress> = BTreeMap::new();

        let remote = match self.database.load_exercise_progress(user_id, day, today).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(%user_id, day, error = %err, "remote progress load failed, trying local cache");
                Vec::new()
            }
        };

        if remote.is_empty() {
            let key = ProgressKey::new(user_id, day.to_owned());
            let cached: Option<CachedWorkoutState> = match self.cache.get(&key).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    debug!(%key, error = %err, "unreadable local snapshot discarded");
                    None
                }
            };
            if let Some(snapshot) = cached {
                if snapshot.exercises_state.len() == plan_exercise_count {
                    exercises_state = snapshot.exercises_state;
                } else {
                    debug!(
                        cached = snapshot.exercises_state.len(),
                        live = plan_exercise_count,
                        "stale cached progress discarded after plan edit"
                    );
                }
            }
        } else {
            for row in remote {
                // Indices beyond the live plan would point outside the
                // current exercise sequence
                if row.exercise_index < plan_exercise_count {
                    exercises_state.insert(
                        row.exercise_index,
                        ExerciseProgress {
                            sets: row.sets,
                            completed: row.completed,
                        },
                    );
                }
            }
        }

        for index in 0..plan_exercise_count {
            exercises_state.entry(index).or_default();
        }

        let first_incomplete = (0..plan_exercise_count)
            .find(|index| exercises_state.get(index).map_or(true, |p| !p.completed))
            .unwrap_or(0);

        Ok(LoadedProgress {
            exercises_state,
            first_incomplete,
        })
    }

    /// Remove the local entry and today's remote rows for (user, day).
    ///
    /// Callers must record the finished session before clearing: the
    /// ordering is record-then-clear so a crash in between never loses a
    /// workout.
    ///
    /// # Errors
    ///
    /// Returns an error if either delete fails
    pub async fn clear_progress(&self, user_id: Uuid, day: &str) -> AppResult<()> {
        let key = ProgressKey::new(user_id, day.to_owned());
        self.cache.invalidate(&key).await?;
        self.database
            .clear_exercise_progress(user_id, day, Utc::now().date_naive())
            .await
    }
}

/// Remote half of the dual write: upsert with linear backoff.
///
/// Retry N sleeps N x base backoff, so the default policy gives up after
/// roughly three seconds. Exhaustion is surfaced to the user as a
/// non-blocking notification; the local copy stays authoritative.
#[allow(clippy::too_many_arguments)]
async fn sync_remote<D: DatabaseProvider>(
    database: &D,
    notifier: &dyn WorkoutNotifier,
    retry: &SyncRetryConfig,
    user_id: Uuid,
    day: &str,
    exercise_index: usize,
    exercise_name: &str,
    progress: &ExerciseProgress,
) {
    let today = Utc::now().date_naive();
    let mut attempt = 0u32;
    loop {
        match database
            .upsert_exercise_progress(
                user_id,
                day,
                today,
                exercise_index,
                exercise_name,
                &progress.sets,
                progress.completed,
            )
            .await
        {
            Ok(()) => {
                trace!(%user_id, day, exercise_index, "progress row synced");
                return;
            }
            Err(err) => {
                if attempt >= retry.max_retries {
                    warn!(
                        %user_id, day, exercise_index, error = %err,
                        "progress sync exhausted retries"
                    );
                    notifier.notify(WorkoutEvent::SyncFailed {
                        user_id,
                        day: day.to_owned(),
                        message: SYNC_FAILED_MESSAGE.to_owned(),
                    });
                    return;
                }
                attempt += 1;
                let backoff = retry.backoff * attempt;
                debug!(
                    %user_id, day, exercise_index, attempt, ?backoff, error = %err,
                    "progress sync failed, backing off"
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
