// ABOUTME: Integration tests for the dual-write progress repository
// ABOUTME: Local-then-remote writes, retry exhaustion, stale-plan guard, load fallbacks
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

mod common;

use anyhow::Result;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use common::{create_flaky_database, create_test_cache, FlakyDatabase};
use liftlog::cache::{memory::InMemoryCache, ProgressCache, ProgressKey};
use liftlog::database_plugins::DatabaseProvider;
use liftlog::models::{ExerciseProgress, SetRecord};
use liftlog::notifications::{BroadcastNotifier, WorkoutEvent};
use liftlog::progress::{
    CachedWorkoutState, ProgressRepository, SyncRetryConfig, SYNC_FAILED_MESSAGE,
};

fn set(number: u32, reps: u32, weight: f64) -> SetRecord {
    SetRecord {
        set: number,
        reps,
        weight,
        rir: None,
        rpe: None,
    }
}

fn state_with_sets(sets: Vec<SetRecord>) -> BTreeMap<usize, ExerciseProgress> {
    let mut state = BTreeMap::new();
    state.insert(
        0,
        ExerciseProgress {
            sets,
            completed: false,
        },
    );
    state.insert(1, ExerciseProgress::default());
    state
}

async fn repository(
    cache: InMemoryCache,
    database: FlakyDatabase,
    notifier: BroadcastNotifier,
) -> ProgressRepository<InMemoryCache, FlakyDatabase> {
    ProgressRepository::new(cache, database, Arc::new(notifier)).with_retry(SyncRetryConfig {
        max_retries: 3,
        backoff: Duration::from_millis(500),
    })
}

#[tokio::test]
async fn persist_writes_local_snapshot_and_remote_row() -> Result<()> {
    let cache = create_test_cache().await?;
    let database = create_flaky_database().await?;
    let repo = repository(cache.clone(), database.clone(), BroadcastNotifier::default()).await;
    let user_id = Uuid::new_v4();

    let state = state_with_sets(vec![set(1, 10, 50.0)]);
    let sync = repo
        .persist_exercise_progress(user_id, "monday", 0, "Bench Press", &state, 0)
        .await?;

    // Local snapshot is immediately readable
    let key = ProgressKey::new(user_id, "monday".to_owned());
    let snapshot: CachedWorkoutState = cache.get(&key).await?.unwrap();
    assert_eq!(snapshot.exercises_state, state);
    assert_eq!(snapshot.current_exercise_index, 0);

    // Remote row lands once the detached sync settles
    sync.await?;
    let rows = database
        .load_exercise_progress(user_id, "monday", Utc::now().date_naive())
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].exercise_name, "Bench Press");
    assert_eq!(rows[0].sets.len(), 1);
    Ok(())
}

#[tokio::test]
async fn transient_remote_failures_are_retried() -> Result<()> {
    let cache = create_test_cache().await?;
    let database = create_flaky_database().await?;
    // Pause after the SQLite pool has connected: establishing the in-memory
    // connection runs on a blocking thread, and the auto-advancing virtual
    // clock would otherwise trip the pool's acquire timeout before it lands.
    tokio::time::pause();
    let repo = repository(cache.clone(), database.clone(), BroadcastNotifier::default()).await;
    let user_id = Uuid::new_v4();

    // Two failures, then success: within the retry allowance
    database.fail_next_upserts(2);
    let state = state_with_sets(vec![set(1, 10, 50.0)]);
    let sync = repo
        .persist_exercise_progress(user_id, "monday", 0, "Bench Press", &state, 0)
        .await?;
    sync.await?;

    let rows = database
        .load_exercise_progress(user_id, "monday", Utc::now().date_naive())
        .await?;
    assert_eq!(rows.len(), 1);
    Ok(())
}

#[tokio::test]
async fn retry_exhaustion_surfaces_nonblocking_notification() -> Result<()> {
    let cache = create_test_cache().await?;
    let database = create_flaky_database().await?;
    // Pause after the SQLite pool has connected: establishing the in-memory
    // connection runs on a blocking thread, and the auto-advancing virtual
    // clock would otherwise trip the pool's acquire timeout before it lands.
    tokio::time::pause();
    let notifier = BroadcastNotifier::default();
    let mut events = notifier.subscribe();
    let repo = repository(cache.clone(), database.clone(), notifier).await;
    let user_id = Uuid::new_v4();

    database.fail_next_upserts(u32::MAX);
    let state = state_with_sets(vec![set(1, 10, 50.0)]);
    let sync = repo
        .persist_exercise_progress(user_id, "monday", 0, "Bench Press", &state, 0)
        .await?;
    sync.await?;

    let event = events.recv().await?;
    assert_eq!(
        event,
        WorkoutEvent::SyncFailed {
            user_id,
            day: "monday".to_owned(),
            message: SYNC_FAILED_MESSAGE.to_owned(),
        }
    );

    // The local write is never rolled back
    let key = ProgressKey::new(user_id, "monday".to_owned());
    let snapshot: Option<CachedWorkoutState> = cache.get(&key).await?;
    assert!(snapshot.is_some());

    // And nothing reached the remote
    let rows = database
        .load_exercise_progress(user_id, "monday", Utc::now().date_naive())
        .await?;
    assert!(rows.is_empty());
    Ok(())
}

#[tokio::test]
async fn load_prefers_remote_rows_over_cache() -> Result<()> {
    let cache = create_test_cache().await?;
    let database = create_flaky_database().await?;
    let repo = repository(cache.clone(), database.clone(), BroadcastNotifier::default()).await;
    let user_id = Uuid::new_v4();
    let today = Utc::now().date_naive();

    // A stale local snapshot says one thing...
    let local_state = state_with_sets(vec![set(1, 10, 47.5)]);
    let key = ProgressKey::new(user_id, "monday".to_owned());
    cache
        .set(
            &key,
            &CachedWorkoutState {
                exercises_state: local_state,
                current_exercise_index: 0,
                saved_at: Utc::now(),
            },
            Duration::from_secs(3600),
        )
        .await?;

    // ...the remote says another
    database
        .upsert_exercise_progress(
            user_id,
            "monday",
            today,
            0,
            "Bench Press",
            &[set(1, 10, 50.0), set(2, 10, 52.5)],
            true,
        )
        .await?;

    let loaded = repo.load_progress(user_id, "monday", 2).await?;
    let first = &loaded.exercises_state[&0];
    assert!(first.completed);
    assert_eq!(first.sets.len(), 2);
    assert_eq!(loaded.first_incomplete, 1);
    Ok(())
}

#[tokio::test]
async fn load_falls_back_to_matching_cache_snapshot() -> Result<()> {
    let cache = create_test_cache().await?;
    let database = create_flaky_database().await?;
    let repo = repository(cache.clone(), database.clone(), BroadcastNotifier::default()).await;
    let user_id = Uuid::new_v4();

    let state = state_with_sets(vec![set(1, 10, 50.0)]);
    let key = ProgressKey::new(user_id, "monday".to_owned());
    cache
        .set(
            &key,
            &CachedWorkoutState {
                exercises_state: state.clone(),
                current_exercise_index: 0,
                saved_at: Utc::now(),
            },
            Duration::from_secs(3600),
        )
        .await?;

    let loaded = repo.load_progress(user_id, "monday", 2).await?;
    assert_eq!(loaded.exercises_state, state);
    assert_eq!(loaded.first_incomplete, 0);
    Ok(())
}

#[tokio::test]
async fn stale_cache_snapshot_is_discarded_on_count_mismatch() -> Result<()> {
    let cache = create_test_cache().await?;
    let database = create_flaky_database().await?;
    let repo = repository(cache.clone(), database.clone(), BroadcastNotifier::default()).await;
    let user_id = Uuid::new_v4();

    // Snapshot taken when the plan had two exercises
    let state = state_with_sets(vec![set(1, 10, 50.0)]);
    let key = ProgressKey::new(user_id, "monday".to_owned());
    cache
        .set(
            &key,
            &CachedWorkoutState {
                exercises_state: state,
                current_exercise_index: 0,
                saved_at: Utc::now(),
            },
            Duration::from_secs(3600),
        )
        .await?;

    // The plan has since grown to three exercises: resume must start clean
    let loaded = repo.load_progress(user_id, "monday", 3).await?;
    assert_eq!(loaded.exercises_state.len(), 3);
    assert!(loaded
        .exercises_state
        .values()
        .all(|progress| progress.sets.is_empty() && !progress.completed));
    assert_eq!(loaded.first_incomplete, 0);
    Ok(())
}

#[tokio::test]
async fn first_incomplete_is_zero_when_all_complete() -> Result<()> {
    let cache = create_test_cache().await?;
    let database = create_flaky_database().await?;
    let repo = repository(cache.clone(), database.clone(), BroadcastNotifier::default()).await;
    let user_id = Uuid::new_v4();
    let today = Utc::now().date_naive();

    for index in 0..2usize {
        database
            .upsert_exercise_progress(
                user_id,
                "monday",
                today,
                index,
                "Exercise",
                &[set(1, 10, 50.0)],
                true,
            )
            .await?;
    }

    let loaded = repo.load_progress(user_id, "monday", 2).await?;
    assert_eq!(loaded.first_incomplete, 0);
    Ok(())
}

#[tokio::test]
async fn clear_removes_local_and_remote_state() -> Result<()> {
    let cache = create_test_cache().await?;
    let database = create_flaky_database().await?;
    let repo = repository(cache.clone(), database.clone(), BroadcastNotifier::default()).await;
    let user_id = Uuid::new_v4();

    let state = state_with_sets(vec![set(1, 10, 50.0)]);
    let sync = repo
        .persist_exercise_progress(user_id, "monday", 0, "Bench Press", &state, 0)
        .await?;
    sync.await?;

    repo.clear_progress(user_id, "monday").await?;

    let key = ProgressKey::new(user_id, "monday".to_owned());
    let snapshot: Option<CachedWorkoutState> = cache.get(&key).await?;
    assert!(snapshot.is_none());
    let rows = database
        .load_exercise_progress(user_id, "monday", Utc::now().date_naive())
        .await?;
    assert!(rows.is_empty());
    Ok(())
}
