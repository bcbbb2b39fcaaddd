// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database, plan, and fault-injection helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project
#![allow(dead_code)]

//! Shared test utilities for `liftlog` integration tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Once};
use uuid::Uuid;

use liftlog::cache::{memory::InMemoryCache, CacheConfig, ProgressCache};
use liftlog::config::AppConfig;
use liftlog::database_plugins::{factory::Database, DatabaseProvider, ExerciseProgressRow};
use liftlog::errors::{AppError, AppResult};
use liftlog::models::{
    CompletedWorkoutSession, DayWorkout, ExercisePrescription, ExerciseRecord, PlanPreferences,
    PreviousExercise, SessionEvaluation, SetRecord, TrainingPlan,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    Ok(database)
}

/// Standard test cache setup
pub async fn create_test_cache() -> Result<InMemoryCache> {
    Ok(InMemoryCache::new(CacheConfig::default()).await?)
}

/// Configuration with fast sync backoff for tests
pub fn test_config() -> AppConfig {
    AppConfig::default()
}

/// A plan with one "monday" day: Bench Press x2 sets, Barbell Row x1 set
pub fn two_exercise_plan() -> TrainingPlan {
    let mut workouts = HashMap::new();
    workouts.insert(
        "monday".to_owned(),
        DayWorkout {
            exercises: vec![
                ExercisePrescription::new("Bench Press", 2, 10, 50.0),
                ExercisePrescription::new("Barbell Row", 1, 10, 40.0),
            ],
        },
    );
    TrainingPlan {
        workouts,
        preferences: PlanPreferences::default(),
    }
}

/// A plan with one "monday" day of three single-set exercises
pub fn three_exercise_plan() -> TrainingPlan {
    let mut workouts = HashMap::new();
    workouts.insert(
        "monday".to_owned(),
        DayWorkout {
            exercises: vec![
                ExercisePrescription::new("Squats", 1, 10, 80.0),
                ExercisePrescription::new("Leg Press", 1, 12, 120.0),
                ExercisePrescription::new("Leg Curls", 1, 12, 45.0),
            ],
        },
    );
    TrainingPlan {
        workouts,
        preferences: PlanPreferences::default(),
    }
}

/// Database wrapper with injectable failures.
///
/// Wraps a real SQLite database and fails selected operations on demand, so
/// tests can drive the retry and record-then-clear paths deterministically.
#[derive(Clone)]
pub struct FlakyDatabase {
    inner: Database,
    failing_creates: Arc<AtomicU32>,
    failing_upserts: Arc<AtomicU32>,
}

impl FlakyDatabase {
    /// Fail the next `count` calls to `create_workout_session`
    pub fn fail_next_creates(&self, count: u32) {
        self.failing_creates.store(count, Ordering::SeqCst);
    }

    /// Fail the next `count` calls to `upsert_exercise_progress`
    /// (`u32::MAX` keeps them failing for the whole test)
    pub fn fail_next_upserts(&self, count: u32) {
        self.failing_upserts.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl DatabaseProvider for FlakyDatabase {
    async fn new(database_url: &str) -> AppResult<Self> {
        Ok(Self {
            inner: Database::new(database_url).await?,
            failing_creates: Arc::new(AtomicU32::new(0)),
            failing_upserts: Arc::new(AtomicU32::new(0)),
        })
    }

    async fn migrate(&self) -> AppResult<()> {
        self.inner.migrate().await
    }

    async fn get_or_create_plan(&self, user_id: Uuid) -> AppResult<TrainingPlan> {
        self.inner.get_or_create_plan(user_id).await
    }

    async fn update_plan(&self, user_id: Uuid, plan: &TrainingPlan) -> AppResult<()> {
        self.inner.update_plan(user_id, plan).await
    }

    async fn create_workout_session(
        &self,
        user_id: Uuid,
        day: &str,
        date: DateTime<Utc>,
        evaluation: &SessionEvaluation,
    ) -> AppResult<Uuid> {
        let remaining = self.failing_creates.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_creates.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::database("injected create failure"));
        }
        self.inner
            .create_workout_session(user_id, day, date, evaluation)
            .await
    }

    async fn add_exercise_records(
        &self,
        session_id: Uuid,
        records: &[ExerciseRecord],
    ) -> AppResult<()> {
        self.inner.add_exercise_records(session_id, records).await
    }

    async fn list_workout_history(&self, user_id: Uuid) -> AppResult<Vec<CompletedWorkoutSession>> {
        self.inner.list_workout_history(user_id).await
    }

    async fn delete_workout_session(&self, session_id: Uuid) -> AppResult<()> {
        self.inner.delete_workout_session(session_id).await
    }

    async fn get_previous_exercise(
        &self,
        user_id: Uuid,
        day: &str,
        exercise_name: &str,
    ) -> AppResult<Option<PreviousExercise>> {
        self.inner
            .get_previous_exercise(user_id, day, exercise_name)
            .await
    }

    async fn upsert_exercise_progress(
        &self,
        user_id: Uuid,
        day: &str,
        date: NaiveDate,
        exercise_index: usize,
        exercise_name: &str,
        sets: &[SetRecord],
        completed: bool,
    ) -> AppResult<()> {
        let remaining = self.failing_upserts.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.failing_upserts.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(AppError::database("injected upsert failure"));
        }
        self.inner
            .upsert_exercise_progress(
                user_id,
                day,
                date,
                exercise_index,
                exercise_name,
                sets,
                completed,
            )
            .await
    }

    async fn load_exercise_progress(
        &self,
        user_id: Uuid,
        day: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<ExerciseProgressRow>> {
        self.inner.load_exercise_progress(user_id, day, date).await
    }

    async fn clear_exercise_progress(
        &self,
        user_id: Uuid,
        day: &str,
        date: NaiveDate,
    ) -> AppResult<()> {
        self.inner.clear_exercise_progress(user_id, day, date).await
    }

    async fn upsert_user_profile(&self, user_id: Uuid, profile_data: Value) -> AppResult<()> {
        self.inner.upsert_user_profile(user_id, profile_data).await
    }

    async fn get_user_profile(&self, user_id: Uuid) -> AppResult<Option<Value>> {
        self.inner.get_user_profile(user_id).await
    }
}

/// Create a fault-injectable database over in-memory SQLite
pub async fn create_flaky_database() -> Result<FlakyDatabase> {
    init_test_logging();
    Ok(FlakyDatabase::new("sqlite::memory:").await?)
}
