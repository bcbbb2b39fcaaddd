// ABOUTME: Database abstraction layer for the workout tracking engine
// ABOUTME: Plugin architecture with a SQLite backend behind one async trait
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! Remote storage collaborators behind one trait.
//!
//! The hosted backend the product delegates to is modeled as a
//! [`DatabaseProvider`]: plan store, session recorder, in-progress rows, and
//! profile documents. The [`factory::Database`] enum selects a backend from
//! a connection URL.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::{
    CompletedWorkoutSession, ExerciseRecord, PreviousExercise, SessionEvaluation, SetRecord,
    TrainingPlan,
};

/// Backend selection from a connection URL
pub mod factory;
/// SQLite implementation
pub mod sqlite;

/// One remote in-progress row: a single exercise's state for
/// (user, day, date). Natural key is (user, day, date, `exercise_index`);
/// writes are upserts, so last-write-wins across tabs and devices.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseProgressRow {
    /// 0-based position of the exercise in the day's plan
    pub exercise_index: usize,
    /// Exercise name at the time of the write
    pub exercise_name: String,
    /// Confirmed sets, in order
    pub sets: Vec<SetRecord>,
    /// Whether the exercise was marked complete
    pub completed: bool,
    /// Time of the last upsert
    pub updated_at: DateTime<Utc>,
}

/// Core database abstraction trait
///
/// All database implementations must implement this trait to provide
/// a consistent interface for the application layer.
#[async_trait]
pub trait DatabaseProvider: Send + Sync + Clone {
    /// Create a new database connection
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established
    async fn new(database_url: &str) -> AppResult<Self>
    where
        Self: Sized;

    /// Run database migrations to set up schema
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails
    async fn migrate(&self) -> AppResult<()>;

    // ================================
    // Training Plans
    // ================================

    /// Get the user's plan, materializing the default plan on first access
    ///
    /// # Errors
    ///
    /// Returns an error if the read or the lazy insert fails
    async fn get_or_create_plan(&self, user_id: Uuid) -> AppResult<TrainingPlan>;

    /// Replace the user's plan document (upsert)
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    async fn update_plan(&self, user_id: Uuid, plan: &TrainingPlan) -> AppResult<()>;

    // ================================
    // Workout Sessions (immutable history)
    // ================================

    /// Record a finished session's header row; returns the new session id
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    async fn create_workout_session(
        &self,
        user_id: Uuid,
        day: &str,
        date: DateTime<Utc>,
        evaluation: &SessionEvaluation,
    ) -> AppResult<Uuid>;

    /// Attach exercise record rows to a session
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails
    async fn add_exercise_records(
        &self,
        session_id: Uuid,
        records: &[ExerciseRecord],
    ) -> AppResult<()>;

    /// All of a user's recorded sessions, most recent first
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails
    async fn list_workout_history(&self, user_id: Uuid) -> AppResult<Vec<CompletedWorkoutSession>>;

    /// Delete a session, cascading to its exercise records first
    ///
    /// # Errors
    ///
    /// Returns an error if either delete fails
    async fn delete_workout_session(&self, session_id: Uuid) -> AppResult<()>;

    /// Last recorded set of `exercise_name` on `day`, for the
    /// "last time you did this" hint. Most recent session wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails (callers treat this as a missing
    /// hint, never as fatal)
    async fn get_previous_exercise(
        &self,
        user_id: Uuid,
        day: &str,
        exercise_name: &str,
    ) -> AppResult<Option<PreviousExercise>>;

    // ================================
    // In-Progress Workout State
    // ================================

    /// Upsert one exercise's in-progress row for (user, day, date)
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails
    #[allow(clippy::too_many_arguments)]
    async fn upsert_exercise_progress(
        &self,
        user_id: Uuid,
        day: &str,
        date: NaiveDate,
        exercise_index: usize,
        exercise_name: &str,
        sets: &[SetRecord],
        completed: bool,
    ) -> AppResult<()>;

    /// All in-progress rows for (user, day, date), ordered by index
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails
    async fn load_exercise_progress(
        &self,
        user_id: Uuid,
        day: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<ExerciseProgressRow>>;

    /// Delete all in-progress rows for (user, day, date)
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    async fn clear_exercise_progress(
        &self,
        user_id: Uuid,
        day: &str,
        date: NaiveDate,
    ) -> AppResult<()>;

    // ================================
    // User Profiles
    // ================================

    /// Upsert user profile data
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    async fn upsert_user_profile(&self, user_id: Uuid, profile_data: Value) -> AppResult<()>;

    /// Get user profile data
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails
    async fn get_user_profile(&self, user_id: Uuid) -> AppResult<Option<Value>>;
}
