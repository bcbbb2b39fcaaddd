// ABOUTME: Database factory with runtime backend selection from the connection URL
// ABOUTME: Delegates every DatabaseProvider operation to the selected implementation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! Database factory for creating database providers
//!
//! Detects the backend from the connection string. Only SQLite ships today;
//! the enum keeps the call sites backend-agnostic.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::sqlite::SqliteDatabase;
use super::{DatabaseProvider, ExerciseProgressRow};
use crate::errors::{AppError, AppResult};
use crate::models::{
    CompletedWorkoutSession, ExerciseRecord, PreviousExercise, SessionEvaluation, SetRecord,
    TrainingPlan,
};

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// Embedded file-based database
    Sqlite,
}

/// Database instance wrapper that delegates to the appropriate implementation
#[derive(Clone)]
pub enum Database {
    /// SQLite backend
    Sqlite(SqliteDatabase),
}

impl Database {
    /// Get a descriptive string for the current database backend
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "SQLite (embedded)",
        }
    }

    /// Get the database type enum
    #[must_use]
    pub const fn database_type(&self) -> DatabaseType {
        match self {
            Self::Sqlite(_) => DatabaseType::Sqlite,
        }
    }
}

fn detect_database_type(database_url: &str) -> AppResult<DatabaseType> {
    if database_url.starts_with("sqlite:") {
        Ok(DatabaseType::Sqlite)
    } else {
        Err(AppError::config(format!(
            "unsupported database URL scheme: {database_url}"
        )))
    }
}

#[async_trait]
impl DatabaseProvider for Database {
    async fn new(database_url: &str) -> AppResult<Self> {
        debug!("detecting database type from URL");
        let db_type = detect_database_type(database_url)?;
        info!(?db_type, "initializing database backend");

        match db_type {
            DatabaseType::Sqlite => {
                let db = SqliteDatabase::new(database_url).await?;
                Ok(Self::Sqlite(db))
            }
        }
    }

    async fn migrate(&self) -> AppResult<()> {
        match self {
            Self::Sqlite(db) => db.migrate().await,
        }
    }

    async fn get_or_create_plan(&self, user_id: Uuid) -> AppResult<TrainingPlan> {
        match self {
            Self::Sqlite(db) => db.get_or_create_plan(user_id).await,
        }
    }

    async fn update_plan(&self, user_id: Uuid, plan: &TrainingPlan) -> AppResult<()> {
        match self {
            Self::Sqlite(db) => db.update_plan(user_id, plan).await,
        }
    }

    async fn create_workout_session(
        &self,
        user_id: Uuid,
        day: &str,
        date: DateTime<Utc>,
        evaluation: &SessionEvaluation,
    ) -> AppResult<Uuid> {
        match self {
            Self::Sqlite(db) => db.create_workout_session(user_id, day, date, evaluation).await,
        }
    }

    async fn add_exercise_records(
        &self,
        session_id: Uuid,
        records: &[ExerciseRecord],
    ) -> AppResult<()> {
        match self {
            Self::Sqlite(db) => db.add_exercise_records(session_id, records).await,
        }
    }

    async fn list_workout_history(&self, user_id: Uuid) -> AppResult<Vec<CompletedWorkoutSession>> {
        match self {
            Self::Sqlite(db) => db.list_workout_history(user_id).await,
        }
    }

    async fn delete_workout_session(&self, session_id: Uuid) -> AppResult<()> {
        match self {
            Self::Sqlite(db) => db.delete_workout_session(session_id).await,
        }
    }

    async fn get_previous_exercise(
        &self,
        user_id: Uuid,
        day: &str,
        exercise_name: &str,
    ) -> AppResult<Option<PreviousExercise>> {
        match self {
            Self::Sqlite(db) => db.get_previous_exercise(user_id, day, exercise_name).await,
        }
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
        match self {
            Self::Sqlite(db) => {
                db.upsert_exercise_progress(
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
        }
    }

    async fn load_exercise_progress(
        &self,
        user_id: Uuid,
        day: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<ExerciseProgressRow>> {
        match self {
            Self::Sqlite(db) => db.load_exercise_progress(user_id, day, date).await,
        }
    }

    async fn clear_exercise_progress(
        &self,
        user_id: Uuid,
        day: &str,
        date: NaiveDate,
    ) -> AppResult<()> {
        match self {
            Self::Sqlite(db) => db.clear_exercise_progress(user_id, day, date).await,
        }
    }

    async fn upsert_user_profile(&self, user_id: Uuid, profile_data: Value) -> AppResult<()> {
        match self {
            Self::Sqlite(db) => db.upsert_user_profile(user_id, profile_data).await,
        }
    }

    async fn get_user_profile(&self, user_id: Uuid) -> AppResult<Option<Value>> {
        match self {
            Self::Sqlite(db) => db.get_user_profile(user_id).await,
        }
    }
}
