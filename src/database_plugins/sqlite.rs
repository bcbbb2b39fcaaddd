// ABOUTME: SQLite implementation of the DatabaseProvider trait via sqlx
// ABOUTME: Runtime-checked queries, TEXT-encoded ids and timestamps, upsert by natural key
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! SQLite database implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{DatabaseProvider, ExerciseProgressRow};
use crate::errors::{AppError, AppResult};
use crate::models::{
    CompletedExercise, CompletedWorkoutSession, ExerciseRecord, Feeling, PreviousExercise,
    SessionEvaluation, SetRecord, TrainingPlan,
};

/// SQLite database implementation
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: Pool<Sqlite>,
}

impl SqliteDatabase {
    fn parse_uuid(raw: &str, column: &str) -> AppResult<Uuid> {
        Uuid::parse_str(raw)
            .map_err(|e| AppError::database(format!("corrupt {column} uuid '{raw}': {e}")))
    }

    fn parse_timestamp(raw: &str, column: &str) -> AppResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| AppError::database(format!("corrupt {column} timestamp '{raw}': {e}")))
    }

    fn parse_feeling(raw: i64, column: &str) -> AppResult<Feeling> {
        u8::try_from(raw)
            .ok()
            .and_then(|v| Feeling::try_from(v).ok())
            .ok_or_else(|| AppError::database(format!("corrupt {column} value {raw}")))
    }

    async fn exercise_records_for_session(
        &self,
        session_id: Uuid,
    ) -> AppResult<Vec<CompletedExercise>> {
        let rows = sqlx::query(
            r"
            SELECT exercise_name, set_number, reps, weight, rir, rpe
            FROM workout_exercises
            WHERE session_id = ?
            ORDER BY id
            ",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        // Rows come back in insertion order; consecutive rows with the same
        // name belong to the same exercise.
        let mut exercises: Vec<CompletedExercise> = Vec::new();
        for row in rows {
            let name: String = row.try_get("exercise_name")?;
            let record = SetRecord {
                set: row.try_get::<i64, _>("set_number")? as u32,
                reps: row.try_get::<i64, _>("reps")? as u32,
                weight: row.try_get("weight")?,
                rir: row.try_get::<Option<i64>, _>("rir")?.map(|v| v as u32),
                rpe: row.try_get::<Option<i64>, _>("rpe")?.map(|v| v as u32),
            };
            match exercises.last_mut() {
                Some(last) if last.name == name => last.sets.push(record),
                _ => exercises.push(CompletedExercise {
                    name,
                    sets: vec![record],
                }),
            }
        }
        Ok(exercises)
    }
}

#[async_trait]
impl DatabaseProvider for SqliteDatabase {
    async fn new(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains(":memory:")
            && !database_url.contains("mode=")
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        // An in-memory database lives and dies with its connection, so it
        // must be pinned to one connection that the pool never recycles
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(&connection_options)
                .await?
        } else {
            SqlitePool::connect(&connection_options).await?
        };

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_plans (
                user_id TEXT PRIMARY KEY,
                plan_data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                day TEXT NOT NULL,
                date TEXT NOT NULL,
                feeling INTEGER NOT NULL,
                notes TEXT NOT NULL DEFAULT ''
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_workout_sessions_user_date \
             ON workout_sessions(user_id, date)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                exercise_name TEXT NOT NULL,
                set_number INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                weight REAL NOT NULL,
                rir INTEGER,
                rpe INTEGER,
                FOREIGN KEY (session_id) REFERENCES workout_sessions (id) ON DELETE CASCADE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_workout_exercises_session \
             ON workout_exercises(session_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_progress (
                user_id TEXT NOT NULL,
                day TEXT NOT NULL,
                date TEXT NOT NULL,
                exercise_index INTEGER NOT NULL,
                exercise_name TEXT NOT NULL,
                sets_data TEXT NOT NULL,
                completed BOOLEAN NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, day, date, exercise_index)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id TEXT PRIMARY KEY,
                profile_data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_or_create_plan(&self, user_id: Uuid) -> AppResult<TrainingPlan> {
        let row = sqlx::query("SELECT plan_data FROM user_plans WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            let raw: String = row.try_get("plan_data")?;
            return Ok(serde_json::from_str(&raw)?);
        }

        // First access: materialize the default plan
        let plan = TrainingPlan::default_plan();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO user_plans (user_id, plan_data, created_at, updated_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id.to_string())
        .bind(serde_json::to_string(&plan)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!(%user_id, "materialized default training plan");
        Ok(plan)
    }

    async fn update_plan(&self, user_id: Uuid, plan: &TrainingPlan) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r"
            INSERT INTO user_plans (user_id, plan_data, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id)
            DO UPDATE SET plan_data = excluded.plan_data, updated_at = excluded.updated_at
            ",
        )
        .bind(user_id.to_string())
        .bind(serde_json::to_string(plan)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_workout_session(
        &self,
        user_id: Uuid,
        day: &str,
        date: DateTime<Utc>,
        evaluation: &SessionEvaluation,
    ) -> AppResult<Uuid> {
        let session_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO workout_sessions (id, user_id, day, date, feeling, notes) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(session_id.to_string())
        .bind(user_id.to_string())
        .bind(day)
        .bind(date.to_rfc3339())
        .bind(i64::from(evaluation.feeling.score()))
        .bind(&evaluation.notes)
        .execute(&self.pool)
        .await?;
        Ok(session_id)
    }

    async fn add_exercise_records(
        &self,
        session_id: Uuid,
        records: &[ExerciseRecord],
    ) -> AppResult<()> {
        for record in records {
            sqlx::query(
                "INSERT INTO workout_exercises \
                 (session_id, exercise_name, set_number, reps, weight, rir, rpe) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(session_id.to_string())
            .bind(&record.exercise_name)
            .bind(i64::from(record.set_number))
            .bind(i64::from(record.reps))
            .bind(record.weight)
            .bind(record.rir.map(i64::from))
            .bind(record.rpe.map(i64::from))
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn list_workout_history(&self, user_id: Uuid) -> AppResult<Vec<CompletedWorkoutSession>> {
        let rows = sqlx::query(
            "SELECT id, day, date, feeling, notes FROM workout_sessions \
             WHERE user_id = ? ORDER BY date DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            let raw_id: String = row.try_get("id")?;
            let session_id = Self::parse_uuid(&raw_id, "workout_sessions.id")?;
            let raw_date: String = row.try_get("date")?;
            let exercises = self.exercise_records_for_session(session_id).await?;
            sessions.push(CompletedWorkoutSession {
                id: session_id,
                user_id,
                day: row.try_get("day")?,
                date: Self::parse_timestamp(&raw_date, "workout_sessions.date")?,
                exercises,
                evaluation: SessionEvaluation {
                    feeling: Self::parse_feeling(
                        row.try_get("feeling")?,
                        "workout_sessions.feeling",
                    )?,
                    notes: row.try_get("notes")?,
                },
            });
        }
        Ok(sessions)
    }

    async fn delete_workout_session(&self, session_id: Uuid) -> AppResult<()> {
        // Cascade order: exercise records first, then the session row
        sqlx::query("DELETE FROM workout_exercises WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM workout_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_previous_exercise(
        &self,
        user_id: Uuid,
        day: &str,
        exercise_name: &str,
    ) -> AppResult<Option<PreviousExercise>> {
        let row = sqlx::query(
            r"
            SELECT we.reps, we.weight, we.rir, we.rpe, ws.feeling, ws.notes
            FROM workout_exercises we
            JOIN workout_sessions ws ON ws.id = we.session_id
            WHERE ws.user_id = ? AND ws.day = ? AND we.exercise_name = ?
            ORDER BY ws.date DESC, we.set_number DESC
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(day)
        .bind(exercise_name)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let notes: String = row.try_get("notes")?;
        Ok(Some(PreviousExercise {
            reps: row.try_get::<i64, _>("reps")? as u32,
            weight: row.try_get("weight")?,
            rir: row.try_get::<Option<i64>, _>("rir")?.map(|v| v as u32),
            rpe: row.try_get::<Option<i64>, _>("rpe")?.map(|v| v as u32),
            feeling: Self::parse_feeling(row.try_get("feeling")?, "workout_sessions.feeling").ok(),
            notes: if notes.is_empty() { None } else { Some(notes) },
        }))
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
        sqlx::query(
            r"
            INSERT INTO workout_progress
                (user_id, day, date, exercise_index, exercise_name, sets_data, completed, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, day, date, exercise_index)
            DO UPDATE SET
                exercise_name = excluded.exercise_name,
                sets_data = excluded.sets_data,
                completed = excluded.completed,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id.to_string())
        .bind(day)
        .bind(date.to_string())
        .bind(exercise_index as i64)
        .bind(exercise_name)
        .bind(serde_json::to_string(sets)?)
        .bind(completed)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_exercise_progress(
        &self,
        user_id: Uuid,
        day: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<ExerciseProgressRow>> {
        let rows = sqlx::query(
            "SELECT exercise_index, exercise_name, sets_data, completed, updated_at \
             FROM workout_progress \
             WHERE user_id = ? AND day = ? AND date = ? \
             ORDER BY exercise_index",
        )
        .bind(user_id.to_string())
        .bind(day)
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut progress = Vec::with_capacity(rows.len());
        for row in rows {
            let sets_data: String = row.try_get("sets_data")?;
            let raw_updated: String = row.try_get("updated_at")?;
            progress.push(ExerciseProgressRow {
                exercise_index: row.try_get::<i64, _>("exercise_index")? as usize,
                exercise_name: row.try_get("exercise_name")?,
                sets: serde_json::from_str(&sets_data)?,
                completed: row.try_get("completed")?,
                updated_at: Self::parse_timestamp(&raw_updated, "workout_progress.updated_at")?,
            });
        }
        Ok(progress)
    }

    async fn clear_exercise_progress(
        &self,
        user_id: Uuid,
        day: &str,
        date: NaiveDate,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM workout_progress WHERE user_id = ? AND day = ? AND date = ?")
            .bind(user_id.to_string())
            .bind(day)
            .bind(date.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_user_profile(&self, user_id: Uuid, profile_data: Value) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO user_profiles (user_id, profile_data, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id)
            DO UPDATE SET profile_data = excluded.profile_data, updated_at = excluded.updated_at
            ",
        )
        .bind(user_id.to_string())
        .bind(serde_json::to_string(&profile_data)?)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user_profile(&self, user_id: Uuid) -> AppResult<Option<Value>> {
        let row = sqlx::query("SELECT profile_data FROM user_profiles WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let raw: String = row.try_get("profile_data")?;
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => Ok(None),
        }
    }
}
