// ABOUTME: Core data models for training plans, workout sessions, and set records
// ABOUTME: Serde-serializable domain types shared by the tracker, storage, and analytics
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! # Data Models
//!
//! Core data structures for the workout tracking engine.
//!
//! ## Design Principles
//!
//! - **Storage Agnostic**: models do not know which backend persists them
//! - **Extensible**: optional fields accommodate per-user preferences (RIR/RPE)
//! - **Serializable**: all models support JSON serialization for the remote
//!   store's document columns and the local cache blobs
//!
//! ## Core Models
//!
//! - [`TrainingPlan`]: a user's weekly plan, keyed by lowercase weekday name
//! - [`ExercisePrescription`]: target sets/reps/weight for one exercise
//! - [`SetRecord`] / [`ExerciseProgress`]: in-session confirmed work
//! - [`CompletedWorkoutSession`]: one immutable history entry

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::constants::limits;

/// A user's weekly training plan.
///
/// The `workouts` map is day-keyed and unordered; ordering matters only
/// inside each [`DayWorkout`]. Created lazily on first read (a default plan
/// is materialized if none exists), updated by full-document replace, never
/// deleted by the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingPlan {
    /// Lowercase weekday name -> exercises for that day
    pub workouts: HashMap<String, DayWorkout>,
    /// User preferences attached to the plan document
    #[serde(default)]
    pub preferences: PlanPreferences,
}

/// Preferences stored alongside the plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PlanPreferences {
    /// Capture RIR/RPE on every confirmed set
    #[serde(default)]
    pub track_intensity: bool,
}

impl TrainingPlan {
    /// The plan materialized for users who have never edited one.
    ///
    /// Four training days with compound lifts; weights in kilograms.
    #[must_use]
    pub fn default_plan() -> Self {
        let mut workouts = HashMap::new();
        workouts.insert(
            "monday".to_owned(),
            DayWorkout {
                exercises: vec![
                    ExercisePrescription::new("Bench Press", 4, 10, 60.0)
                        .with_notes("Keep elbows at 45 degrees, feet planted."),
                    ExercisePrescription::new("Dumbbell Flys", 3, 12, 15.0),
                ],
            },
        );
        workouts.insert(
            "tuesday".to_owned(),
            DayWorkout {
                exercises: vec![ExercisePrescription::new("Pull-Ups", 4, 8, 0.0)
                    .with_notes("Full range of motion.")],
            },
        );
        workouts.insert(
            "thursday".to_owned(),
            DayWorkout {
                exercises: vec![ExercisePrescription::new("Squats", 4, 10, 80.0)
                    .with_notes("Break parallel, chest up.")],
            },
        );
        workouts.insert(
            "friday".to_owned(),
            DayWorkout {
                exercises: vec![ExercisePrescription::new("Overhead Press", 4, 10, 40.0)
                    .with_notes("Do not arch the lower back.")],
            },
        );
        Self {
            workouts,
            preferences: PlanPreferences::default(),
        }
    }

    /// Exercises prescribed for `day`, empty when the day is not in the plan
    /// (a rest day).
    #[must_use]
    pub fn day_workout(&self, day: &str) -> DayWorkout {
        self.workouts.get(day).cloned().unwrap_or_default()
    }
}

/// Ordered sequence of exercises for one training day.
///
/// Order is significant: it defines the exercise sequence in a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DayWorkout {
    /// Exercises in prescribed order
    pub exercises: Vec<ExercisePrescription>,
}

/// One exercise's targets within a day.
///
/// The name is the identity key within a day; it is not a durable id.
/// `sets` is the authoritative count the set tracker drives to completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExercisePrescription {
    /// Exercise name (identity within the day)
    pub name: String,
    /// Target set count
    pub sets: u32,
    /// Target repetitions per set
    pub reps: u32,
    /// Target working weight in kilograms
    pub weight: f64,
    /// Free-text technique notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Goal weight the user is working toward
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    /// Date the goal weight should be reached by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    /// Reference technique video URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technique_video: Option<String>,
}

impl ExercisePrescription {
    /// Create a prescription with the required targets
    #[must_use]
    pub fn new(name: impl Into<String>, sets: u32, reps: u32, weight: f64) -> Self {
        Self {
            name: name.into(),
            sets,
            reps,
            weight,
            notes: None,
            target_weight: None,
            target_date: None,
            technique_video: None,
        }
    }

    /// Attach technique notes
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attach a goal weight and optional deadline
    #[must_use]
    pub fn with_goal(mut self, target_weight: f64, target_date: Option<NaiveDate>) -> Self {
        self.target_weight = Some(target_weight);
        self.target_date = target_date;
        self
    }
}

/// One confirmed set within an exercise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetRecord {
    /// 1-based set number within the exercise
    pub set: u32,
    /// Repetitions performed
    pub reps: u32,
    /// Weight lifted in kilograms
    pub weight: f64,
    /// Reps in reserve, when intensity tracking is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rir: Option<u32>,
    /// Rate of perceived exertion, when intensity tracking is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<u32>,
}

/// Per-exercise state within an in-progress workout session.
///
/// `completed = true` is consistent with the prescription's set count in the
/// normal flow, but fewer sets are tolerated when the user force-completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExerciseProgress {
    /// Sets confirmed so far, in order
    pub sets: Vec<SetRecord>,
    /// Whether the exercise has been marked complete
    pub completed: bool,
}

/// Subjective post-workout feeling on a 1-5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Feeling {
    /// Completely drained
    Exhausted,
    /// Below par
    Tired,
    /// Unremarkable
    Normal,
    /// Solid session
    Good,
    /// Best-day energy
    Excellent,
}

impl Feeling {
    /// Numeric value on the 1-5 scale
    #[must_use]
    pub const fn score(self) -> u8 {
        match self {
            Self::Exhausted => 1,
            Self::Tired => 2,
            Self::Normal => 3,
            Self::Good => 4,
            Self::Excellent => 5,
        }
    }
}

impl From<Feeling> for u8 {
    fn from(feeling: Feeling) -> Self {
        feeling.score()
    }
}

impl TryFrom<u8> for Feeling {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Exhausted),
            2 => Ok(Self::Tired),
            3 => Ok(Self::Normal),
            4 => Ok(Self::Good),
            5 => Ok(Self::Excellent),
            other => Err(format!(
                "feeling must be between {} and {}, got {other}",
                limits::MIN_FEELING,
                limits::MAX_FEELING
            )),
        }
    }
}

/// Subjective evaluation captured when a workout finishes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionEvaluation {
    /// How the session felt, 1-5
    pub feeling: Feeling,
    /// Free-text notes
    #[serde(default)]
    pub notes: String,
}

/// One exercise's confirmed sets inside a finished session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedExercise {
    /// Exercise name as prescribed
    pub name: String,
    /// Confirmed sets in order
    pub sets: Vec<SetRecord>,
}

/// A finished workout, immutable once recorded.
///
/// Deleting one cascades to its exercise record rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedWorkoutSession {
    /// Session id assigned by the recorder
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Day label the session was trained under ("monday", ...)
    pub day: String,
    /// Completion timestamp
    pub date: DateTime<Utc>,
    /// Exercises in plan order, each with its confirmed sets
    pub exercises: Vec<CompletedExercise>,
    /// Subjective evaluation
    pub evaluation: SessionEvaluation,
}

/// Flattened exercise record row as handed to the session recorder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseRecord {
    /// Exercise name
    pub exercise_name: String,
    /// 1-based set number within the exercise
    pub set_number: u32,
    /// Repetitions performed
    pub reps: u32,
    /// Weight lifted in kilograms
    pub weight: f64,
    /// Reps in reserve, if captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rir: Option<u32>,
    /// Rate of perceived exertion, if captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<u32>,
}

/// The most recent recorded performance of an exercise on a given day,
/// shown as a "last time you did this" hint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreviousExercise {
    /// Reps of the last recorded set
    pub reps: u32,
    /// Weight of the last recorded set
    pub weight: f64,
    /// RIR of the last recorded set, if captured
    pub rir: Option<u32>,
    /// RPE of the last recorded set, if captured
    pub rpe: Option<u32>,
    /// Feeling recorded for that session
    pub feeling: Option<Feeling>,
    /// Notes recorded for that session
    pub notes: Option<String>,
}
