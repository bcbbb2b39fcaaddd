// ABOUTME: End-to-end workout scenario from plan load through recorded history
// ABOUTME: Two exercises, three sets, rest intervals, evaluation, durable record
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

mod common;

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use common::{create_test_cache, create_test_database, test_config, two_exercise_plan};
use liftlog::database_plugins::DatabaseProvider;
use liftlog::models::{Feeling, SessionEvaluation};
use liftlog::notifications::NullNotifier;
use liftlog::workout::{SessionEvent, SessionPhase, SetInput, TrackerState, WorkoutSession};

#[tokio::test]
async fn full_workout_from_plan_to_history() -> Result<()> {
    let database = create_test_database().await?;
    let cache = create_test_cache().await?;
    let user_id = Uuid::new_v4();

    // Day with two exercises, prescribed sets [2, 1]
    database.update_plan(user_id, &two_exercise_plan()).await?;

    let mut session = WorkoutSession::begin(
        user_id,
        "monday",
        database.clone(),
        cache.clone(),
        Arc::new(NullNotifier),
        &test_config(),
    )
    .await?;
    assert_eq!(session.phase(), SessionPhase::InProgress);
    assert_eq!(session.current_index(), 0);

    // Set 1: 10 reps at 50kg, then rest
    let event = session.confirm_set(SetInput::new(10, 50.0)).await?;
    assert_eq!(event, SessionEvent::RestStarted);
    assert_eq!(
        session.tracker().unwrap().state(),
        TrackerState::Resting
    );

    // Ride the countdown a bit, then cut it short
    session.tick();
    session.tick();
    session.skip_rest()?;
    assert_eq!(session.tracker().unwrap().current_set(), 2);

    // Set 2: 10 reps at 52.5kg finishes exercise 1, focus moves on
    let event = session.confirm_set(SetInput::new(10, 52.5)).await?;
    assert_eq!(event, SessionEvent::ExerciseAdvanced { next_index: 1 });
    assert_eq!(session.completion_percentage(), 50);

    // Exercise 2 has a single set; confirming it completes the workout
    let event = session.confirm_set(SetInput::new(10, 40.0)).await?;
    assert_eq!(event, SessionEvent::EvaluationReady);
    assert_eq!(session.phase(), SessionPhase::Evaluation);

    // Let the detached remote syncs settle before finalizing
    tokio::time::sleep(Duration::from_millis(50)).await;

    let session_id = session
        .finish(SessionEvaluation {
            feeling: Feeling::Good,
            notes: "strong bench day".to_owned(),
        })
        .await?;
    assert_eq!(session.phase(), SessionPhase::Finished);

    // The durable record carries exactly 2 exercises and 3 sets
    let history = database.list_workout_history(user_id).await?;
    assert_eq!(history.len(), 1);
    let recorded = &history[0];
    assert_eq!(recorded.id, session_id);
    assert_eq!(recorded.day, "monday");
    assert_eq!(recorded.evaluation.feeling, Feeling::Good);
    assert_eq!(recorded.exercises.len(), 2);
    let total_sets: usize = recorded
        .exercises
        .iter()
        .map(|exercise| exercise.sets.len())
        .sum();
    assert_eq!(total_sets, 3);
    assert_eq!(recorded.exercises[0].name, "Bench Press");
    assert!((recorded.exercises[0].sets[1].weight - 52.5).abs() < f64::EPSILON);

    // Progress was cleared after the record write
    let rows = database
        .load_exercise_progress(user_id, "monday", Utc::now().date_naive())
        .await?;
    assert!(rows.is_empty());

    // A fresh session for the same day starts clean
    let fresh = WorkoutSession::begin(
        user_id,
        "monday",
        database.clone(),
        cache.clone(),
        Arc::new(NullNotifier),
        &test_config(),
    )
    .await?;
    assert!(fresh.tracker().unwrap().sets().is_empty());
    assert_eq!(fresh.tracker().unwrap().current_set(), 1);

    // The recorded session now feeds the "last time" hint
    let hint = database
        .get_previous_exercise(user_id, "monday", "Bench Press")
        .await?
        .unwrap();
    assert!((hint.weight - 52.5).abs() < f64::EPSILON);
    Ok(())
}
