// ABOUTME: Workout session orchestrator sequencing a day's exercises to completion
// ABOUTME: Owns traversal, persistence cascades, evaluation hand-off, and finalization
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! Workout-level flow.
//!
//! The orchestrator owns the ordered traversal of a day's exercises and
//! delegates per-exercise mechanics to [`SetTracker`]. Every tracker
//! transition that changes recorded sets cascades into the progress
//! repository (local cache + remote rows). A day with no prescribed
//! exercises short-circuits to a rest day before the exercise loop starts.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::ProgressCache;
use crate::config::AppConfig;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{
    CompletedExercise, ExercisePrescription, ExerciseProgress, ExerciseRecord, SessionEvaluation,
};
use crate::notifications::{WorkoutEvent, WorkoutNotifier};
use crate::progress::{ProgressRepository, SyncRetryConfig};
use crate::workout::set_tracker::{
    BackEvent, GoalAchievement, SetInput, SetTracker, TrackerEvent,
};

/// Workout-level state machine positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No exercises prescribed for this day
    RestDay,
    /// Exercises are being worked through
    InProgress,
    /// Every exercise is complete; awaiting the subjective evaluation
    Evaluation,
    /// The session has been durably recorded and progress cleared
    Finished,
}

/// Outcome of a confirm/continue operation at the session level
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Set recorded; the rest countdown is running
    RestStarted,
    /// Set recorded and a goal weight was crossed
    GoalReached(GoalAchievement),
    /// Exercise finished; focus moved to the next incomplete exercise
    ExerciseAdvanced {
        /// Index now in focus
        next_index: usize,
    },
    /// Every exercise is complete; the evaluation step is ready
    EvaluationReady,
}

/// Outcome of session-level back-navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// A set was reopened within the current exercise
    SetReopened,
    /// Focus moved back to the previous exercise, reopened for edits
    MovedToPrevious {
        /// Index now in focus
        index: usize,
    },
    /// Already at the first set of the first exercise
    AtStart,
}

/// One user's workout session for one day.
///
/// Created by [`WorkoutSession::begin`], which loads the plan, resumes any
/// persisted progress, and focuses the first incomplete exercise.
pub struct WorkoutSession<C, D> {
    user_id: Uuid,
    day: String,
    prescriptions: Vec<ExercisePrescription>,
    exercises_state: BTreeMap<usize, ExerciseProgress>,
    current_index: usize,
    phase: SessionPhase,
    tracker: Option<SetTracker>,
    track_intensity: bool,
    rest_duration_secs: u32,
    repository: ProgressRepository<C, D>,
    database: D,
    notifier: Arc<dyn WorkoutNotifier>,
}

impl<C, D> WorkoutSession<C, D>
where
    C: ProgressCache + 'static,
    D: DatabaseProvider + 'static,
{
    /// Open a session for (user, day).
    ///
    /// Reads the plan (materializing the default on first access), resumes
    /// persisted progress, and focuses the first incomplete exercise. A day
    /// with zero prescribed exercises becomes a rest day and never enters
    /// the exercise loop.
    ///
    /// # Errors
    ///
    /// Returns an error when the plan cannot be read or local progress
    /// cannot be restored.
    pub async fn begin(
        user_id: Uuid,
        day: &str,
        database: D,
        cache: C,
        notifier: Arc<dyn WorkoutNotifier>,
        config: &AppConfig,
    ) -> AppResult<Self> {
        let plan = database.get_or_create_plan(user_id).await?;
        let workout = plan.day_workout(day);
        let repository = ProgressRepository::new(cache, database.clone(), Arc::clone(&notifier))
            .with_retry(SyncRetryConfig {
                max_retries: config.sync_max_retries,
                backoff: std::time::Duration::from_millis(config.sync_backoff_ms),
            });

        let mut session = Self {
            user_id,
            day: day.to_owned(),
            prescriptions: workout.exercises,
            exercises_state: BTreeMap::new(),
            current_index: 0,
            phase: SessionPhase::RestDay,
            tracker: None,
            track_intensity: plan.preferences.track_intensity,
            rest_duration_secs: config.rest_duration_secs,
            repository,
            database,
            notifier,
        };

        if session.prescriptions.is_empty() {
            info!(%user_id, day, "rest day, no exercises prescribed");
            return Ok(session);
        }

        let loaded = session
            .repository
            .load_progress(user_id, day, session.prescriptions.len())
            .await?;
        session.exercises_state = loaded.exercises_state;
        session.current_index = loaded.first_incomplete;
        session.phase = SessionPhase::InProgress;
        let tracker = session.build_tracker(session.current_index).await?;
        session.tracker = Some(tracker);
        debug!(
            %user_id, day,
            resumed_index = session.current_index,
            "workout session opened"
        );
        Ok(session)
    }

    /// Confirm the current set on the focused exercise.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` outside the in-progress phase or outside the
    /// tracker's `EnteringSet` state; storage errors from the local cache
    /// propagate.
    pub async fn confirm_set(&mut self, input: SetInput) -> AppResult<SessionEvent> {
        let tracker = self.active_tracker_mut()?;
        let event = tracker.confirm_set(input)?;
        self.handle_tracker_event(event).await
    }

    /// Acknowledge a goal celebration and continue the workout.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when no celebration is showing.
    pub async fn continue_from_celebration(&mut self) -> AppResult<SessionEvent> {
        let tracker = self.active_tracker_mut()?;
        let event = tracker.continue_from_celebration()?;
        self.handle_tracker_event(event).await
    }

    /// Skip the rest countdown.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when not resting.
    pub fn skip_rest(&mut self) -> AppResult<()> {
        self.active_tracker_mut()?.skip_rest()
    }

    /// Adjust the rest duration on the running countdown.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when not resting.
    pub fn adjust_rest(&mut self, delta_secs: i64) -> AppResult<()> {
        self.active_tracker_mut()?.adjust_rest(delta_secs)
    }

    /// Advance one second of rest; `true` when the countdown just expired
    /// and the next set opened.
    pub fn tick(&mut self) -> bool {
        self.tracker.as_mut().is_some_and(SetTracker::tick)
    }

    /// Step backwards: reopen the previous set, or move to the previous
    /// exercise when already on set 1.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` outside the in-progress phase; storage errors
    /// from the progress cascade propagate.
    pub async fn go_back(&mut self) -> AppResult<BackOutcome> {
        let tracker = self.active_tracker_mut()?;
        match tracker.go_back()? {
            BackEvent::SetReopened => {
                self.capture_tracker_state(false);
                self.persist_current().await?;
                Ok(BackOutcome::SetReopened)
            }
            BackEvent::PreviousExercise => {
                if self.current_index == 0 {
                    return Ok(BackOutcome::AtStart);
                }
                let previous = self.current_index - 1;
                // Reopen the previous exercise for edits, keeping its sets
                if let Some(progress) = self.exercises_state.get_mut(&previous) {
                    progress.completed = false;
                }
                self.current_index = previous;
                let tracker = self.build_tracker(previous).await?;
                self.tracker = Some(tracker);
                self.persist_current().await?;
                Ok(BackOutcome::MovedToPrevious { index: previous })
            }
        }
    }

    /// Change focus to `index` without marking anything complete.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `index` is out of range or the session is
    /// not in progress.
    pub async fn navigate_to(&mut self, index: usize) -> AppResult<()> {
        if self.phase != SessionPhase::InProgress {
            return Err(AppError::invalid_input("workout is not in progress"));
        }
        if index >= self.prescriptions.len() {
            return Err(AppError::out_of_range(format!(
                "exercise index {index} out of range ({} exercises)",
                self.prescriptions.len()
            )));
        }
        if index == self.current_index {
            return Ok(());
        }
        self.current_index = index;
        let tracker = self.build_tracker(index).await?;
        self.tracker = Some(tracker);
        self.persist_current().await?;
        Ok(())
    }

    /// Record the finished session and clear persisted progress.
    ///
    /// Ordering is record-then-clear: progress is only discarded once the
    /// session (header and exercise records) is durably stored, so a failed
    /// save leaves everything resumable and the user retries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` outside the evaluation phase; recorder errors
    /// propagate after being surfaced through the notifier.
    pub async fn finish(&mut self, evaluation: SessionEvaluation) -> AppResult<Uuid> {
        if self.phase != SessionPhase::Evaluation {
            return Err(AppError::invalid_input(
                "workout is not awaiting evaluation",
            ));
        }

        let exercises = self.completed_exercises();
        let recorded_at = Utc::now();

        let session_id = match self
            .database
            .create_workout_session(self.user_id, &self.day, recorded_at, &evaluation)
            .await
        {
            Ok(id) => id,
            Err(err) => return Err(self.report_save_failure(err)),
        };

        let records: Vec<ExerciseRecord> = exercises
            .iter()
            .flat_map(|exercise| {
                exercise.sets.iter().map(|set| ExerciseRecord {
                    exercise_name: exercise.name.clone(),
                    set_number: set.set,
                    reps: set.reps,
                    weight: set.weight,
                    rir: set.rir,
                    rpe: set.rpe,
                })
            })
            .collect();

        if let Err(err) = self.database.add_exercise_records(session_id, &records).await {
            return Err(self.report_save_failure(err));
        }

        // Progress is only cleared after the record write succeeded; a
        // failed cleanup is logged but the session is already safe
        if let Err(err) = self.repository.clear_progress(self.user_id, &self.day).await {
            warn!(user_id = %self.user_id, day = %self.day, error = %err,
                "failed to clear persisted progress after recording session");
        }

        self.phase = SessionPhase::Finished;
        self.notifier
            .notify(WorkoutEvent::SessionSaved { session_id });
        info!(user_id = %self.user_id, day = %self.day, %session_id, "workout recorded");
        Ok(session_id)
    }

    // ── internals ───────────────────────────────────────────────────────

    fn active_tracker_mut(&mut self) -> AppResult<&mut SetTracker> {
        if self.phase != SessionPhase::InProgress {
            return Err(AppError::invalid_input("workout is not in progress"));
        }
        self.tracker
            .as_mut()
            .ok_or_else(|| AppError::internal("in-progress session without a tracker"))
    }

    async fn handle_tracker_event(&mut self, event: TrackerEvent) -> AppResult<SessionEvent> {
        match event {
            TrackerEvent::RestStarted => {
                self.capture_tracker_state(false);
                self.persist_current().await?;
                Ok(SessionEvent::RestStarted)
            }
            TrackerEvent::GoalReached(achievement) => {
                self.capture_tracker_state(false);
                self.persist_current().await?;
                if let Some(tracker) = self.tracker.as_ref() {
                    self.notifier.notify(WorkoutEvent::GoalAchieved {
                        exercise: tracker.prescription().name.clone(),
                        weight: achievement.weight,
                        target: achievement.target,
                        days_remaining: achievement.days_remaining,
                    });
                }
                Ok(SessionEvent::GoalReached(achievement))
            }
            TrackerEvent::ExerciseComplete(data) => self.on_exercise_complete(data).await,
        }
    }

    async fn on_exercise_complete(
        &mut self,
        data: CompletedExercise,
    ) -> AppResult<SessionEvent> {
        self.exercises_state.insert(
            self.current_index,
            ExerciseProgress {
                sets: data.sets,
                completed: true,
            },
        );
        self.persist_current().await?;

        match self.next_incomplete_index() {
            Some(next) => {
                self.current_index = next;
                let tracker = self.build_tracker(next).await?;
                self.tracker = Some(tracker);
                Ok(SessionEvent::ExerciseAdvanced { next_index: next })
            }
            None => {
                self.tracker = None;
                self.phase = SessionPhase::Evaluation;
                debug!(user_id = %self.user_id, day = %self.day, "all exercises complete");
                Ok(SessionEvent::EvaluationReady)
            }
        }
    }

    /// Forward circular scan starting at current+1, stopping at the first
    /// incomplete index. Supports finishing exercises out of declared order
    /// via manual navigation.
    fn next_incomplete_index(&self) -> Option<usize> {
        let count = self.prescriptions.len();
        (0..count)
            .map(|offset| (self.current_index + 1 + offset) % count)
            .find(|index| {
                self.exercises_state
                    .get(index)
                    .map_or(true, |progress| !progress.completed)
            })
    }

    fn capture_tracker_state(&mut self, completed: bool) {
        if let Some(tracker) = self.tracker.as_ref() {
            self.exercises_state.insert(
                self.current_index,
                ExerciseProgress {
                    sets: tracker.sets().to_vec(),
                    completed,
                },
            );
        }
    }

    async fn persist_current(&self) -> AppResult<()> {
        let name = self
            .prescriptions
            .get(self.current_index)
            .map(|p| p.name.clone())
            .ok_or_else(|| AppError::internal("focused exercise missing from plan"))?;
        // Detached: the remote half retries in the background and reports
        // through the notifier on exhaustion
        let _sync = self
            .repository
            .persist_exercise_progress(
                self.user_id,
                &self.day,
                self.current_index,
                &name,
                &self.exercises_state,
                self.current_index,
            )
            .await?;
        Ok(())
    }

    async fn build_tracker(&self, index: usize) -> AppResult<SetTracker> {
        let prescription = self
            .prescriptions
            .get(index)
            .cloned()
            .ok_or_else(|| AppError::internal("exercise index out of plan range"))?;

        // Optional hint; a failed lookup only suppresses the display
        let previous = match self
            .database
            .get_previous_exercise(self.user_id, &self.day, &prescription.name)
            .await
        {
            Ok(previous) => previous,
            Err(err) => {
                debug!(error = %err, exercise = %prescription.name,
                    "previous workout hint unavailable");
                None
            }
        };

        let resumed = self
            .exercises_state
            .get(&index)
            .map(|progress| progress.sets.clone())
            .unwrap_or_default();

        Ok(SetTracker::new(
            prescription,
            index,
            resumed,
            self.track_intensity,
            previous,
            self.rest_duration_secs,
        ))
    }

    fn completed_exercises(&self) -> Vec<CompletedExercise> {
        self.prescriptions
            .iter()
            .enumerate()
            .filter_map(|(index, prescription)| {
                self.exercises_state
                    .get(&index)
                    .filter(|progress| progress.completed && !progress.sets.is_empty())
                    .map(|progress| CompletedExercise {
                        name: prescription.name.clone(),
                        sets: progress.sets.clone(),
                    })
            })
            .collect()
    }

    fn report_save_failure(&self, err: AppError) -> AppError {
        warn!(user_id = %self.user_id, day = %self.day, error = %err,
            "failed to record workout session; progress retained for retry");
        self.notifier.notify(WorkoutEvent::SessionSaveFailed {
            message: err.to_string(),
        });
        err
    }

    // ── accessors ───────────────────────────────────────────────────────

    /// Current workout-level phase
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether this day has no prescribed exercises
    #[must_use]
    pub fn is_rest_day(&self) -> bool {
        self.phase == SessionPhase::RestDay
    }

    /// Index of the focused exercise
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of exercises prescribed for the day
    #[must_use]
    pub fn exercise_count(&self) -> usize {
        self.prescriptions.len()
    }

    /// The focused exercise's tracker, when the session is in progress
    #[must_use]
    pub const fn tracker(&self) -> Option<&SetTracker> {
        self.tracker.as_ref()
    }

    /// Per-exercise progress keyed by index
    #[must_use]
    pub const fn exercises_state(&self) -> &BTreeMap<usize, ExerciseProgress> {
        &self.exercises_state
    }

    /// Percentage of exercises completed, rounded
    #[must_use]
    pub fn completion_percentage(&self) -> u8 {
        if self.prescriptions.is_empty() {
            return 0;
        }
        let completed = self
            .exercises_state
            .values()
            .filter(|progress| progress.completed)
            .count();
        ((completed as f64 / self.prescriptions.len() as f64) * 100.0).round() as u8
    }

    /// Day label this session trains under
    #[must_use]
    pub fn day(&self) -> &str {
        &self.day
    }
}
