// ABOUTME: Per-exercise state machine driving one set at a time through rest intervals
// ABOUTME: Handles input coercion, goal-crossing detection, and undo via back-navigation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! Per-exercise set tracking.
//!
//! States: `EnteringSet -> (goal check) -> [GoalCelebration] -> Resting ->
//! EnteringSet(next) -> ... -> ExerciseComplete`. The tracker is pure state;
//! it performs no IO. The orchestrator owns persistence and feeds the
//! tracker's confirmed-set list into the progress repository after every
//! transition.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::errors::{AppError, AppResult};
use crate::models::{CompletedExercise, ExercisePrescription, PreviousExercise, SetRecord};
use crate::workout::rest_timer::RestTimer;

/// Tracker state machine positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Waiting for the user to confirm the current set
    EnteringSet,
    /// A goal weight was just crossed; waiting for acknowledgement
    GoalCelebration,
    /// Counting down the rest interval
    Resting,
    /// All prescribed sets confirmed; control returns to the orchestrator
    ExerciseComplete,
}

/// User input for one set.
///
/// Raw text input is coerced, never rejected: unparseable numbers collapse
/// to zero, matching the product's tolerant entry fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SetInput {
    /// Repetitions performed
    pub reps: u32,
    /// Weight lifted in kilograms
    pub weight: f64,
    /// Reps in reserve, when intensity tracking is on
    pub rir: Option<u32>,
    /// Rate of perceived exertion, when intensity tracking is on
    pub rpe: Option<u32>,
}

impl SetInput {
    /// Input with explicit numeric values
    #[must_use]
    pub const fn new(reps: u32, weight: f64) -> Self {
        Self {
            reps,
            weight,
            rir: None,
            rpe: None,
        }
    }

    /// Attach RIR/RPE values
    #[must_use]
    pub const fn with_intensity(mut self, rir: u32, rpe: u32) -> Self {
        self.rir = Some(rir);
        self.rpe = Some(rpe);
        self
    }

    /// Coerce raw text fields; invalid numeric text collapses to 0
    #[must_use]
    pub fn parse(reps_text: &str, weight_text: &str) -> Self {
        Self {
            reps: reps_text.trim().parse().unwrap_or(0),
            weight: weight_text.trim().parse().unwrap_or(0.0),
            rir: None,
            rpe: None,
        }
    }
}

/// Details of a goal-weight crossing, captured for the celebration screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalAchievement {
    /// Weight that crossed the threshold
    pub weight: f64,
    /// The goal weight
    pub target: f64,
    /// Days until the target date; negative when already past it
    pub days_remaining: Option<i64>,
    /// Whether the goal landed before its target date
    pub early: bool,
}

/// Outcome of confirming a set (or continuing past a celebration)
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// Set recorded; rest countdown started for the next one
    RestStarted,
    /// Set recorded and it crossed the goal weight for the first time this
    /// exercise instance; the tracker is now celebrating
    GoalReached(GoalAchievement),
    /// Final set recorded; the accumulated set list is handed back
    ExerciseComplete(CompletedExercise),
}

/// Outcome of back-navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackEvent {
    /// The last confirmed set was popped and its values restored as input
    SetReopened,
    /// Already on set 1; the orchestrator decides what "previous" means
    PreviousExercise,
}

/// Per-exercise state machine.
///
/// Constructed once per focused exercise, optionally resuming from
/// previously recorded sets. The previous-workout hint is supplied by the
/// orchestrator; a failed lookup simply arrives as `None`.
#[derive(Debug, Clone)]
pub struct SetTracker {
    prescription: ExercisePrescription,
    position: usize,
    track_intensity: bool,
    previous: Option<PreviousExercise>,
    completed_sets: Vec<SetRecord>,
    current_set: u32,
    state: TrackerState,
    rest_timer: RestTimer,
    suggested: SetInput,
}

impl SetTracker {
    /// Create a tracker, resuming from `initial_sets` when non-empty.
    ///
    /// Inputs are pre-populated from the last resumed set when present,
    /// otherwise from the prescription, with the previous workout's weight
    /// taking precedence for a fresh start.
    #[must_use]
    pub fn new(
        prescription: ExercisePrescription,
        position: usize,
        initial_sets: Vec<SetRecord>,
        track_intensity: bool,
        previous: Option<PreviousExercise>,
        rest_duration_secs: u32,
    ) -> Self {
        let current_set = initial_sets.len() as u32 + 1;
        let suggested = initial_sets.last().map_or_else(
            || {
                let weight = previous
                    .as_ref()
                    .map(|p| p.weight)
                    .filter(|w| *w > 0.0)
                    .unwrap_or(prescription.weight);
                SetInput {
                    reps: prescription.reps,
                    weight,
                    rir: track_intensity.then_some(defaults::SUGGESTED_RIR),
                    rpe: track_intensity.then_some(defaults::SUGGESTED_RPE),
                }
            },
            |last| SetInput {
                reps: last.reps,
                weight: last.weight,
                rir: last.rir,
                rpe: last.rpe,
            },
        );

        Self {
            prescription,
            position,
            track_intensity,
            previous,
            completed_sets: initial_sets,
            current_set,
            state: TrackerState::EnteringSet,
            rest_timer: RestTimer::new(rest_duration_secs),
            suggested,
        }
    }

    /// Confirm the current set.
    ///
    /// Appends a [`SetRecord`] with the next sequential set number. When the
    /// recorded weight crosses the exercise's goal weight for the first time
    /// in this exercise instance, the tracker enters `GoalCelebration`
    /// instead of advancing; the set is appended before the celebration so
    /// progress is not lost if the user never continues.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when called outside `EnteringSet`.
    pub fn confirm_set(&mut self, input: SetInput) -> AppResult<TrackerEvent> {
        if self.state != TrackerState::EnteringSet {
            return Err(AppError::invalid_input(
                "confirm_set is only valid while entering a set",
            ));
        }

        let record = self.record_from(&input);

        if let Some(target) = self.prescription.target_weight.filter(|t| *t > 0.0) {
            let crossed = record.weight >= target;
            // Detected once per exercise instance so a later heavy set does
            // not re-interrupt the session
            let already_achieved = self.completed_sets.iter().any(|s| s.weight >= target);
            if crossed && !already_achieved {
                let days_remaining = self.prescription.target_date.map(days_until);
                let achievement = GoalAchievement {
                    weight: record.weight,
                    target,
                    days_remaining,
                    early: days_remaining.is_some_and(|d| d > 0),
                };
                self.suggested = input;
                self.completed_sets.push(record);
                self.state = TrackerState::GoalCelebration;
                return Ok(TrackerEvent::GoalReached(achievement));
            }
        }

        self.suggested = input;
        Ok(self.advance(record))
    }

    /// Acknowledge the celebration and perform the advance `confirm_set`
    /// would have performed directly.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when no celebration is showing.
    pub fn continue_from_celebration(&mut self) -> AppResult<TrackerEvent> {
        if self.state != TrackerState::GoalCelebration {
            return Err(AppError::invalid_input("no goal celebration to continue from"));
        }
        let Some(record) = self.completed_sets.last().cloned() else {
            return Err(AppError::internal("celebration without a recorded set"));
        };
        Ok(self.advance(record))
    }

    /// Advance one second of rest; returns `true` when the countdown expired
    /// and the tracker moved to the next set.
    pub fn tick(&mut self) -> bool {
        if self.state != TrackerState::Resting {
            return false;
        }
        if self.rest_timer.tick() {
            self.begin_next_set();
            return true;
        }
        false
    }

    /// Skip the rest countdown and move straight to the next set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when not resting.
    pub fn skip_rest(&mut self) -> AppResult<()> {
        if self.state != TrackerState::Resting {
            return Err(AppError::invalid_input("not resting"));
        }
        self.rest_timer.stop();
        self.begin_next_set();
        Ok(())
    }

    /// Adjust the rest duration (floored at 10s) and restart the countdown.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when not resting.
    pub fn adjust_rest(&mut self, delta_secs: i64) -> AppResult<()> {
        if self.state != TrackerState::Resting {
            return Err(AppError::invalid_input("not resting"));
        }
        self.rest_timer.adjust(delta_secs);
        Ok(())
    }

    /// Step backwards.
    ///
    /// From set N>1: pops the last confirmed set, decrements the counter,
    /// and restores the popped values as the suggested input, so an edited
    /// re-confirm is a non-destructive retry. From set 1: signals the
    /// orchestrator. From rest: the just-confirmed set is popped and the
    /// tracker returns to entering the same set number (resting is undone).
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` from `GoalCelebration` or `ExerciseComplete`.
    pub fn go_back(&mut self) -> AppResult<BackEvent> {
        match self.state {
            TrackerState::EnteringSet => {
                if self.current_set <= 1 {
                    return Ok(BackEvent::PreviousExercise);
                }
                if let Some(popped) = self.completed_sets.pop() {
                    self.suggested = SetInput {
                        reps: popped.reps,
                        weight: popped.weight,
                        rir: popped.rir,
                        rpe: popped.rpe,
                    };
                }
                self.current_set -= 1;
                Ok(BackEvent::SetReopened)
            }
            TrackerState::Resting => {
                self.rest_timer.stop();
                if let Some(popped) = self.completed_sets.pop() {
                    self.suggested = SetInput {
                        reps: popped.reps,
                        weight: popped.weight,
                        rir: popped.rir,
                        rpe: popped.rpe,
                    };
                }
                // The set counter was not advanced yet; re-enter the same set
                self.state = TrackerState::EnteringSet;
                Ok(BackEvent::SetReopened)
            }
            TrackerState::GoalCelebration | TrackerState::ExerciseComplete => Err(
                AppError::invalid_input("cannot go back from this state"),
            ),
        }
    }

    fn record_from(&self, input: &SetInput) -> SetRecord {
        SetRecord {
            set: self.current_set,
            reps: input.reps,
            weight: input.weight,
            rir: self
                .track_intensity
                .then(|| input.rir.unwrap_or(defaults::SUGGESTED_RIR)),
            rpe: self
                .track_intensity
                .then(|| input.rpe.unwrap_or(defaults::SUGGESTED_RPE)),
        }
    }

    /// Shared advance logic for direct confirms and post-celebration
    /// continues. The record is only appended when the celebration path has
    /// not already done so.
    fn advance(&mut self, record: SetRecord) -> TrackerEvent {
        let already_appended = self
            .completed_sets
            .last()
            .is_some_and(|last| last.set == record.set);
        if !already_appended {
            self.completed_sets.push(record);
        }

        if self.current_set < self.prescription.sets {
            self.state = TrackerState::Resting;
            self.rest_timer.start();
            TrackerEvent::RestStarted
        } else {
            self.state = TrackerState::ExerciseComplete;
            TrackerEvent::ExerciseComplete(CompletedExercise {
                name: self.prescription.name.clone(),
                sets: self.completed_sets.clone(),
            })
        }
    }

    fn begin_next_set(&mut self) {
        self.current_set += 1;
        self.state = TrackerState::EnteringSet;
    }

    /// Current state machine position
    #[must_use]
    pub const fn state(&self) -> TrackerState {
        self.state
    }

    /// 1-based number of the set being entered
    #[must_use]
    pub const fn current_set(&self) -> u32 {
        self.current_set
    }

    /// Prescribed set count
    #[must_use]
    pub const fn total_sets(&self) -> u32 {
        self.prescription.sets
    }

    /// Sets confirmed so far
    #[must_use]
    pub fn sets(&self) -> &[SetRecord] {
        &self.completed_sets
    }

    /// Values to pre-populate the input fields with
    #[must_use]
    pub const fn suggested_input(&self) -> &SetInput {
        &self.suggested
    }

    /// The "last time you did this" hint, when the lookup succeeded
    #[must_use]
    pub const fn previous(&self) -> Option<&PreviousExercise> {
        self.previous.as_ref()
    }

    /// The exercise being tracked
    #[must_use]
    pub const fn prescription(&self) -> &ExercisePrescription {
        &self.prescription
    }

    /// 0-based position among the day's exercises
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Rest countdown state
    #[must_use]
    pub const fn rest_timer(&self) -> &RestTimer {
        &self.rest_timer
    }
}

/// Whole days from today until `date`; negative when `date` is past
fn days_until(date: NaiveDate) -> i64 {
    (date - Utc::now().date_naive()).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn bench_press() -> ExercisePrescription {
        ExercisePrescription::new("Bench Press", 3, 10, 60.0)
    }

    fn tracker(prescription: ExercisePrescription) -> SetTracker {
        SetTracker::new(prescription, 0, Vec::new(), false, None, 90)
    }

    #[test]
    fn input_coercion_collapses_invalid_text_to_zero() {
        let input = SetInput::parse("ten", "abc");
        assert_eq!(input.reps, 0);
        assert!((input.weight - 0.0).abs() < f64::EPSILON);

        let ok = SetInput::parse(" 8 ", "62.5");
        assert_eq!(ok.reps, 8);
        assert!((ok.weight - 62.5).abs() < f64::EPSILON);
    }

    #[test]
    fn confirming_all_sets_completes_the_exercise() {
        let mut t = tracker(bench_press());
        assert!(matches!(
            t.confirm_set(SetInput::new(10, 60.0)).unwrap(),
            TrackerEvent::RestStarted
        ));
        t.skip_rest().unwrap();
        assert!(matches!(
            t.confirm_set(SetInput::new(10, 60.0)).unwrap(),
            TrackerEvent::RestStarted
        ));
        t.skip_rest().unwrap();

        let event = t.confirm_set(SetInput::new(9, 60.0)).unwrap();
        let TrackerEvent::ExerciseComplete(done) = event else {
            panic!("expected completion");
        };
        assert_eq!(done.sets.len(), 3);
        let numbers: Vec<u32> = done.sets.iter().map(|s| s.set).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn rest_expiry_advances_like_skip() {
        let mut t = SetTracker::new(bench_press(), 0, Vec::new(), false, None, 10);
        t.confirm_set(SetInput::new(10, 60.0)).unwrap();
        assert_eq!(t.state(), TrackerState::Resting);

        let mut expired = false;
        for _ in 0..10 {
            expired = t.tick();
        }
        assert!(expired);
        assert_eq!(t.state(), TrackerState::EnteringSet);
        assert_eq!(t.current_set(), 2);
    }

    #[test]
    fn goal_celebration_fires_once_per_instance() {
        let prescription = bench_press().with_goal(
            62.5,
            Some(Utc::now().date_naive() + ChronoDuration::days(14)),
        );
        let mut t = tracker(prescription);

        let event = t.confirm_set(SetInput::new(8, 63.0)).unwrap();
        let TrackerEvent::GoalReached(goal) = event else {
            panic!("expected celebration");
        };
        assert!(goal.early);
        assert_eq!(goal.days_remaining, Some(14));
        assert_eq!(t.sets().len(), 1);

        t.continue_from_celebration().unwrap();
        t.skip_rest().unwrap();

        // A second crossing in the same instance advances silently
        assert!(matches!(
            t.confirm_set(SetInput::new(8, 64.0)).unwrap(),
            TrackerEvent::RestStarted
        ));
    }

    #[test]
    fn back_then_reconfirm_is_idempotent() {
        let mut t = tracker(bench_press());
        t.confirm_set(SetInput::new(10, 60.0)).unwrap();
        t.skip_rest().unwrap();
        t.confirm_set(SetInput::new(9, 62.5)).unwrap();
        t.skip_rest().unwrap();
        let before: Vec<SetRecord> = t.sets().to_vec();

        assert_eq!(t.go_back().unwrap(), BackEvent::SetReopened);
        assert_eq!(t.current_set(), 2);
        let restored = t.suggested_input().clone();
        assert_eq!(restored.reps, 9);

        t.confirm_set(restored).unwrap();
        assert_eq!(t.sets(), before.as_slice());
    }

    #[test]
    fn back_from_rest_undoes_the_rest() {
        let mut t = tracker(bench_press());
        t.confirm_set(SetInput::new(10, 60.0)).unwrap();
        assert_eq!(t.state(), TrackerState::Resting);

        assert_eq!(t.go_back().unwrap(), BackEvent::SetReopened);
        assert_eq!(t.state(), TrackerState::EnteringSet);
        assert_eq!(t.current_set(), 1);
        assert!(t.sets().is_empty());
    }

    #[test]
    fn back_on_first_set_defers_to_orchestrator() {
        let mut t = tracker(bench_press());
        assert_eq!(t.go_back().unwrap(), BackEvent::PreviousExercise);
    }

    #[test]
    fn previous_workout_weight_seeds_fresh_input() {
        let previous = PreviousExercise {
            reps: 10,
            weight: 57.5,
            rir: None,
            rpe: None,
            feeling: None,
            notes: None,
        };
        let t = SetTracker::new(bench_press(), 0, Vec::new(), false, Some(previous), 90);
        assert!((t.suggested_input().weight - 57.5).abs() < f64::EPSILON);

        let resumed = SetTracker::new(
            bench_press(),
            0,
            vec![SetRecord {
                set: 1,
                reps: 9,
                weight: 61.0,
                rir: None,
                rpe: None,
            }],
            false,
            None,
            90,
        );
        assert_eq!(resumed.current_set(), 2);
        assert!((resumed.suggested_input().weight - 61.0).abs() < f64::EPSILON);
    }

    #[test]
    fn intensity_tracking_fills_rir_rpe() {
        let mut t = SetTracker::new(bench_press(), 0, Vec::new(), true, None, 90);
        t.confirm_set(SetInput::new(10, 60.0).with_intensity(1, 9))
            .unwrap();
        let record = &t.sets()[0];
        assert_eq!(record.rir, Some(1));
        assert_eq!(record.rpe, Some(9));

        let mut plain = tracker(bench_press());
        plain.confirm_set(SetInput::new(10, 60.0)).unwrap();
        assert_eq!(plain.sets()[0].rir, None);
    }
}
