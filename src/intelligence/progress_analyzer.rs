// ABOUTME: Progress statistics derived from recorded workout history
// ABOUTME: Totals, weekly counts, day streaks, session volume and its trend
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! History-derived statistics.
//!
//! Everything here is a pure function over [`CompletedWorkoutSession`]
//! slices; the presentation layer decides how to chart them. Volume is the
//! classic tonnage measure: weight times reps summed over every set.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::CompletedWorkoutSession;

/// Summary counters over a user's full history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryStats {
    /// Sessions recorded overall
    pub total_workouts: usize,
    /// Sessions recorded in the trailing seven days
    pub workouts_this_week: usize,
    /// Mean feeling score across all sessions, when any exist
    pub average_feeling: Option<f64>,
    /// Consecutive training days ending today (a missing today is
    /// tolerated, so an evening user keeps yesterday's streak)
    pub streak_days: u32,
}

/// Total volume lifted in one session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionVolume {
    /// Session completion time
    pub date: DateTime<Utc>,
    /// Day label the session trained under
    pub day: String,
    /// Sum of weight x reps over every set (kg)
    pub volume: f64,
}

/// Compute summary counters for a history slice.
#[must_use]
pub fn history_stats(history: &[CompletedWorkoutSession], today: NaiveDate) -> HistoryStats {
    let week_ago = today
        .checked_sub_days(Days::new(7))
        .unwrap_or(NaiveDate::MIN);
    let workouts_this_week = history
        .iter()
        .filter(|session| session.date.date_naive() > week_ago)
        .count();

    let average_feeling = if history.is_empty() {
        None
    } else {
        let sum: u32 = history
            .iter()
            .map(|session| u32::from(session.evaluation.feeling.score()))
            .sum();
        Some(f64::from(sum) / history.len() as f64)
    };

    HistoryStats {
        total_workouts: history.len(),
        workouts_this_week,
        average_feeling,
        streak_days: streak_days(history, today),
    }
}

/// Consecutive training days counting back from `today`.
///
/// A rest gap ends the streak, except that a missing `today` itself is
/// skipped so the streak survives until the day's training happens.
#[must_use]
pub fn streak_days(history: &[CompletedWorkoutSession], today: NaiveDate) -> u32 {
    let trained: HashSet<NaiveDate> = history
        .iter()
        .map(|session| session.date.date_naive())
        .collect();
    if trained.is_empty() {
        return 0;
    }

    let mut streak = 0;
    for offset in 0..=trained.len() as u64 {
        let Some(check) = today.checked_sub_days(Days::new(offset)) else {
            break;
        };
        if trained.contains(&check) {
            streak += 1;
        } else if offset == 0 {
            continue;
        } else {
            break;
        }
    }
    streak
}

/// Per-session volume, oldest first, ready for charting.
#[must_use]
pub fn session_volumes(history: &[CompletedWorkoutSession]) -> Vec<SessionVolume> {
    let mut volumes: Vec<SessionVolume> = history
        .iter()
        .map(|session| SessionVolume {
            date: session.date,
            day: session.day.clone(),
            volume: session
                .exercises
                .iter()
                .flat_map(|exercise| exercise.sets.iter())
                .map(|set| set.weight * f64::from(set.reps))
                .sum(),
        })
        .collect();
    volumes.sort_by_key(|entry| entry.date);
    volumes
}

/// Percentage change between the last two sessions' volumes.
///
/// A zero baseline is treated as one so the change stays finite.
#[must_use]
pub fn volume_trend(volumes: &[SessionVolume]) -> Option<f64> {
    let [.., previous, latest] = volumes else {
        return None;
    };
    let baseline = if previous.volume == 0.0 {
        1.0
    } else {
        previous.volume
    };
    Some((latest.volume - previous.volume) / baseline * 100.0)
}

/// The heaviest session by volume, if any
#[must_use]
pub fn peak_session(volumes: &[SessionVolume]) -> Option<&SessionVolume> {
    volumes
        .iter()
        .max_by(|a, b| a.volume.total_cmp(&b.volume))
}
