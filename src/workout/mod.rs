// ABOUTME: In-workout flow: set tracking, rest countdowns, and day-level orchestration
// ABOUTME: Re-exports the session entry point and the tracker event types
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! The in-workout state machines.
//!
//! [`orchestrator::WorkoutSession`] is the entry point: it owns the day's
//! traversal and delegates per-exercise mechanics to
//! [`set_tracker::SetTracker`].

/// Day-level traversal and session finalization
pub mod orchestrator;
/// Rest interval countdown
pub mod rest_timer;
/// Per-exercise set state machine
pub mod set_tracker;

pub use orchestrator::{BackOutcome, SessionEvent, SessionPhase, WorkoutSession};
pub use rest_timer::RestTimer;
pub use set_tracker::{BackEvent, GoalAchievement, SetInput, SetTracker, TrackerEvent, TrackerState};
