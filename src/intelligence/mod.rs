// ABOUTME: Analytics over recorded workouts plus standalone fitness calculators
// ABOUTME: Calorie targets and history-derived progress statistics
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! Derived numbers: calorie targets from profile data and progress
//! statistics from recorded history. Pure functions over the domain models;
//! no storage access.

/// BMR/TDEE calorie target calculations
pub mod calorie_calculator;
/// History-derived progress statistics
pub mod progress_analyzer;

pub use calorie_calculator::{ActivityLevel, BiologicalSex, CalorieProfile, CalorieTargets};
pub use progress_analyzer::{HistoryStats, SessionVolume};
