// ABOUTME: Main library entry point for the Liftlog workout tracking engine
// ABOUTME: Resumable set-by-set progress with dual-path persistence and history analytics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog Project

#![deny(unsafe_code)]

//! # Liftlog
//!
//! The core of a personal fitness-tracking application: weekly training
//! plans, an in-workout state machine that records one set at a time, and
//! dual-path persistence so a session survives reloads and crashes.
//!
//! ## Architecture
//!
//! - **Models**: plans, prescriptions, set records, and finished sessions
//! - **Workout**: the set tracker and the day-level orchestrator
//! - **Progress**: dual-write repository (local cache plus remote rows)
//! - **Database plugins**: storage collaborators behind one async trait
//! - **Cache**: the local half of progress persistence
//! - **Intelligence**: calorie targets and history statistics
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use liftlog::cache::{memory::InMemoryCache, CacheConfig, ProgressCache};
//! use liftlog::config::AppConfig;
//! use liftlog::database_plugins::{factory::Database, DatabaseProvider};
//! use liftlog::errors::AppResult;
//! use liftlog::notifications::NullNotifier;
//! use liftlog::workout::{SetInput, WorkoutSession};
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = AppConfig::from_env()?;
//!     let database = Database::new(&config.database_url).await?;
//!     let cache = InMemoryCache::new(CacheConfig::default()).await?;
//!
//!     let mut session = WorkoutSession::begin(
//!         Uuid::new_v4(),
//!         "monday",
//!         database,
//!         cache,
//!         Arc::new(NullNotifier),
//!         &config,
//!     )
//!     .await?;
//!
//!     if !session.is_rest_day() {
//!         session.confirm_set(SetInput::new(10, 60.0)).await?;
//!     }
//!     Ok(())
//! }
//! ```

/// Local progress cache with pluggable backends
pub mod cache;

/// Configuration management from environment variables
pub mod config;

/// Application constants and tuning values
pub mod constants;

/// Database abstraction layer with plugin support
pub mod database_plugins;

/// Unified error handling system with standard error codes
pub mod errors;

/// Calorie targets and history-derived statistics
pub mod intelligence;

/// Structured logging setup
pub mod logging;

/// Common data models for plans, sessions, and set records
pub mod models;

/// Workout event notifications with explicit observer registration
pub mod notifications;

/// Dual-write persistence for in-progress workout state
pub mod progress;

/// In-workout state machines: set tracker, rest timer, orchestrator
pub mod workout;
