// ABOUTME: Application constants grouped by concern for central tuning
// ABOUTME: Environment variable names, defaults, limits, and timer increments
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! Central constants for the workout tracking engine.
//!
//! Values are grouped into small modules so call sites read as
//! `defaults::REST_DURATION_SECS` rather than bare numbers.

/// Environment variable names recognized by [`crate::config::environment::AppConfig`]
pub mod env_config {
    /// Database connection URL (SQLite)
    pub const DATABASE_URL: &str = "LIFTLOG_DATABASE_URL";
    /// Log level (error, warn, info, debug, trace)
    pub const LOG_LEVEL: &str = "LIFTLOG_LOG_LEVEL";
    /// Log output format (json, pretty, compact)
    pub const LOG_FORMAT: &str = "LIFTLOG_LOG_FORMAT";
    /// Default rest interval between sets, in seconds
    pub const REST_DURATION_SECS: &str = "LIFTLOG_REST_DURATION_SECS";
    /// Maximum remote sync retries for progress writes
    pub const SYNC_MAX_RETRIES: &str = "LIFTLOG_SYNC_MAX_RETRIES";
    /// Base backoff between sync retries, in milliseconds
    pub const SYNC_BACKOFF_MS: &str = "LIFTLOG_SYNC_BACKOFF_MS";
    /// Maximum entries held by the local progress cache
    pub const CACHE_MAX_ENTRIES: &str = "LIFTLOG_CACHE_MAX_ENTRIES";
}

/// Default values applied when the environment does not override them
pub mod defaults {
    /// SQLite database used when no URL is configured
    pub const DATABASE_URL: &str = "sqlite:liftlog.db";

    /// Rest interval between sets (seconds)
    pub const REST_DURATION_SECS: u32 = 90;

    /// Progress writes retry this many times before giving up on the remote
    pub const SYNC_MAX_RETRIES: u32 = 3;

    /// Base backoff between sync retries; attempt N sleeps N times this
    pub const SYNC_BACKOFF_MS: u64 = 500;

    /// Bounded size of the local progress cache
    pub const CACHE_MAX_ENTRIES: usize = 256;

    /// Cached progress expires after a day; remote rows are date-scoped anyway
    pub const CACHE_TTL_SECS: u64 = 86_400;

    /// Reps-in-reserve suggested before the user records their own
    pub const SUGGESTED_RIR: u32 = 2;

    /// Rate-of-perceived-exertion suggested before the user records their own
    pub const SUGGESTED_RPE: u32 = 8;
}

/// Hard limits enforced by the domain model
pub mod limits {
    /// Rest countdown can never be adjusted below this (seconds)
    pub const REST_FLOOR_SECS: u32 = 10;

    /// RPE scale is 1-10
    pub const MAX_RPE: u32 = 10;

    /// Session feeling scale is 1-5
    pub const MIN_FEELING: u8 = 1;
    /// Session feeling scale is 1-5
    pub const MAX_FEELING: u8 = 5;
}

/// Rest timer adjustment increments offered to the user (seconds)
pub mod rest_adjustments {
    /// Small decrement
    pub const MINUS_SMALL: i64 = -10;
    /// Medium increment
    pub const PLUS_MEDIUM: i64 = 30;
    /// Large increment
    pub const PLUS_LARGE: i64 = 60;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_floor_below_default() {
        assert!(limits::REST_FLOOR_SECS < defaults::REST_DURATION_SECS);
    }

    #[test]
    fn feeling_scale_bounds() {
        assert!(limits::MIN_FEELING < limits::MAX_FEELING);
        assert_eq!(limits::MAX_FEELING, 5);
    }
}
