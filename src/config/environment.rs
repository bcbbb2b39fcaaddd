// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, defaults, and runtime configuration parsing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! Environment-based configuration management

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::constants::{defaults, env_config, limits};
use crate::errors::{AppError, AppResult};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Standard operational logging
    #[default]
    Info,
    /// Verbose diagnostics
    Debug,
    /// Everything, including per-tick noise
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback to `Info`
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Runtime configuration assembled from environment variables.
///
/// Every field has a default from [`crate::constants::defaults`], so a bare
/// environment yields a working configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,
    /// Log level
    pub log_level: LogLevel,
    /// Default rest interval between sets (seconds)
    pub rest_duration_secs: u32,
    /// Maximum remote sync retries for progress writes
    pub sync_max_retries: u32,
    /// Base backoff between sync retries (milliseconds)
    pub sync_backoff_ms: u64,
    /// Maximum entries held by the local progress cache
    pub cache_max_entries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: defaults::DATABASE_URL.to_owned(),
            log_level: LogLevel::Info,
            rest_duration_secs: defaults::REST_DURATION_SECS,
            sync_max_retries: defaults::SYNC_MAX_RETRIES,
            sync_backoff_ms: defaults::SYNC_BACKOFF_MS,
            cache_max_entries: defaults::CACHE_MAX_ENTRIES,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when a variable is present but unparseable,
    /// or when a parsed value violates a domain limit.
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            database_url: env::var(env_config::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_owned()),
            log_level: env::var(env_config::LOG_LEVEL)
                .map(|raw| LogLevel::from_str_or_default(&raw))
                .unwrap_or_default(),
            rest_duration_secs: parse_env(
                env_config::REST_DURATION_SECS,
                defaults::REST_DURATION_SECS,
            )?,
            sync_max_retries: parse_env(env_config::SYNC_MAX_RETRIES, defaults::SYNC_MAX_RETRIES)?,
            sync_backoff_ms: parse_env(env_config::SYNC_BACKOFF_MS, defaults::SYNC_BACKOFF_MS)?,
            cache_max_entries: parse_env(
                env_config::CACHE_MAX_ENTRIES,
                defaults::CACHE_MAX_ENTRIES,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.rest_duration_secs < limits::REST_FLOOR_SECS {
            return Err(AppError::config(format!(
                "rest duration {}s is below the {}s floor",
                self.rest_duration_secs,
                limits::REST_FLOOR_SECS
            )));
        }
        if self.cache_max_entries == 0 {
            return Err(AppError::config("cache_max_entries must be non-zero"));
        }
        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T: FromStr>(name: &str, default: T) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::config(format!("invalid value for {name}: {e}"))),
        Err(_) => Ok(default),
    }
}
