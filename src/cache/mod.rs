// ABOUTME: Local progress cache abstraction standing in for the browser's keyed storage
// ABOUTME: Pluggable backend trait following the DatabaseProvider pattern
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

//! Local persistence half of progress tracking.
//!
//! A small keyed store that survives within one device profile, behind a
//! pluggable async trait with an in-memory LRU implementation. Entries are
//! keyed `workout_progress_{user}_{day}` so cache contents stay readable in
//! diagnostics.

/// In-memory cache implementation
pub mod memory;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::constants::defaults;
use crate::errors::AppResult;

/// Cache provider trait for pluggable backend implementations
#[async_trait::async_trait]
pub trait ProgressCache: Send + Sync + Clone {
    /// Create a new cache instance with configuration
    ///
    /// # Errors
    ///
    /// Returns an error if cache initialization fails
    async fn new(config: CacheConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Store a value with TTL
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &ProgressKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>;

    /// Retrieve a value; `None` on miss or expiry
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails
    async fn get<T: for<'de> Deserialize<'de>>(&self, key: &ProgressKey) -> AppResult<Option<T>>;

    /// Remove a single entry
    ///
    /// # Errors
    ///
    /// Returns an error if invalidation fails
    async fn invalidate(&self, key: &ProgressKey) -> AppResult<()>;

    /// Check if a key exists and has not expired
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check fails
    async fn exists(&self, key: &ProgressKey) -> AppResult<bool>;

    /// Get remaining TTL for a key
    ///
    /// # Errors
    ///
    /// Returns an error if the TTL check fails
    async fn ttl(&self, key: &ProgressKey) -> AppResult<Option<Duration>>;

    /// Clear all entries (for testing/logout)
    ///
    /// # Errors
    ///
    /// Returns an error if the clear operation fails
    async fn clear_all(&self) -> AppResult<()>;
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries (for the in-memory cache)
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: defaults::CACHE_MAX_ENTRIES,
        }
    }
}

/// Structured cache key scoping progress to one user and one training day
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgressKey {
    /// Owning user
    pub user_id: Uuid,
    /// Day label ("monday", ...)
    pub day: String,
}

impl ProgressKey {
    /// Create a new progress key
    #[must_use]
    pub const fn new(user_id: Uuid, day: String) -> Self {
        Self { user_id, day }
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "workout_progress_{}_{}", self.user_id, self.day)
    }
}
