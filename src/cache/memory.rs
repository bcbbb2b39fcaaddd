// ABOUTME: In-memory cache implementation with LRU eviction and TTL support
// ABOUTME: Expired entries are dropped lazily on access
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::{CacheConfig, ProgressCache, ProgressKey};
use crate::errors::AppResult;

/// In-memory cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn remaining_ttl(&self) -> Option<Duration> {
        self.expires_at.checked_duration_since(Instant::now())
    }
}

/// In-memory cache with LRU eviction.
///
/// Uses `Arc<RwLock<LruCache>>` so clones share one store, matching how a
/// single browser profile shares one local storage area across tabs.
/// `LruCache` provides O(1) eviction of least-recently-used entries.
#[derive(Clone)]
pub struct InMemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
}

impl InMemoryCache {
    /// Fallback capacity when config specifies zero entries
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
        Some(n) => n,
        None => unreachable!(),
    };
}

#[async_trait::async_trait]
impl ProgressCache for InMemoryCache {
    async fn new(config: CacheConfig) -> AppResult<Self> {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        Ok(Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
        })
    }

    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &ProgressKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let serialized = serde_json::to_vec(value)?;
        let entry = CacheEntry::new(serialized, ttl);

        // LruCache handles eviction automatically on push
        self.store.write().await.push(key.to_string(), entry);

        Ok(())
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, key: &ProgressKey) -> AppResult<Option<T>> {
        let mut store = self.store.write().await;

        // LruCache::get is mutable (updates access order)
        let Some(entry) = store.get(&key.to_string()) else {
            return Ok(None);
        };

        if entry.is_expired() {
            store.pop(&key.to_string());
            return Ok(None);
        }

        let value = serde_json::from_slice(&entry.data)?;
        Ok(Some(value))
    }

    async fn invalidate(&self, key: &ProgressKey) -> AppResult<()> {
        self.store.write().await.pop(&key.to_string());
        Ok(())
    }

    async fn exists(&self, key: &ProgressKey) -> AppResult<bool> {
        let store = self.store.read().await;
        Ok(store
            .peek(&key.to_string())
            .is_some_and(|entry| !entry.is_expired()))
    }

    async fn ttl(&self, key: &ProgressKey) -> AppResult<Option<Duration>> {
        let store = self.store.read().await;
        Ok(store
            .peek(&key.to_string())
            .and_then(CacheEntry::remaining_ttl))
    }

    async fn clear_all(&self) -> AppResult<()> {
        self.store.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn key(day: &str) -> ProgressKey {
        ProgressKey::new(Uuid::new_v4(), day.to_owned())
    }

    #[tokio::test]
    async fn set_and_get_round_trip() {
        let cache = InMemoryCache::new(CacheConfig::default()).await.unwrap();
        let key = key("monday");

        cache
            .set(&key, &"snapshot", Duration::from_secs(60))
            .await
            .unwrap();

        let value: Option<String> = cache.get(&key).await.unwrap();
        assert_eq!(value.as_deref(), Some("snapshot"));
        assert!(cache.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn expired_entries_read_as_misses() {
        let cache = InMemoryCache::new(CacheConfig::default()).await.unwrap();
        let key = key("monday");

        cache
            .set(&key, &1u32, Duration::from_millis(0))
            .await
            .unwrap();

        let value: Option<u32> = cache.get(&key).await.unwrap();
        assert_eq!(value, None);
        assert!(!cache.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = InMemoryCache::new(CacheConfig::default()).await.unwrap();
        let key = key("friday");

        cache
            .set(&key, &"gone", Duration::from_secs(60))
            .await
            .unwrap();
        cache.invalidate(&key).await.unwrap();

        let value: Option<String> = cache.get(&key).await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn capacity_bound_evicts_oldest() {
        let cache = InMemoryCache::new(CacheConfig { max_entries: 2 })
            .await
            .unwrap();
        let first = key("monday");
        let second = key("tuesday");
        let third = key("thursday");

        for k in [&first, &second, &third] {
            cache.set(k, &1u32, Duration::from_secs(60)).await.unwrap();
        }

        assert!(!cache.exists(&first).await.unwrap());
        assert!(cache.exists(&second).await.unwrap());
        assert!(cache.exists(&third).await.unwrap());
    }
}
