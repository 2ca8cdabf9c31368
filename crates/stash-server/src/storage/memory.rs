//! In-memory cache using DashMap (stands in for Redis)

use async_trait::async_trait;
use dashmap::DashMap;
use stash_core::{CacheError, CacheStore};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Simple in-memory cache with TTL support
pub struct MemoryCache {
    data: Arc<DashMap<String, CacheEntry>>,
}

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl MemoryCache {
    pub fn new() -> Self {
        let cache = Self {
            data: Arc::new(DashMap::new()),
        };

        // Start cleanup task
        cache.start_cleanup_task();

        cache
    }

    /// Get a value from cache
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.data.get(key).and_then(|entry| {
            if let Some(expires) = entry.expires_at {
                if Instant::now() > expires {
                    drop(entry);
                    self.data.remove(key);
                    return None;
                }
            }
            Some(entry.value.clone())
        })
    }

    /// Set a value, optionally expiring after `ttl`
    pub fn set(&self, key: String, value: Vec<u8>, ttl: Option<Duration>) {
        self.data.insert(
            key,
            CacheEntry {
                value,
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
    }

    /// Delete a key from cache
    pub fn delete(&self, key: &str) {
        self.data.remove(key);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn start_cleanup_task(&self) {
        let data = self.data.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;

                let now = Instant::now();
                data.retain(|_, entry| entry.expires_at.map(|at| now <= at).unwrap_or(true));
            }
        });
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(MemoryCache::get(self, key))
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        MemoryCache::set(self, key.to_string(), value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        MemoryCache::delete(self, key);
        Ok(())
    }
}
