//! Cache-aside resolver
//!
//! A lookup first asks the cache. On a hit the cached snapshot is decoded and
//! returned. On a miss the [`Source`] is consulted and, if it has the entity,
//! the snapshot is written back to the cache (backfill) before returning.
//!
//! Cache faults never fail a lookup:
//! - an unreachable cache degrades to a store-only read, with no backfill
//!   attempted against it
//! - a malformed entry is treated as a miss and overwritten by the backfill
//! - a failed backfill is logged and dropped
//!
//! Every cache call is bounded by its own timeout; one that does not answer
//! in time is a cache fault like any other. The optional deadline covers only
//! the source read, so a slow backfill can never fail a lookup the source
//! already answered.
//!
//! Negative results are never cached. Concurrent misses for the same key may
//! both backfill; the last write wins.

use crate::{CacheError, CacheStore, ResolveError, Source};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Where a resolved entity was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Store,
}

impl Origin {
    /// Value for the `X-Cache` response header
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Cache => "hit",
            Origin::Store => "miss",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Cache => write!(f, "cache"),
            Origin::Store => write!(f, "store"),
        }
    }
}

/// A found entity together with its origin
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<E> {
    pub entity: E,
    pub origin: Origin,
}

/// Bound on a single cache round trip unless overridden
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(250);

pub struct Resolver<S: ?Sized> {
    source: Arc<S>,
    cache: Arc<dyn CacheStore>,
    namespace: String,
    ttl: Option<Duration>,
    deadline: Option<Duration>,
    cache_timeout: Duration,
}

impl<S: Source + ?Sized> Resolver<S> {
    /// Cache keys are `"{namespace}:{key}"`.
    pub fn new(namespace: impl Into<String>, source: Arc<S>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            source,
            cache,
            namespace: namespace.into(),
            ttl: None,
            deadline: None,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }

    /// Expiry for backfilled entries. `None` keeps them until evicted.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Upper bound on reaching the source. Cache calls are bounded
    /// separately and an elapsed cache call counts as a cache fault.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Upper bound on each cache get/set/delete.
    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = timeout;
        self
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn cache_key(&self, key: &S::Key) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// Resolve `key`, preferring the cache.
    ///
    /// Returns `Ok(None)` when neither the cache nor the source has it.
    /// Cancelling `cancel` drops any outstanding cache/store call and yields
    /// [`ResolveError::Cancelled`].
    pub async fn resolve(
        &self,
        key: &S::Key,
        cancel: &CancellationToken,
    ) -> Result<Option<Resolved<S::Entity>>, ResolveError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Lookup of {} cancelled", self.cache_key(key));
                Err(ResolveError::Cancelled)
            }
            result = self.lookup(key) => result,
        }
    }

    /// Drop the cached snapshot for `key` so the next lookup refills it.
    pub async fn invalidate(&self, key: &S::Key) -> Result<(), CacheError> {
        let cache_key = self.cache_key(key);
        debug!("Invalidating {}", cache_key);
        self.bounded(self.cache.delete(&cache_key)).await
    }

    async fn lookup(&self, key: &S::Key) -> Result<Option<Resolved<S::Entity>>, ResolveError> {
        let cache_key = self.cache_key(key);

        let cache_reachable = match self.bounded(self.cache.get(&cache_key)).await {
            Ok(Some(bytes)) => match decode::<S::Entity>(&bytes) {
                Ok(entity) => {
                    debug!("Fetched {} from cache", cache_key);
                    return Ok(Some(Resolved {
                        entity,
                        origin: Origin::Cache,
                    }));
                }
                Err(e) => {
                    warn!("Discarding cache entry {}: {}", cache_key, e);
                    true
                }
            },
            Ok(None) => true,
            Err(e) => {
                warn!("Reading {} through to store: {}", cache_key, e);
                false
            }
        };

        let loaded = match self.deadline {
            Some(limit) => match timeout(limit, self.source.load(key)).await {
                Ok(result) => result?,
                Err(_) => {
                    debug!("Store lookup of {} exceeded {:?}", cache_key, limit);
                    return Err(ResolveError::DeadlineExceeded(limit));
                }
            },
            None => self.source.load(key).await?,
        };
        let Some(entity) = loaded else {
            debug!("{} not found in store", cache_key);
            return Ok(None);
        };
        debug!("Fetched {} from store", cache_key);

        // Past the deadline scope: a slow backfill only forgoes the write
        if cache_reachable {
            self.backfill(&cache_key, &entity).await;
        }

        Ok(Some(Resolved {
            entity,
            origin: Origin::Store,
        }))
    }

    async fn backfill(&self, cache_key: &str, entity: &S::Entity) {
        let result = match encode(entity) {
            Ok(bytes) => self.bounded(self.cache.set(cache_key, bytes, self.ttl)).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Skipping backfill of {}: {}", cache_key, e);
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        timeout(self.cache_timeout, call).await.unwrap_or_else(|_| {
            Err(CacheError::Unavailable(format!(
                "no answer within {:?}",
                self.cache_timeout
            )))
        })
    }
}

fn encode<E: Serialize>(entity: &E) -> Result<Vec<u8>, CacheError> {
    serde_json::to_vec(entity).map_err(|e| CacheError::Encode(e.to_string()))
}

fn decode<E: DeserializeOwned>(bytes: &[u8]) -> Result<E, CacheError> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Malformed(e.to_string()))
}
