//! Key/value cache port

use crate::CacheError;
use async_trait::async_trait;
use std::time::Duration;

/// Best-effort key/value cache holding opaque serialized values.
///
/// `Ok(None)` from `get` is a plain miss; `Err` means the cache itself could
/// not be reached or answered. Implementations check a connection out per
/// call and give it back on every exit path.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Unconditional overwrite. `ttl = None` keeps the entry until evicted.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>)
        -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
