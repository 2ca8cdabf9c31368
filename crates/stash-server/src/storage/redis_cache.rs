//! Redis cache
//!
//! Connects lazily and keeps a `ConnectionManager`, which multiplexes calls
//! over one connection and reconnects by itself. Each call clones a handle
//! for its own duration. Only one task dials at a time; callers arriving
//! while a dial is in flight fail fast as unavailable instead of queueing
//! behind it. Every call, dial included, is bounded by one `timeout`, so a
//! hung Redis looks like an unavailable one and reads fall through to the
//! store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, FromRedisValue, RedisError};
use stash_core::{CacheError, CacheStore};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{info, warn};

pub struct RedisCache {
    client: Client,
    manager: Mutex<Option<ConnectionManager>>,
    connecting: tokio::sync::Mutex<()>,
    timeout: Duration,
}

impl RedisCache {
    /// Only validates the URL; the first call opens the connection.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(redis_error)?;
        Ok(Self {
            client,
            manager: Mutex::new(None),
            connecting: tokio::sync::Mutex::new(()),
            timeout,
        })
    }

    fn cached(&self) -> Option<ConnectionManager> {
        self.manager
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        if let Some(conn) = self.cached() {
            return Ok(conn);
        }

        let _dialing = self.connecting.try_lock().map_err(|_| {
            CacheError::Unavailable("Redis connection attempt in progress".to_string())
        })?;
        // Another task may have finished dialing between the check and the lock
        if let Some(conn) = self.cached() {
            return Ok(conn);
        }

        let conn = ConnectionManager::new(self.client.clone())
            .await
            .map_err(|e| {
                warn!("Redis connection failed: {}", e);
                redis_error(e)
            })?;
        info!("Redis connection established");

        *self.manager.lock().unwrap_or_else(PoisonError::into_inner) = Some(conn.clone());
        Ok(conn)
    }

    async fn run<T: FromRedisValue>(&self, cmd: redis::Cmd) -> Result<T, CacheError> {
        let call = async {
            let mut conn = self.connection().await?;
            cmd.query_async::<_, T>(&mut conn).await.map_err(redis_error)
        };
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                CacheError::Unavailable(format!("Redis did not answer within {:?}", self.timeout))
            })?
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.run(cmd).await
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(ttl.as_millis().max(1) as u64);
        }
        self.run(cmd).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        self.run(cmd).await
    }
}

fn redis_error(e: RedisError) -> CacheError {
    CacheError::Unavailable(e.to_string())
}
