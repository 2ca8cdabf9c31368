//! In-memory fakes of the port traits with call counters
//!
//! Enabled for this crate's tests and, through the `test-util` feature, for
//! downstream crates.

use crate::{CacheError, CacheStore, NewUser, StoreError, User, UserStore};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// User store backed by a `BTreeMap`, generating sequential ids
pub struct MemoryUserStore {
    rows: Mutex<BTreeMap<i64, User>>,
    next_id: AtomicI64,
    lookups: AtomicUsize,
    max_lookups: Option<usize>,
    unreachable: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// First generated id will be `id`
    pub fn starting_at(id: i64) -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(id),
            lookups: AtomicUsize::new(0),
            max_lookups: None,
            unreachable: AtomicBool::new(false),
        }
    }

    /// Point lookups beyond the first `n` fail with a database error
    pub fn fail_after_lookups(mut self, n: usize) -> Self {
        self.max_lookups = Some(n);
        self
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Number of `get_by_id` calls so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Write a row directly, bypassing `insert` (an out-of-band update)
    pub fn put(&self, user: User) {
        lock(&self.rows).insert(user.id, user);
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection refused".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &NewUser) -> Result<i64, StoreError> {
        self.check_reachable()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.rows).insert(id, user.clone().with_id(id));
        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let seen = self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(max) = self.max_lookups {
            if seen >= max {
                return Err(StoreError::Database(format!(
                    "unexpected lookup #{} for id {}",
                    seen + 1,
                    id
                )));
            }
        }
        self.check_reachable()?;
        Ok(lock(&self.rows).get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<User>, StoreError> {
        self.check_reachable()?;
        Ok(lock(&self.rows).values().cloned().collect())
    }
}

/// Cache that counts calls and can be switched into failure modes
pub struct ScriptedCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    gets: AtomicUsize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
    unreachable: AtomicBool,
    reject_sets: AtomicBool,
    stall: AtomicBool,
    stall_sets: AtomicBool,
}

impl ScriptedCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            unreachable: AtomicBool::new(false),
            reject_sets: AtomicBool::new(false),
            stall: AtomicBool::new(false),
            stall_sets: AtomicBool::new(false),
        }
    }

    /// Every call fails with `CacheError::Unavailable`
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Only `set` fails; reads keep working
    pub fn reject_sets(&self, reject: bool) {
        self.reject_sets.store(reject, Ordering::SeqCst);
    }

    /// Every call hangs without answering
    pub fn stall(&self, stall: bool) {
        self.stall.store(stall, Ordering::SeqCst);
    }

    /// Only `set` hangs; reads keep answering
    pub fn stall_sets(&self, stall: bool) {
        self.stall_sets.store(stall, Ordering::SeqCst);
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries).contains_key(key)
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store raw bytes under `key` without counting a `set`
    pub fn insert_raw(&self, key: &str, value: Vec<u8>) {
        lock(&self.entries).insert(key.to_string(), value);
    }

    async fn hang_if(&self, flag: &AtomicBool) {
        if self.stall.load(Ordering::SeqCst) || flag.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }

    fn check_reachable(&self) -> Result<(), CacheError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

impl Default for ScriptedCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for ScriptedCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.hang_if(&self.stall).await;
        self.check_reachable()?;
        Ok(lock(&self.entries).get(key).cloned())
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        _ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.hang_if(&self.stall_sets).await;
        self.check_reachable()?;
        if self.reject_sets.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("write rejected".to_string()));
        }
        lock(&self.entries).insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.hang_if(&self.stall).await;
        self.check_reachable()?;
        lock(&self.entries).remove(key);
        Ok(())
    }
}
