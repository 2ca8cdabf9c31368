//! Storage traits for persistence

use crate::{NewUser, StoreError, User};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// User record store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new row; returns the identifier the store generated.
    async fn insert(&self, user: &NewUser) -> Result<i64, StoreError>;
    /// "No rows" is `Ok(None)`, not an error.
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn get_all(&self) -> Result<Vec<User>, StoreError>;
}

/// Read side of a system of record, as seen by the resolver
#[async_trait]
pub trait Source: Send + Sync {
    /// Lookup key. Its `Display` form becomes the cache key suffix.
    type Key: fmt::Display + Send + Sync + ?Sized;
    type Entity: Serialize + DeserializeOwned + Send + Sync;

    async fn load(&self, key: &Self::Key) -> Result<Option<Self::Entity>, StoreError>;
}

/// Point lookups against a [`UserStore`], keyed by user id
pub struct UserRecords {
    store: Arc<dyn UserStore>,
}

impl UserRecords {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Source for UserRecords {
    type Key = i64;
    type Entity = User;

    async fn load(&self, id: &i64) -> Result<Option<User>, StoreError> {
        self.store.get_by_id(*id).await
    }
}
