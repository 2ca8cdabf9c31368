//! User service

use super::CachePolicy;
use stash_core::{
    CacheStore, NewUser, ResolveError, Resolved, Resolver, StoreError, User, UserRecords,
    UserStore,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct UserService {
    store: Arc<dyn UserStore>,
    resolver: Resolver<UserRecords>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, cache: Arc<dyn CacheStore>, policy: CachePolicy) -> Self {
        let resolver = Resolver::new("user", Arc::new(UserRecords::new(store.clone())), cache)
            .with_ttl(policy.ttl)
            .with_deadline(policy.deadline)
            .with_cache_timeout(policy.cache_timeout);
        Self { store, resolver }
    }

    /// Insert a user, then drop any cache entry under the new id so the
    /// next cached read comes from the store.
    pub async fn create(&self, user: &NewUser) -> Result<i64, StoreError> {
        info!("Creating user: name={}", user.name);

        let id = self.store.insert(user).await?;

        if let Err(e) = self.resolver.invalidate(&id).await {
            warn!("Failed to invalidate cached user {}: {}", id, e);
        }

        Ok(id)
    }

    pub async fn list(&self) -> Result<Vec<User>, StoreError> {
        self.store.get_all().await
    }

    /// Record store only, no cache involved
    pub async fn get_uncached(&self, id: i64) -> Result<Option<User>, StoreError> {
        self.store.get_by_id(id).await
    }

    pub async fn get(
        &self,
        id: i64,
        cancel: &CancellationToken,
    ) -> Result<Option<Resolved<User>>, ResolveError> {
        let resolved = self.resolver.resolve(&id, cancel).await?;
        if let Some(r) = &resolved {
            debug!("User {} served from {}", id, r.origin);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stash_core::testing::{MemoryUserStore, ScriptedCache};
    use stash_core::Origin;

    fn alice() -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            age: 30,
            location: "NYC".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_invalidates_stale_entry() {
        let store = Arc::new(MemoryUserStore::starting_at(7));
        let cache = Arc::new(ScriptedCache::new());
        // Left over from an earlier life of the database
        cache.insert_raw("user:7", br#"{"userid":7,"name":"Old","age":1,"location":"X"}"#.to_vec());

        let service = UserService::new(store.clone(), cache.clone(), CachePolicy::default());
        let id = service.create(&alice()).await.unwrap();
        assert_eq!(id, 7);
        assert_eq!(cache.deletes(), 1);
        assert!(!cache.contains("user:7"));

        let found = service.get(id, &CancellationToken::new()).await.unwrap().unwrap();
        assert_eq!(found.entity.name, "Alice");
        assert_eq!(found.origin, Origin::Store);
    }

    #[tokio::test]
    async fn test_create_survives_unreachable_cache() {
        let store = Arc::new(MemoryUserStore::new());
        let cache = Arc::new(ScriptedCache::new());
        cache.set_unreachable(true);

        let service = UserService::new(store.clone(), cache.clone(), CachePolicy::default());
        let id = service.create(&alice()).await.unwrap();

        let found = service.get(id, &CancellationToken::new()).await.unwrap().unwrap();
        assert_eq!(found.entity, alice().with_id(id));
    }

    #[tokio::test]
    async fn test_uncached_read_skips_cache() {
        let store = Arc::new(MemoryUserStore::new());
        let cache = Arc::new(ScriptedCache::new());
        let service = UserService::new(store.clone(), cache.clone(), CachePolicy::default());

        let id = service.create(&alice()).await.unwrap();
        assert!(service.get_uncached(id).await.unwrap().is_some());
        assert!(service.get_uncached(id + 1).await.unwrap().is_none());
        assert_eq!(cache.gets(), 0);
        assert_eq!(cache.sets(), 0);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
