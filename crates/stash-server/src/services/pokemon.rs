//! Pokemon proxy service

use super::CachePolicy;
use serde_json::Value;
use stash_core::{CacheStore, PokemonName, ResolveError, Resolved, Resolver, Source, StoreError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Anything that can look a pokemon up by name
pub type PokemonSource = dyn Source<Key = PokemonName, Entity = Value>;

pub struct PokemonService {
    resolver: Resolver<PokemonSource>,
}

impl PokemonService {
    pub fn new(source: Arc<PokemonSource>, cache: Arc<dyn CacheStore>, policy: CachePolicy) -> Self {
        let resolver = Resolver::new("pokemon", source, cache)
            .with_ttl(policy.ttl)
            .with_deadline(policy.deadline)
            .with_cache_timeout(policy.cache_timeout);
        Self { resolver }
    }

    pub async fn get(
        &self,
        name: &PokemonName,
        cancel: &CancellationToken,
    ) -> Result<Option<Resolved<Value>>, ResolveError> {
        self.resolver.resolve(name, cancel).await
    }

    /// Straight to the upstream, no cache involved
    pub async fn get_uncached(&self, name: &PokemonName) -> Result<Option<Value>, StoreError> {
        self.resolver.source().load(name).await
    }
}
