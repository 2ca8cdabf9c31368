//! Business logic services

pub mod pokemon;
pub mod users;

pub use pokemon::{PokemonService, PokemonSource};
pub use users::UserService;

use stash_core::DEFAULT_CACHE_TIMEOUT;
use std::time::Duration;

/// Knobs shared by every resolver the server builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Expiry for backfilled entries; `None` keeps them until evicted
    pub ttl: Option<Duration>,
    /// Upper bound on the store read of a cache-aside lookup
    pub deadline: Option<Duration>,
    /// Bound on each cache call the resolver makes
    pub cache_timeout: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: None,
            deadline: None,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }
}
