//! Stash Core Library
//!
//! Error taxonomy, storage port traits and the cache-aside resolver.
//! Concrete adapters (Postgres, Redis, HTTP upstreams) live in the server.

// Re-export pure types from stash-types
pub use stash_types::*;

pub mod error;
pub mod ports;
pub mod resolver;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::{CacheError, ResolveError, StoreError};
pub use ports::{CacheStore, Source, UserRecords, UserStore};
pub use resolver::{Origin, Resolved, Resolver, DEFAULT_CACHE_TIMEOUT};
