//! Error types for Stash

use std::time::Duration;
use thiserror::Error;

/// Cache layer failure. Always recoverable: the resolver falls back to the
/// record store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed cache entry: {0}")]
    Malformed(String),

    #[error("Failed to encode cache entry: {0}")]
    Encode(String),
}

/// System-of-record failure. Not recoverable locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Failure of a cache-aside lookup as seen by the caller.
///
/// Cache faults never surface here; they are absorbed by the resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Lookup cancelled")]
    Cancelled,

    #[error("Lookup exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}
