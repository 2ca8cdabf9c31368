//! Router test harness backed by in-memory fakes

use crate::services::{CachePolicy, PokemonService, UserService};
use crate::AppState;
use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use stash_core::testing::{MemoryUserStore, ScriptedCache};
use stash_core::{PokemonName, Source, StoreError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// Upstream fake that only knows pikachu
pub struct FakeDex {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl FakeDex {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Source for FakeDex {
    type Key = PokemonName;
    type Entity = Value;

    async fn load(&self, name: &PokemonName) -> Result<Option<Value>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Upstream("503 Service Unavailable".to_string()));
        }
        Ok((name.as_str() == "pikachu").then(|| json!({ "id": 25, "name": "pikachu" })))
    }
}

pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryUserStore>,
    pub cache: Arc<ScriptedCache>,
    pub dex: Arc<FakeDex>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_first_id(1)
    }

    pub fn with_first_id(id: i64) -> Self {
        let store = Arc::new(MemoryUserStore::starting_at(id));
        let cache = Arc::new(ScriptedCache::new());
        let dex = Arc::new(FakeDex {
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        });

        let policy = CachePolicy::default();
        let state = AppState {
            users: Arc::new(UserService::new(store.clone(), cache.clone(), policy)),
            pokemon: Arc::new(PokemonService::new(dex.clone(), cache.clone(), policy)),
        };

        Self {
            app: crate::app(state),
            store,
            cache,
            dex,
        }
    }
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Bytes) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => request
            .header("content-type", "application/json")
            .body(Body::from(value.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes)
}

pub fn body_json(bytes: &Bytes) -> Value {
    serde_json::from_slice(bytes).unwrap()
}
