//! HTTP handlers

pub mod pokemon;
pub mod users;

use axum::{http::HeaderName, Json};
use serde_json::{json, Value};

/// Reports whether a cache-aside response was served from the cache
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
