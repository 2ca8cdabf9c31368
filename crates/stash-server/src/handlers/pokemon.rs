//! Pokemon proxy handlers

use super::X_CACHE;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use stash_core::PokemonName;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
pub struct PokemonQuery {
    #[serde(default)]
    pokemon: String,
}

/// Cache-aside lookup. A blank name is rejected before the cache is asked.
pub async fn get_cached(
    State(state): State<AppState>,
    Query(query): Query<PokemonQuery>,
) -> Result<Response, ApiError> {
    let name = PokemonName::parse(&query.pokemon)?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match state.pokemon.get(&name, &cancel).await? {
        Some(resolved) => {
            Ok(([(X_CACHE, resolved.origin.as_str())], Json(resolved.entity)).into_response())
        }
        None => Err(ApiError::NotFound(format!("Pokemon {}", name))),
    }
}

/// Upstream lookup, bypassing the cache
pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<PokemonQuery>,
) -> Result<Json<Value>, ApiError> {
    let name = PokemonName::parse(&query.pokemon)?;

    match state.pokemon.get_uncached(&name).await? {
        Some(body) => Ok(Json(body)),
        None => Err(ApiError::NotFound(format!("Pokemon {}", name))),
    }
}
