//! Stash Server
//!
//! HTTP API for user records kept in PostgreSQL with a cache-aside read path
//! through Redis, plus a cached pass-through proxy to PokéAPI.

mod error;
mod handlers;
mod services;
mod settings;
mod storage;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use stash_core::CacheStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use settings::{CacheBackend, ServerConfig};
use services::{PokemonService, UserService};
use storage::{Database, MemoryCache, PokeApi, RedisCache};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub pokemon: Arc<PokemonService>,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing, RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Stash Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    info!("Loading configuration...");
    let config = ServerConfig::load().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, cache={:?}",
        config.bind_address, config.cache_backend
    );

    let db = Arc::new(
        Database::connect(
            &config.database_url,
            config.database_max_connections,
            config.database_connect_timeout(),
        )
        .await
        .context("Failed to initialize database")?,
    );

    let cache: Arc<dyn CacheStore> = match config.cache_backend {
        CacheBackend::Redis => {
            info!("Using Redis cache at {}", config.redis_url);
            Arc::new(
                RedisCache::new(&config.redis_url, config.cache_timeout())
                    .context("Failed to configure Redis cache")?,
            )
        }
        CacheBackend::Memory => {
            info!("Using in-memory cache");
            Arc::new(MemoryCache::new())
        }
    };

    let pokeapi = Arc::new(
        PokeApi::new(&config.pokeapi_base_url, config.upstream_timeout())
            .context("Failed to configure PokéAPI client")?,
    );

    let policy = config.cache_policy();
    let state = AppState {
        users: Arc::new(UserService::new(db, cache.clone(), policy)),
        pokemon: Arc::new(PokemonService::new(pokeapi, cache, policy)),
    };

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/user",
            get(handlers::users::list).post(handlers::users::create),
        )
        .route("/user/:id", get(handlers::users::get))
        .route("/user-redis/:id", get(handlers::users::get_cached))
        .route("/pokemonwithredis", get(handlers::pokemon::get_cached))
        .route("/pokemonwithoutredis", get(handlers::pokemon::get))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
