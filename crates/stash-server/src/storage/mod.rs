//! Storage layer
//!
//! PostgreSQL (sqlx) is the record store for users. The cache is Redis, or
//! an in-process DashMap when no Redis is wanted. The pokemon "store" is the
//! upstream PokéAPI.

pub mod db;
pub mod memory;
pub mod pokeapi;
pub mod redis_cache;

pub use db::Database;
pub use memory::MemoryCache;
pub use pokeapi::PokeApi;
pub use redis_cache::RedisCache;
