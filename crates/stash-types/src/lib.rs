//! Stash Types - Pure data types shared by the core and the server
//!
//! This crate has no async runtime or storage dependencies; it only
//! describes what travels over the wire and what lands in the cache.

pub mod pokemon;
pub mod user;

pub use pokemon::*;
pub use user::*;
