//! Storage implementations for the auth system.
//!
//! - **Token Store** (Redis) - refresh, verification, and reset tokens with TTL
//! - **Member Repository** (PostgreSQL) - member and pharmacy records

#[cfg(feature = "postgres")]
pub mod postgres;
pub mod token_redis;

// Re-exports
#[cfg(feature = "postgres")]
pub use postgres::PostgresMemberRepository;
pub use token_redis::RedisTokenStore;
