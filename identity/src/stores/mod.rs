//! Production-backed provider implementations.
//!
//! `RedisCacheStore` backs [`CacheStore`](crate::providers::CacheStore)
//! with Redis; the `postgres` feature adds a sqlx-backed
//! [`UserRepository`](crate::providers::UserRepository).

pub mod redis_cache;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use redis_cache::RedisCacheStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresUserRepository;
