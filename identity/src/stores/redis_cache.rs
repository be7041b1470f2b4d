//! Redis-backed cache store.
//!
//! Backs both the OTP challenge ledger and the request-ID dedup ledger.
//! Values are plain strings; TTLs ride on Redis key expiry so nothing
//! needs a background sweeper.
//!
//! # Example
//!
//! ```no_run
//! use studia_identity::stores::RedisCacheStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisCacheStore::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{IdentityError, Result};
use crate::providers::CacheStore;
use chrono::Duration;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// Redis-backed [`CacheStore`] with connection pooling via
/// `ConnectionManager`.
///
/// A missing key reads as `Ok(None)`; only transport and server errors
/// surface as [`IdentityError::CacheUnavailable`], so callers can tell
/// "not there" apart from "backend down".
pub struct RedisCacheStore {
    conn_manager: ConnectionManager,
}

impl RedisCacheStore {
    /// Create a new Redis cache store.
    ///
    /// # Errors
    ///
    /// Returns `CacheUnavailable` if the connection to Redis fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            IdentityError::CacheUnavailable(format!("failed to create Redis client: {e}"))
        })?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            IdentityError::CacheUnavailable(format!(
                "failed to create Redis connection manager: {e}"
            ))
        })?;

        Ok(Self { conn_manager })
    }
}

impl Clone for RedisCacheStore {
    fn clone(&self) -> Self {
        Self {
            conn_manager: self.conn_manager.clone(),
        }
    }
}

impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn_manager.clone();

        // Nil replies decode as None; that's a miss, not an error.
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            IdentityError::CacheUnavailable(format!("failed to read key: {e}"))
        })?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let _: () = conn.set(key, value).await.map_err(|e| {
            IdentityError::CacheUnavailable(format!("failed to write key: {e}"))
        })?;

        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        #[allow(clippy::cast_sign_loss)]
        let ttl_seconds = ttl.num_seconds().max(1) as u64;

        let _: () = conn.set_ex(key, value, ttl_seconds).await.map_err(|e| {
            IdentityError::CacheUnavailable(format!("failed to write key with TTL: {e}"))
        })?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        // DEL on a missing key is a no-op, which is fine for consume paths.
        let _: () = conn.del(key).await.map_err(|e| {
            IdentityError::CacheUnavailable(format!("failed to delete key: {e}"))
        })?;

        Ok(())
    }
}
