//! Cache store trait.

use crate::error::Result;
use chrono::Duration;
use std::future::Future;

/// Key/value cache with TTL semantics.
///
/// This trait abstracts over the cache backend (Redis in production,
/// in-memory for tests). A missing key is a distinguishable, non-error
/// outcome: `get` returns `Ok(None)`. A backend fault returns
/// `IdentityError::CacheUnavailable` — callers must treat the two
/// differently, since a miss is expected steady state while a fault is
/// exceptional and should degrade gracefully.
pub trait CacheStore: Send + Sync {
    /// Get the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key is absent or expired.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::CacheUnavailable` if the backend is
    /// unreachable.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Store `value` under `key` without expiry.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::CacheUnavailable` if the backend is
    /// unreachable.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;

    /// Store `value` under `key`, expiring after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::CacheUnavailable` if the backend is
    /// unreachable.
    fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove `key` from the cache.
    ///
    /// Deleting an absent key is not an error. Used to consume
    /// single-use challenges so they cannot be replayed.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::CacheUnavailable` if the backend is
    /// unreachable.
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}
