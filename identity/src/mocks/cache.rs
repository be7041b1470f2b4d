//! In-memory cache store for testing.

use crate::error::{IdentityError, Result};
use crate::providers::CacheStore;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// A cached entry with an optional expiry deadline.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

/// In-memory cache store.
///
/// Honors TTL semantics via wall-clock checks on read, so expiry tests
/// behave like the Redis backend. `fail_next_ops` flips the store into
/// a simulated outage where every operation returns
/// `IdentityError::CacheUnavailable`, for exercising degradation paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCacheStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryCacheStore {
    /// Create a new empty cache store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a backend outage: all subsequent operations fail until
    /// [`recover`](Self::recover) is called.
    pub fn fail_next_ops(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// End a simulated outage.
    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }

    /// Force-expire `key`, as if its TTL elapsed.
    pub fn expire_now(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IdentityError::CacheUnavailable(
                "simulated backend outage".to_string(),
            ));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| IdentityError::InternalError("cache mutex poisoned".to_string()))
    }
}

impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        let mut entries = self.lock()?;

        match entries.get(key) {
            Some(entry) => {
                if entry.expires_at.is_some_and(|at| at <= Instant::now()) {
                    entries.remove(key);
                    Ok(None)
                } else {
                    Ok(Some(entry.value.clone()))
                }
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.lock()?.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.check_available()?;
        let ttl = ttl
            .to_std()
            .map_err(|_| IdentityError::InternalError("negative TTL".to_string()))?;
        self.lock()?.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.lock()?.remove(key);
        Ok(())
    }
}
