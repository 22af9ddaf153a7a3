//! # veridian-store-memory
//!
//! In-memory [`ExpiringStore`] backend for the Veridian auth engine.
//!
//! A single-node fallback implementation of the shared-store contract:
//! suitable for tests, development, and single-process deployments.
//! Horizontal deployments should back the same trait with a distributed
//! cache instead; the engine does not care which it gets.
//!
//! Expired entries are dropped lazily on read. Long-running processes
//! can call [`MemoryExpiringStore::purge_expired`] from a periodic task
//! to reclaim memory for keys that are never read again.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use veridian_auth::storage::ExpiringStore;
use veridian_auth::{AuthError, AuthResult};

/// In-memory expiring key-value store.
#[derive(Debug, Default)]
pub struct MemoryExpiringStore {
    entries: RwLock<HashMap<String, (Value, Instant)>>,
}

impl MemoryExpiringStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, including not-yet-purged
    /// expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().expect("store lock poisoned").len()
    }

    /// Returns `true` if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().expect("store lock poisoned");
        let before = entries.len();
        entries.retain(|_, (_, deadline)| now < *deadline);
        before - entries.len()
    }

    fn lock_err() -> AuthError {
        AuthError::storage("memory store lock poisoned")
    }
}

#[async_trait]
impl ExpiringStore for MemoryExpiringStore {
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> AuthResult<()> {
        let deadline = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| AuthError::storage("TTL overflows the clock"))?;
        self.entries
            .write()
            .map_err(|_| Self::lock_err())?
            .insert(key.to_string(), (value, deadline));
        Ok(())
    }

    async fn get(&self, key: &str) -> AuthResult<Option<Value>> {
        let entries = self.entries.read().map_err(|_| Self::lock_err())?;
        Ok(entries.get(key).and_then(|(value, deadline)| {
            if Instant::now() < *deadline {
                Some(value.clone())
            } else {
                None
            }
        }))
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        self.entries
            .write()
            .map_err(|_| Self::lock_err())?
            .remove(key);
        Ok(())
    }
}
