//! Expiring key-value store trait.
//!
//! Every ephemeral artifact in the engine (revocation entries, pending
//! two-factor logins, OAuth clients, authorization codes, opaque access
//! tokens) lives behind this one contract. A key's value is replaced
//! wholesale, never partially updated, so store-level atomicity per key
//! is all the engine requires.
//!
//! # Semantics
//!
//! - `set` overwrites any existing value and resets the TTL
//! - `get` returns `None` for absent *or* expired keys
//! - `delete` is idempotent
//! - The engine never assumes persistence across process restarts, and
//!   never relies on eviction timing: domain code re-checks embedded
//!   `expires_at` fields against its own clock on every read.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::AuthResult;

/// Key/value store with per-key time-to-live.
///
/// # Example Implementation
///
/// ```ignore
/// use veridian_auth::storage::ExpiringStore;
///
/// struct MapStore {
///     entries: std::sync::RwLock<HashMap<String, (Value, Instant)>>,
/// }
///
/// #[async_trait::async_trait]
/// impl ExpiringStore for MapStore {
///     async fn set(&self, key: &str, value: Value, ttl: Duration) -> AuthResult<()> {
///         let deadline = Instant::now() + ttl;
///         self.entries.write().unwrap().insert(key.to_string(), (value, deadline));
///         Ok(())
///     }
///     // ... get / delete
/// }
/// ```
#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Stores `value` under `key`, expiring after `ttl`.
    ///
    /// Overwrites any existing value and resets the TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> AuthResult<()>;

    /// Returns the value stored under `key`, or `None` if the key is
    /// absent or its TTL has elapsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn get(&self, key: &str) -> AuthResult<Option<Value>>;

    /// Removes the value stored under `key`.
    ///
    /// Deleting an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, key: &str) -> AuthResult<()>;
}
