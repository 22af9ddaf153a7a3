//! Token revocation blacklist.
//!
//! Revoked tokens are tracked in the shared expiring store until they
//! would have naturally expired. The entry TTL is bounded by the token's
//! own remaining lifetime, so the blacklist never grows without bound.
//!
//! The store is the single source of truth for revocation: one revoke is
//! visible to every request handler regardless of which process issued
//! the token.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::AuthResult;
use crate::storage::ExpiringStore;

const KEY_PREFIX: &str = "token:blacklist:";

/// Deny-list of tokens revoked before their natural expiry.
#[derive(Clone)]
pub struct TokenBlacklist {
    store: Arc<dyn ExpiringStore>,
}

impl TokenBlacklist {
    /// Creates a blacklist over the shared expiring store.
    #[must_use]
    pub fn new(store: Arc<dyn ExpiringStore>) -> Self {
        Self { store }
    }

    fn key(token: &str) -> String {
        format!("{KEY_PREFIX}{token}")
    }

    /// Marks a token as revoked for the remainder of its lifetime.
    ///
    /// A token with no remaining lifetime is already unusable; revoking
    /// it is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn revoke(&self, token: &str, remaining: Duration) -> AuthResult<()> {
        if remaining.is_zero() {
            return Ok(());
        }
        self.store
            .set(&Self::key(token), json!("revoked"), remaining)
            .await
    }

    /// Returns `true` if the token has a live revocation entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn is_revoked(&self, token: &str) -> AuthResult<bool> {
        Ok(self.store.get(&Self::key(token)).await?.is_some())
    }
}
