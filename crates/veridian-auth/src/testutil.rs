//! Shared in-memory mocks for unit tests.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::clock::Clock;
use crate::error::AuthError;
use crate::storage::{ExpiringStore, MfaSettings, User, UserStorage};

/// Expiring store over a plain map. Expiry is tracked against the
/// injected clock so tests can steer TTL behavior deterministically.
pub struct MapStore {
    entries: RwLock<HashMap<String, (Value, OffsetDateTime)>>,
    clock: std::sync::Arc<dyn Clock>,
}

impl MapStore {
    pub fn new(clock: std::sync::Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

#[async_trait]
impl ExpiringStore for MapStore {
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> AuthResult<()> {
        let deadline = self.clock.now() + ttl;
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), (value, deadline));
        Ok(())
    }

    async fn get(&self, key: &str) -> AuthResult<Option<Value>> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).and_then(|(value, deadline)| {
            if self.clock.now() < *deadline {
                Some(value.clone())
            } else {
                None
            }
        }))
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

/// User storage over a plain map with version-CAS semantics.
pub struct MockUserStorage {
    users: RwLock<HashMap<String, User>>,
}

impl MockUserStorage {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_user(&self, user: User) {
        self.users.write().unwrap().insert(user.id.clone(), user);
    }

    pub fn get(&self, user_id: &str) -> Option<User> {
        self.users.read().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl UserStorage for MockUserStorage {
    async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>> {
        Ok(self.users.read().unwrap().get(user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn verify_password(&self, user_id: &str, password: &str) -> AuthResult<bool> {
        let users = self.users.read().unwrap();
        let user = users.get(user_id).ok_or(AuthError::UserNotFound)?;
        // Plain comparison stands in for the hash-comparison contract.
        Ok(user
            .password_hash
            .as_deref()
            .is_some_and(|hash| hash == password))
    }

    async fn update_mfa(
        &self,
        user_id: &str,
        expected_version: i64,
        settings: MfaSettings,
    ) -> AuthResult<()> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(user_id).ok_or(AuthError::UserNotFound)?;
        if user.version != expected_version {
            return Err(AuthError::ConcurrentModification);
        }
        user.mfa_enabled = settings.enabled;
        user.mfa_secret = settings.secret;
        user.recovery_codes = settings.recovery_codes;
        user.version += 1;
        user.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}
