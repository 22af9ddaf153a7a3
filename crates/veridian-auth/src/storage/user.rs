//! User storage trait.
//!
//! Defines the interface for the user record collaborator. The engine
//! never performs profile CRUD; it reads users, verifies passwords
//! through the hash-comparison contract, and updates the MFA fields it
//! owns via a compare-and-swap on the record version.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;

/// Default datetime value for deserialization when the field is missing.
fn default_datetime() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

// =============================================================================
// User Type
// =============================================================================

/// A user in the authentication system.
///
/// Only the MFA fields (`mfa_enabled`, `mfa_secret`, `recovery_codes`)
/// are ever written by this engine; everything else is read-only context
/// owned by the surrounding platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user.
    #[serde(default)]
    pub id: String,

    /// Username for authentication.
    pub username: String,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Display nickname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// Avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// Hashed password (None for federated users who cannot log in with
    /// a password).
    #[serde(default)]
    pub password_hash: Option<String>,

    /// Whether two-factor authentication is enabled.
    ///
    /// Invariant: `mfa_enabled` implies `mfa_secret` is set.
    #[serde(default)]
    pub mfa_enabled: bool,

    /// Base32-encoded TOTP secret, present once enrollment is confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mfa_secret: Option<String>,

    /// Hashed single-use recovery codes. Shrinks by one element per
    /// successful redemption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_codes: Option<Vec<String>>,

    /// Whether the user account is active. Inactive users cannot
    /// authenticate or refresh tokens.
    pub active: bool,

    /// Record version, incremented by the store on every write. Used for
    /// optimistic concurrency on MFA-field updates.
    #[serde(default)]
    pub version: i64,

    /// When the user was created.
    #[serde(default = "default_datetime", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the user was last updated.
    #[serde(default = "default_datetime", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Creates a new active user with the given username.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            email: None,
            phone: None,
            nickname: None,
            avatar_url: None,
            password_hash: None,
            mfa_enabled: false,
            mfa_secret: None,
            recovery_codes: None,
            active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new user builder.
    #[must_use]
    pub fn builder(username: impl Into<String>) -> UserBuilder {
        UserBuilder::new(username)
    }

    /// Returns `true` if the user account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the number of unredeemed recovery codes.
    #[must_use]
    pub fn recovery_codes_remaining(&self) -> usize {
        self.recovery_codes.as_ref().map_or(0, Vec::len)
    }
}

// =============================================================================
// User Builder
// =============================================================================

/// Builder for creating `User` instances.
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    fn new(username: impl Into<String>) -> Self {
        Self {
            user: User::new(username),
        }
    }

    /// Sets the user ID.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.user.id = id.into();
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.user.email = Some(email.into());
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.user.phone = Some(phone.into());
        self
    }

    /// Sets the nickname.
    #[must_use]
    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.user.nickname = Some(nickname.into());
        self
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn avatar_url(mut self, url: impl Into<String>) -> Self {
        self.user.avatar_url = Some(url.into());
        self
    }

    /// Sets the password hash.
    #[must_use]
    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.user.password_hash = Some(hash.into());
        self
    }

    /// Sets whether the user is active.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.user.active = active;
        self
    }

    /// Builds the user.
    #[must_use]
    pub fn build(self) -> User {
        self.user
    }
}

// =============================================================================
// MFA Settings
// =============================================================================

/// The MFA fields written as one unit.
///
/// The three fields always change together through a single update so a
/// failed confirmation can never leave partial state behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaSettings {
    /// Whether two-factor authentication is enabled.
    pub enabled: bool,

    /// Base32-encoded TOTP secret. Must be `Some` when `enabled`.
    pub secret: Option<String>,

    /// Hashed recovery codes.
    pub recovery_codes: Option<Vec<String>>,
}

impl MfaSettings {
    /// Settings representing a fully disabled state.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            secret: None,
            recovery_codes: None,
        }
    }

    /// Extracts the current settings from a user record.
    #[must_use]
    pub fn of(user: &User) -> Self {
        Self {
            enabled: user.mfa_enabled,
            secret: user.mfa_secret.clone(),
            recovery_codes: user.recovery_codes.clone(),
        }
    }
}

// =============================================================================
// User Storage Trait
// =============================================================================

/// Storage operations for users.
///
/// # Example
///
/// ```ignore
/// use veridian_auth::storage::UserStorage;
///
/// async fn example(storage: &impl UserStorage) {
///     if let Some(user) = storage.find_by_username("alice").await? {
///         println!("found {}", user.id);
///     }
/// }
/// ```
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Find a user by their unique ID.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>>;

    /// Find a user by their username.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Verify a user's password against the stored hash.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the password matches
    /// - `Ok(false)` if the password doesn't match or no password is set
    ///
    /// # Errors
    ///
    /// Returns an error if the user doesn't exist or the storage
    /// operation fails.
    async fn verify_password(&self, user_id: &str, password: &str) -> AuthResult<bool>;

    /// Replace the user's MFA fields, guarded by the record version.
    ///
    /// The write succeeds only if the stored record still carries
    /// `expected_version`; the store then applies `settings` and bumps
    /// the version. Unrelated fields are left untouched.
    ///
    /// # Errors
    ///
    /// - `ConcurrentModification` if the version no longer matches
    /// - `UserNotFound` if the user doesn't exist
    /// - `Storage` if the operation fails
    async fn update_mfa(
        &self,
        user_id: &str,
        expected_version: i64,
        settings: MfaSettings,
    ) -> AuthResult<()>;
}

// =============================================================================
// Tests
// =============================================================================
