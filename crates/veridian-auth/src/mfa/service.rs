//! Two-factor enrollment and verification.
//!
//! Owns the per-user enrollment state machine and the pending-login
//! sub-machine used for step-up verification at login time.
//!
//! # Enrollment states
//!
//! `Disabled → PendingConfirmation → Enabled`
//!
//! `PendingConfirmation` is transient and never persisted: the secret and
//! recovery codes generated by [`TwoFactorService::enable`] exist only in
//! the response to the caller until [`TwoFactorService::confirm_enable`]
//! verifies a live code and writes all three MFA fields in one update.
//! An abandoned enrollment therefore leaves no residue to clean up, and
//! a failed confirmation never writes partial state.
//!
//! # Pending logins
//!
//! A password-verified login for an enrolled user parks in the shared
//! expiring store under an opaque temporary token. Entries are single-use
//! and carry their own `expires_at`, which is checked against the clock
//! on every read independent of store eviction timing.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::clock::Clock;
use crate::config::TwoFactorConfig;
use crate::error::AuthError;
use crate::mfa::recovery::RecoveryCodeService;
use crate::mfa::totp::TotpService;
use crate::storage::{ExpiringStore, MfaSettings, User, UserStorage};

const PENDING_KEY_PREFIX: &str = "twofactor:pending:";

/// Material returned by [`TwoFactorService::enable`].
///
/// Nothing here has been persisted; the caller shows the secret and
/// plaintext recovery codes to the user exactly once and passes them
/// back on confirmation.
#[derive(Debug, Clone)]
pub struct TwoFactorEnrollment {
    /// Base32-encoded TOTP secret.
    pub secret: String,

    /// `otpauth://` URI for authenticator apps.
    pub provisioning_uri: String,

    /// Plaintext recovery codes.
    pub recovery_codes: Vec<String>,
}

/// A login parked while awaiting the second factor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingLogin {
    /// The user awaiting verification.
    pub user_id: String,

    /// Username at login time.
    pub username: String,

    /// Hard expiry, checked on every read.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Orchestrates two-factor enrollment, verification, and recovery.
pub struct TwoFactorService {
    users: Arc<dyn UserStorage>,
    store: Arc<dyn ExpiringStore>,
    totp: TotpService,
    recovery: RecoveryCodeService,
    clock: Arc<dyn Clock>,
    pending_login_lifetime: Duration,
}

impl TwoFactorService {
    /// Creates a new two-factor service.
    ///
    /// # Arguments
    ///
    /// * `users` - User store (MFA fields are written through its CAS
    ///   update contract)
    /// * `store` - Shared expiring store for pending logins
    /// * `clock` - Time source
    /// * `issuer` - Issuer label for provisioning URIs
    /// * `config` - TOTP, recovery-code, and pending-login settings
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStorage>,
        store: Arc<dyn ExpiringStore>,
        clock: Arc<dyn Clock>,
        issuer: impl Into<String>,
        config: &TwoFactorConfig,
    ) -> Self {
        Self {
            users,
            store,
            totp: TotpService::new(issuer, config, clock.clone()),
            recovery: RecoveryCodeService::new(config.recovery_code_count),
            clock,
            pending_login_lifetime: config.pending_login_lifetime,
        }
    }

    // -------------------------------------------------------------------------
    // Enrollment
    // -------------------------------------------------------------------------

    /// Starts enrollment: generates a secret and recovery codes.
    ///
    /// Nothing is persisted; the user record is untouched until
    /// [`confirm_enable`](Self::confirm_enable) verifies a live code.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user doesn't resolve
    /// - `AlreadyEnabled` if two-factor is already on
    pub async fn enable(&self, user_id: &str) -> AuthResult<TwoFactorEnrollment> {
        let user = self.require_user(user_id).await?;
        if user.mfa_enabled {
            return Err(AuthError::AlreadyEnabled);
        }

        let totp = self.totp.generate_secret(&user.username)?;
        let recovery_codes = self.recovery.generate();

        Ok(TwoFactorEnrollment {
            secret: totp.secret,
            provisioning_uri: totp.provisioning_uri,
            recovery_codes,
        })
    }

    /// Confirms enrollment with a live code from the authenticator.
    ///
    /// On success the secret and hashed recovery codes are persisted and
    /// `mfa_enabled` flips to true, all in a single guarded update. On
    /// failure no state is written.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` / `AlreadyEnabled` as for `enable`
    /// - `InvalidCode` if the code does not verify against the secret
    /// - `ConcurrentModification` if the record changed underneath
    pub async fn confirm_enable(
        &self,
        user_id: &str,
        secret: &str,
        code: &str,
        recovery_codes: &[String],
    ) -> AuthResult<()> {
        let user = self.require_user(user_id).await?;
        if user.mfa_enabled {
            return Err(AuthError::AlreadyEnabled);
        }

        if !self.totp.verify(secret, code) {
            return Err(AuthError::InvalidCode);
        }

        let hashed = self.recovery.hash(recovery_codes)?;
        self.users
            .update_mfa(
                user_id,
                user.version,
                MfaSettings {
                    enabled: true,
                    secret: Some(secret.to_string()),
                    recovery_codes: Some(hashed),
                },
            )
            .await?;

        tracing::info!(user_id, "two-factor authentication enabled");
        Ok(())
    }

    /// Disables two-factor authentication.
    ///
    /// Requires password re-verification so a hijacked session cannot
    /// silently strip the second factor.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` / `NotEnabled`
    /// - `InvalidPassword` if re-verification fails
    pub async fn disable(&self, user_id: &str, password: &str) -> AuthResult<()> {
        let user = self.require_enabled(user_id).await?;

        if !self.users.verify_password(user_id, password).await? {
            return Err(AuthError::InvalidPassword);
        }

        self.users
            .update_mfa(user_id, user.version, MfaSettings::disabled())
            .await?;

        tracing::info!(user_id, "two-factor authentication disabled");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Verification
    // -------------------------------------------------------------------------

    /// Verifies a one-time code against the user's stored secret.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` / `NotEnabled`
    pub async fn verify(&self, user_id: &str, code: &str) -> AuthResult<bool> {
        let user = self.require_enabled(user_id).await?;
        let secret = user.mfa_secret.as_deref().ok_or(AuthError::NotEnabled)?;
        Ok(self.totp.verify(secret, code))
    }

    /// Redeems a recovery code, consuming it.
    ///
    /// Returns the number of codes remaining after consumption.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` / `NotEnabled`
    /// - `InvalidRecoveryCode` if no remaining code matches
    /// - `ConcurrentModification` if a concurrent redemption won
    pub async fn verify_recovery_code(&self, user_id: &str, code: &str) -> AuthResult<usize> {
        let user = self.require_enabled(user_id).await?;
        let hashed = user
            .recovery_codes
            .clone()
            .ok_or(AuthError::InvalidRecoveryCode)?;

        let index = self
            .recovery
            .verify(&hashed, code)
            .ok_or(AuthError::InvalidRecoveryCode)?;

        let remaining = self.recovery.consume(hashed, index);
        let remaining_count = remaining.len();

        self.users
            .update_mfa(
                user_id,
                user.version,
                MfaSettings {
                    enabled: user.mfa_enabled,
                    secret: user.mfa_secret,
                    recovery_codes: Some(remaining),
                },
            )
            .await?;

        tracing::info!(user_id, remaining = remaining_count, "recovery code redeemed");
        Ok(remaining_count)
    }

    /// Replaces the full recovery-code set.
    ///
    /// Password-gated. Returns the fresh plaintext codes; the old set is
    /// gone regardless of how many were left.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` / `NotEnabled`
    /// - `InvalidPassword` if re-verification fails
    pub async fn regenerate_recovery_codes(
        &self,
        user_id: &str,
        password: &str,
    ) -> AuthResult<Vec<String>> {
        let user = self.require_enabled(user_id).await?;

        if !self.users.verify_password(user_id, password).await? {
            return Err(AuthError::InvalidPassword);
        }

        let plaintext = self.recovery.generate();
        let hashed = self.recovery.hash(&plaintext)?;

        self.users
            .update_mfa(
                user_id,
                user.version,
                MfaSettings {
                    enabled: user.mfa_enabled,
                    secret: user.mfa_secret,
                    recovery_codes: Some(hashed),
                },
            )
            .await?;

        Ok(plaintext)
    }

    // -------------------------------------------------------------------------
    // Pending logins
    // -------------------------------------------------------------------------

    /// Parks a password-verified login, returning the temporary token.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store write fails.
    pub async fn create_pending_login(&self, user_id: &str, username: &str) -> AuthResult<String> {
        let token = generate_temp_token();
        let pending = PendingLogin {
            user_id: user_id.to_string(),
            username: username.to_string(),
            expires_at: self.clock.now() + self.pending_login_lifetime,
        };

        let value = serde_json::to_value(&pending)
            .map_err(|err| AuthError::internal(format!("pending login encoding failed: {err}")))?;
        self.store
            .set(&pending_key(&token), value, self.pending_login_lifetime)
            .await?;

        Ok(token)
    }

    /// Looks up a pending login without consuming it.
    ///
    /// Used by the verify/recovery endpoints to recover login context.
    /// Entries past their `expires_at` are treated as absent even when
    /// the store has not evicted them yet.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store read fails.
    pub async fn validate_pending_login(&self, token: &str) -> AuthResult<Option<PendingLogin>> {
        let Some(value) = self.store.get(&pending_key(token)).await? else {
            return Ok(None);
        };

        let pending: PendingLogin = serde_json::from_value(value)
            .map_err(|err| AuthError::internal(format!("pending login decoding failed: {err}")))?;

        if pending.expires_at <= self.clock.now() {
            return Ok(None);
        }

        Ok(Some(pending))
    }

    /// Consumes a pending login (validate + delete, single-use).
    ///
    /// # Errors
    ///
    /// - `InvalidOrExpiredSession` if the entry is absent or expired
    /// - `Storage` if the store operation fails
    pub async fn complete_pending_login(&self, token: &str) -> AuthResult<PendingLogin> {
        let pending = self
            .validate_pending_login(token)
            .await?
            .ok_or(AuthError::InvalidOrExpiredSession)?;

        self.store.delete(&pending_key(token)).await?;
        Ok(pending)
    }

    // -------------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------------

    async fn require_user(&self, user_id: &str) -> AuthResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn require_enabled(&self, user_id: &str) -> AuthResult<User> {
        let user = self.require_user(user_id).await?;
        if !user.mfa_enabled {
            return Err(AuthError::NotEnabled);
        }
        Ok(user)
    }
}

fn pending_key(token: &str) -> String {
    format!("{PENDING_KEY_PREFIX}{token}")
}

/// Generates an opaque, unguessable temporary token (256 bits,
/// base64url-encoded).
fn generate_temp_token() -> String {
    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes[..]);
    URL_SAFE_NO_PAD.encode(bytes)
}
