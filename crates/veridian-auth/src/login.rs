//! Login orchestration.
//!
//! The login/logout entry point. Composes the token service and the
//! two-factor service to decide whether a login completes immediately or
//! parks in the pending-2FA state.
//!
//! Every credential failure surfaces as the same generic
//! `InvalidCredentials` so callers cannot enumerate accounts; the
//! concrete reason is recorded through the audit sink, whose failures
//! are swallowed.

use std::sync::Arc;

use crate::AuthResult;
use crate::audit::{AuditOutcome, AuditSink, record_event};
use crate::error::AuthError;
use crate::mfa::TwoFactorService;
use crate::storage::{User, UserStorage};
use crate::token::{TokenPair, TokenService};

/// Username/password credentials presented at login.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// The username.
    pub username: String,

    /// The plaintext password.
    pub password: String,
}

/// Result of a successful credential check.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// No second factor required; the session tokens are ready.
    Complete(TokenPair),

    /// The user is enrolled in two-factor authentication. The caller
    /// must verify a code (or recovery code) and then complete the login
    /// with the temporary token.
    TwoFactorRequired {
        /// Opaque single-use token identifying the pending login.
        temp_token: String,
    },
}

/// The login/logout entry point.
pub struct LoginService {
    users: Arc<dyn UserStorage>,
    tokens: Arc<TokenService>,
    two_factor: Arc<TwoFactorService>,
    audit: Arc<dyn AuditSink>,
}

impl LoginService {
    /// Creates a new login service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStorage>,
        tokens: Arc<TokenService>,
        two_factor: Arc<TwoFactorService>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            users,
            tokens,
            two_factor,
            audit,
        }
    }

    /// Verifies credentials and either issues tokens or parks the login
    /// behind the second factor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for every credential failure: unknown
    /// user, no password set, wrong password, or disabled account. The
    /// distinction is recorded to the audit sink only.
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<LoginOutcome> {
        let user = match self.users.find_by_username(&credentials.username).await? {
            Some(user) => user,
            None => return self.reject(None, "user_not_found").await,
        };

        if user.password_hash.is_none() {
            return self.reject(Some(&user), "no_password_set").await;
        }

        if !self
            .users
            .verify_password(&user.id, &credentials.password)
            .await?
        {
            return self.reject(Some(&user), "invalid_password").await;
        }

        if !user.is_active() {
            return self.reject(Some(&user), "account_disabled").await;
        }

        if user.mfa_enabled {
            let temp_token = self
                .two_factor
                .create_pending_login(&user.id, &user.username)
                .await?;

            record_event(
                self.audit.as_ref(),
                Some(&user.id),
                "login",
                AuditOutcome::Success,
                Some("two_factor_required"),
            )
            .await;

            return Ok(LoginOutcome::TwoFactorRequired { temp_token });
        }

        let pair = self.tokens.issue(&user)?;
        record_event(
            self.audit.as_ref(),
            Some(&user.id),
            "login",
            AuditOutcome::Success,
            None,
        )
        .await;

        Ok(LoginOutcome::Complete(pair))
    }

    /// Completes a pending two-factor login, consuming the temporary
    /// token and issuing session tokens.
    ///
    /// The caller is expected to have verified a one-time code or
    /// recovery code against the pending user first.
    ///
    /// # Errors
    ///
    /// - `InvalidOrExpiredSession` if the pending login is gone or expired
    /// - `UserNotFound` / `AccountDisabled` if the user no longer
    ///   resolves or was disabled in the meantime
    pub async fn complete_two_factor_login(&self, temp_token: &str) -> AuthResult<TokenPair> {
        let pending = match self.two_factor.complete_pending_login(temp_token).await {
            Ok(pending) => pending,
            Err(err) => {
                record_event(
                    self.audit.as_ref(),
                    None,
                    "login.two_factor",
                    AuditOutcome::Failure,
                    Some("invalid_or_expired_session"),
                )
                .await;
                return Err(err);
            }
        };

        let user = self
            .users
            .find_by_id(&pending.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.is_active() {
            return Err(AuthError::AccountDisabled);
        }

        let pair = self.tokens.issue(&user)?;
        record_event(
            self.audit.as_ref(),
            Some(&user.id),
            "login.two_factor",
            AuditOutcome::Success,
            None,
        )
        .await;

        Ok(pair)
    }

    /// Logs out by revoking the presented access token.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` if the token fails validation
    /// - `Storage` if the blacklist write fails
    pub async fn logout(&self, user_id: &str, access_token: &str) -> AuthResult<()> {
        self.tokens.revoke(access_token).await?;

        record_event(
            self.audit.as_ref(),
            Some(user_id),
            "logout",
            AuditOutcome::Success,
            None,
        )
        .await;

        Ok(())
    }

    async fn reject(&self, user: Option<&User>, reason: &str) -> AuthResult<LoginOutcome> {
        record_event(
            self.audit.as_ref(),
            user.map(|u| u.id.as_str()),
            "login",
            AuditOutcome::Failure,
            Some(reason),
        )
        .await;

        Err(AuthError::InvalidCredentials)
    }
}
