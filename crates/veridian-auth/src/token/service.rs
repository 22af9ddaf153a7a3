//! Session token service.
//!
//! Issues and validates signed session token pairs. Tokens are compact
//! JWTs signed with an HMAC key that never leaves this service; the
//! payload carries the subject, username, and a kind discriminator so a
//! refresh token can never be accepted where an access token is required.
//!
//! # Lifecycle
//!
//! 1. `issue` mints an access/refresh pair for a verified user
//! 2. `validate_access` gates resource access
//! 3. `refresh` rotates the pair, blacklisting the used refresh token
//!    before the new pair is minted (a stolen refresh token replayed
//!    after exchange fails with `Revoked`)
//! 4. `revoke` blacklists an access token for its remaining lifetime
//!
//! Expiry is compared against the injected clock on every validation, in
//! addition to nothing else: the JWT library's own wall-clock expiry
//! check is disabled so boundary behavior stays deterministic in tests.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AuthResult;
use crate::clock::Clock;
use crate::config::TokenConfig;
use crate::error::AuthError;
use crate::storage::{ExpiringStore, User, UserStorage};
use crate::token::blacklist::TokenBlacklist;

// =============================================================================
// Claims
// =============================================================================

/// Discriminates access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived token presented on resource requests.
    Access,
    /// Long-lived token exchanged for new pairs.
    Refresh,
}

impl TokenKind {
    /// Returns the kind as its wire string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Signed session token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Subject (user ID).
    pub sub: String,

    /// Username at issuance time.
    pub username: String,

    /// Token kind discriminator.
    pub kind: TokenKind,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Unique token ID. Keeps two tokens minted within the same second
    /// from serializing to the same string.
    pub jti: String,
}

/// An issued access/refresh pair.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// The access token.
    pub access_token: String,

    /// The refresh token.
    pub refresh_token: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

// =============================================================================
// Token Service
// =============================================================================

/// Issues, validates, rotates, and revokes session tokens.
pub struct TokenService {
    users: Arc<dyn UserStorage>,
    blacklist: TokenBlacklist,
    clock: Arc<dyn Clock>,
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Creates a new token service.
    ///
    /// # Arguments
    ///
    /// * `users` - User store for resolving token subjects
    /// * `store` - Shared expiring store backing the revocation blacklist
    /// * `clock` - Time source for issuance and expiry checks
    /// * `signing_key` - HMAC signing key; retained internally only
    /// * `config` - Token lifetimes
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStorage>,
        store: Arc<dyn ExpiringStore>,
        clock: Arc<dyn Clock>,
        signing_key: &[u8],
        config: TokenConfig,
    ) -> Self {
        Self {
            users,
            blacklist: TokenBlacklist::new(store),
            clock,
            config,
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
        }
    }

    /// Issues a fresh access/refresh pair for the user.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if token encoding fails.
    pub fn issue(&self, user: &User) -> AuthResult<TokenPair> {
        let access_token = self.mint(user, TokenKind::Access, self.config.access_token_lifetime)?;
        let refresh_token =
            self.mint(user, TokenKind::Refresh, self.config.refresh_token_lifetime)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.access_token_lifetime.as_secs(),
        })
    }

    /// Exchanges a refresh token for a new pair, rotating the old one.
    ///
    /// The presented refresh token is blacklisted for its remaining
    /// lifetime *before* the new pair is minted.
    ///
    /// # Errors
    ///
    /// - `Revoked` if the token is blacklisted
    /// - `InvalidToken` if signature/expiry/kind validation fails
    /// - `UserNotFound` if the subject no longer resolves
    /// - `AccountDisabled` if the subject is inactive
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self.check(refresh_token, TokenKind::Refresh).await?;

        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.is_active() {
            return Err(AuthError::AccountDisabled);
        }

        // Rotation-on-use: the old token dies before its successor exists.
        self.blacklist
            .revoke(refresh_token, self.remaining(&claims))
            .await?;

        tracing::debug!(user_id = %user.id, "refresh token rotated");
        self.issue(&user)
    }

    /// Validates an access token and resolves its subject.
    ///
    /// # Errors
    ///
    /// - `Revoked` if the token is blacklisted
    /// - `InvalidToken` if signature/expiry/kind validation fails
    /// - `UserNotFound` if the subject no longer resolves
    /// - `AccountDisabled` if the subject is inactive
    pub async fn validate_access(&self, access_token: &str) -> AuthResult<User> {
        let claims = self.check(access_token, TokenKind::Access).await?;

        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.is_active() {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }

    /// Revokes an access token for its remaining lifetime (logout).
    ///
    /// Held refresh tokens must be submitted separately; revocation does
    /// not cascade.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` if the token fails signature/expiry/kind checks
    /// - `Storage` if the blacklist write fails
    pub async fn revoke(&self, access_token: &str) -> AuthResult<()> {
        let claims = self.decode(access_token)?;
        Self::expect_kind(&claims, TokenKind::Access)?;

        self.blacklist
            .revoke(access_token, self.remaining(&claims))
            .await
    }

    /// Revokes a refresh token for its remaining lifetime.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` if the token fails signature/expiry/kind checks
    /// - `Storage` if the blacklist write fails
    pub async fn revoke_refresh(&self, refresh_token: &str) -> AuthResult<()> {
        let claims = self.decode(refresh_token)?;
        Self::expect_kind(&claims, TokenKind::Refresh)?;

        self.blacklist
            .revoke(refresh_token, self.remaining(&claims))
            .await
    }

    /// Blacklist check, decode, expiry, and kind validation in order.
    async fn check(&self, token: &str, kind: TokenKind) -> AuthResult<SessionClaims> {
        if self.blacklist.is_revoked(token).await? {
            return Err(AuthError::Revoked);
        }
        let claims = self.decode(token)?;
        Self::expect_kind(&claims, kind)?;
        Ok(claims)
    }

    fn mint(&self, user: &User, kind: TokenKind, lifetime: Duration) -> AuthResult<String> {
        let now = self.clock.now().unix_timestamp();
        let claims = SessionClaims {
            sub: user.id.clone(),
            username: user.username.clone(),
            kind,
            iat: now,
            exp: now + lifetime.as_secs() as i64,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| AuthError::internal(format!("token encoding failed: {err}")))
    }

    /// Decodes and verifies the signature, then checks expiry against
    /// the injected clock.
    fn decode(&self, token: &str) -> AuthResult<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|err| AuthError::invalid_token(err.to_string()))?;

        if data.claims.exp <= self.clock.now().unix_timestamp() {
            return Err(AuthError::invalid_token("token expired"));
        }

        Ok(data.claims)
    }

    fn expect_kind(claims: &SessionClaims, kind: TokenKind) -> AuthResult<()> {
        if claims.kind != kind {
            return Err(AuthError::invalid_token(format!(
                "expected {} token, got {}",
                kind.as_str(),
                claims.kind.as_str()
            )));
        }
        Ok(())
    }

    fn remaining(&self, claims: &SessionClaims) -> Duration {
        let secs = claims.exp - self.clock.now().unix_timestamp();
        Duration::from_secs(secs.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::testutil::{MapStore, MockUserStorage};
    use time::OffsetDateTime;

    const SIGNING_KEY: &[u8] = b"an-hmac-key-of-at-least-32-bytes!";

    struct Fixture {
        service: TokenService,
        users: Arc<MockUserStorage>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(
            OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        ));
        let store = Arc::new(MapStore::new(clock.clone()));
        let users = Arc::new(MockUserStorage::new());
        let service = TokenService::new(
            users.clone(),
            store,
            clock.clone(),
            SIGNING_KEY,
            TokenConfig::default(),
        );
        Fixture {
            service,
            users,
            clock,
        }
    }

    fn test_user() -> User {
        User::builder("alice").id("user-1").build()
    }

    #[tokio::test]
    async fn test_issue_then_validate_access() {
        let fx = fixture();
        fx.users.add_user(test_user());

        let pair = fx.service.issue(&test_user()).unwrap();
        assert_eq!(pair.expires_in, 900);
        assert_ne!(pair.access_token, pair.refresh_token);

        let user = fx.service.validate_access(&pair.access_token).await.unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_refresh_token_rejected_as_access() {
        let fx = fixture();
        fx.users.add_user(test_user());

        let pair = fx.service.issue(&test_user()).unwrap();
        let err = fx
            .service
            .validate_access(&pair.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_access_token_rejected_as_refresh() {
        let fx = fixture();
        fx.users.add_user(test_user());

        let pair = fx.service.issue(&test_user()).unwrap();
        let err = fx.service.refresh(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_revoke_then_validate_fails_revoked() {
        let fx = fixture();
        fx.users.add_user(test_user());

        let pair = fx.service.issue(&test_user()).unwrap();
        fx.service
            .validate_access(&pair.access_token)
            .await
            .unwrap();

        fx.service.revoke(&pair.access_token).await.unwrap();
        let err = fx
            .service
            .validate_access(&pair.access_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Revoked));
    }

    #[tokio::test]
    async fn test_refresh_rotation_single_use() {
        let fx = fixture();
        fx.users.add_user(test_user());

        let pair = fx.service.issue(&test_user()).unwrap();
        let rotated = fx.service.refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        // Replaying the exchanged token fails with Revoked.
        let err = fx.service.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::Revoked));

        // The new token still works.
        fx.service.refresh(&rotated.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_access_token_expires_at_boundary() {
        let fx = fixture();
        fx.users.add_user(test_user());

        let pair = fx.service.issue(&test_user()).unwrap();

        fx.clock.advance(time::Duration::seconds(899));
        fx.service
            .validate_access(&pair.access_token)
            .await
            .unwrap();

        fx.clock.advance(time::Duration::seconds(2));
        let err = fx
            .service
            .validate_access(&pair.access_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_refresh_outlives_access() {
        let fx = fixture();
        fx.users.add_user(test_user());

        let pair = fx.service.issue(&test_user()).unwrap();
        fx.clock.advance(time::Duration::seconds(3600));

        // Access token is long gone, refresh still valid.
        assert!(fx.service.validate_access(&pair.access_token).await.is_err());
        fx.service.refresh(&pair.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_user_fails() {
        let fx = fixture();
        let pair = fx.service.issue(&test_user()).unwrap();

        // User never added to the store.
        let err = fx.service.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_refresh_for_disabled_user_fails() {
        let fx = fixture();
        fx.users
            .add_user(User::builder("alice").id("user-1").active(false).build());

        let pair = fx.service.issue(&test_user()).unwrap();
        let err = fx.service.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDisabled));

        let err = fx
            .service
            .validate_access(&pair.access_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountDisabled));
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid() {
        let fx = fixture();
        let err = fx.service.validate_access("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_token_signed_with_other_key_is_invalid() {
        let fx = fixture();
        fx.users.add_user(test_user());

        let other_clock = Arc::new(ManualClock::new(
            OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        ));
        let other = TokenService::new(
            Arc::new(MockUserStorage::new()),
            Arc::new(MapStore::new(other_clock.clone())),
            other_clock,
            b"a-completely-different-32b-secret",
            TokenConfig::default(),
        );
        let pair = other.issue(&test_user()).unwrap();

        let err = fx
            .service
            .validate_access(&pair.access_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_revoke_refresh() {
        let fx = fixture();
        fx.users.add_user(test_user());

        let pair = fx.service.issue(&test_user()).unwrap();
        fx.service.revoke_refresh(&pair.refresh_token).await.unwrap();

        let err = fx.service.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::Revoked));
    }
}
