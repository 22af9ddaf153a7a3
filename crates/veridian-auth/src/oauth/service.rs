//! OAuth authorization server service.
//!
//! Client registration, the authorize step, the token endpoint, and
//! userinfo, all over the shared expiring store. Clients live under a
//! long TTL; codes and tokens are short-lived and additionally carry
//! their own `expires_at`, checked against the injected clock on every
//! read so correctness never depends on store eviction timing.

use std::sync::Arc;

use time::Duration;
use uuid::Uuid;

use crate::AuthResult;
use crate::clock::Clock;
use crate::config::OAuthConfig;
use crate::error::AuthError;
use crate::oauth::code::AuthorizationCode;
use crate::oauth::token::{AccessTokenRecord, TokenRequest, TokenResponse};
use crate::oauth::userinfo::{UserInfoResponse, extract_bearer};
use crate::storage::{ExpiringStore, UserStorage};
use crate::types::{Client, GrantType};

const CLIENT_KEY_PREFIX: &str = "oauth:client:";
const CODE_KEY_PREFIX: &str = "oauth:code:";
const TOKEN_KEY_PREFIX: &str = "oauth:token:";

/// A client registration request.
#[derive(Debug, Clone)]
pub struct RegisterClientRequest {
    /// The platform user registering the client.
    pub owner_user_id: String,

    /// Human-readable display name.
    pub name: String,

    /// Allowed redirect URIs.
    pub redirect_uris: Vec<String>,

    /// Scopes the client may be granted.
    pub scopes: Vec<String>,
}

/// The embedded OAuth 2.0 authorization server.
pub struct OAuthService {
    store: Arc<dyn ExpiringStore>,
    users: Arc<dyn UserStorage>,
    clock: Arc<dyn Clock>,
    config: OAuthConfig,
}

impl OAuthService {
    /// Creates a new OAuth service.
    #[must_use]
    pub fn new(
        store: Arc<dyn ExpiringStore>,
        users: Arc<dyn UserStorage>,
        clock: Arc<dyn Clock>,
        config: OAuthConfig,
    ) -> Self {
        Self {
            store,
            users,
            clock,
            config,
        }
    }

    // -------------------------------------------------------------------------
    // Client registry
    // -------------------------------------------------------------------------

    /// Registers a new client with generated credentials.
    ///
    /// The generated `client_id` is unique and immutable; there is no
    /// update path for it. The secret is returned in the record exactly
    /// once here.
    ///
    /// # Errors
    ///
    /// - `InvalidClient` if the registration is invalid
    /// - `Storage` if the store write fails
    pub async fn register_client(&self, request: RegisterClientRequest) -> AuthResult<Client> {
        let now = self.clock.now();
        let client = Client {
            id: Uuid::new_v4().to_string(),
            client_id: Uuid::new_v4().simple().to_string(),
            client_secret: generate_secret(),
            name: request.name,
            redirect_uris: request.redirect_uris,
            scopes: request.scopes,
            owner_user_id: request.owner_user_id,
            created_at: now,
            updated_at: now,
        };

        client
            .validate()
            .map_err(|err| AuthError::invalid_client(err.to_string()))?;

        let value = serde_json::to_value(&client)
            .map_err(|err| AuthError::internal(format!("client encoding failed: {err}")))?;
        self.store
            .set(
                &client_key(&client.client_id),
                value,
                self.config.client_record_lifetime,
            )
            .await?;

        tracing::info!(client_id = %client.client_id, "OAuth client registered");
        Ok(client)
    }

    /// Looks up a client by its `client_id`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store read fails.
    pub async fn find_client(&self, client_id: &str) -> AuthResult<Option<Client>> {
        let Some(value) = self.store.get(&client_key(client_id)).await? else {
            return Ok(None);
        };
        let client = serde_json::from_value(value)
            .map_err(|err| AuthError::internal(format!("client decoding failed: {err}")))?;
        Ok(Some(client))
    }

    // -------------------------------------------------------------------------
    // Authorize
    // -------------------------------------------------------------------------

    /// Processes an authorization for an already-authenticated user.
    ///
    /// The requested scope is intersected with the client's allowed set,
    /// silently dropping anything unauthorized. Returns the redirect URL
    /// carrying `code` and, when supplied, the echoed `state`.
    ///
    /// # Errors
    ///
    /// - `InvalidClient` if the client is unknown
    /// - `InvalidRedirectUri` if the URI is not registered
    /// - `Storage` if the store write fails
    pub async fn authorize(
        &self,
        user_id: &str,
        client_id: &str,
        redirect_uri: &str,
        scope: Option<&str>,
        state: Option<&str>,
    ) -> AuthResult<String> {
        let client = self
            .find_client(client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

        if !client.is_redirect_uri_allowed(redirect_uri) {
            return Err(AuthError::InvalidRedirectUri);
        }

        let scopes = client.narrow_scopes(scope);

        let code = AuthorizationCode {
            code: AuthorizationCode::generate_code(),
            client_id: client.client_id.clone(),
            redirect_uri: redirect_uri.to_string(),
            user_id: user_id.to_string(),
            scopes,
            expires_at: self.clock.now() + self.code_lifetime(),
        };

        let value = serde_json::to_value(&code)
            .map_err(|err| AuthError::internal(format!("code encoding failed: {err}")))?;
        self.store
            .set(
                &code_key(&code.code),
                value,
                self.config.authorization_code_lifetime,
            )
            .await?;

        let mut url =
            url::Url::parse(redirect_uri).map_err(|_| AuthError::InvalidRedirectUri)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("code", &code.code);
            if let Some(state) = state {
                pairs.append_pair("state", state);
            }
        }

        Ok(url.to_string())
    }

    // -------------------------------------------------------------------------
    // Token endpoint
    // -------------------------------------------------------------------------

    /// Handles a token request.
    ///
    /// Client authentication happens first; the grant is dispatched only
    /// after the secret matches.
    ///
    /// # Errors
    ///
    /// - `InvalidClient` if the client is unknown or the secret is wrong
    /// - `UnsupportedGrantType` for anything but the two supported grants
    /// - `MissingCode` / `InvalidOrExpiredCode` / `ClientMismatch` /
    ///   `RedirectUriMismatch` for authorization-code failures
    /// - `Storage` if a store operation fails
    pub async fn token(&self, request: &TokenRequest) -> AuthResult<TokenResponse> {
        let client = self
            .find_client(&request.client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

        if client.client_secret != request.client_secret {
            return Err(AuthError::invalid_client("Invalid client secret"));
        }

        match GrantType::parse(&request.grant_type) {
            Some(GrantType::AuthorizationCode) => {
                self.authorization_code_grant(&client, request).await
            }
            Some(GrantType::ClientCredentials) => {
                self.client_credentials_grant(&client, request).await
            }
            None => Err(AuthError::unsupported_grant_type(&request.grant_type)),
        }
    }

    async fn authorization_code_grant(
        &self,
        client: &Client,
        request: &TokenRequest,
    ) -> AuthResult<TokenResponse> {
        let code_value = request.code.as_deref().ok_or(AuthError::MissingCode)?;

        let Some(stored) = self.store.get(&code_key(code_value)).await? else {
            return Err(AuthError::InvalidOrExpiredCode);
        };
        let code: AuthorizationCode = serde_json::from_value(stored)
            .map_err(|err| AuthError::internal(format!("code decoding failed: {err}")))?;

        if code.is_expired(self.clock.now()) {
            return Err(AuthError::InvalidOrExpiredCode);
        }

        if code.client_id != client.client_id {
            return Err(AuthError::ClientMismatch);
        }

        if let Some(redirect_uri) = request.redirect_uri.as_deref() {
            if redirect_uri != code.redirect_uri {
                return Err(AuthError::RedirectUriMismatch);
            }
        }

        // Single-use: the code dies before the token exists.
        self.store.delete(&code_key(code_value)).await?;

        self.mint_token(client, Some(code.user_id), code.scopes)
            .await
    }

    async fn client_credentials_grant(
        &self,
        client: &Client,
        request: &TokenRequest,
    ) -> AuthResult<TokenResponse> {
        let scopes = client.narrow_scopes(request.scope.as_deref());
        self.mint_token(client, None, scopes).await
    }

    async fn mint_token(
        &self,
        client: &Client,
        user_id: Option<String>,
        scopes: Vec<String>,
    ) -> AuthResult<TokenResponse> {
        let record = AccessTokenRecord {
            access_token: AccessTokenRecord::generate_token(),
            client_id: client.client_id.clone(),
            user_id,
            scopes,
            expires_at: self.clock.now() + self.token_lifetime(),
        };

        let value = serde_json::to_value(&record)
            .map_err(|err| AuthError::internal(format!("token encoding failed: {err}")))?;
        self.store
            .set(
                &token_key(&record.access_token),
                value,
                self.config.access_token_lifetime,
            )
            .await?;

        Ok(TokenResponse::new(
            record.access_token,
            self.config.access_token_lifetime.as_secs(),
            record.scopes.join(" "),
        ))
    }

    // -------------------------------------------------------------------------
    // Userinfo
    // -------------------------------------------------------------------------

    /// Returns scope-gated claims for the token in the given
    /// `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - `MissingToken` if the header is absent or malformed
    /// - `InvalidOrExpiredToken` if the token does not resolve
    /// - `NoUserContext` for client-credentials tokens
    /// - `UserNotFound` if the authorizing user no longer resolves
    pub async fn userinfo(&self, authorization: Option<&str>) -> AuthResult<UserInfoResponse> {
        let token = extract_bearer(authorization)?;

        let Some(stored) = self.store.get(&token_key(token)).await? else {
            return Err(AuthError::InvalidOrExpiredToken);
        };
        let record: AccessTokenRecord = serde_json::from_value(stored)
            .map_err(|err| AuthError::internal(format!("token decoding failed: {err}")))?;

        if record.is_expired(self.clock.now()) {
            return Err(AuthError::InvalidOrExpiredToken);
        }

        let user_id = record.user_id.as_deref().ok_or(AuthError::NoUserContext)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserInfoResponse::for_user(&user, &record.scopes))
    }

    fn code_lifetime(&self) -> Duration {
        Duration::seconds(self.config.authorization_code_lifetime.as_secs() as i64)
    }

    fn token_lifetime(&self) -> Duration {
        Duration::seconds(self.config.access_token_lifetime.as_secs() as i64)
    }
}

fn client_key(client_id: &str) -> String {
    format!("{CLIENT_KEY_PREFIX}{client_id}")
}

fn code_key(code: &str) -> String {
    format!("{CODE_KEY_PREFIX}{code}")
}

fn token_key(token: &str) -> String {
    format!("{TOKEN_KEY_PREFIX}{token}")
}

/// Generates a client secret (256 bits, base64url-encoded).
fn generate_secret() -> String {
    use base64::Engine;
    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes[..]);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::User;
    use crate::testutil::{MapStore, MockUserStorage};
    use time::OffsetDateTime;

    struct Fixture {
        service: OAuthService,
        users: Arc<MockUserStorage>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(
            OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        ));
        let store = Arc::new(MapStore::new(clock.clone()));
        let users = Arc::new(MockUserStorage::new());
        let service = OAuthService::new(
            store,
            users.clone(),
            clock.clone(),
            OAuthConfig::default(),
        );
        Fixture {
            service,
            users,
            clock,
        }
    }

    fn add_user(fx: &Fixture) {
        fx.users.add_user(
            User::builder("alice")
                .id("user-1")
                .email("alice@example.com")
                .phone("+15550100")
                .nickname("ally")
                .avatar_url("https://cdn.example.com/alice.png")
                .build(),
        );
    }

    async fn register(fx: &Fixture) -> Client {
        fx.service
            .register_client(RegisterClientRequest {
                owner_user_id: "user-1".to_string(),
                name: "Test App".to_string(),
                redirect_uris: vec!["https://app/cb".to_string()],
                scopes: vec!["profile".to_string(), "email".to_string()],
            })
            .await
            .unwrap()
    }

    fn code_from(redirect_url: &str) -> String {
        let url = url::Url::parse(redirect_url).unwrap();
        url.query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.to_string())
            .expect("redirect URL carries a code")
    }

    #[tokio::test]
    async fn test_register_client_generates_credentials() {
        let fx = fixture();
        let client = register(&fx).await;

        assert!(!client.client_id.is_empty());
        assert!(!client.client_secret.is_empty());
        assert_eq!(client.owner_user_id, "user-1");

        let found = fx
            .service
            .find_client(&client.client_id)
            .await
            .unwrap()
            .expect("client stored");
        assert_eq!(found.name, "Test App");
        assert_eq!(found.client_secret, client.client_secret);
    }

    #[tokio::test]
    async fn test_register_client_requires_redirect_uris() {
        let fx = fixture();
        let err = fx
            .service
            .register_client(RegisterClientRequest {
                owner_user_id: "user-1".to_string(),
                name: "Bad App".to_string(),
                redirect_uris: vec![],
                scopes: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidClient { .. }));
    }

    #[tokio::test]
    async fn test_authorize_builds_redirect_url() {
        let fx = fixture();
        add_user(&fx);
        let client = register(&fx).await;

        let url = fx
            .service
            .authorize(
                "user-1",
                &client.client_id,
                "https://app/cb",
                Some("email"),
                Some("xyz"),
            )
            .await
            .unwrap();

        assert!(url.starts_with("https://app/cb?"));
        assert!(url.contains("code="));
        assert!(url.contains("state=xyz"));
    }

    #[tokio::test]
    async fn test_authorize_unknown_client() {
        let fx = fixture();
        let err = fx
            .service
            .authorize("user-1", "nope", "https://app/cb", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidClient { .. }));
    }

    #[tokio::test]
    async fn test_authorize_unregistered_redirect_uri() {
        let fx = fixture();
        let client = register(&fx).await;

        let err = fx
            .service
            .authorize("user-1", &client.client_id, "https://evil/cb", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRedirectUri));
    }

    #[tokio::test]
    async fn test_full_authorization_code_flow() {
        let fx = fixture();
        add_user(&fx);
        let client = register(&fx).await;

        let redirect = fx
            .service
            .authorize(
                "user-1",
                &client.client_id,
                "https://app/cb",
                Some("email"),
                None,
            )
            .await
            .unwrap();
        let code = code_from(&redirect);

        let response = fx
            .service
            .token(&TokenRequest {
                grant_type: "authorization_code".to_string(),
                client_id: client.client_id.clone(),
                client_secret: client.client_secret.clone(),
                code: Some(code),
                redirect_uri: Some("https://app/cb".to_string()),
                scope: None,
            })
            .await
            .unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);
        assert_eq!(response.scope, "email");

        // Userinfo with the email-scoped token: sub, username, email and
        // nothing from the profile scope.
        let claims = fx
            .service
            .userinfo(Some(&format!("Bearer {}", response.access_token)))
            .await
            .unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
        assert!(claims.nickname.is_none());
        assert!(claims.avatar_url.is_none());
        assert!(claims.phone.is_none());
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let fx = fixture();
        add_user(&fx);
        let client = register(&fx).await;

        let redirect = fx
            .service
            .authorize("user-1", &client.client_id, "https://app/cb", None, None)
            .await
            .unwrap();
        let code = code_from(&redirect);

        let request = TokenRequest {
            grant_type: "authorization_code".to_string(),
            client_id: client.client_id.clone(),
            client_secret: client.client_secret.clone(),
            code: Some(code),
            redirect_uri: Some("https://app/cb".to_string()),
            scope: None,
        };

        fx.service.token(&request).await.unwrap();
        let err = fx.service.token(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpiredCode));
    }

    #[tokio::test]
    async fn test_code_expires() {
        let fx = fixture();
        add_user(&fx);
        let client = register(&fx).await;

        let redirect = fx
            .service
            .authorize("user-1", &client.client_id, "https://app/cb", None, None)
            .await
            .unwrap();
        let code = code_from(&redirect);

        fx.clock.advance(time::Duration::seconds(601));

        let err = fx
            .service
            .token(&TokenRequest {
                grant_type: "authorization_code".to_string(),
                client_id: client.client_id.clone(),
                client_secret: client.client_secret.clone(),
                code: Some(code),
                redirect_uri: None,
                scope: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpiredCode));
    }

    #[tokio::test]
    async fn test_redirect_uri_mismatch() {
        let fx = fixture();
        add_user(&fx);
        let client = register(&fx).await;

        let redirect = fx
            .service
            .authorize("user-1", &client.client_id, "https://app/cb", None, None)
            .await
            .unwrap();

        let err = fx
            .service
            .token(&TokenRequest {
                grant_type: "authorization_code".to_string(),
                client_id: client.client_id.clone(),
                client_secret: client.client_secret.clone(),
                code: Some(code_from(&redirect)),
                redirect_uri: Some("https://app/other".to_string()),
                scope: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RedirectUriMismatch));
    }

    #[tokio::test]
    async fn test_code_issued_to_other_client_is_rejected() {
        let fx = fixture();
        add_user(&fx);
        let client_a = register(&fx).await;
        let client_b = register(&fx).await;

        let redirect = fx
            .service
            .authorize("user-1", &client_a.client_id, "https://app/cb", None, None)
            .await
            .unwrap();

        let err = fx
            .service
            .token(&TokenRequest {
                grant_type: "authorization_code".to_string(),
                client_id: client_b.client_id.clone(),
                client_secret: client_b.client_secret.clone(),
                code: Some(code_from(&redirect)),
                redirect_uri: None,
                scope: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ClientMismatch));
    }

    #[tokio::test]
    async fn test_missing_code() {
        let fx = fixture();
        let client = register(&fx).await;

        let err = fx
            .service
            .token(&TokenRequest {
                grant_type: "authorization_code".to_string(),
                client_id: client.client_id.clone(),
                client_secret: client.client_secret.clone(),
                code: None,
                redirect_uri: None,
                scope: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCode));
    }

    #[tokio::test]
    async fn test_wrong_client_secret() {
        let fx = fixture();
        let client = register(&fx).await;

        let err = fx
            .service
            .token(&TokenRequest {
                grant_type: "client_credentials".to_string(),
                client_id: client.client_id.clone(),
                client_secret: "wrong".to_string(),
                code: None,
                redirect_uri: None,
                scope: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidClient { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_grant_type() {
        let fx = fixture();
        let client = register(&fx).await;

        for grant in ["password", "refresh_token", "implicit"] {
            let err = fx
                .service
                .token(&TokenRequest {
                    grant_type: grant.to_string(),
                    client_id: client.client_id.clone(),
                    client_secret: client.client_secret.clone(),
                    code: None,
                    redirect_uri: None,
                    scope: None,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::UnsupportedGrantType { .. }));
        }
    }

    #[tokio::test]
    async fn test_client_credentials_grant() {
        let fx = fixture();
        let client = register(&fx).await;

        // No scope requested: full allowed set.
        let response = fx
            .service
            .token(&TokenRequest {
                grant_type: "client_credentials".to_string(),
                client_id: client.client_id.clone(),
                client_secret: client.client_secret.clone(),
                code: None,
                redirect_uri: None,
                scope: None,
            })
            .await
            .unwrap();
        assert_eq!(response.scope, "profile email");

        // Userinfo has no user context for these tokens.
        let err = fx
            .service
            .userinfo(Some(&format!("Bearer {}", response.access_token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NoUserContext));
    }

    #[tokio::test]
    async fn test_client_credentials_scope_narrowing() {
        let fx = fixture();
        let client = register(&fx).await;

        let response = fx
            .service
            .token(&TokenRequest {
                grant_type: "client_credentials".to_string(),
                client_id: client.client_id.clone(),
                client_secret: client.client_secret.clone(),
                code: None,
                redirect_uri: None,
                scope: Some("email admin".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(response.scope, "email");
    }

    #[tokio::test]
    async fn test_authorize_narrows_unauthorized_scope_silently() {
        let fx = fixture();
        add_user(&fx);
        let client = register(&fx).await;

        let redirect = fx
            .service
            .authorize(
                "user-1",
                &client.client_id,
                "https://app/cb",
                Some("profile admin"),
                None,
            )
            .await
            .unwrap();

        let response = fx
            .service
            .token(&TokenRequest {
                grant_type: "authorization_code".to_string(),
                client_id: client.client_id.clone(),
                client_secret: client.client_secret.clone(),
                code: Some(code_from(&redirect)),
                redirect_uri: None,
                scope: None,
            })
            .await
            .unwrap();
        assert_eq!(response.scope, "profile");
    }

    #[tokio::test]
    async fn test_userinfo_profile_scope_gating() {
        let fx = fixture();
        add_user(&fx);
        let client = register(&fx).await;

        let redirect = fx
            .service
            .authorize(
                "user-1",
                &client.client_id,
                "https://app/cb",
                Some("profile"),
                None,
            )
            .await
            .unwrap();
        let response = fx
            .service
            .token(&TokenRequest {
                grant_type: "authorization_code".to_string(),
                client_id: client.client_id.clone(),
                client_secret: client.client_secret.clone(),
                code: Some(code_from(&redirect)),
                redirect_uri: None,
                scope: None,
            })
            .await
            .unwrap();

        let claims = fx
            .service
            .userinfo(Some(&format!("Bearer {}", response.access_token)))
            .await
            .unwrap();
        assert_eq!(claims.nickname.as_deref(), Some("ally"));
        assert_eq!(
            claims.avatar_url.as_deref(),
            Some("https://cdn.example.com/alice.png")
        );
        assert!(claims.email.is_none());
        assert!(claims.phone.is_none());
    }

    #[tokio::test]
    async fn test_userinfo_token_expires() {
        let fx = fixture();
        add_user(&fx);
        let client = register(&fx).await;

        let response = fx
            .service
            .token(&TokenRequest {
                grant_type: "client_credentials".to_string(),
                client_id: client.client_id.clone(),
                client_secret: client.client_secret.clone(),
                code: None,
                redirect_uri: None,
                scope: None,
            })
            .await
            .unwrap();

        fx.clock.advance(time::Duration::seconds(3601));
        let err = fx
            .service
            .userinfo(Some(&format!("Bearer {}", response.access_token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpiredToken));
    }

    #[tokio::test]
    async fn test_userinfo_missing_or_malformed_header() {
        let fx = fixture();

        let err = fx.service.userinfo(None).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));

        let err = fx.service.userinfo(Some("Basic abc")).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));

        let err = fx
            .service
            .userinfo(Some("Bearer unknown-token"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpiredToken));
    }
}
