//! Token endpoint types.
//!
//! Request/response shapes for the embedded server's token endpoint and
//! the stored record behind its opaque access tokens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Token request parameters.
///
/// Required fields depend on `grant_type`:
///
/// - `authorization_code`: `code` (and optionally `redirect_uri`, which
///   must then match the authorization request)
/// - `client_credentials`: optionally `scope`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type.
    pub grant_type: String,

    /// Client identifier.
    pub client_id: String,

    /// Client secret.
    pub client_secret: String,

    /// Authorization code (authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI (must match the authorization request when present).
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Requested scope (client_credentials grant).
    #[serde(default)]
    pub scope: Option<String>,
}

/// Successful token response.
///
/// ```json
/// {
///   "access_token": "wJalrXUtnFEMI...",
///   "token_type": "Bearer",
///   "expires_in": 3600,
///   "scope": "email"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// The opaque access token.
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Granted scopes (space-separated).
    pub scope: String,
}

impl TokenResponse {
    /// Creates a new bearer token response.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64, scope: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            scope,
        }
    }
}

/// Stored record behind an opaque access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenRecord {
    /// The token value (256-bit random, base64url-encoded).
    pub access_token: String,

    /// Client the token was issued to.
    pub client_id: String,

    /// The authorizing user; absent for client-credentials tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Granted scopes.
    pub scopes: Vec<String>,

    /// Hard expiry, checked on every read.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AccessTokenRecord {
    /// Generates a new cryptographically random token value.
    #[must_use]
    pub fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes[..]);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Returns `true` if the token has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    /// Returns `true` if the token carries the given scope.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}
