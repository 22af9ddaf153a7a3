//! Userinfo endpoint types.
//!
//! Claims about the authorizing user, gated strictly by the scopes the
//! token was issued with:
//!
//! - `sub`, `username` - always included
//! - `email` - scopes `email` or `openid`
//! - `phone` - scope `phone`
//! - `nickname`, `avatar_url` - scope `profile`

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::User;

/// Userinfo response claims.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfoResponse {
    /// Subject identifier (the user's unique ID).
    pub sub: String,

    /// Username.
    pub username: String,

    /// Email address (scopes `email` or `openid`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Phone number (scope `phone`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Display nickname (scope `profile`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// Avatar URL (scope `profile`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserInfoResponse {
    /// Builds the claims for a user, including only what the granted
    /// scopes permit.
    #[must_use]
    pub fn for_user(user: &User, scopes: &[String]) -> Self {
        let has = |scope: &str| scopes.iter().any(|s| s == scope);

        let mut response = Self {
            sub: user.id.clone(),
            username: user.username.clone(),
            ..Self::default()
        };

        if has("email") || has("openid") {
            response.email = user.email.clone();
        }
        if has("phone") {
            response.phone = user.phone.clone();
        }
        if has("profile") {
            response.nickname = user.nickname.clone();
            response.avatar_url = user.avatar_url.clone();
        }

        response
    }
}

/// Extracts the bearer token from an `Authorization` header value.
///
/// # Errors
///
/// Returns `MissingToken` if the header is absent, does not use the
/// `Bearer` scheme, or carries an empty token.
pub fn extract_bearer(header: Option<&str>) -> AuthResult<&str> {
    let header = header.ok_or(AuthError::MissingToken)?;
    let token = header.strip_prefix("Bearer ").ok_or(AuthError::MissingToken)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
