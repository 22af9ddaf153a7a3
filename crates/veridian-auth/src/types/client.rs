//! OAuth 2.0 client domain types.
//!
//! Defines the `Client` registration record and the closed set of grant
//! types the embedded authorization server dispatches on.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types supported by the embedded authorization server.
///
/// A closed tagged union: the token endpoint parses the wire value into
/// this enum and dispatches with an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow.
    AuthorizationCode,
    /// Client Credentials flow (no end-user context).
    ClientCredentials,
}

impl GrantType {
    /// Returns the OAuth 2.0 `grant_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::ClientCredentials => "client_credentials",
        }
    }

    /// Parses a wire `grant_type` value.
    ///
    /// Returns `None` for any grant type outside the supported set
    /// (including `refresh_token`, which the embedded server does not
    /// offer).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "authorization_code" => Some(Self::AuthorizationCode),
            "client_credentials" => Some(Self::ClientCredentials),
            _ => None,
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Client
// =============================================================================

/// OAuth 2.0 client registration.
///
/// `client_id` is globally unique and immutable after creation; there is
/// no update path for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Internal record identifier.
    pub id: String,

    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Client secret, compared verbatim at the token endpoint.
    pub client_secret: String,

    /// Human-readable display name.
    pub name: String,

    /// Allowed redirect URIs for the authorization code flow.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Scopes this client may be granted.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// The platform user who registered the client.
    pub owner_user_id: String,

    /// When the client was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the client was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Client {
    /// Validates the client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }
        if self.name.is_empty() {
            return Err(ClientValidationError::EmptyName);
        }
        if self.redirect_uris.is_empty() {
            return Err(ClientValidationError::NoRedirectUris);
        }
        Ok(())
    }

    /// Checks if the given redirect URI is in the registered set.
    ///
    /// Exact string match; no prefix or wildcard semantics.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Intersects a requested scope string with the client's allowed set.
    ///
    /// Unknown or unauthorized scopes are silently dropped rather than
    /// rejected. With no requested scope, the client's full allowed set
    /// is granted.
    #[must_use]
    pub fn narrow_scopes(&self, requested: Option<&str>) -> Vec<String> {
        match requested.map(str::trim) {
            None | Some("") => self.scopes.clone(),
            Some(requested) => {
                let mut granted = Vec::new();
                for scope in requested.split_whitespace() {
                    if self.scopes.iter().any(|allowed| allowed == scope)
                        && !granted.iter().any(|g: &String| g == scope)
                    {
                        granted.push(scope.to_string());
                    }
                }
                granted
            }
        }
    }
}

/// Client validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClientValidationError {
    /// The client_id is empty.
    #[error("client_id cannot be empty")]
    EmptyClientId,

    /// The display name is empty.
    #[error("client name cannot be empty")]
    EmptyName,

    /// No redirect URIs are registered.
    #[error("at least one redirect URI is required")]
    NoRedirectUris,
}
