//! Authentication and authorization error types.
//!
//! This module defines all error types that can occur during credential,
//! two-factor, and OAuth operations. Failures that must stay
//! indistinguishable to callers (expired vs. absent artifacts, wrong
//! password vs. unknown user) are modeled as unit variants carrying no
//! detail; the concrete reason is recorded through the audit sink instead.

use std::fmt;

/// Errors that can occur during credential and authorization operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The supplied credentials are wrong. Covers unknown user, missing
    /// password, wrong password, and disabled account; callers must not
    /// be able to tell which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The token has been explicitly revoked before its natural expiry.
    #[error("Token revoked")]
    Revoked,

    /// The session token failed signature, expiry, or kind validation.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The authorization code is absent, expired, or already redeemed.
    #[error("Invalid or expired authorization code")]
    InvalidOrExpiredCode,

    /// The opaque OAuth access token is absent or expired.
    #[error("Invalid or expired access token")]
    InvalidOrExpiredToken,

    /// The pending two-factor login session is absent or expired.
    #[error("Invalid or expired login session")]
    InvalidOrExpiredSession,

    /// The one-time code did not verify against the TOTP secret.
    #[error("Invalid verification code")]
    InvalidCode,

    /// The recovery code did not match any remaining code.
    #[error("Invalid recovery code")]
    InvalidRecoveryCode,

    /// Password re-verification failed for a password-gated operation.
    #[error("Invalid password")]
    InvalidPassword,

    /// Two-factor authentication is already enabled for this user.
    #[error("Two-factor authentication is already enabled")]
    AlreadyEnabled,

    /// Two-factor authentication is not enabled for this user.
    #[error("Two-factor authentication is not enabled")]
    NotEnabled,

    /// The user account is disabled and cannot authenticate.
    #[error("Account disabled")]
    AccountDisabled,

    /// The user no longer resolves in the user store.
    #[error("User not found")]
    UserNotFound,

    /// The client credentials are invalid or the client is not registered.
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client is invalid.
        message: String,
    },

    /// The redirect URI is not in the client's registered set.
    #[error("Invalid redirect URI")]
    InvalidRedirectUri,

    /// The authorization code was issued to a different client.
    #[error("Authorization code was issued to a different client")]
    ClientMismatch,

    /// The redirect URI does not match the one used at authorization time.
    #[error("Redirect URI does not match the authorization request")]
    RedirectUriMismatch,

    /// The authorization server does not support the requested grant type.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType {
        /// The unsupported grant type.
        grant_type: String,
    },

    /// The token request is missing the authorization code parameter.
    #[error("Missing required parameter: code")]
    MissingCode,

    /// The request carries no usable bearer token.
    #[error("Missing bearer token")]
    MissingToken,

    /// The token carries no user context (client-credentials tokens
    /// cannot call user-scoped endpoints).
    #[error("Token has no user context")]
    NoUserContext,

    /// A compare-and-swap update lost against a concurrent writer.
    #[error("Concurrent modification of user record")]
    ConcurrentModification,

    /// An error occurred while storing or retrieving auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedGrantType` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Internal { .. })
    }

    /// Returns `true` if this failure must stay indistinguishable from
    /// its siblings (absent vs. expired, wrong password vs. unknown user).
    #[must_use]
    pub fn is_enumeration_safe(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::InvalidOrExpiredCode
                | Self::InvalidOrExpiredToken
                | Self::InvalidOrExpiredSession
        )
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCredentials
            | Self::InvalidPassword
            | Self::AccountDisabled
            | Self::UserNotFound => ErrorCategory::Authentication,
            Self::Revoked | Self::InvalidToken { .. } | Self::InvalidOrExpiredToken => {
                ErrorCategory::Token
            }
            Self::InvalidCode
            | Self::InvalidRecoveryCode
            | Self::AlreadyEnabled
            | Self::NotEnabled
            | Self::InvalidOrExpiredSession => ErrorCategory::TwoFactor,
            Self::InvalidClient { .. }
            | Self::InvalidRedirectUri
            | Self::ClientMismatch
            | Self::RedirectUriMismatch
            | Self::UnsupportedGrantType { .. }
            | Self::MissingCode
            | Self::MissingToken
            | Self::NoUserContext
            | Self::InvalidOrExpiredCode => ErrorCategory::OAuth,
            Self::ConcurrentModification | Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    ///
    /// Only meaningful for failures surfaced by the embedded OAuth server;
    /// other failures map to the generic codes.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidClient { .. } => "invalid_client",
            Self::InvalidOrExpiredCode
            | Self::ClientMismatch
            | Self::RedirectUriMismatch
            | Self::InvalidRedirectUri => "invalid_grant",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::MissingCode => "invalid_request",
            Self::MissingToken | Self::InvalidOrExpiredToken | Self::InvalidToken { .. } => {
                "invalid_token"
            }
            Self::NoUserContext => "access_denied",
            Self::Storage { .. } | Self::Internal { .. } => "server_error",
            _ => "invalid_request",
        }
    }
}

/// Categories of authentication/authorization errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credential verification failures.
    Authentication,
    /// Session-token failures (validation, revocation).
    Token,
    /// Two-factor enrollment and verification failures.
    TwoFactor,
    /// Embedded OAuth server failures.
    OAuth,
    /// Storage and concurrency failures.
    Infrastructure,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Token => write!(f, "token"),
            Self::TwoFactor => write!(f, "two_factor"),
            Self::OAuth => write!(f, "oauth"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
