//! # veridian-auth
//!
//! Credential and authorization-token lifecycle engine for the Veridian
//! account platform.
//!
//! This crate provides:
//! - Signed session token pairs with rotation-on-use refresh and
//!   blacklist-backed revocation
//! - Two-factor authentication (TOTP enrollment, recovery codes, and the
//!   pending-login state machine)
//! - Login orchestration with enumeration-safe failures
//! - An embedded OAuth 2.0 authorization server (client registry,
//!   authorization-code and client-credentials grants, userinfo)
//!
//! ## Overview
//!
//! Every ephemeral artifact (revocation entries, pending logins, OAuth
//! clients, codes, and tokens) lives behind one [`storage::ExpiringStore`]
//! contract; expiry is additionally enforced lazily at read time, so
//! correctness never depends on store eviction timing. External
//! collaborators (user store, audit sink, clock) are narrow traits
//! injected into the services.
//!
//! ## Modules
//!
//! - [`config`] - engine configuration
//! - [`error`] - error taxonomy
//! - [`token`] - session token service and revocation blacklist
//! - [`mfa`] - TOTP, recovery codes, and the two-factor state machine
//! - [`login`] - login/logout orchestration
//! - [`oauth`] - embedded OAuth 2.0 authorization server
//! - [`storage`] - storage traits for auth-related data
//! - [`audit`] - security event audit contract
//! - [`clock`] - injectable time source
//! - [`http`] - Axum HTTP handlers for the exposed surface

pub mod audit;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod login;
pub mod mfa;
pub mod oauth;
pub mod storage;
pub mod token;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

pub use audit::{AuditOutcome, AuditSink, TracingAuditSink};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuthConfig, ConfigError, OAuthConfig, TokenConfig, TwoFactorConfig};
pub use error::{AuthError, ErrorCategory};
pub use http::{AppState, router};
pub use login::{Credentials, LoginOutcome, LoginService};
pub use mfa::{
    PendingLogin, RecoveryCodeService, TotpEnrollment, TotpService, TwoFactorEnrollment,
    TwoFactorService,
};
pub use oauth::{
    AccessTokenRecord, AuthorizationCode, OAuthService, RegisterClientRequest, TokenRequest,
    TokenResponse, UserInfoResponse,
};
pub use storage::{ExpiringStore, MfaSettings, User, UserBuilder, UserStorage};
pub use token::{SessionClaims, TokenBlacklist, TokenKind, TokenPair, TokenService};
pub use types::{Client, ClientValidationError, GrantType};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use veridian_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::audit::{AuditOutcome, AuditSink, TracingAuditSink};
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::{AuthConfig, ConfigError};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::login::{Credentials, LoginOutcome, LoginService};
    pub use crate::mfa::{RecoveryCodeService, TotpService, TwoFactorService};
    pub use crate::oauth::{OAuthService, RegisterClientRequest};
    pub use crate::storage::{ExpiringStore, MfaSettings, User, UserStorage};
    pub use crate::token::{TokenPair, TokenService};
    pub use crate::types::{Client, GrantType};
}
