//! Embedded OAuth 2.0 authorization server.
//!
//! An independent OAuth2 provider for third-party integrations: client
//! registration, the authorize step, the token endpoint, and a
//! scope-gated userinfo endpoint. It mints its own opaque bearer tokens
//! and does not depend on the session-token service.
//!
//! # Grant lifecycle
//!
//! `Authorized (code issued) → Redeemed (access token issued)`; a code
//! that is never redeemed simply expires.
//!
//! # Supported grants
//!
//! - `authorization_code` (no PKCE)
//! - `client_credentials`
//!
//! Anything else fails with `UnsupportedGrantType`.

pub mod code;
pub mod service;
pub mod token;
pub mod userinfo;

pub use code::AuthorizationCode;
pub use service::{OAuthService, RegisterClientRequest};
pub use token::{AccessTokenRecord, TokenRequest, TokenResponse};
pub use userinfo::UserInfoResponse;
