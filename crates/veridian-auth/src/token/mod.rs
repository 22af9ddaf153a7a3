//! Session token issuance, validation, and revocation.
//!
//! This module provides:
//!
//! - Signed access/refresh token pairs with kind discriminators
//! - Rotation-on-use refresh
//! - Revocation through an expiry-bounded blacklist

pub mod blacklist;
pub mod service;

pub use blacklist::TokenBlacklist;
pub use service::{SessionClaims, TokenKind, TokenPair, TokenService};
