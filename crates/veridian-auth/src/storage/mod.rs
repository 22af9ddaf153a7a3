//! Storage traits for credential and authorization data.
//!
//! This module defines the storage interfaces the engine depends on:
//!
//! - [`ExpiringStore`] - key/value store with per-key TTL, backing every
//!   ephemeral artifact (blacklist entries, pending logins, OAuth
//!   clients/codes/tokens)
//! - [`UserStorage`] - the user record collaborator contract
//!
//! # Implementations
//!
//! Store implementations are provided in separate crates:
//!
//! - `veridian-store-memory` - single-node in-memory backend

pub mod expiring;
pub mod user;

pub use expiring::ExpiringStore;
pub use user::{MfaSettings, User, UserBuilder, UserStorage};
