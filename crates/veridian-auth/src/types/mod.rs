//! Common types used across the authentication and authorization modules.
//!
//! ## Domain Types
//!
//! - [`Client`] - OAuth 2.0 client registration
//! - [`GrantType`] - Supported OAuth grant types

pub mod client;

pub use client::{Client, ClientValidationError, GrantType};
