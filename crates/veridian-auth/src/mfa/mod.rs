//! Two-factor authentication.
//!
//! This module provides:
//!
//! - [`totp`] - RFC 6238 time-based one-time passwords
//! - [`recovery`] - single-use backup codes
//! - [`service`] - enrollment state machine and pending-login handling

pub mod recovery;
pub mod service;
pub mod totp;

pub use recovery::RecoveryCodeService;
pub use service::{PendingLogin, TwoFactorEnrollment, TwoFactorService};
pub use totp::{TotpEnrollment, TotpService};
