//! Authorization codes.
//!
//! Single-use, short-lived codes binding a user's authorization to one
//! client and redirect URI. Codes are deleted on redemption; expiry is
//! additionally checked against the embedded `expires_at` on every read.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An issued authorization code awaiting redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// The code value (256-bit random, base64url-encoded).
    pub code: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Redirect URI used at authorization time. The token request must
    /// present the same value if it presents one at all.
    pub redirect_uri: String,

    /// The authorizing user.
    pub user_id: String,

    /// Granted scopes (already narrowed to the client's allowed set).
    pub scopes: Vec<String>,

    /// Hard expiry, checked on every read.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AuthorizationCode {
    /// Generates a new cryptographically random code value.
    ///
    /// 32 bytes of entropy, base64url-encoded without padding
    /// (43 characters).
    #[must_use]
    pub fn generate_code() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes[..]);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Returns `true` if the code has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}
