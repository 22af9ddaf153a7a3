//! Time-based one-time passwords (RFC 6238).
//!
//! Generates enrollment secrets and verifies codes from authenticator
//! apps. SHA-1 HMAC, 6 digits, and a 30-second step are the defaults for
//! interoperability with the common authenticator apps; verification
//! accepts a configurable drift window (±1 step by default).
//!
//! The service is stateless: secrets live on the user record, codes are
//! derived from (secret, clock) on demand.

use std::sync::Arc;
use std::time::Duration;

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::AuthResult;
use crate::clock::Clock;
use crate::config::TwoFactorConfig;
use crate::error::AuthError;

type HmacSha1 = Hmac<Sha1>;

const SECRET_LENGTH: usize = 20;

/// Fresh enrollment material for one user.
#[derive(Debug, Clone)]
pub struct TotpEnrollment {
    /// Base32-encoded shared secret.
    pub secret: String,

    /// `otpauth://` URI for provisioning authenticator apps.
    pub provisioning_uri: String,
}

/// Generates and verifies time-based one-time codes.
pub struct TotpService {
    issuer: String,
    step: Duration,
    digits: u32,
    skew: u64,
    clock: Arc<dyn Clock>,
}

impl TotpService {
    /// Creates a new TOTP service.
    #[must_use]
    pub fn new(issuer: impl Into<String>, config: &TwoFactorConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            issuer: issuer.into(),
            step: config.totp_step,
            digits: config.totp_digits,
            skew: config.totp_skew,
            clock,
        }
    }

    /// Generates a fresh random secret and its provisioning URI.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the provisioning URI cannot be built.
    pub fn generate_secret(&self, label: &str) -> AuthResult<TotpEnrollment> {
        let mut bytes = [0u8; SECRET_LENGTH];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes[..]);
        let secret = base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &bytes);

        let provisioning_uri = self.provisioning_uri(label, &secret)?;
        Ok(TotpEnrollment {
            secret,
            provisioning_uri,
        })
    }

    /// Builds the `otpauth://totp/` URI for a secret.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the issuer/label combination does not parse
    /// into a valid URI.
    pub fn provisioning_uri(&self, label: &str, secret: &str) -> AuthResult<String> {
        let mut url = url::Url::parse(&format!("otpauth://totp/{}:{}", self.issuer, label))
            .map_err(|err| AuthError::internal(format!("invalid provisioning label: {err}")))?;

        url.query_pairs_mut()
            .append_pair("secret", secret)
            .append_pair("issuer", &self.issuer)
            .append_pair("algorithm", "SHA1")
            .append_pair("digits", &self.digits.to_string())
            .append_pair("period", &self.step.as_secs().to_string());

        Ok(url.to_string())
    }

    /// Returns the code for the current time step.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the secret is not valid base32.
    pub fn generate_code(&self, secret: &str) -> AuthResult<String> {
        let key = decode_secret(secret)
            .ok_or_else(|| AuthError::internal("stored TOTP secret is not valid base32"))?;
        Ok(self.code_at(&key, self.current_step()))
    }

    /// Verifies a code against the secret within the drift window.
    ///
    /// Never fails on malformed input: an undecodable secret or a code
    /// that is not exactly the configured number of digits simply does
    /// not verify.
    #[must_use]
    pub fn verify(&self, secret: &str, code: &str) -> bool {
        let code = code.trim();
        if code.len() != self.digits as usize || !code.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }

        let Some(key) = decode_secret(secret) else {
            return false;
        };

        let current = self.current_step();
        let skew = self.skew as i64;
        (-skew..=skew).any(|offset| {
            let step = current + offset;
            step >= 0 && self.code_at(&key, step) == code
        })
    }

    fn current_step(&self) -> i64 {
        let now = self.clock.now().unix_timestamp();
        now.div_euclid(self.step.as_secs() as i64)
    }

    fn code_at(&self, key: &[u8], step: i64) -> String {
        let counter = (step.max(0) as u64).to_be_bytes();

        let mut mac =
            HmacSha1::new_from_slice(key).expect("HMAC-SHA1 accepts keys of any length");
        mac.update(&counter);
        let digest = mac.finalize().into_bytes();

        // Dynamic truncation per RFC 4226 §5.3.
        let offset = (digest[digest.len() - 1] & 0x0f) as usize;
        let binary = (u32::from(digest[offset] & 0x7f) << 24)
            | (u32::from(digest[offset + 1]) << 16)
            | (u32::from(digest[offset + 2]) << 8)
            | u32::from(digest[offset + 3]);

        let code = binary % 10u32.pow(self.digits);
        format!("{code:0width$}", width = self.digits as usize)
    }
}

fn decode_secret(secret: &str) -> Option<Vec<u8>> {
    let normalized = secret.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return None;
    }
    base32::decode(base32::Alphabet::Rfc4648 { padding: false }, &normalized)
}
