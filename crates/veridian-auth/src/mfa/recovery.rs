//! Single-use recovery codes.
//!
//! Backup credentials for users whose authenticator device is
//! unavailable. Codes use the format `XXXX-XXXX` (uppercase hex
//! alphabet, 8 significant characters) for compactness and manual
//! transcription. Only one-way hashes are stored; the plaintext is shown
//! to the user exactly once, at generation time.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::AuthResult;
use crate::error::AuthError;

/// Number of codes generated per enrollment by default.
pub const DEFAULT_CODE_COUNT: usize = 10;

const GROUP_LENGTH: usize = 4;

/// Generates, hashes, verifies, and consumes recovery codes.
#[derive(Debug, Clone)]
pub struct RecoveryCodeService {
    count: usize,
}

impl Default for RecoveryCodeService {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_COUNT)
    }
}

impl RecoveryCodeService {
    /// Creates a service generating `count` codes per batch.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    /// Generates a fresh batch of plaintext codes.
    #[must_use]
    pub fn generate(&self) -> Vec<String> {
        (0..self.count).map(|_| Self::generate_code()).collect()
    }

    fn generate_code() -> String {
        let mut bytes = [0u8; GROUP_LENGTH];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes[..]);
        let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
        format!("{}-{}", &hex[..GROUP_LENGTH], &hex[GROUP_LENGTH..])
    }

    /// Hashes a batch of codes with independent salts.
    ///
    /// Codes are normalized before hashing so user input can be matched
    /// regardless of dashes and case.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if hashing fails or a code is malformed.
    pub fn hash(&self, codes: &[String]) -> AuthResult<Vec<String>> {
        codes
            .iter()
            .map(|code| {
                let normalized = normalize(code).ok_or_else(|| {
                    AuthError::internal("recovery code does not match the canonical format")
                })?;
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(normalized.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|err| AuthError::internal(format!("recovery code hashing failed: {err}")))
            })
            .collect()
    }

    /// Finds the index of the first hash matching the candidate.
    ///
    /// The candidate is normalized (dashes stripped, uppercased,
    /// canonical dash re-inserted) before comparison. Linear over the
    /// remaining codes, which is fine for batches of ten.
    #[must_use]
    pub fn verify(&self, hashed_codes: &[String], candidate: &str) -> Option<usize> {
        let normalized = normalize(candidate)?;

        hashed_codes.iter().position(|stored| {
            PasswordHash::new(stored).is_ok_and(|hash| {
                Argon2::default()
                    .verify_password(normalized.as_bytes(), &hash)
                    .is_ok()
            })
        })
    }

    /// Removes the code at `index`, returning the remaining hashes.
    ///
    /// An out-of-range index returns the input unchanged; `verify` gates
    /// real callers, so that path is not expected to occur.
    #[must_use]
    pub fn consume(&self, mut hashed_codes: Vec<String>, index: usize) -> Vec<String> {
        if index < hashed_codes.len() {
            hashed_codes.remove(index);
        }
        hashed_codes
    }
}

/// Normalizes a candidate into the canonical `XXXX-XXXX` form.
///
/// Returns `None` if the stripped input is not exactly 8 alphanumeric
/// characters.
fn normalize(candidate: &str) -> Option<String> {
    let stripped: String = candidate
        .trim()
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if stripped.len() != GROUP_LENGTH * 2 || !stripped.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    Some(format!(
        "{}-{}",
        &stripped[..GROUP_LENGTH],
        &stripped[GROUP_LENGTH..]
    ))
}
