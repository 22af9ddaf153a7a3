//! Engine configuration.
//!
//! Configuration for session tokens, two-factor authentication, and the
//! embedded OAuth authorization server. Defaults carry the production
//! lifetimes; every section can be overridden from TOML/JSON config.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! issuer = "https://accounts.example.com"
//!
//! [auth.tokens]
//! access_token_lifetime = "15m"
//! refresh_token_lifetime = "7d"
//!
//! [auth.oauth]
//! authorization_code_lifetime = "10m"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the credential engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Issuer name, shown in authenticator apps and used as the token
    /// `iss`-equivalent label in provisioning URIs.
    pub issuer: String,

    /// HMAC signing key for session tokens. Must be at least 32 bytes.
    /// The key never leaves the token service.
    pub signing_key: String,

    /// Session token configuration.
    pub tokens: TokenConfig,

    /// Two-factor authentication configuration.
    pub two_factor: TwoFactorConfig,

    /// Embedded OAuth authorization server configuration.
    pub oauth: OAuthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "veridian".to_string(),
            signing_key: String::new(),
            tokens: TokenConfig::default(),
            two_factor: TwoFactorConfig::default(),
            oauth: OAuthConfig::default(),
        }
    }
}

/// Session token lifetimes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::from_secs(900), // 15 minutes
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 3600), // 7 days
        }
    }
}

/// Two-factor authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TwoFactorConfig {
    /// Lifetime of a pending login awaiting the second factor.
    #[serde(with = "humantime_serde")]
    pub pending_login_lifetime: Duration,

    /// Number of recovery codes generated per enrollment.
    pub recovery_code_count: usize,

    /// TOTP time step.
    #[serde(with = "humantime_serde")]
    pub totp_step: Duration,

    /// Number of TOTP digits.
    pub totp_digits: u32,

    /// Accepted clock-drift window, in time steps on each side.
    pub totp_skew: u64,
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self {
            pending_login_lifetime: Duration::from_secs(300), // 5 minutes
            recovery_code_count: 10,
            totp_step: Duration::from_secs(30),
            totp_digits: 6,
            totp_skew: 1,
        }
    }
}

/// Embedded OAuth authorization server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime. Codes are short-lived and single-use.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime for the embedded server's opaque tokens.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Client registration record lifetime. Client records live in the
    /// same expiring store as the ephemeral artifacts; this keeps them
    /// durable-enough without a second storage abstraction.
    #[serde(with = "humantime_serde")]
    pub client_record_lifetime: Duration,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(600), // 10 minutes
            access_token_lifetime: Duration::from_secs(3600),      // 1 hour
            client_record_lifetime: Duration::from_secs(365 * 24 * 3600), // 1 year
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The issuer is empty
    /// - The signing key is missing or shorter than 32 bytes
    /// - Any lifetime is zero
    /// - TOTP digits are outside 6..=8
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.is_empty() {
            return Err(ConfigError::InvalidValue(
                "issuer cannot be empty".to_string(),
            ));
        }

        if self.signing_key.is_empty() {
            return Err(ConfigError::Missing("signing_key".to_string()));
        }
        if self.signing_key.len() < 32 {
            return Err(ConfigError::InvalidValue(
                "signing_key must be at least 32 bytes".to_string(),
            ));
        }

        for (name, lifetime) in [
            ("access_token_lifetime", self.tokens.access_token_lifetime),
            ("refresh_token_lifetime", self.tokens.refresh_token_lifetime),
            (
                "pending_login_lifetime",
                self.two_factor.pending_login_lifetime,
            ),
            (
                "authorization_code_lifetime",
                self.oauth.authorization_code_lifetime,
            ),
            (
                "oauth access_token_lifetime",
                self.oauth.access_token_lifetime,
            ),
            ("client_record_lifetime", self.oauth.client_record_lifetime),
        ] {
            if lifetime.is_zero() {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must be > 0"
                )));
            }
        }

        if self.tokens.refresh_token_lifetime <= self.tokens.access_token_lifetime {
            return Err(ConfigError::InvalidValue(
                "refresh_token_lifetime must exceed access_token_lifetime".to_string(),
            ));
        }

        if !(6..=8).contains(&self.two_factor.totp_digits) {
            return Err(ConfigError::InvalidValue(format!(
                "totp_digits must be between 6 and 8, got {}",
                self.two_factor.totp_digits
            )));
        }

        if self.two_factor.totp_step.is_zero() {
            return Err(ConfigError::InvalidValue(
                "totp_step must be > 0".to_string(),
            ));
        }

        if self.two_factor.recovery_code_count == 0 {
            return Err(ConfigError::InvalidValue(
                "recovery_code_count must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AuthConfig {
        AuthConfig {
            signing_key: "0123456789abcdef0123456789abcdef".to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_default_lifetimes() {
        let config = AuthConfig::default();
        assert_eq!(config.tokens.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(
            config.tokens.refresh_token_lifetime,
            Duration::from_secs(604_800)
        );
        assert_eq!(
            config.two_factor.pending_login_lifetime,
            Duration::from_secs(300)
        );
        assert_eq!(
            config.oauth.authorization_code_lifetime,
            Duration::from_secs(600)
        );
        assert_eq!(config.oauth.access_token_lifetime, Duration::from_secs(3600));
        assert_eq!(config.two_factor.recovery_code_count, 10);
    }

    #[test]
    fn test_valid_config_validates() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_signing_key_fails() {
        let config = AuthConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_short_signing_key_fails() {
        let mut config = valid_config();
        config.signing_key = "too-short".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("32 bytes"));
    }

    #[test]
    fn test_zero_lifetime_fails() {
        let mut config = valid_config();
        config.two_factor.pending_login_lifetime = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pending_login_lifetime"));
    }

    #[test]
    fn test_refresh_must_outlive_access() {
        let mut config = valid_config();
        config.tokens.refresh_token_lifetime = Duration::from_secs(60);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("refresh_token_lifetime"));
    }

    #[test]
    fn test_invalid_totp_digits_fails() {
        let mut config = valid_config();
        config.two_factor.totp_digits = 4;
        assert!(config.validate().is_err());

        config.two_factor.totp_digits = 8;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = valid_config();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AuthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.issuer, parsed.issuer);
        assert_eq!(
            config.tokens.access_token_lifetime,
            parsed.tokens.access_token_lifetime
        );
        assert_eq!(
            config.two_factor.recovery_code_count,
            parsed.two_factor.recovery_code_count
        );
    }
}
