//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Authentication and token lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256). Required.
    #[serde(default)]
    pub jwt_secret: String,
    /// Issuer claim embedded in and required of every bearer token. Required.
    #[serde(default)]
    pub issuer: String,
    /// Audience claim embedded in and required of every bearer token. Required.
    #[serde(default)]
    pub audience: String,
    /// Bearer token TTL in minutes.
    #[serde(default = "default_access_minutes")]
    pub access_token_minutes: i64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_days")]
    pub refresh_token_days: i64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl AuthConfig {
    /// Structural presence check for the token-signing configuration.
    ///
    /// Reports whether the signing key, issuer, and audience are all
    /// non-empty without exposing their values. Used by diagnostics.
    pub fn is_fully_configured(&self) -> bool {
        !self.jwt_secret.trim().is_empty()
            && !self.issuer.trim().is_empty()
            && !self.audience.trim().is_empty()
    }

    /// Validate the section at startup.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.is_fully_configured() {
            return Err(AppError::configuration(
                "auth.jwt_secret, auth.issuer, and auth.audience must all be set",
            ));
        }
        if self.access_token_minutes <= 0 {
            return Err(AppError::configuration(
                "auth.access_token_minutes must be positive",
            ));
        }
        if self.refresh_token_days <= 0 {
            return Err(AppError::configuration(
                "auth.refresh_token_days must be positive",
            ));
        }
        Ok(())
    }
}

fn default_access_minutes() -> i64 {
    60
}

fn default_refresh_days() -> i64 {
    7
}

fn default_password_min() -> usize {
    6
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AuthConfig {
        AuthConfig {
            jwt_secret: "secret".to_string(),
            issuer: "keystone".to_string(),
            audience: "keystone-clients".to_string(),
            access_token_minutes: default_access_minutes(),
            refresh_token_days: default_refresh_days(),
            password_min_length: default_password_min(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid().validate().is_ok());
        assert!(valid().is_fully_configured());
    }

    #[test]
    fn test_missing_signing_material_is_fatal() {
        for blank_field in ["jwt_secret", "issuer", "audience"] {
            let mut config = valid();
            match blank_field {
                "jwt_secret" => config.jwt_secret = "  ".to_string(),
                "issuer" => config.issuer = String::new(),
                _ => config.audience = String::new(),
            }
            assert!(!config.is_fully_configured());
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let mut config = valid();
        config.access_token_minutes = 0;
        assert!(config.validate().is_err());
    }
}
