//! Bearer token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use thiserror::Error;

use keystone_core::config::auth::AuthConfig;
use keystone_core::error::AppError;

use super::claims::Claims;

/// Why a bearer token failed validation.
///
/// `Expired` is deliberately distinct from `InvalidSignature`: the refresh
/// flow accepts expired tokens but must never accept forged ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The embedded expiry has passed.
    #[error("token has expired")]
    Expired,
    /// Signature mismatch or unexpected signing algorithm.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// Structurally invalid, or a claim failed validation.
    #[error("token is malformed")]
    Malformed,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            _ => Self::Malformed,
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::authentication(err.to_string())
    }
}

/// Validates signed bearer tokens.
///
/// Stateless; safe to share across concurrent requests.
#[derive(Clone)]
pub struct TokenVerifier {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Full validation: signature, issuer, audience, expiry.
    validation: Validation,
    /// Same validation with the expiry check disabled.
    relaxed: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    /// Create a new verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.leeway = 5; // 5 seconds leeway for clock skew

        let mut relaxed = validation.clone();
        relaxed.validate_exp = false;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            relaxed,
        }
    }

    /// Decode and fully validate a bearer token.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::from)
    }

    /// Decode with the expiry check relaxed.
    ///
    /// Used only by the refresh flow to recover the identity claim from an
    /// already-expired bearer token. Signature, structure, issuer, and
    /// audience are still enforced, so a forged token fails here exactly
    /// as it would in [`TokenVerifier::verify`].
    pub fn verify_ignoring_expiry(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.relaxed)
            .map(|data| data.claims)
            .map_err(TokenError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::issuer::TokenIssuer;
    use chrono::{Duration, Utc};
    use keystone_entity::user::{User, UserRole};
    use uuid::Uuid;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            issuer: "keystone-tests".to_string(),
            audience: "keystone-clients".to_string(),
            access_token_minutes: 60,
            refresh_token_days: 7,
            password_min_length: 6,
        }
    }

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Example".to_string(),
            roles: vec![UserRole::User.as_str().to_string()],
            refresh_token: None,
            refresh_token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_round_trip_preserves_identity_and_roles() {
        let config = config("secret-a");
        let issuer = TokenIssuer::new(&config);
        let verifier = TokenVerifier::new(&config);
        let user = user();

        let issued = issuer.issue(&user, Utc::now()).unwrap();
        let claims = verifier.verify(&issued.token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, user.username);
        assert_eq!(claims.roles, user.roles);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_expired_token_rejected_then_accepted_when_relaxed() {
        let config = config("secret-a");
        let issuer = TokenIssuer::new(&config);
        let verifier = TokenVerifier::new(&config);

        // Issued two hours in the past with a one-hour TTL.
        let issued = issuer.issue(&user(), Utc::now() - Duration::hours(2)).unwrap();

        assert_eq!(verifier.verify(&issued.token), Err(TokenError::Expired));
        assert!(verifier.verify_ignoring_expiry(&issued.token).is_ok());
    }

    #[test]
    fn test_forged_signature_rejected_even_when_relaxed() {
        let issuer = TokenIssuer::new(&config("attacker-secret"));
        let verifier = TokenVerifier::new(&config("secret-a"));

        let forged = issuer.issue(&user(), Utc::now()).unwrap();

        assert_eq!(
            verifier.verify(&forged.token),
            Err(TokenError::InvalidSignature)
        );
        assert_eq!(
            verifier.verify_ignoring_expiry(&forged.token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let verifier = TokenVerifier::new(&config("secret-a"));
        assert_eq!(
            verifier.verify_ignoring_expiry("not-a-token"),
            Err(TokenError::Malformed)
        );
    }
}
