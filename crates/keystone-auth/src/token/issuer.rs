//! Bearer token issuance and refresh-token generation.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand::RngCore;

use keystone_core::config::auth::AuthConfig;
use keystone_core::error::AppError;
use keystone_core::result::AppResult;
use keystone_entity::user::User;

use super::claims::Claims;

/// Number of random bytes behind each opaque refresh token.
const REFRESH_TOKEN_BYTES: usize = 64;

/// Signs bearer tokens and generates opaque refresh tokens.
///
/// Stateless; safe to share across concurrent requests.
#[derive(Clone)]
pub struct TokenIssuer {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Issuer claim.
    issuer: String,
    /// Audience claim.
    audience: String,
    /// Bearer token TTL in minutes.
    access_ttl_minutes: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

/// A signed bearer token together with its absolute expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The signed token string.
    pub token: String,
    /// Absolute expiry embedded in the `exp` claim.
    pub expires_at: DateTime<Utc>,
}

impl TokenIssuer {
    /// Create a new issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl_minutes: config.access_token_minutes,
        }
    }

    /// Issue a signed bearer token for `user`, valid from `now`.
    ///
    /// Once issued, the token stays valid until its embedded expiry; there
    /// is no server-side revocation list for bearer tokens. Keep the TTL
    /// short and pair it with the server-tracked refresh slot.
    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> AppResult<IssuedToken> {
        let expires_at = now + chrono::Duration::minutes(self.access_ttl_minutes);

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            roles: user.roles.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign bearer token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Generate an opaque, cryptographically random refresh token.
    ///
    /// Independent of any bearer token's content; the store-side slot is
    /// the only record of its validity.
    pub fn generate_refresh_token(&self) -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        STANDARD.encode(bytes)
    }
}
