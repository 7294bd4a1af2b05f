//! Request and response contracts for the auth service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use keystone_store::store::StorePing;

/// Uniform result contract for register, login, and refresh.
///
/// Expected failures are reported through `success`/`message`/`errors`
/// instead of an error type, so callers never branch on error kinds for
/// ordinary outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable outcome message.
    pub message: String,
    /// One entry per violated rule; empty on success and on generic
    /// authentication failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Issued bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Issued refresh token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute expiry of the bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthResult {
    /// Successful outcome carrying a fresh token pair.
    pub fn granted(
        message: impl Into<String>,
        token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: Vec::new(),
            token: Some(token),
            refresh_token: Some(refresh_token),
            expires_at: Some(expires_at),
        }
    }

    /// Failed outcome with a message only.
    pub fn denied(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: Vec::new(),
            token: None,
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Failed outcome with a message and per-rule error entries.
    pub fn denied_with_errors(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            errors,
            ..Self::denied(message)
        }
    }
}

/// Registration request.
///
/// Password complexity is enforced separately by
/// [`crate::password::PasswordPolicy`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username.
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username must be between 3 and 50 characters"
    ))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Must equal `password`.
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    /// Given name. Blankness is rejected before validation runs.
    #[validate(length(max = 50, message = "First name must not exceed 50 characters"))]
    pub first_name: String,
    /// Family name. Blankness is rejected before validation runs.
    #[validate(length(max = 50, message = "Last name must not exceed 50 characters"))]
    pub last_name: String,
}

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username (matched case-insensitively).
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Token refresh request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The (possibly expired) bearer token.
    pub token: String,
    /// The opaque refresh token issued alongside it.
    pub refresh_token: String,
}

/// Administrative diagnostics snapshot.
///
/// Reports structural presence of the signing configuration and a live
/// store probe. Operational only; never consulted for authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Signing key, issuer, and audience are all present (values are
    /// never exposed).
    pub jwt_configured: bool,
    /// Store connectivity probe.
    pub store: StorePing,
}
