//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered account in the Keystone credential store.
///
/// Username and email uniqueness is case-insensitive; the store enforces
/// it at write time and all lookups use the same normalization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Stable unique identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 password hash. Never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Role labels. Non-empty; every account carries at least "User".
    pub roles: Vec<String>,
    /// Single-slot refresh token. At most one live value per user;
    /// issuing a new one invalidates the previous one.
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    /// Absolute expiry of the refresh slot. Meaningful only while
    /// `refresh_token` is set.
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the stored refresh token is present and unexpired at `now`.
    ///
    /// An expired or absent slot is treated as "no valid refresh token".
    pub fn has_valid_refresh_token(&self, now: DateTime<Utc>) -> bool {
        match (&self.refresh_token, self.refresh_token_expires_at) {
            (Some(_), Some(expires_at)) => now < expires_at,
            _ => false,
        }
    }

    /// Whether `presented` matches the stored slot exactly and the slot
    /// has not expired.
    pub fn refresh_token_matches(&self, presented: &str, now: DateTime<Utc>) -> bool {
        self.has_valid_refresh_token(now) && self.refresh_token.as_deref() == Some(presented)
    }

    /// Check membership in a role.
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.iter().any(|r| r == role.as_str())
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Assigned role labels.
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user_with_slot(token: Option<&str>, expires_in: Option<Duration>) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Example".to_string(),
            roles: vec![UserRole::User.as_str().to_string()],
            refresh_token: token.map(str::to_string),
            refresh_token_expires_at: expires_in.map(|d| now + d),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_live_slot_is_valid() {
        let user = user_with_slot(Some("tok"), Some(Duration::days(7)));
        assert!(user.has_valid_refresh_token(Utc::now()));
        assert!(user.refresh_token_matches("tok", Utc::now()));
        assert!(!user.refresh_token_matches("other", Utc::now()));
    }

    #[test]
    fn test_expired_slot_is_not_valid() {
        let user = user_with_slot(Some("tok"), Some(Duration::days(-1)));
        assert!(!user.has_valid_refresh_token(Utc::now()));
        assert!(!user.refresh_token_matches("tok", Utc::now()));
    }

    #[test]
    fn test_absent_slot_is_not_valid() {
        let user = user_with_slot(None, None);
        assert!(!user.has_valid_refresh_token(Utc::now()));
    }

    #[test]
    fn test_has_role() {
        let user = user_with_slot(None, None);
        assert!(user.has_role(UserRole::User));
        assert!(!user.has_role(UserRole::Admin));
    }
}
