//! Credential store trait and diagnostic types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use keystone_core::result::AppResult;
use keystone_entity::user::{CreateUser, User};

/// Result of a store connectivity probe.
///
/// Used only for operational health reporting, never for authorization
/// decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorePing {
    /// Whether the store answered the probe.
    pub reachable: bool,
    /// Total persisted users.
    pub user_count: u64,
    /// Store identifier (database name or provider label).
    pub identifier: String,
}

/// Persistence operations for user credentials.
///
/// Username and email comparisons are case-insensitive in every provider.
/// The uniqueness checks and the lookups must agree on the same
/// normalization, or a user could register with colliding credentials via
/// case variation.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user by username (case-insensitive).
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Whether any user already holds this username (case-insensitive).
    async fn username_exists(&self, username: &str) -> AppResult<bool>;

    /// Whether any user already holds this email (case-insensitive).
    async fn email_exists(&self, email: &str) -> AppResult<bool>;

    /// Create a new user and return the persisted row.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Overwrite the refresh slot unconditionally (login/register path).
    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Replace the refresh slot only if it still holds `previous`.
    ///
    /// Returns `false` when the slot no longer matches, meaning a
    /// concurrent rotation won the race. Exactly one of two concurrent
    /// rotations presenting the same token succeeds.
    async fn rotate_refresh_token(
        &self,
        user_id: Uuid,
        previous: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Clear the refresh slot and its expiry.
    async fn clear_refresh_token(&self, user_id: Uuid) -> AppResult<()>;

    /// List every user, newest first.
    async fn list_all(&self) -> AppResult<Vec<User>>;

    /// Count total users.
    async fn count(&self) -> AppResult<u64>;

    /// Live connectivity probe with a row count and store identifier.
    async fn ping(&self) -> AppResult<StorePing>;
}
