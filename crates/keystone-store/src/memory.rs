//! In-memory credential store backed by dashmap.
//!
//! Behaves identically to the PostgreSQL provider, including
//! case-insensitive matching and compare-and-swap rotation. Used by tests
//! and single-process deployments.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use async_trait::async_trait;
use keystone_core::error::AppError;
use keystone_core::result::AppResult;
use keystone_entity::user::{CreateUser, User};

use crate::store::{CredentialStore, StorePing};

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: DashMap<Uuid, User>,
    /// Serializes create: the uniqueness scan and the insert must not
    /// interleave with another create, or two case-variant registrations
    /// could both pass the scan.
    create_lock: tokio::sync::Mutex<()>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn find_where(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        self.users
            .iter()
            .find(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let needle = username.to_lowercase();
        Ok(self.find_where(|u| u.username.to_lowercase() == needle))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let needle = email.to_lowercase();
        Ok(self.find_where(|u| u.email.to_lowercase() == needle))
    }

    async fn username_exists(&self, username: &str) -> AppResult<bool> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        // Mirrors the unique constraints of the PostgreSQL schema. Held
        // until the insert lands so concurrent creates see each other.
        let _guard = self.create_lock.lock().await;

        if self.username_exists(&data.username).await? {
            return Err(AppError::conflict(format!(
                "Username '{}' already exists",
                data.username
            )));
        }
        if self.email_exists(&data.email).await? {
            return Err(AppError::conflict("Email already in use".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            roles: data.roles.clone(),
            refresh_token: None,
            refresh_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        user.refresh_token = Some(token.to_string());
        user.refresh_token_expires_at = Some(expires_at);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        user_id: Uuid,
        previous: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        // get_mut holds the shard write lock, making the compare-and-swap
        // atomic with respect to concurrent rotations.
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        if user.refresh_token.as_deref() != Some(previous) {
            return Ok(false);
        }
        user.refresh_token = Some(token.to_string());
        user.refresh_token_expires_at = Some(expires_at);
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn clear_refresh_token(&self, user_id: Uuid) -> AppResult<()> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        user.refresh_token = None;
        user.refresh_token_expires_at = None;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.users.len() as u64)
    }

    async fn ping(&self) -> AppResult<StorePing> {
        Ok(StorePing {
            reachable: true,
            user_count: self.users.len() as u64,
            identifier: "memory".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_data(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            roles: vec!["User".to_string()],
        }
    }

    #[tokio::test]
    async fn test_case_insensitive_lookup_and_uniqueness() {
        let store = MemoryCredentialStore::new();
        store.create(&create_data("Alice", "Alice@Example.com")).await.unwrap();

        assert!(store.username_exists("ALICE").await.unwrap());
        assert!(store.email_exists("alice@example.COM").await.unwrap());
        assert!(store.find_by_username("alice").await.unwrap().is_some());

        let err = store
            .create(&create_data("aLiCe", "other@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, keystone_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_rotate_is_compare_and_swap() {
        let store = MemoryCredentialStore::new();
        let user = store.create(&create_data("bob", "bob@example.com")).await.unwrap();
        let expires = Utc::now() + Duration::days(7);

        store
            .store_refresh_token(user.id, "first", expires)
            .await
            .unwrap();

        // First rotation on the live value wins.
        assert!(store
            .rotate_refresh_token(user.id, "first", "second", expires)
            .await
            .unwrap());
        // Second rotation presenting the already-consumed value loses.
        assert!(!store
            .rotate_refresh_token(user.id, "first", "third", expires)
            .await
            .unwrap());

        let stored = store.find_by_username("bob").await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_clear_refresh_token() {
        let store = MemoryCredentialStore::new();
        let user = store.create(&create_data("carol", "carol@example.com")).await.unwrap();
        store
            .store_refresh_token(user.id, "tok", Utc::now() + Duration::days(7))
            .await
            .unwrap();

        store.clear_refresh_token(user.id).await.unwrap();
        let stored = store.find_by_username("carol").await.unwrap().unwrap();
        assert!(stored.refresh_token.is_none());
        assert!(stored.refresh_token_expires_at.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_case_variant_creates_yield_one_user() {
        use std::sync::Arc;

        for _ in 0..100 {
            let store = Arc::new(MemoryCredentialStore::new());

            let first = tokio::spawn({
                let store = store.clone();
                async move { store.create(&create_data("alice", "alice@example.com")).await }
            });
            let second = tokio::spawn({
                let store = store.clone();
                async move { store.create(&create_data("ALICE", "other@example.com")).await }
            });

            let first = first.await.unwrap();
            let second = second.await.unwrap();

            // Exactly one of the two racing creates may win.
            assert_ne!(first.is_ok(), second.is_ok());
            assert_eq!(store.count().await.unwrap(), 1);
        }
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let store = MemoryCredentialStore::new();
        store.create(&create_data("first", "first@example.com")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.create(&create_data("second", "second@example.com")).await.unwrap();

        let users = store.list_all().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "second");
    }

    #[tokio::test]
    async fn test_ping_reports_count() {
        let store = MemoryCredentialStore::new();
        store.create(&create_data("dave", "dave@example.com")).await.unwrap();

        let ping = store.ping().await.unwrap();
        assert!(ping.reachable);
        assert_eq!(ping.user_count, 1);
        assert_eq!(ping.identifier, "memory");
    }
}
