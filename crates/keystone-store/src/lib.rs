//! # keystone-store
//!
//! Credential persistence for Keystone: the [`CredentialStore`] trait,
//! a PostgreSQL provider, an in-memory provider, and connection pool
//! management.

pub mod connection;
pub mod memory;
pub mod postgres;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;
pub use store::{CredentialStore, StorePing};
