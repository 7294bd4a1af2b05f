//! # keystone-auth
//!
//! Credential and token lifecycle for Keystone: password hashing and
//! complexity policy, signed bearer tokens, single-slot refresh-token
//! rotation, and the [`AuthService`] orchestrator.
//!
//! ## Modules
//!
//! - `password` — Argon2id password hashing and complexity policy
//! - `token` — bearer token signing/validation and opaque refresh tokens
//! - `contract` — request/response contracts (`AuthResult`)
//! - `service` — the orchestrator tying store, hasher, and signer together

pub mod contract;
pub mod password;
pub mod service;
pub mod token;

pub use contract::{AuthResult, Diagnostics, LoginRequest, RefreshRequest, RegisterRequest};
pub use password::{PasswordHasher, PasswordPolicy};
pub use service::AuthService;
pub use token::{Claims, TokenError, TokenIssuer, TokenVerifier};
