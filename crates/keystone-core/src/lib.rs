//! # keystone-core
//!
//! Core crate for Keystone. Contains configuration schemas, the unified
//! error system, the logging bootstrap, and trait seams shared by every
//! other crate.
//!
//! This crate has **no** internal dependencies on other Keystone crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
