//! User role labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles recognized by the credential subsystem.
///
/// Stored on the user as string labels so the set can grow without a
/// schema change. Every account carries at least [`UserRole::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    /// Administrative access, including diagnostics.
    Admin,
    /// Default role assigned at registration.
    User,
}

impl UserRole {
    /// Return the role as its stored label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = keystone_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(keystone_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: Admin, User"
            ))),
        }
    }
}
