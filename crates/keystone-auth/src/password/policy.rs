//! Password complexity policy.

use keystone_core::config::auth::AuthConfig;

/// Enforces the registration password policy: minimum length plus at
/// least one uppercase letter, one lowercase letter, one digit, and one
/// symbol.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl PasswordPolicy {
    /// Create a policy from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Check a candidate password against every rule.
    ///
    /// Returns one entry per violated rule, empty when the password is
    /// acceptable.
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut violations = Vec::new();

        if password.chars().count() < self.min_length {
            violations.push(format!(
                "Password must be at least {} characters",
                self.min_length
            ));
        }
        if !password.chars().any(|c| c.is_uppercase()) {
            violations.push("Password must contain at least one uppercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_lowercase()) {
            violations.push("Password must contain at least one lowercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push("Password must contain at least one digit".to_string());
        }
        if !password.chars().any(|c| !c.is_alphanumeric()) {
            violations.push("Password must contain at least one special character".to_string());
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PasswordPolicy {
        PasswordPolicy { min_length: 6 }
    }

    #[test]
    fn test_acceptable_password() {
        assert!(policy().violations("Abc123!@").is_empty());
    }

    #[test]
    fn test_each_rule_reported_separately() {
        // Too short, no uppercase, no digit, no symbol: four violations.
        let violations = policy().violations("abc");
        assert_eq!(violations.len(), 4);
        assert!(violations.iter().any(|v| v.contains("uppercase")));
        assert!(violations.iter().any(|v| v.contains("digit")));
        assert!(violations.iter().any(|v| v.contains("special")));
    }

    #[test]
    fn test_missing_lowercase() {
        let violations = policy().violations("ABC123!@");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("lowercase"));
    }
}
