//! Auth orchestrator: register, login, refresh, revoke, diagnostics.
//!
//! The single point where validation, authentication, and infrastructure
//! failures are normalized into the [`AuthResult`] contract. Components
//! beneath this layer fail with specific kinds; nothing escapes uncaught.

use std::sync::Arc;

use tracing::{error, info, warn};
use validator::Validate;

use keystone_core::config::auth::AuthConfig;
use keystone_core::error::AppError;
use keystone_core::traits::clock::Clock;
use keystone_entity::user::{CreateUser, User, UserRole};
use keystone_store::store::{CredentialStore, StorePing};

use crate::contract::{AuthResult, Diagnostics, LoginRequest, RefreshRequest, RegisterRequest};
use crate::password::{PasswordHasher, PasswordPolicy};
use crate::token::{TokenIssuer, TokenVerifier};

/// Generic message for bad credentials. Identical for unknown-user and
/// wrong-password so callers cannot enumerate valid usernames.
const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Generic message for every refresh rejection. Mismatched, expired,
/// revoked, and forged presentations are indistinguishable to the caller.
const INVALID_REFRESH: &str = "Invalid refresh token or token expired";

/// Coordinates the credential store, password hasher, and token signer.
///
/// All operations run within the caller's request scope; the service
/// itself holds no mutable state and is safe to share.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl AuthService {
    /// Create a new service over a credential store and clock.
    pub fn new(store: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>, config: AuthConfig) -> Self {
        Self {
            hasher: PasswordHasher::new(),
            policy: PasswordPolicy::new(&config),
            issuer: TokenIssuer::new(&config),
            verifier: TokenVerifier::new(&config),
            store,
            clock,
            config,
        }
    }

    /// Register a new account and log it in.
    ///
    /// Validation runs before any storage access. Username and email
    /// uniqueness violations are reported together, one error entry per
    /// violated rule.
    pub async fn register(&self, request: RegisterRequest) -> AuthResult {
        let required = missing_required_fields(&request);
        if !required.is_empty() {
            warn!(username = %request.username, "Registration rejected: missing fields");
            return AuthResult::denied_with_errors("Validation failed", required);
        }

        let mut errors = Vec::new();
        if let Err(violations) = request.validate() {
            errors.extend(collect_messages(&violations));
        }
        errors.extend(self.policy.violations(&request.password));
        if !errors.is_empty() {
            warn!(username = %request.username, "Registration rejected: validation failed");
            return AuthResult::denied_with_errors("Validation failed", errors);
        }

        match self.try_register(&request).await {
            Ok(result) => result,
            Err(e) => {
                error!(username = %request.username, error = %e, "Registration failed");
                AuthResult::denied_with_errors("Registration failed", vec![e.to_string()])
            }
        }
    }

    async fn try_register(&self, request: &RegisterRequest) -> Result<AuthResult, AppError> {
        // Both uniqueness checks run unconditionally so a caller colliding
        // on both gets both entries at once.
        let mut errors = Vec::new();
        if self.store.username_exists(&request.username).await? {
            errors.push("Username is already taken".to_string());
        }
        if self.store.email_exists(&request.email).await? {
            errors.push("Email is already registered".to_string());
        }
        if !errors.is_empty() {
            return Ok(AuthResult::denied_with_errors("Registration failed", errors));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = self
            .store
            .create(&CreateUser {
                username: request.username.clone(),
                email: request.email.clone(),
                password_hash,
                first_name: request.first_name.clone(),
                last_name: request.last_name.clone(),
                roles: vec![UserRole::User.as_str().to_string()],
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        self.issue_pair(&user, "Registration successful").await
    }

    /// Authenticate by username and password.
    pub async fn login(&self, request: LoginRequest) -> AuthResult {
        match self.try_login(&request).await {
            Ok(result) => result,
            Err(e) => {
                error!(username = %request.username, error = %e, "Login failed");
                AuthResult::denied_with_errors("Login failed", vec![e.to_string()])
            }
        }
    }

    async fn try_login(&self, request: &LoginRequest) -> Result<AuthResult, AppError> {
        let Some(user) = self.store.find_by_username(&request.username).await? else {
            warn!(username = %request.username, "Login rejected: unknown user");
            return Ok(AuthResult::denied(INVALID_CREDENTIALS));
        };

        if !self.hasher.verify(&request.password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Ok(AuthResult::denied(INVALID_CREDENTIALS));
        }

        info!(user_id = %user.id, "Login successful");
        self.issue_pair(&user, "Login successful").await
    }

    /// Exchange an expired bearer token plus the stored refresh token for
    /// a fresh pair.
    ///
    /// Rotation is single-use: the presented refresh token is invalid the
    /// instant a new one is issued, whether or not the new one reaches the
    /// client. A lost response forces a fresh login rather than a retry.
    pub async fn refresh_token(&self, request: RefreshRequest) -> AuthResult {
        match self.try_refresh(&request).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Token refresh failed");
                AuthResult::denied_with_errors("Error refreshing token", vec![e.to_string()])
            }
        }
    }

    async fn try_refresh(&self, request: &RefreshRequest) -> Result<AuthResult, AppError> {
        // Signature, structure, issuer, and audience are still enforced;
        // only the expiry check is relaxed.
        let claims = match self.verifier.verify_ignoring_expiry(&request.token) {
            Ok(claims) => claims,
            Err(reason) => {
                warn!(%reason, "Refresh rejected: bearer token failed validation");
                return Ok(AuthResult::denied(INVALID_REFRESH));
            }
        };

        let now = self.clock.now();
        let Some(user) = self.store.find_by_username(&claims.username).await? else {
            warn!(username = %claims.username, "Refresh rejected: unknown user");
            return Ok(AuthResult::denied(INVALID_REFRESH));
        };

        if !user.refresh_token_matches(&request.refresh_token, now) {
            warn!(user_id = %user.id, "Refresh rejected: token mismatch or slot expired");
            return Ok(AuthResult::denied(INVALID_REFRESH));
        }

        let bearer = self.issuer.issue(&user, now)?;
        let refresh = self.issuer.generate_refresh_token();
        let slot_expires = now + chrono::Duration::days(self.config.refresh_token_days);

        // Compare-and-swap on the presented value: of two concurrent
        // refreshes with the same token, exactly one wins.
        let rotated = self
            .store
            .rotate_refresh_token(user.id, &request.refresh_token, &refresh, slot_expires)
            .await?;
        if !rotated {
            warn!(user_id = %user.id, "Refresh rejected: lost rotation race");
            return Ok(AuthResult::denied(INVALID_REFRESH));
        }

        info!(user_id = %user.id, "Token refreshed");
        Ok(AuthResult::granted(
            "Token refreshed successfully",
            bearer.token,
            refresh,
            bearer.expires_at,
        ))
    }

    /// Clear the stored refresh slot for `username`.
    ///
    /// Returns `false` only when the user does not exist; revoking an
    /// already-revoked session still returns `true`.
    pub async fn revoke(&self, username: &str) -> bool {
        match self.try_revoke(username).await {
            Ok(revoked) => revoked,
            Err(e) => {
                error!(username = %username, error = %e, "Revocation failed");
                false
            }
        }
    }

    async fn try_revoke(&self, username: &str) -> Result<bool, AppError> {
        let Some(user) = self.store.find_by_username(username).await? else {
            return Ok(false);
        };
        self.store.clear_refresh_token(user.id).await?;
        info!(user_id = %user.id, "Refresh token revoked");
        Ok(true)
    }

    /// Operational health snapshot: signing configuration presence and a
    /// live store probe.
    pub async fn diagnostics(&self) -> Diagnostics {
        let store = match self.store.ping().await {
            Ok(ping) => ping,
            Err(e) => {
                error!(error = %e, "Store ping failed");
                StorePing {
                    reachable: false,
                    user_count: 0,
                    identifier: String::new(),
                }
            }
        };

        Diagnostics {
            jwt_configured: self.config.is_fully_configured(),
            store,
        }
    }

    /// Issue a bearer + refresh pair and overwrite the refresh slot.
    async fn issue_pair(&self, user: &User, message: &str) -> Result<AuthResult, AppError> {
        let now = self.clock.now();
        let bearer = self.issuer.issue(user, now)?;
        let refresh = self.issuer.generate_refresh_token();
        let slot_expires = now + chrono::Duration::days(self.config.refresh_token_days);

        self.store
            .store_refresh_token(user.id, &refresh, slot_expires)
            .await?;

        Ok(AuthResult::granted(
            message,
            bearer.token,
            refresh,
            bearer.expires_at,
        ))
    }
}

/// Required-field check mirroring the pre-validation the HTTP layer is
/// not trusted to do.
fn missing_required_fields(request: &RegisterRequest) -> Vec<String> {
    let mut missing = Vec::new();
    if request.username.trim().is_empty() {
        missing.push("Username is required".to_string());
    }
    if request.email.trim().is_empty() {
        missing.push("Email is required".to_string());
    }
    if request.password.trim().is_empty() {
        missing.push("Password is required".to_string());
    }
    if !request.password.trim().is_empty() && request.confirm_password.trim().is_empty() {
        missing.push("Confirm password is required".to_string());
    }
    if request.first_name.trim().is_empty() {
        missing.push("First name is required".to_string());
    }
    if request.last_name.trim().is_empty() {
        missing.push("Last name is required".to_string());
    }
    missing
}

/// Flatten validator output into one string per violated rule.
fn collect_messages(violations: &validator::ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = violations
        .field_errors()
        .values()
        .flat_map(|errors| {
            errors
                .iter()
                .filter_map(|error| error.message.as_ref().map(std::string::ToString::to_string))
        })
        .collect();
    messages.sort();
    messages
}
