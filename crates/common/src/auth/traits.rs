use chrono::{DateTime, Utc};

use crate::domain::DomainResult;

/// Signed session token handed to the browser in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and checks session tokens
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AuthTokenProvider: Send + Sync {
    /// Issue a session token for a user
    fn generate_token(&self, user_id: &str, email: &str) -> DomainResult<SessionToken>;

    /// Validate a session token and return the user id it was issued for
    fn validate_token(&self, token: &str) -> DomainResult<String>;
}

/// Password hashing and verification
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordService: Send + Sync {
    fn hash_password(&self, password: &str) -> DomainResult<String>;

    /// `Ok(false)` on mismatch, `Err` only for a malformed stored hash
    fn verify_password(&self, password: &str, hash: &str) -> DomainResult<bool>;
}
