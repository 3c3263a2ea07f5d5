use crate::domain::DomainResult;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Stored password reset request. Only the token hash is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetToken {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

impl PasswordResetToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateResetTokenInput {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetResetTokenByHashInput {
    pub token_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResetTokensByUserInput {
    pub user_id: String,
}

/// Raw token for the email link plus the hash to store
#[derive(Debug, Clone)]
pub struct GeneratedResetToken {
    pub raw_token: String,
    pub token_hash: String,
}

/// Repository trait for password reset tokens
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PasswordResetTokenRepository: Send + Sync {
    async fn create_reset_token(&self, input: CreateResetTokenInput)
        -> DomainResult<PasswordResetToken>;

    async fn get_reset_token_by_hash(
        &self,
        input: GetResetTokenByHashInput,
    ) -> DomainResult<Option<PasswordResetToken>>;

    /// Remove every outstanding token of a user
    async fn delete_reset_tokens_by_user(
        &self,
        input: DeleteResetTokensByUserInput,
    ) -> DomainResult<()>;
}

/// Generation and hashing of opaque reset tokens
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ResetTokenProvider: Send + Sync {
    fn generate_reset_token(&self) -> GeneratedResetToken;

    fn hash_reset_token(&self, raw_token: &str) -> String;
}

/// 32 random bytes, URL-safe base64, stored as a SHA-256 digest.
#[derive(Debug, Default)]
pub struct CryptoResetTokenProvider;

impl CryptoResetTokenProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ResetTokenProvider for CryptoResetTokenProvider {
    fn generate_reset_token(&self) -> GeneratedResetToken {
        let mut random_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let raw_token = URL_SAFE_NO_PAD.encode(random_bytes);
        let token_hash = self.hash_reset_token(&raw_token);

        GeneratedResetToken {
            raw_token,
            token_hash,
        }
    }

    fn hash_reset_token(&self, raw_token: &str) -> String {
        let digest = Sha256::digest(raw_token.as_bytes());
        URL_SAFE_NO_PAD.encode(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique() {
        let provider = CryptoResetTokenProvider::new();
        let first = provider.generate_reset_token();
        let second = provider.generate_reset_token();

        assert_ne!(first.raw_token, second.raw_token);
        assert_ne!(first.token_hash, second.token_hash);
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(first.raw_token.len(), 43);
    }

    #[test]
    fn test_hash_matches_generated_token() {
        let provider = CryptoResetTokenProvider::new();
        let generated = provider.generate_reset_token();
        assert_eq!(
            provider.hash_reset_token(&generated.raw_token),
            generated.token_hash
        );
        assert_ne!(generated.raw_token, generated.token_hash);
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let now = Utc::now();
        let token = PasswordResetToken {
            id: "t1".to_string(),
            user_id: "u1".to_string(),
            token_hash: "h".to_string(),
            expires_at: now,
            created_at: None,
        };
        assert!(token.is_expired(now));
        assert!(!token.is_expired(now - chrono::Duration::seconds(1)));
    }
}
