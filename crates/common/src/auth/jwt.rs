use crate::auth::{AuthTokenProvider, JwtConfig, SessionToken};
use crate::domain::{DomainError, DomainResult};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by the session token. The role is not embedded, it is
/// re-read from the user record on every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

/// HS256 session tokens signed with the configured secret
pub struct JwtAuthTokenProvider {
    config: JwtConfig,
}

impl JwtAuthTokenProvider {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }
}

impl AuthTokenProvider for JwtAuthTokenProvider {
    fn generate_token(&self, user_id: &str, email: &str) -> DomainResult<SessionToken> {
        let now = chrono::Utc::now();
        let expires_at = now + self.config.expiration();

        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| DomainError::RepositoryError(anyhow::anyhow!("JWT encoding error: {}", e)))?;

        Ok(SessionToken { token, expires_at })
    }

    fn validate_token(&self, token: &str) -> DomainResult<String> {
        let token_data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| DomainError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(secret: &str) -> JwtAuthTokenProvider {
        JwtAuthTokenProvider::new(JwtConfig::new(secret.to_string(), 24))
    }

    #[test]
    fn test_issued_token_validates_to_user_id() {
        let provider = provider("test-secret-key");
        let session = provider
            .generate_token("user-123", "anna@morgana.example")
            .unwrap();

        assert!(!session.token.is_empty());
        assert!(session.expires_at > chrono::Utc::now() + chrono::Duration::hours(23));
        assert_eq!(provider.validate_token(&session.token).unwrap(), "user-123");
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let result = provider("test-secret-key").validate_token("not-a-jwt");
        assert!(matches!(result, Err(DomainError::InvalidToken(_))));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let session = provider("secret-one")
            .generate_token("user-123", "anna@morgana.example")
            .unwrap();
        let result = provider("secret-two").validate_token(&session.token);
        assert!(matches!(result, Err(DomainError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired = JwtAuthTokenProvider::new(JwtConfig::new("k".to_string(), 0));
        let claims = SessionClaims {
            sub: "user-123".to_string(),
            email: "anna@morgana.example".to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
            iat: (chrono::Utc::now() - chrono::Duration::hours(3)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"k"),
        )
        .unwrap();
        assert!(matches!(
            expired.validate_token(&token),
            Err(DomainError::InvalidToken(_))
        ));
    }
}
