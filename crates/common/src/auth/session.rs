use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::auth::AuthTokenProvider;
use crate::domain::{Actor, DomainResult, GetUserRepoInput, UserRepository};

/// Resolves the acting user behind a session token.
///
/// `Ok(None)` means "anonymous": the token is invalid, expired or belongs to
/// a user that no longer exists. Only infrastructure failures are errors.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve_actor(&self, token: &str) -> DomainResult<Option<Actor>>;
}

/// Session resolver backed by signed tokens and the user store
pub struct TokenSessionResolver {
    token_provider: Arc<dyn AuthTokenProvider>,
    user_repository: Arc<dyn UserRepository>,
}

impl TokenSessionResolver {
    pub fn new(
        token_provider: Arc<dyn AuthTokenProvider>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            token_provider,
            user_repository,
        }
    }
}

#[async_trait]
impl SessionResolver for TokenSessionResolver {
    #[instrument(skip(self, token))]
    async fn resolve_actor(&self, token: &str) -> DomainResult<Option<Actor>> {
        let user_id = match self.token_provider.validate_token(token) {
            Ok(user_id) => user_id,
            Err(e) => {
                debug!(error = %e, "Session token rejected");
                return Ok(None);
            }
        };

        let user = self
            .user_repository
            .get_user(GetUserRepoInput {
                user_id: user_id.clone(),
            })
            .await?;

        match user {
            Some(user) => Ok(Some(user.actor())),
            None => {
                debug!(user_id = %user_id, "Session refers to a deleted user");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MockAuthTokenProvider;
    use crate::domain::{Association, DomainError, MockUserRepository, Role, User};

    fn stored_user() -> User {
        User {
            id: "user-1".to_string(),
            email: "anna@morgana.example".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            name: "Anna".to_string(),
            role: Role::AdminNetwork,
            association: Some(Association::Scipog),
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_valid_token_resolves_to_current_role() {
        let mut tokens = MockAuthTokenProvider::new();
        tokens
            .expect_validate_token()
            .with(mockall::predicate::eq("good"))
            .returning(|_| Ok("user-1".to_string()));

        let mut users = MockUserRepository::new();
        users
            .expect_get_user()
            .withf(|input| input.user_id == "user-1")
            .return_once(|_| Ok(Some(stored_user())));

        let resolver = TokenSessionResolver::new(Arc::new(tokens), Arc::new(users));
        let actor = resolver.resolve_actor("good").await.unwrap().unwrap();

        assert_eq!(actor.user_id, "user-1");
        assert_eq!(actor.role, Role::AdminNetwork);
        assert_eq!(actor.association, Some(Association::Scipog));
    }

    #[tokio::test]
    async fn test_invalid_token_is_anonymous() {
        let mut tokens = MockAuthTokenProvider::new();
        tokens
            .expect_validate_token()
            .returning(|_| Err(DomainError::InvalidToken("expired".to_string())));
        let mut users = MockUserRepository::new();
        users.expect_get_user().never();

        let resolver = TokenSessionResolver::new(Arc::new(tokens), Arc::new(users));
        assert!(resolver.resolve_actor("stale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleted_user_is_anonymous() {
        let mut tokens = MockAuthTokenProvider::new();
        tokens
            .expect_validate_token()
            .returning(|_| Ok("gone".to_string()));
        let mut users = MockUserRepository::new();
        users.expect_get_user().return_once(|_| Ok(None));

        let resolver = TokenSessionResolver::new(Arc::new(tokens), Arc::new(users));
        assert!(resolver.resolve_actor("token").await.unwrap().is_none());
    }
}
