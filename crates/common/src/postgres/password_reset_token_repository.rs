use crate::auth::{
    CreateResetTokenInput, DeleteResetTokensByUserInput, GetResetTokenByHashInput,
    PasswordResetToken, PasswordResetTokenRepository,
};
use crate::domain::{DomainError, DomainResult};
use crate::postgres::support::{read_error, write_error};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use tokio_postgres::Row;
use tracing::{debug, instrument};

fn to_reset_token(row: &Row) -> PasswordResetToken {
    PasswordResetToken {
        id: row.get("id"),
        user_id: row.get("user_id"),
        token_hash: row.get("token_hash"),
        expires_at: row.get("expires_at"),
        created_at: Some(row.get("created_at")),
    }
}

#[derive(Clone)]
pub struct PostgresPasswordResetTokenRepository {
    client: PostgresClient,
}

impl PostgresPasswordResetTokenRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PasswordResetTokenRepository for PostgresPasswordResetTokenRepository {
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn create_reset_token(
        &self,
        input: CreateResetTokenInput,
    ) -> DomainResult<PasswordResetToken> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_one(
                "INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at, created_at)
                 VALUES ($1, $2, $3, $4, NOW())
                 RETURNING id, user_id, token_hash, expires_at, created_at",
                &[
                    &input.id,
                    &input.user_id,
                    &input.token_hash,
                    &input.expires_at,
                ],
            )
            .await
            .map_err(|e| write_error(e, "token"))?;

        debug!("password reset token stored");
        Ok(to_reset_token(&row))
    }

    #[instrument(skip(self, input))]
    async fn get_reset_token_by_hash(
        &self,
        input: GetResetTokenByHashInput,
    ) -> DomainResult<Option<PasswordResetToken>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                "SELECT id, user_id, token_hash, expires_at, created_at
                 FROM password_reset_tokens
                 WHERE token_hash = $1",
                &[&input.token_hash],
            )
            .await
            .map_err(read_error)?;

        Ok(row.as_ref().map(to_reset_token))
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn delete_reset_tokens_by_user(
        &self,
        input: DeleteResetTokensByUserInput,
    ) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let deleted = conn
            .execute(
                "DELETE FROM password_reset_tokens WHERE user_id = $1",
                &[&input.user_id],
            )
            .await
            .map_err(read_error)?;

        debug!(deleted, "password reset tokens removed");
        Ok(())
    }
}
