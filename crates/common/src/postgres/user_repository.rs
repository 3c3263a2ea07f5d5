use crate::domain::{
    DeleteUserRepoInput, DomainError, DomainResult, GetUserByEmailRepoInput, GetUserRepoInput,
    ListUsersRepoInput, RegisterUserRepoInput, Role, UpdatePasswordRepoInput,
    UpdateUserRoleRepoInput, User, UserRepository,
};
use crate::postgres::support::{association_param, read_error, stored_association, write_error};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use tracing::{debug, instrument};

const USER_COLUMNS: &str =
    "id, email, password_hash, name, role, association, created_at, updated_at";

/// User row for PostgreSQL storage
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub association: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Row> for UserRow {
    fn from(row: &Row) -> Self {
        UserRow {
            id: row.get("id"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            name: row.get("name"),
            role: row.get("role"),
            association: row.get("association"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            role: Role::from_stored(&row.role),
            association: stored_association(row.association),
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

fn to_user(row: &Row) -> User {
    UserRow::from(row).into()
}

/// PostgreSQL implementation of UserRepository trait
#[derive(Clone)]
pub struct PostgresUserRepository {
    client: PostgresClient,
}

impl PostgresUserRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, input), fields(user_id = %input.id))]
    async fn register_user(&self, input: RegisterUserRepoInput) -> DomainResult<User> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let now = Utc::now();
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO users (id, email, password_hash, name, role, association, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
                     RETURNING {}",
                    USER_COLUMNS
                ),
                &[
                    &input.id,
                    &input.email,
                    &input.password_hash,
                    &input.name,
                    &input.role.as_str(),
                    &association_param(input.association),
                    &now,
                ],
            )
            .await
            .map_err(|e| write_error(e, "email"))?;

        debug!(user_id = %input.id, "user registered in database");
        Ok(to_user(&row))
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn get_user(&self, input: GetUserRepoInput) -> DomainResult<Option<User>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                &format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS),
                &[&input.user_id],
            )
            .await
            .map_err(read_error)?;

        Ok(row.as_ref().map(to_user))
    }

    #[instrument(skip(self, input))]
    async fn get_user_by_email(
        &self,
        input: GetUserByEmailRepoInput,
    ) -> DomainResult<Option<User>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                &format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS),
                &[&input.email],
            )
            .await
            .map_err(read_error)?;

        Ok(row.as_ref().map(to_user))
    }

    #[instrument(skip(self, input))]
    async fn list_users(&self, input: ListUsersRepoInput) -> DomainResult<Vec<User>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = match input.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => {
                let pattern = format!("%{}%", query);
                conn.query(
                    &format!(
                        "SELECT {} FROM users
                         WHERE name ILIKE $1 OR email ILIKE $1
                         ORDER BY name ASC, id ASC",
                        USER_COLUMNS
                    ),
                    &[&pattern],
                )
                .await
            }
            None => {
                conn.query(
                    &format!("SELECT {} FROM users ORDER BY name ASC, id ASC", USER_COLUMNS),
                    &[],
                )
                .await
            }
        }
        .map_err(read_error)?;

        debug!(count = rows.len(), "listed users");
        Ok(rows.iter().map(to_user).collect())
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id, role = %input.role))]
    async fn update_user_role(&self, input: UpdateUserRoleRepoInput) -> DomainResult<User> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                &format!(
                    "UPDATE users SET role = $2, association = $3, updated_at = NOW()
                     WHERE id = $1
                     RETURNING {}",
                    USER_COLUMNS
                ),
                &[
                    &input.user_id,
                    &input.role.as_str(),
                    &association_param(input.association),
                ],
            )
            .await
            .map_err(read_error)?;

        row.as_ref()
            .map(to_user)
            .ok_or(DomainError::UserNotFound(input.user_id))
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn update_password(&self, input: UpdatePasswordRepoInput) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let updated = conn
            .execute(
                "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
                &[&input.user_id, &input.password_hash],
            )
            .await
            .map_err(read_error)?;

        if updated == 0 {
            return Err(DomainError::UserNotFound(input.user_id));
        }
        Ok(())
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn delete_user(&self, input: DeleteUserRepoInput) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let deleted = conn
            .execute("DELETE FROM users WHERE id = $1", &[&input.user_id])
            .await
            .map_err(read_error)?;

        if deleted == 0 {
            return Err(DomainError::UserNotFound(input.user_id));
        }
        debug!("user deleted");
        Ok(())
    }
}
