use crate::domain::result::DomainResult;
use crate::domain::{Actor, Association, Role};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub association: Option<Association>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role, self.association)
    }
}

/// User as exposed outside the service (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub association: Option<Association>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            association: user.association,
            created_at: user.created_at,
        }
    }
}

/// Internal input with generated ID and hashed password
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserRepoInput {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub association: Option<Association>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUserRepoInput {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetUserByEmailRepoInput {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserRoleRepoInput {
    pub user_id: String,
    pub role: Role,
    pub association: Option<Association>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePasswordRepoInput {
    pub user_id: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteUserRepoInput {
    pub user_id: String,
}

/// Case-insensitive substring over name and email; empty matches everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListUsersRepoInput {
    pub query: Option<String>,
}

/// Repository trait for user storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Register a new user (id and password_hash already generated/hashed by domain service)
    async fn register_user(&self, input: RegisterUserRepoInput) -> DomainResult<User>;

    async fn get_user(&self, input: GetUserRepoInput) -> DomainResult<Option<User>>;

    async fn get_user_by_email(&self, input: GetUserByEmailRepoInput)
        -> DomainResult<Option<User>>;

    /// Users ordered by name, then id
    async fn list_users(&self, input: ListUsersRepoInput) -> DomainResult<Vec<User>>;

    async fn update_user_role(&self, input: UpdateUserRoleRepoInput) -> DomainResult<User>;

    async fn update_password(&self, input: UpdatePasswordRepoInput) -> DomainResult<()>;

    async fn delete_user(&self, input: DeleteUserRepoInput) -> DomainResult<()>;
}
