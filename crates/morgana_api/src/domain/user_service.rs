use std::sync::Arc;

use chrono::Utc;
use common::auth::{
    can_manage_users, require_actor, resolve_role_assignment, AuthTokenProvider,
    CreateResetTokenInput, DeleteResetTokensByUserInput, GetResetTokenByHashInput,
    PasswordResetConfig, PasswordResetTokenRepository, PasswordService, ResetTokenProvider,
    SessionToken,
};
use common::domain::{
    Actor, DeleteUserRepoInput, DomainError, DomainResult, GetUserByEmailRepoInput,
    GetUserRepoInput, ListUsersRepoInput, RegisterUserRepoInput, Role, UpdatePasswordRepoInput,
    UpdateUserRoleRepoInput, User, UserProfile, UserRepository,
};
use common::email::{dispatch_email, password_reset_email, welcome_email, EmailSender};
use common::garde::{known_association, known_role, not_blank};
use garde::Validate;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::domain::parsing::{normalize_email, parse_association};

/// Request to create an account
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 8, max = 256))]
    pub password: String,
    #[garde(length(max = 100), custom(not_blank))]
    pub name: String,
    #[garde(custom(known_association))]
    #[serde(default)]
    pub association: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginUserRequest {
    #[garde(length(min = 1))]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

/// Session issued at login
#[derive(Debug, Clone)]
pub struct LoginUserOutput {
    pub user: UserProfile,
    pub session: SessionToken,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListUsersRequest {
    #[garde(length(max = 200))]
    #[serde(default)]
    pub query: Option<String>,
}

/// Request to change the role of a user
#[derive(Debug, Clone, Validate)]
pub struct ChangeUserRoleRequest {
    #[garde(length(min = 1))]
    pub user_id: String,
    #[garde(custom(known_role))]
    pub role: String,
    #[garde(custom(known_association))]
    pub association: Option<String>,
}

#[derive(Debug, Clone, Validate)]
pub struct DeleteUserRequest {
    #[garde(length(min = 1))]
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestPasswordResetRequest {
    #[garde(email)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[garde(length(min = 1))]
    pub token: String,
    #[garde(length(min = 8, max = 256))]
    pub new_password: String,
}

/// Domain service for accounts, sessions and password resets
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    reset_token_repository: Arc<dyn PasswordResetTokenRepository>,
    auth_token_provider: Arc<dyn AuthTokenProvider>,
    reset_token_provider: Arc<dyn ResetTokenProvider>,
    password_service: Arc<dyn PasswordService>,
    email_sender: Arc<dyn EmailSender>,
    reset_config: PasswordResetConfig,
}

impl UserService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        reset_token_repository: Arc<dyn PasswordResetTokenRepository>,
        auth_token_provider: Arc<dyn AuthTokenProvider>,
        reset_token_provider: Arc<dyn ResetTokenProvider>,
        password_service: Arc<dyn PasswordService>,
        email_sender: Arc<dyn EmailSender>,
        reset_config: PasswordResetConfig,
    ) -> Self {
        Self {
            user_repository,
            reset_token_repository,
            auth_token_provider,
            reset_token_provider,
            password_service,
            email_sender,
            reset_config,
        }
    }

    async fn load_user(&self, user_id: &str) -> DomainResult<User> {
        self.user_repository
            .get_user(GetUserRepoInput {
                user_id: user_id.to_string(),
            })
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()))
    }

    /// Register a new account with role USER and send a welcome email
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register_user(&self, request: RegisterUserRequest) -> DomainResult<UserProfile> {
        let request = RegisterUserRequest {
            email: normalize_email(&request.email),
            ..request
        };
        common::garde::validate_struct(&request)?;

        let association = parse_association(request.association.as_deref())?;
        let password_hash = self.password_service.hash_password(&request.password)?;
        let user_id = xid::new().to_string();

        debug!(user_id = %user_id, "registering user with hashed password");

        let user = self
            .user_repository
            .register_user(RegisterUserRepoInput {
                id: user_id,
                email: request.email,
                password_hash,
                name: request.name.trim().to_string(),
                role: Role::User,
                association,
            })
            .await?;

        dispatch_email(
            self.email_sender.clone(),
            welcome_email(&user.email, &user.name),
        );

        info!(user_id = %user.id, "user registered");
        Ok(user.into())
    }

    /// Check credentials and issue a session token
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login_user(&self, request: LoginUserRequest) -> DomainResult<LoginUserOutput> {
        let request = LoginUserRequest {
            email: normalize_email(&request.email),
            ..request
        };
        common::garde::validate_struct(&request)?;

        let user = self
            .user_repository
            .get_user_by_email(GetUserByEmailRepoInput {
                email: request.email,
            })
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        if !self
            .password_service
            .verify_password(&request.password, &user.password_hash)?
        {
            return Err(DomainError::InvalidCredentials);
        }

        let session = self
            .auth_token_provider
            .generate_token(&user.id, &user.email)?;

        debug!(user_id = %user.id, "user logged in");
        Ok(LoginUserOutput {
            user: user.into(),
            session,
        })
    }

    #[instrument(skip(self, actor))]
    pub async fn get_current_user(&self, actor: Option<&Actor>) -> DomainResult<UserProfile> {
        let actor = require_actor(actor)?;
        Ok(self.load_user(&actor.user_id).await?.into())
    }

    /// All accounts matching a name/email substring. Super admins only.
    #[instrument(skip(self, actor, request))]
    pub async fn list_users(
        &self,
        actor: Option<&Actor>,
        request: ListUsersRequest,
    ) -> DomainResult<Vec<UserProfile>> {
        common::garde::validate_struct(&request)?;

        let actor = require_actor(actor)?;
        if !can_manage_users(Some(actor)) {
            return Err(DomainError::PermissionDenied(format!(
                "{} {} cannot list users",
                actor.role, actor.user_id
            )));
        }

        let query = request
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        let users = self
            .user_repository
            .list_users(ListUsersRepoInput { query })
            .await?;

        debug!(count = users.len(), "listed users");
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    /// Change the role of a user, keeping the role/association invariants
    #[instrument(skip(self, actor, request), fields(user_id = %request.user_id, role = %request.role))]
    pub async fn change_user_role(
        &self,
        actor: Option<&Actor>,
        request: ChangeUserRoleRequest,
    ) -> DomainResult<UserProfile> {
        common::garde::validate_struct(&request)?;

        let actor = require_actor(actor)?;
        let target_role: Role = request.role.parse()?;
        let requested = parse_association(request.association.as_deref())?;

        let user = self.load_user(&request.user_id).await?;
        let assignment =
            resolve_role_assignment(Some(actor), user.association, target_role, requested)?;

        debug!(
            previous_role = %user.role,
            association = ?assignment.association,
            "applying role assignment"
        );

        let updated = self
            .user_repository
            .update_user_role(UpdateUserRoleRepoInput {
                user_id: user.id,
                role: assignment.role,
                association: assignment.association,
            })
            .await?;

        info!(user_id = %updated.id, role = %updated.role, "user role changed");
        Ok(updated.into())
    }

    /// Delete an account. Super admins only, and never their own.
    #[instrument(skip(self, actor, request), fields(user_id = %request.user_id))]
    pub async fn delete_user(
        &self,
        actor: Option<&Actor>,
        request: DeleteUserRequest,
    ) -> DomainResult<()> {
        common::garde::validate_struct(&request)?;

        let actor = require_actor(actor)?;
        let user = self.load_user(&request.user_id).await?;

        if !can_manage_users(Some(actor)) {
            return Err(DomainError::PermissionDenied(format!(
                "{} {} cannot delete users",
                actor.role, actor.user_id
            )));
        }
        if user.id == actor.user_id {
            return Err(DomainError::ValidationError(
                "you cannot delete your own account".to_string(),
            ));
        }

        self.user_repository
            .delete_user(DeleteUserRepoInput { user_id: user.id })
            .await?;

        info!(user_id = %request.user_id, "user deleted");
        Ok(())
    }

    /// Email a reset link when the account exists.
    ///
    /// The outcome is the same whether or not the address is registered.
    #[instrument(skip(self, request))]
    pub async fn request_password_reset(
        &self,
        request: RequestPasswordResetRequest,
    ) -> DomainResult<()> {
        let request = RequestPasswordResetRequest {
            email: normalize_email(&request.email),
        };
        common::garde::validate_struct(&request)?;

        let Some(user) = self
            .user_repository
            .get_user_by_email(GetUserByEmailRepoInput {
                email: request.email,
            })
            .await?
        else {
            debug!("password reset requested for unknown email");
            return Ok(());
        };

        self.reset_token_repository
            .delete_reset_tokens_by_user(DeleteResetTokensByUserInput {
                user_id: user.id.clone(),
            })
            .await?;

        let generated = self.reset_token_provider.generate_reset_token();
        self.reset_token_repository
            .create_reset_token(CreateResetTokenInput {
                id: xid::new().to_string(),
                user_id: user.id.clone(),
                token_hash: generated.token_hash,
                expires_at: Utc::now() + self.reset_config.token_ttl(),
            })
            .await?;

        dispatch_email(
            self.email_sender.clone(),
            password_reset_email(
                &user.email,
                &user.name,
                &self.reset_config.reset_link(&generated.raw_token),
                self.reset_config.token_ttl_minutes,
            ),
        );

        debug!(user_id = %user.id, "password reset token issued");
        Ok(())
    }

    /// Set a new password using a reset token. Tokens are single use.
    #[instrument(skip(self, request))]
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> DomainResult<()> {
        common::garde::validate_struct(&request)?;

        let token_hash = self.reset_token_provider.hash_reset_token(&request.token);
        let stored = self
            .reset_token_repository
            .get_reset_token_by_hash(GetResetTokenByHashInput { token_hash })
            .await?
            .ok_or_else(|| DomainError::InvalidToken("unknown password reset token".to_string()))?;

        if stored.is_expired(Utc::now()) {
            self.reset_token_repository
                .delete_reset_tokens_by_user(DeleteResetTokensByUserInput {
                    user_id: stored.user_id,
                })
                .await?;
            return Err(DomainError::ResetTokenExpired);
        }

        let password_hash = self
            .password_service
            .hash_password(&request.new_password)?;
        self.user_repository
            .update_password(UpdatePasswordRepoInput {
                user_id: stored.user_id.clone(),
                password_hash,
            })
            .await?;
        self.reset_token_repository
            .delete_reset_tokens_by_user(DeleteResetTokensByUserInput {
                user_id: stored.user_id.clone(),
            })
            .await?;

        info!(user_id = %stored.user_id, "password reset");
        Ok(())
    }
}
