use axum::extract::{Path, Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use common::domain::{DomainError, UserProfile};
use common::http::{ApiError, ApiResponse, SessionCookie};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ChangeUserRoleRequest, DeleteUserRequest, ListUsersRequest, LoginUserRequest,
    RegisterUserRequest, RequestPasswordResetRequest, ResetPasswordRequest,
};
use crate::http::{created, ApiResult, AppState, CreatedResult, CurrentActor};

#[derive(Debug, Serialize)]
pub struct SessionBody {
    pub user: UserProfile,
    /// Same token as the cookie, for clients using `Authorization: Bearer`
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleBody {
    pub role: String,
    #[serde(default)]
    pub association: Option<String>,
}

fn with_cookie(mut response: Response, cookie: SessionCookie) -> Result<Response, ApiError> {
    let value: HeaderValue = cookie.to_header().ok_or_else(|| {
        ApiError(DomainError::RepositoryError(anyhow::anyhow!(
            "session token is not a valid header value"
        )))
    })?;
    response.headers_mut().insert(SET_COOKIE, value);
    Ok(response)
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> CreatedResult<UserProfile> {
    let user = state.user_service.register_user(request).await?;
    Ok(created(user))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginUserRequest>,
) -> Result<Response, ApiError> {
    let output = state.user_service.login_user(request).await?;

    let max_age = (output.session.expires_at - Utc::now()).num_seconds();
    let cookie = SessionCookie::new(output.session.token.clone(), max_age, state.secure_cookies);
    let body = ApiResponse::ok(SessionBody {
        user: output.user,
        token: output.session.token,
        expires_at: output.session.expires_at,
    });

    with_cookie(body.into_response(), cookie)
}

/// Sessions are stateless, so logging out only drops the cookie
pub async fn logout(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = ApiResponse::ok(MessageBody {
        message: "Logged out",
    });
    with_cookie(body.into_response(), SessionCookie::clear(state.secure_cookies))
}

pub async fn me(State(state): State<AppState>, actor: CurrentActor) -> ApiResult<UserProfile> {
    let user = state.user_service.get_current_user(actor.get()).await?;
    Ok(ApiResponse::ok(user))
}

/// Always answers the same way so accounts cannot be probed
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<RequestPasswordResetRequest>,
) -> ApiResult<MessageBody> {
    state.user_service.request_password_reset(request).await?;
    Ok(ApiResponse::ok(MessageBody {
        message: "If the address is registered, a reset link has been sent",
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> ApiResult<MessageBody> {
    state.user_service.reset_password(request).await?;
    Ok(ApiResponse::ok(MessageBody {
        message: "Password updated",
    }))
}

pub async fn list_users(
    State(state): State<AppState>,
    actor: CurrentActor,
    Query(request): Query<ListUsersRequest>,
) -> ApiResult<Vec<UserProfile>> {
    let users = state.user_service.list_users(actor.get(), request).await?;
    Ok(ApiResponse::ok(users))
}

pub async fn change_user_role(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(user_id): Path<String>,
    Json(body): Json<ChangeRoleBody>,
) -> ApiResult<UserProfile> {
    let user = state
        .user_service
        .change_user_role(
            actor.get(),
            ChangeUserRoleRequest {
                user_id,
                role: body.role,
                association: body.association,
            },
        )
        .await?;
    Ok(ApiResponse::ok(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(user_id): Path<String>,
) -> ApiResult<()> {
    state
        .user_service
        .delete_user(actor.get(), DeleteUserRequest { user_id })
        .await?;
    Ok(ApiResponse::ok(()))
}
