use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::domain::DomainError;

/// Success envelope: `{ "success": true, "data": ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

/// A domain error on its way out of an HTTP handler
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        ApiError(error)
    }
}

/// HTTP status for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Unauthenticated
        | DomainError::InvalidCredentials
        | DomainError::InvalidToken(_) => StatusCode::UNAUTHORIZED,

        DomainError::PermissionDenied(_) => StatusCode::FORBIDDEN,

        DomainError::UserNotFound(_)
        | DomainError::RepresentativeNotFound(_)
        | DomainError::ConventionNotFound(_)
        | DomainError::EventNotFound(_)
        | DomainError::NewsNotFound(_)
        | DomainError::SubscriberNotFound(_) => StatusCode::NOT_FOUND,

        DomainError::ValidationError(_) | DomainError::ResetTokenExpired => {
            StatusCode::BAD_REQUEST
        }

        DomainError::AlreadyExists { .. }
        | DomainError::EventFull(_)
        | DomainError::EventNotOpen(_) => StatusCode::CONFLICT,

        DomainError::PasswordHashingError(_)
        | DomainError::EmailError(_)
        | DomainError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message shown to the client. Internal details stay in the logs.
fn public_message(error: &DomainError, status: StatusCode) -> String {
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        "Internal server error".to_string()
    } else {
        error.to_string()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed with internal error");
        }

        let body = ErrorBody {
            success: false,
            error: public_message(&self.0, status),
        };
        (status, Json(body)).into_response()
    }
}
