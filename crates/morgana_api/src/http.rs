mod analytics_handlers;
mod convention_handlers;
mod event_handlers;
mod extract;
mod news_handlers;
mod newsletter_handlers;
mod representative_handlers;
mod router;
mod state;
mod user_handlers;

pub use extract::*;
pub use router::*;
pub use state::*;

use axum::http::StatusCode;
use axum::Json;
use common::http::{ApiError, ApiResponse};

/// Handler result wrapped in the success envelope
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Same as [`ApiResult`] with `201 Created`
pub type CreatedResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub(crate) fn created<T: serde::Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ApiResponse::ok(data))
}
