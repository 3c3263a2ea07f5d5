use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use common::domain::PageViewCount;
use common::http::{ApiError, ApiResponse};

use crate::domain::{PageViewSummaryRequest, RecordPageViewRequest};
use crate::http::{ApiResult, AppState, CurrentActor};

pub async fn record_page_view(
    State(state): State<AppState>,
    Json(request): Json<RecordPageViewRequest>,
) -> Result<StatusCode, ApiError> {
    state.analytics_service.record_page_view(request).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn page_view_summary(
    State(state): State<AppState>,
    actor: CurrentActor,
    Query(request): Query<PageViewSummaryRequest>,
) -> ApiResult<Vec<PageViewCount>> {
    let counts = state
        .analytics_service
        .summarize_page_views(actor.get(), request)
        .await?;
    Ok(ApiResponse::ok(counts))
}
