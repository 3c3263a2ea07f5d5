use axum::extract::{Path, Query, State};
use axum::Json;
use common::auth::ListingFilters;
use common::domain::Convention;
use common::http::ApiResponse;

use crate::domain::{
    ConventionFields, ConventionIdRequest, CreateConventionRequest, UpdateConventionRequest,
};
use crate::http::{created, ApiResult, AppState, CreatedResult, CurrentActor};

pub async fn list_public(
    State(state): State<AppState>,
    Query(filters): Query<ListingFilters>,
) -> ApiResult<Vec<Convention>> {
    let conventions = state
        .convention_service
        .list_public_conventions(filters)
        .await?;
    Ok(ApiResponse::ok(conventions))
}

/// Admins also see drafts here
pub async fn get_one(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(convention_id): Path<String>,
) -> ApiResult<Convention> {
    let convention = state
        .convention_service
        .get_convention(actor.get(), ConventionIdRequest { convention_id })
        .await?;
    Ok(ApiResponse::ok(convention))
}

pub async fn list_admin(
    State(state): State<AppState>,
    actor: CurrentActor,
    Query(filters): Query<ListingFilters>,
) -> ApiResult<Vec<Convention>> {
    let conventions = state
        .convention_service
        .list_admin_conventions(actor.get(), filters)
        .await?;
    Ok(ApiResponse::ok(conventions))
}

pub async fn create(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(fields): Json<ConventionFields>,
) -> CreatedResult<Convention> {
    let convention = state
        .convention_service
        .create_convention(actor.get(), CreateConventionRequest { fields })
        .await?;
    Ok(created(convention))
}

pub async fn update(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(convention_id): Path<String>,
    Json(fields): Json<ConventionFields>,
) -> ApiResult<Convention> {
    let convention = state
        .convention_service
        .update_convention(
            actor.get(),
            UpdateConventionRequest {
                convention_id,
                fields,
            },
        )
        .await?;
    Ok(ApiResponse::ok(convention))
}

pub async fn delete(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(convention_id): Path<String>,
) -> ApiResult<()> {
    state
        .convention_service
        .delete_convention(actor.get(), ConventionIdRequest { convention_id })
        .await?;
    Ok(ApiResponse::ok(()))
}

pub async fn duplicate(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(convention_id): Path<String>,
) -> CreatedResult<Convention> {
    let copy = state
        .convention_service
        .duplicate_convention(actor.get(), ConventionIdRequest { convention_id })
        .await?;
    Ok(created(copy))
}
