use axum::extract::{Path, Query, State};
use axum::Json;
use common::auth::ListingFilters;
use common::domain::Representative;
use common::http::ApiResponse;

use crate::domain::{
    CreateRepresentativeRequest, RepresentativeFields, RepresentativeIdRequest,
    UpdateRepresentativeRequest,
};
use crate::http::{created, ApiResult, AppState, CreatedResult, CurrentActor};

pub async fn list_public(
    State(state): State<AppState>,
    Query(filters): Query<ListingFilters>,
) -> ApiResult<Vec<Representative>> {
    let representatives = state
        .representative_service
        .list_public_representatives(filters)
        .await?;
    Ok(ApiResponse::ok(representatives))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(representative_id): Path<String>,
) -> ApiResult<Representative> {
    let representative = state
        .representative_service
        .get_representative(RepresentativeIdRequest { representative_id })
        .await?;
    Ok(ApiResponse::ok(representative))
}

pub async fn list_admin(
    State(state): State<AppState>,
    actor: CurrentActor,
    Query(filters): Query<ListingFilters>,
) -> ApiResult<Vec<Representative>> {
    let representatives = state
        .representative_service
        .list_admin_representatives(actor.get(), filters)
        .await?;
    Ok(ApiResponse::ok(representatives))
}

pub async fn create(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(fields): Json<RepresentativeFields>,
) -> CreatedResult<Representative> {
    let representative = state
        .representative_service
        .create_representative(actor.get(), CreateRepresentativeRequest { fields })
        .await?;
    Ok(created(representative))
}

pub async fn update(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(representative_id): Path<String>,
    Json(fields): Json<RepresentativeFields>,
) -> ApiResult<Representative> {
    let representative = state
        .representative_service
        .update_representative(
            actor.get(),
            UpdateRepresentativeRequest {
                representative_id,
                fields,
            },
        )
        .await?;
    Ok(ApiResponse::ok(representative))
}

pub async fn delete(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(representative_id): Path<String>,
) -> ApiResult<()> {
    state
        .representative_service
        .delete_representative(actor.get(), RepresentativeIdRequest { representative_id })
        .await?;
    Ok(ApiResponse::ok(()))
}

pub async fn duplicate(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(representative_id): Path<String>,
) -> CreatedResult<Representative> {
    let copy = state
        .representative_service
        .duplicate_representative(actor.get(), RepresentativeIdRequest { representative_id })
        .await?;
    Ok(created(copy))
}
