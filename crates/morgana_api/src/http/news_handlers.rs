use axum::extract::{Path, Query, State};
use axum::Json;
use common::auth::ListingFilters;
use common::domain::News;
use common::http::ApiResponse;

use crate::domain::{CreateNewsRequest, NewsFields, NewsIdRequest, UpdateNewsRequest};
use crate::http::{created, ApiResult, AppState, CreatedResult, CurrentActor};

pub async fn list_public(
    State(state): State<AppState>,
    Query(filters): Query<ListingFilters>,
) -> ApiResult<Vec<News>> {
    let news = state.news_service.list_public_news(filters).await?;
    Ok(ApiResponse::ok(news))
}

pub async fn get_one(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(news_id): Path<String>,
) -> ApiResult<News> {
    let news = state
        .news_service
        .get_news(actor.get(), NewsIdRequest { news_id })
        .await?;
    Ok(ApiResponse::ok(news))
}

pub async fn list_admin(
    State(state): State<AppState>,
    actor: CurrentActor,
    Query(filters): Query<ListingFilters>,
) -> ApiResult<Vec<News>> {
    let news = state.news_service.list_admin_news(actor.get(), filters).await?;
    Ok(ApiResponse::ok(news))
}

pub async fn create(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(fields): Json<NewsFields>,
) -> CreatedResult<News> {
    let news = state
        .news_service
        .create_news(actor.get(), CreateNewsRequest { fields })
        .await?;
    Ok(created(news))
}

pub async fn update(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(news_id): Path<String>,
    Json(fields): Json<NewsFields>,
) -> ApiResult<News> {
    let news = state
        .news_service
        .update_news(actor.get(), UpdateNewsRequest { news_id, fields })
        .await?;
    Ok(ApiResponse::ok(news))
}

pub async fn delete(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(news_id): Path<String>,
) -> ApiResult<()> {
    state
        .news_service
        .delete_news(actor.get(), NewsIdRequest { news_id })
        .await?;
    Ok(ApiResponse::ok(()))
}

pub async fn duplicate(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(news_id): Path<String>,
) -> CreatedResult<News> {
    let copy = state
        .news_service
        .duplicate_news(actor.get(), NewsIdRequest { news_id })
        .await?;
    Ok(created(copy))
}
