use axum::extract::State;
use axum::Json;
use common::domain::NewsletterSubscriber;
use common::http::ApiResponse;

use crate::domain::{SubscribeRequest, UnsubscribeRequest};
use crate::http::{created, ApiResult, AppState, CreatedResult, CurrentActor};

pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> CreatedResult<NewsletterSubscriber> {
    let subscriber = state.newsletter_service.subscribe(request).await?;
    Ok(created(subscriber))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(request): Json<UnsubscribeRequest>,
) -> ApiResult<()> {
    state.newsletter_service.unsubscribe(request).await?;
    Ok(ApiResponse::ok(()))
}

pub async fn list_subscribers(
    State(state): State<AppState>,
    actor: CurrentActor,
) -> ApiResult<Vec<NewsletterSubscriber>> {
    let subscribers = state
        .newsletter_service
        .list_subscribers(actor.get())
        .await?;
    Ok(ApiResponse::ok(subscribers))
}
