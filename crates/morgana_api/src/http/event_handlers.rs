use axum::extract::{Path, Query, State};
use axum::Json;
use common::auth::ListingFilters;
use common::domain::{Event, Registration};
use common::http::ApiResponse;
use serde::Deserialize;

use crate::domain::{
    CreateEventRequest, EventFields, EventIdRequest, RegisterForEventRequest, UpdateEventRequest,
};
use crate::http::{created, ApiResult, AppState, CreatedResult, CurrentActor};

#[derive(Debug, Deserialize)]
pub struct RegistrationBody {
    pub name: String,
    pub email: String,
}

pub async fn list_public(
    State(state): State<AppState>,
    Query(filters): Query<ListingFilters>,
) -> ApiResult<Vec<Event>> {
    let events = state.event_service.list_public_events(filters).await?;
    Ok(ApiResponse::ok(events))
}

pub async fn get_one(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(event_id): Path<String>,
) -> ApiResult<Event> {
    let event = state
        .event_service
        .get_event(actor.get(), EventIdRequest { event_id })
        .await?;
    Ok(ApiResponse::ok(event))
}

pub async fn register(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(body): Json<RegistrationBody>,
) -> CreatedResult<Registration> {
    let registration = state
        .event_service
        .register_for_event(RegisterForEventRequest {
            event_id,
            name: body.name,
            email: body.email,
        })
        .await?;
    Ok(created(registration))
}

pub async fn list_admin(
    State(state): State<AppState>,
    actor: CurrentActor,
    Query(filters): Query<ListingFilters>,
) -> ApiResult<Vec<Event>> {
    let events = state
        .event_service
        .list_admin_events(actor.get(), filters)
        .await?;
    Ok(ApiResponse::ok(events))
}

pub async fn create(
    State(state): State<AppState>,
    actor: CurrentActor,
    Json(fields): Json<EventFields>,
) -> CreatedResult<Event> {
    let event = state
        .event_service
        .create_event(actor.get(), CreateEventRequest { fields })
        .await?;
    Ok(created(event))
}

pub async fn update(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(event_id): Path<String>,
    Json(fields): Json<EventFields>,
) -> ApiResult<Event> {
    let event = state
        .event_service
        .update_event(actor.get(), UpdateEventRequest { event_id, fields })
        .await?;
    Ok(ApiResponse::ok(event))
}

pub async fn delete(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(event_id): Path<String>,
) -> ApiResult<()> {
    state
        .event_service
        .delete_event(actor.get(), EventIdRequest { event_id })
        .await?;
    Ok(ApiResponse::ok(()))
}

pub async fn list_registrations(
    State(state): State<AppState>,
    actor: CurrentActor,
    Path(event_id): Path<String>,
) -> ApiResult<Vec<Registration>> {
    let registrations = state
        .event_service
        .list_registrations(actor.get(), EventIdRequest { event_id })
        .await?;
    Ok(ApiResponse::ok(registrations))
}
