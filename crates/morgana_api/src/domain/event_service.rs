use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::auth::{
    build_public_filter, build_visibility_filter, require_admin, AccessPolicy, ListingFilters,
};
use common::domain::{
    Actor, ContentKind, CreateEventRepoInput, CreateRegistrationRepoInput, DeleteEventRepoInput,
    DomainError, DomainResult, Event, EventData, EventRepository, GetEventRepoInput,
    ListRegistrationsRepoInput, Registration, RegistrationRepository, UpdateEventRepoInput,
};
use common::email::{dispatch_email, registration_confirmation_email, EmailSender};
use common::garde::{known_association, not_blank};
use garde::Validate;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::domain::parsing::{normalize_email, parse_association};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EventFields {
    #[garde(length(max = 200), custom(not_blank))]
    pub title: String,
    #[garde(length(max = 10000))]
    #[serde(default)]
    pub description: String,
    #[garde(length(max = 200))]
    #[serde(default)]
    pub location: String,
    #[garde(skip)]
    pub starts_at: DateTime<Utc>,
    #[garde(skip)]
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[garde(range(min = 1))]
    #[serde(default)]
    pub capacity: Option<i32>,
    #[garde(custom(known_association))]
    #[serde(default)]
    pub association: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub published: bool,
}

impl EventFields {
    fn into_data(self) -> DomainResult<EventData> {
        if self.ends_at.is_some_and(|ends_at| ends_at < self.starts_at) {
            return Err(DomainError::ValidationError(
                "ends_at: must not be before starts_at".to_string(),
            ));
        }

        Ok(EventData {
            title: self.title,
            description: self.description,
            location: self.location,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            capacity: self.capacity,
            association: parse_association(self.association.as_deref())?,
            published: self.published,
        }
        .normalized())
    }
}

#[derive(Debug, Clone, Validate)]
pub struct CreateEventRequest {
    #[garde(dive)]
    pub fields: EventFields,
}

#[derive(Debug, Clone, Validate)]
pub struct UpdateEventRequest {
    #[garde(length(min = 1))]
    pub event_id: String,
    #[garde(dive)]
    pub fields: EventFields,
}

#[derive(Debug, Clone, Validate)]
pub struct EventIdRequest {
    #[garde(length(min = 1))]
    pub event_id: String,
}

/// Public sign-up for an event
#[derive(Debug, Clone, Validate)]
pub struct RegisterForEventRequest {
    #[garde(length(min = 1))]
    pub event_id: String,
    #[garde(length(max = 100), custom(not_blank))]
    pub name: String,
    #[garde(email)]
    pub email: String,
}

/// Domain service for events and their registrations
pub struct EventService {
    event_repository: Arc<dyn EventRepository>,
    registration_repository: Arc<dyn RegistrationRepository>,
    email_sender: Arc<dyn EmailSender>,
    policy: Arc<AccessPolicy>,
}

impl EventService {
    pub fn new(
        event_repository: Arc<dyn EventRepository>,
        registration_repository: Arc<dyn RegistrationRepository>,
        email_sender: Arc<dyn EmailSender>,
        policy: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            event_repository,
            registration_repository,
            email_sender,
            policy,
        }
    }

    async fn load(&self, event_id: &str) -> DomainResult<Event> {
        self.event_repository
            .get_event(GetEventRepoInput {
                event_id: event_id.to_string(),
            })
            .await?
            .ok_or_else(|| DomainError::EventNotFound(event_id.to_string()))
    }

    fn require_mutation(&self, actor: Option<&Actor>, data: &EventData) -> DomainResult<()> {
        self.policy
            .require_mutation(actor, data.association, None, "this event")
    }

    #[instrument(skip(self, actor, request), fields(title = %request.fields.title))]
    pub async fn create_event(
        &self,
        actor: Option<&Actor>,
        request: CreateEventRequest,
    ) -> DomainResult<Event> {
        common::garde::validate_struct(&request)?;

        let data = request.fields.into_data()?;
        self.require_mutation(actor, &data)?;

        let event = self
            .event_repository
            .create_event(CreateEventRepoInput {
                id: xid::new().to_string(),
                data,
            })
            .await?;

        info!(event_id = %event.id, "event created");
        Ok(event)
    }

    #[instrument(skip(self, actor, request), fields(event_id = %request.event_id))]
    pub async fn update_event(
        &self,
        actor: Option<&Actor>,
        request: UpdateEventRequest,
    ) -> DomainResult<Event> {
        common::garde::validate_struct(&request)?;

        let data = request.fields.into_data()?;
        let existing = self.load(&request.event_id).await?;
        self.require_mutation(actor, &existing.data())?;
        self.require_mutation(actor, &data)?;

        let event = self
            .event_repository
            .update_event(UpdateEventRepoInput {
                event_id: existing.id,
                data,
            })
            .await?;

        debug!(event_id = %event.id, "event updated");
        Ok(event)
    }

    /// Delete an event together with its registrations
    #[instrument(skip(self, actor, request), fields(event_id = %request.event_id))]
    pub async fn delete_event(
        &self,
        actor: Option<&Actor>,
        request: EventIdRequest,
    ) -> DomainResult<()> {
        common::garde::validate_struct(&request)?;

        let existing = self.load(&request.event_id).await?;
        self.require_mutation(actor, &existing.data())?;

        self.event_repository
            .delete_event(DeleteEventRepoInput {
                event_id: existing.id,
            })
            .await?;

        info!(event_id = %request.event_id, "event deleted");
        Ok(())
    }

    /// Drafts are only visible to admins
    #[instrument(skip(self, actor, request), fields(event_id = %request.event_id))]
    pub async fn get_event(
        &self,
        actor: Option<&Actor>,
        request: EventIdRequest,
    ) -> DomainResult<Event> {
        common::garde::validate_struct(&request)?;

        let event = self.load(&request.event_id).await?;
        if !event.published && !actor.is_some_and(Actor::is_admin) {
            return Err(DomainError::EventNotFound(event.id));
        }
        Ok(event)
    }

    #[instrument(skip(self, actor, filters))]
    pub async fn list_admin_events(
        &self,
        actor: Option<&Actor>,
        filters: ListingFilters,
    ) -> DomainResult<Vec<Event>> {
        let actor = require_admin(actor)?;
        let query = build_visibility_filter(
            Some(actor),
            &filters,
            ContentKind::Event,
            self.policy.keywords(),
        );

        let events = self.event_repository.list_events(query).await?;
        debug!(count = events.len(), "listed events");
        Ok(events)
    }

    #[instrument(skip(self, filters))]
    pub async fn list_public_events(&self, filters: ListingFilters) -> DomainResult<Vec<Event>> {
        let query = build_public_filter(&filters, ContentKind::Event);
        self.event_repository.list_events(query).await
    }

    /// Sign someone up for a published, upcoming event with free places
    #[instrument(skip(self, request), fields(event_id = %request.event_id))]
    pub async fn register_for_event(
        &self,
        request: RegisterForEventRequest,
    ) -> DomainResult<Registration> {
        let request = RegisterForEventRequest {
            email: normalize_email(&request.email),
            ..request
        };
        common::garde::validate_struct(&request)?;

        let event = self.load(&request.event_id).await?;
        if !event.published {
            return Err(DomainError::EventNotFound(event.id));
        }
        if !event.accepts_registrations(Utc::now()) {
            return Err(DomainError::EventNotOpen(event.id));
        }

        if let Some(capacity) = event.capacity {
            let registered = self
                .registration_repository
                .count_registrations(ListRegistrationsRepoInput {
                    event_id: event.id.clone(),
                })
                .await?;
            if registered >= i64::from(capacity) {
                debug!(registered, capacity, "event is full");
                return Err(DomainError::EventFull(event.id));
            }
        }

        let registration = self
            .registration_repository
            .create_registration(CreateRegistrationRepoInput::new(
                xid::new().to_string(),
                event.id.clone(),
                request.name,
                request.email,
            ))
            .await?;

        dispatch_email(
            self.email_sender.clone(),
            registration_confirmation_email(
                &registration.email,
                &registration.name,
                &event.title,
                &event.starts_at.format("%d/%m/%Y %H:%M UTC").to_string(),
                &event.location,
            ),
        );

        info!(event_id = %event.id, registration_id = %registration.id, "registered for event");
        Ok(registration)
    }

    /// Registrations are visible to whoever may modify the event
    #[instrument(skip(self, actor, request), fields(event_id = %request.event_id))]
    pub async fn list_registrations(
        &self,
        actor: Option<&Actor>,
        request: EventIdRequest,
    ) -> DomainResult<Vec<Registration>> {
        common::garde::validate_struct(&request)?;

        let event = self.load(&request.event_id).await?;
        self.require_mutation(actor, &event.data())?;

        self.registration_repository
            .list_registrations(ListRegistrationsRepoInput { event_id: event.id })
            .await
    }
}
