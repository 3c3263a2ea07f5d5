use std::borrow::Cow;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::representative::non_blank;
use crate::domain::{Association, ContentQuery, DomainResult, Field, Filterable};

/// Event domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    /// Maximum number of registrations, unlimited when `None`
    pub capacity: Option<i32>,
    pub association: Option<Association>,
    pub published: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn data(&self) -> EventData {
        EventData {
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            capacity: self.capacity,
            association: self.association,
            published: self.published,
        }
    }

    /// Registrations are accepted for published events that have not started
    pub fn accepts_registrations(&self, now: DateTime<Utc>) -> bool {
        self.published && self.starts_at > now
    }
}

impl Filterable for Event {
    fn field_value(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Id => Some(Cow::Borrowed(&self.id)),
            Field::Title => Some(Cow::Borrowed(&self.title)),
            Field::Association => self.association.map(|a| Cow::Borrowed(a.as_str())),
            Field::Published => Some(Cow::Borrowed(if self.published { "true" } else { "false" })),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventData {
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub association: Option<Association>,
    pub published: bool,
}

impl EventData {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.location = self.location.trim().to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEventRepoInput {
    pub id: String,
    pub data: EventData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetEventRepoInput {
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEventRepoInput {
    pub event_id: String,
    pub data: EventData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteEventRepoInput {
    pub event_id: String,
}

/// Repository trait for event storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create_event(&self, input: CreateEventRepoInput) -> DomainResult<Event>;

    async fn get_event(&self, input: GetEventRepoInput) -> DomainResult<Option<Event>>;

    async fn update_event(&self, input: UpdateEventRepoInput) -> DomainResult<Event>;

    /// Deleting an event removes its registrations as well
    async fn delete_event(&self, input: DeleteEventRepoInput) -> DomainResult<()>;

    async fn list_events(&self, query: ContentQuery) -> DomainResult<Vec<Event>>;
}

/// A person signed up for an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRegistrationRepoInput {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub email: String,
}

impl CreateRegistrationRepoInput {
    pub fn new(id: String, event_id: String, name: String, email: String) -> Self {
        Self {
            id,
            event_id,
            name: name.trim().to_string(),
            email: non_blank(Some(email)).unwrap_or_default().to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRegistrationsRepoInput {
    pub event_id: String,
}

/// Repository trait for event registrations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Fails with `AlreadyExists { field: "email" }` when the email is already registered
    async fn create_registration(
        &self,
        input: CreateRegistrationRepoInput,
    ) -> DomainResult<Registration>;

    async fn count_registrations(&self, input: ListRegistrationsRepoInput) -> DomainResult<i64>;

    /// Registrations ordered by creation time
    async fn list_registrations(
        &self,
        input: ListRegistrationsRepoInput,
    ) -> DomainResult<Vec<Registration>>;
}
