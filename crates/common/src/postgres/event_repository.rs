use crate::domain::{
    ContentQuery, CreateEventRepoInput, CreateRegistrationRepoInput, DeleteEventRepoInput,
    DomainError, DomainResult, Event, EventRepository, Field, GetEventRepoInput,
    ListRegistrationsRepoInput, Registration, RegistrationRepository, UpdateEventRepoInput,
};
use crate::postgres::support::{association_param, read_error, stored_association, write_error};
use crate::postgres::{render_query, PostgresClient};
use async_trait::async_trait;
use chrono::Utc;
use tokio_postgres::Row;
use tracing::{debug, instrument};

const EVENT_COLUMNS: &str = "id, title, description, location, starts_at, ends_at, capacity, \
     association, published, created_at, updated_at";

const REGISTRATION_COLUMNS: &str = "id, event_id, name, email, created_at";

pub fn event_columns(field: Field) -> Option<&'static str> {
    match field {
        Field::Id => Some("id"),
        Field::Title => Some("title"),
        Field::Association => Some("association"),
        Field::Published => Some("published"),
        _ => None,
    }
}

fn to_event(row: &Row) -> Event {
    Event {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        location: row.get("location"),
        starts_at: row.get("starts_at"),
        ends_at: row.get("ends_at"),
        capacity: row.get("capacity"),
        association: stored_association(row.get("association")),
        published: row.get("published"),
        created_at: Some(row.get("created_at")),
        updated_at: Some(row.get("updated_at")),
    }
}

fn to_registration(row: &Row) -> Registration {
    Registration {
        id: row.get("id"),
        event_id: row.get("event_id"),
        name: row.get("name"),
        email: row.get("email"),
        created_at: Some(row.get("created_at")),
    }
}

/// PostgreSQL implementation of both event and registration storage
#[derive(Clone)]
pub struct PostgresEventRepository {
    client: PostgresClient,
}

impl PostgresEventRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    #[instrument(skip(self, input), fields(event_id = %input.id))]
    async fn create_event(&self, input: CreateEventRepoInput) -> DomainResult<Event> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let data = &input.data;
        let now = Utc::now();
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO events
                     (id, title, description, location, starts_at,
                      ends_at, capacity, association, published, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
                     RETURNING {}",
                    EVENT_COLUMNS
                ),
                &[
                    &input.id,
                    &data.title,
                    &data.description,
                    &data.location,
                    &data.starts_at,
                    &data.ends_at,
                    &data.capacity,
                    &association_param(data.association),
                    &data.published,
                    &now,
                ],
            )
            .await
            .map_err(|e| write_error(e, "id"))?;

        debug!("event created");
        Ok(to_event(&row))
    }

    #[instrument(skip(self, input), fields(event_id = %input.event_id))]
    async fn get_event(&self, input: GetEventRepoInput) -> DomainResult<Option<Event>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                &format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS),
                &[&input.event_id],
            )
            .await
            .map_err(read_error)?;

        Ok(row.as_ref().map(to_event))
    }

    #[instrument(skip(self, input), fields(event_id = %input.event_id))]
    async fn update_event(&self, input: UpdateEventRepoInput) -> DomainResult<Event> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let data = &input.data;
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE events SET
                         title = $2, description = $3, location = $4, starts_at = $5, ends_at = $6,
                         capacity = $7, association = $8, published = $9, updated_at = NOW()
                     WHERE id = $1
                     RETURNING {}",
                    EVENT_COLUMNS
                ),
                &[
                    &input.event_id,
                    &data.title,
                    &data.description,
                    &data.location,
                    &data.starts_at,
                    &data.ends_at,
                    &data.capacity,
                    &association_param(data.association),
                    &data.published,
                ],
            )
            .await
            .map_err(read_error)?;

        row.as_ref()
            .map(to_event)
            .ok_or_else(|| DomainError::EventNotFound(input.event_id.clone()))
    }

    #[instrument(skip(self, input), fields(event_id = %input.event_id))]
    async fn delete_event(&self, input: DeleteEventRepoInput) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        // event_registrations rows go with it via ON DELETE CASCADE
        let deleted = conn
            .execute("DELETE FROM events WHERE id = $1", &[&input.event_id])
            .await
            .map_err(read_error)?;

        if deleted == 0 {
            return Err(DomainError::EventNotFound(input.event_id));
        }
        Ok(())
    }

    #[instrument(skip(self, query))]
    async fn list_events(&self, query: ContentQuery) -> DomainResult<Vec<Event>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let filter = render_query(&query, event_columns);
        let rows = conn
            .query(&filter.select(EVENT_COLUMNS, "events"), &filter.param_refs())
            .await
            .map_err(read_error)?;

        Ok(rows.iter().map(to_event).collect())
    }
}

#[async_trait]
impl RegistrationRepository for PostgresEventRepository {
    #[instrument(skip(self, input), fields(event_id = %input.event_id))]
    async fn create_registration(
        &self,
        input: CreateRegistrationRepoInput,
    ) -> DomainResult<Registration> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO event_registrations (id, event_id, name, email, created_at)
                     VALUES ($1, $2, $3, $4, NOW())
                     RETURNING {}",
                    REGISTRATION_COLUMNS
                ),
                &[&input.id, &input.event_id, &input.name, &input.email],
            )
            .await
            .map_err(|e| write_error(e, "email"))?;

        debug!("registration stored");
        Ok(to_registration(&row))
    }

    #[instrument(skip(self, input), fields(event_id = %input.event_id))]
    async fn count_registrations(&self, input: ListRegistrationsRepoInput) -> DomainResult<i64> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_one(
                "SELECT COUNT(*) AS registrations FROM event_registrations WHERE event_id = $1",
                &[&input.event_id],
            )
            .await
            .map_err(read_error)?;

        Ok(row.get("registrations"))
    }

    #[instrument(skip(self, input), fields(event_id = %input.event_id))]
    async fn list_registrations(
        &self,
        input: ListRegistrationsRepoInput,
    ) -> DomainResult<Vec<Registration>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                &format!(
                    "SELECT {} FROM event_registrations WHERE event_id = $1 ORDER BY created_at ASC, id ASC",
                    REGISTRATION_COLUMNS
                ),
                &[&input.event_id],
            )
            .await
            .map_err(read_error)?;

        Ok(rows.iter().map(to_registration).collect())
    }
}
