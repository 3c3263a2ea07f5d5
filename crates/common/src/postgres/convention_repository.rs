use crate::domain::{
    ContentQuery, Convention, ConventionRepository, CreateConventionRepoInput,
    DeleteConventionRepoInput, DomainError, DomainResult, Field, GetConventionRepoInput,
    UpdateConventionRepoInput,
};
use crate::postgres::support::{association_param, read_error, stored_association, write_error};
use crate::postgres::{render_query, PostgresClient};
use async_trait::async_trait;
use chrono::Utc;
use tokio_postgres::Row;
use tracing::{debug, instrument};

const CONVENTION_COLUMNS: &str = "id, name, description, discount, website_url, image_url, \
     association, published, created_at, updated_at";

pub fn convention_columns(field: Field) -> Option<&'static str> {
    match field {
        Field::Id => Some("id"),
        Field::Name => Some("name"),
        Field::Association => Some("association"),
        Field::Published => Some("published"),
        _ => None,
    }
}

fn to_convention(row: &Row) -> Convention {
    Convention {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        discount: row.get("discount"),
        website_url: row.get("website_url"),
        image_url: row.get("image_url"),
        association: stored_association(row.get("association")),
        published: row.get("published"),
        created_at: Some(row.get("created_at")),
        updated_at: Some(row.get("updated_at")),
    }
}

#[derive(Clone)]
pub struct PostgresConventionRepository {
    client: PostgresClient,
}

impl PostgresConventionRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConventionRepository for PostgresConventionRepository {
    #[instrument(skip(self, input), fields(convention_id = %input.id))]
    async fn create_convention(
        &self,
        input: CreateConventionRepoInput,
    ) -> DomainResult<Convention> {
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
                    "INSERT INTO conventions
                     (id, name, description, discount, website_url,
                      image_url, association, published, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
                     RETURNING {}",
                    CONVENTION_COLUMNS
                ),
                &[
                    &input.id,
                    &data.name,
                    &data.description,
                    &data.discount,
                    &data.website_url,
                    &data.image_url,
                    &association_param(data.association),
                    &data.published,
                    &now,
                ],
            )
            .await
            .map_err(|e| write_error(e, "id"))?;

        debug!("convention created");
        Ok(to_convention(&row))
    }

    #[instrument(skip(self, input), fields(convention_id = %input.convention_id))]
    async fn get_convention(
        &self,
        input: GetConventionRepoInput,
    ) -> DomainResult<Option<Convention>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                &format!("SELECT {} FROM conventions WHERE id = $1", CONVENTION_COLUMNS),
                &[&input.convention_id],
            )
            .await
            .map_err(read_error)?;

        Ok(row.as_ref().map(to_convention))
    }

    #[instrument(skip(self, input), fields(convention_id = %input.convention_id))]
    async fn update_convention(
        &self,
        input: UpdateConventionRepoInput,
    ) -> DomainResult<Convention> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let data = &input.data;
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE conventions SET
                         name = $2, description = $3, discount = $4, website_url = $5,
                         image_url = $6, association = $7, published = $8, updated_at = NOW()
                     WHERE id = $1
                     RETURNING {}",
                    CONVENTION_COLUMNS
                ),
                &[
                    &input.convention_id,
                    &data.name,
                    &data.description,
                    &data.discount,
                    &data.website_url,
                    &data.image_url,
                    &association_param(data.association),
                    &data.published,
                ],
            )
            .await
            .map_err(read_error)?;

        row.as_ref()
            .map(to_convention)
            .ok_or_else(|| DomainError::ConventionNotFound(input.convention_id.clone()))
    }

    #[instrument(skip(self, input), fields(convention_id = %input.convention_id))]
    async fn delete_convention(&self, input: DeleteConventionRepoInput) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let deleted = conn
            .execute("DELETE FROM conventions WHERE id = $1", &[&input.convention_id])
            .await
            .map_err(read_error)?;

        if deleted == 0 {
            return Err(DomainError::ConventionNotFound(input.convention_id));
        }
        Ok(())
    }

    #[instrument(skip(self, query))]
    async fn list_conventions(&self, query: ContentQuery) -> DomainResult<Vec<Convention>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let filter = render_query(&query, convention_columns);
        let rows = conn
            .query(
                &filter.select(CONVENTION_COLUMNS, "conventions"),
                &filter.param_refs(),
            )
            .await
            .map_err(read_error)?;

        Ok(rows.iter().map(to_convention).collect())
    }
}
