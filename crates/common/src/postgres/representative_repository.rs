use crate::domain::{
    ContentQuery, CreateRepresentativeRepoInput, DeleteRepresentativeRepoInput, DomainError,
    DomainResult, Field, GetRepresentativeRepoInput, Representative, RepresentativeCategory,
    RepresentativeRepository, UpdateRepresentativeRepoInput,
};
use crate::postgres::support::{association_param, read_error, stored_association, write_error};
use crate::postgres::{render_query, PostgresClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use tracing::{debug, instrument, warn};

const REPRESENTATIVE_COLUMNS: &str = "id, name, surname, email, category, department, list_name, \
     association, position, image_url, created_at, updated_at";

/// Columns of the `representatives` table addressable by listing filters
pub fn representative_columns(field: Field) -> Option<&'static str> {
    match field {
        Field::Id => Some("id"),
        Field::Name => Some("name"),
        Field::Surname => Some("surname"),
        Field::Email => Some("email"),
        Field::Department => Some("department"),
        Field::Association => Some("association"),
        Field::Category => Some("category"),
        Field::ListName => Some("list_name"),
        Field::Title | Field::Published => None,
    }
}

#[derive(Debug, Clone)]
pub struct RepresentativeRow {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub category: String,
    pub department: Option<String>,
    pub list_name: Option<String>,
    pub association: Option<String>,
    pub position: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Row> for RepresentativeRow {
    fn from(row: &Row) -> Self {
        RepresentativeRow {
            id: row.get("id"),
            name: row.get("name"),
            surname: row.get("surname"),
            email: row.get("email"),
            category: row.get("category"),
            department: row.get("department"),
            list_name: row.get("list_name"),
            association: row.get("association"),
            position: row.get("position"),
            image_url: row.get("image_url"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

impl From<RepresentativeRow> for Representative {
    fn from(row: RepresentativeRow) -> Self {
        let category = row.category.parse().unwrap_or_else(|_| {
            warn!(category = %row.category, id = %row.id, "unknown stored category");
            RepresentativeCategory::Central
        });
        Representative {
            id: row.id,
            name: row.name,
            surname: row.surname,
            email: row.email,
            category,
            department: row.department,
            list_name: row.list_name,
            association: stored_association(row.association),
            position: row.position,
            image_url: row.image_url,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

fn to_representative(row: &Row) -> Representative {
    RepresentativeRow::from(row).into()
}

/// PostgreSQL implementation of RepresentativeRepository
#[derive(Clone)]
pub struct PostgresRepresentativeRepository {
    client: PostgresClient,
}

impl PostgresRepresentativeRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RepresentativeRepository for PostgresRepresentativeRepository {
    #[instrument(skip(self, input), fields(representative_id = %input.id))]
    async fn create_representative(
        &self,
        input: CreateRepresentativeRepoInput,
    ) -> DomainResult<Representative> {
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
                    "INSERT INTO representatives
                     (id, name, surname, email, category, department,
                      list_name, association, position, image_url, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
                     RETURNING {}",
                    REPRESENTATIVE_COLUMNS
                ),
                &[
                    &input.id,
                    &data.name,
                    &data.surname,
                    &data.email,
                    &data.category.as_str(),
                    &data.department,
                    &data.list_name,
                    &association_param(data.association),
                    &data.position,
                    &data.image_url,
                    &now,
                ],
            )
            .await
            .map_err(|e| write_error(e, "id"))?;

        debug!("representative created");
        Ok(to_representative(&row))
    }

    #[instrument(skip(self, input), fields(representative_id = %input.representative_id))]
    async fn get_representative(
        &self,
        input: GetRepresentativeRepoInput,
    ) -> DomainResult<Option<Representative>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                &format!(
                    "SELECT {} FROM representatives WHERE id = $1",
                    REPRESENTATIVE_COLUMNS
                ),
                &[&input.representative_id],
            )
            .await
            .map_err(read_error)?;

        Ok(row.as_ref().map(to_representative))
    }

    #[instrument(skip(self, input), fields(representative_id = %input.representative_id))]
    async fn update_representative(
        &self,
        input: UpdateRepresentativeRepoInput,
    ) -> DomainResult<Representative> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let data = &input.data;
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE representatives SET
                         name = $2, surname = $3, email = $4, category = $5, department = $6,
                         list_name = $7, association = $8, position = $9, image_url = $10,
                         updated_at = NOW()
                     WHERE id = $1
                     RETURNING {}",
                    REPRESENTATIVE_COLUMNS
                ),
                &[
                    &input.representative_id,
                    &data.name,
                    &data.surname,
                    &data.email,
                    &data.category.as_str(),
                    &data.department,
                    &data.list_name,
                    &association_param(data.association),
                    &data.position,
                    &data.image_url,
                ],
            )
            .await
            .map_err(read_error)?;

        row.as_ref()
            .map(to_representative)
            .ok_or_else(|| DomainError::RepresentativeNotFound(input.representative_id.clone()))
    }

    #[instrument(skip(self, input), fields(representative_id = %input.representative_id))]
    async fn delete_representative(
        &self,
        input: DeleteRepresentativeRepoInput,
    ) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let deleted = conn
            .execute(
                "DELETE FROM representatives WHERE id = $1",
                &[&input.representative_id],
            )
            .await
            .map_err(read_error)?;

        if deleted == 0 {
            return Err(DomainError::RepresentativeNotFound(input.representative_id));
        }
        Ok(())
    }

    #[instrument(skip(self, query))]
    async fn list_representatives(&self, query: ContentQuery) -> DomainResult<Vec<Representative>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let filter = render_query(&query, representative_columns);
        debug!(sql_where = %filter.where_clause, "listing representatives");

        let rows = conn
            .query(
                &filter.select(REPRESENTATIVE_COLUMNS, "representatives"),
                &filter.param_refs(),
            )
            .await
            .map_err(read_error)?;

        Ok(rows.iter().map(to_representative).collect())
    }
}
