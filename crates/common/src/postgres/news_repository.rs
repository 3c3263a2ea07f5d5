use crate::domain::{
    ContentQuery, CreateNewsRepoInput, DeleteNewsRepoInput, DomainError, DomainResult, Field,
    GetNewsRepoInput, News, NewsRepository, UpdateNewsRepoInput,
};
use crate::postgres::support::{association_param, read_error, stored_association, write_error};
use crate::postgres::{render_query, PostgresClient};
use async_trait::async_trait;
use chrono::Utc;
use tokio_postgres::Row;
use tracing::{debug, instrument};

const NEWS_COLUMNS: &str = "id, title, summary, body, image_url, association, published, \
     published_at, created_at, updated_at";

pub fn news_columns(field: Field) -> Option<&'static str> {
    match field {
        Field::Id => Some("id"),
        Field::Title => Some("title"),
        Field::Association => Some("association"),
        Field::Published => Some("published"),
        _ => None,
    }
}

fn to_news(row: &Row) -> News {
    News {
        id: row.get("id"),
        title: row.get("title"),
        summary: row.get("summary"),
        body: row.get("body"),
        image_url: row.get("image_url"),
        association: stored_association(row.get("association")),
        published: row.get("published"),
        published_at: row.get("published_at"),
        created_at: Some(row.get("created_at")),
        updated_at: Some(row.get("updated_at")),
    }
}

#[derive(Clone)]
pub struct PostgresNewsRepository {
    client: PostgresClient,
}

impl PostgresNewsRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NewsRepository for PostgresNewsRepository {
    #[instrument(skip(self, input), fields(news_id = %input.id))]
    async fn create_news(&self, input: CreateNewsRepoInput) -> DomainResult<News> {
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
                    "INSERT INTO news
                     (id, title, summary, body, image_url,
                      association, published, published_at, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
                     RETURNING {}",
                    NEWS_COLUMNS
                ),
                &[
                    &input.id,
                    &data.title,
                    &data.summary,
                    &data.body,
                    &data.image_url,
                    &association_param(data.association),
                    &data.published,
                    &input.published_at,
                    &now,
                ],
            )
            .await
            .map_err(|e| write_error(e, "id"))?;

        debug!("news created");
        Ok(to_news(&row))
    }

    #[instrument(skip(self, input), fields(news_id = %input.news_id))]
    async fn get_news(&self, input: GetNewsRepoInput) -> DomainResult<Option<News>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                &format!("SELECT {} FROM news WHERE id = $1", NEWS_COLUMNS),
                &[&input.news_id],
            )
            .await
            .map_err(read_error)?;

        Ok(row.as_ref().map(to_news))
    }

    #[instrument(skip(self, input), fields(news_id = %input.news_id))]
    async fn update_news(&self, input: UpdateNewsRepoInput) -> DomainResult<News> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let data = &input.data;
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE news SET
                         title = $2, summary = $3, body = $4, image_url = $5, association = $6,
                         published = $7, published_at = $8, updated_at = NOW()
                     WHERE id = $1
                     RETURNING {}",
                    NEWS_COLUMNS
                ),
                &[
                    &input.news_id,
                    &data.title,
                    &data.summary,
                    &data.body,
                    &data.image_url,
                    &association_param(data.association),
                    &data.published,
                    &input.published_at,
                ],
            )
            .await
            .map_err(read_error)?;

        row.as_ref()
            .map(to_news)
            .ok_or_else(|| DomainError::NewsNotFound(input.news_id.clone()))
    }

    #[instrument(skip(self, input), fields(news_id = %input.news_id))]
    async fn delete_news(&self, input: DeleteNewsRepoInput) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let deleted = conn
            .execute("DELETE FROM news WHERE id = $1", &[&input.news_id])
            .await
            .map_err(read_error)?;

        if deleted == 0 {
            return Err(DomainError::NewsNotFound(input.news_id));
        }
        Ok(())
    }

    #[instrument(skip(self, query))]
    async fn list_news(&self, query: ContentQuery) -> DomainResult<Vec<News>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let filter = render_query(&query, news_columns);
        let rows = conn
            .query(&filter.select(NEWS_COLUMNS, "news"), &filter.param_refs())
            .await
            .map_err(read_error)?;

        Ok(rows.iter().map(to_news).collect())
    }
}
