use crate::domain::{
    CreateSubscriberRepoInput, DeleteSubscriberRepoInput, DomainError, DomainResult,
    NewsletterRepository, NewsletterSubscriber,
};
use crate::postgres::support::{read_error, write_error};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use tokio_postgres::Row;
use tracing::{debug, instrument};

fn to_subscriber(row: &Row) -> NewsletterSubscriber {
    NewsletterSubscriber {
        id: row.get("id"),
        email: row.get("email"),
        created_at: Some(row.get("created_at")),
    }
}

#[derive(Clone)]
pub struct PostgresNewsletterRepository {
    client: PostgresClient,
}

impl PostgresNewsletterRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NewsletterRepository for PostgresNewsletterRepository {
    #[instrument(skip(self, input), fields(subscriber_id = %input.id))]
    async fn create_subscriber(
        &self,
        input: CreateSubscriberRepoInput,
    ) -> DomainResult<NewsletterSubscriber> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_one(
                "INSERT INTO newsletter_subscribers (id, email, created_at)
                 VALUES ($1, $2, NOW())
                 RETURNING id, email, created_at",
                &[&input.id, &input.email],
            )
            .await
            .map_err(|e| write_error(e, "email"))?;

        debug!("subscriber stored");
        Ok(to_subscriber(&row))
    }

    #[instrument(skip(self, input))]
    async fn delete_subscriber(&self, input: DeleteSubscriberRepoInput) -> DomainResult<bool> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let deleted = conn
            .execute(
                "DELETE FROM newsletter_subscribers WHERE email = $1",
                &[&input.email],
            )
            .await
            .map_err(read_error)?;

        Ok(deleted > 0)
    }

    #[instrument(skip(self))]
    async fn list_subscribers(&self) -> DomainResult<Vec<NewsletterSubscriber>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT id, email, created_at FROM newsletter_subscribers ORDER BY email ASC",
                &[],
            )
            .await
            .map_err(read_error)?;

        Ok(rows.iter().map(to_subscriber).collect())
    }
}
