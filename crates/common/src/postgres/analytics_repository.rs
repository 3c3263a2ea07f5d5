use crate::domain::{
    AnalyticsRepository, CountPageViewsRepoInput, DomainError, DomainResult, PageViewCount,
    RecordAnalyticEventRepoInput,
};
use crate::postgres::support::{read_error, write_error};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use tracing::instrument;

#[derive(Clone)]
pub struct PostgresAnalyticsRepository {
    client: PostgresClient,
}

impl PostgresAnalyticsRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnalyticsRepository for PostgresAnalyticsRepository {
    #[instrument(skip(self, input), fields(kind = input.kind.as_str(), path = %input.path))]
    async fn record_event(&self, input: RecordAnalyticEventRepoInput) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        conn.execute(
            "INSERT INTO analytic_events (id, kind, path, referrer, created_at)
             VALUES ($1, $2, $3, $4, NOW())",
            &[&input.id, &input.kind.as_str(), &input.path, &input.referrer],
        )
        .await
        .map_err(|e| write_error(e, "id"))?;

        Ok(())
    }

    #[instrument(skip(self, input), fields(since = %input.since))]
    async fn count_page_views(
        &self,
        input: CountPageViewsRepoInput,
    ) -> DomainResult<Vec<PageViewCount>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT path, COUNT(*) AS views
                 FROM analytic_events
                 WHERE kind = 'PAGE_VIEW' AND created_at >= $1
                 GROUP BY path
                 ORDER BY views DESC, path ASC",
                &[&input.since],
            )
            .await
            .map_err(read_error)?;

        Ok(rows
            .iter()
            .map(|row| PageViewCount {
                path: row.get("path"),
                views: row.get("views"),
            })
            .collect())
    }
}
