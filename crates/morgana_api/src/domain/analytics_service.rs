use std::sync::Arc;

use chrono::{Duration, Utc};
use common::auth::{can_view_analytics, require_actor};
use common::domain::{
    Actor, AnalyticEventKind, AnalyticsRepository, CountPageViewsRepoInput, DomainError,
    DomainResult, PageViewCount, RecordAnalyticEventRepoInput,
};
use common::garde::site_path;
use garde::Validate;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Summary window used when the caller does not pick one
pub const DEFAULT_SUMMARY_DAYS: u32 = 30;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordPageViewRequest {
    #[garde(length(min = 1, max = 512), custom(site_path))]
    pub path: String,
    #[garde(length(max = 2048))]
    #[serde(default)]
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PageViewSummaryRequest {
    #[garde(range(min = 1, max = 365))]
    #[serde(default = "default_days")]
    pub days: u32,
}

impl Default for PageViewSummaryRequest {
    fn default() -> Self {
        Self {
            days: DEFAULT_SUMMARY_DAYS,
        }
    }
}

fn default_days() -> u32 {
    DEFAULT_SUMMARY_DAYS
}

/// Page view tracking for the public site
pub struct AnalyticsService {
    analytics_repository: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsService {
    pub fn new(analytics_repository: Arc<dyn AnalyticsRepository>) -> Self {
        Self {
            analytics_repository,
        }
    }

    #[instrument(skip(self, request), fields(path = %request.path))]
    pub async fn record_page_view(&self, request: RecordPageViewRequest) -> DomainResult<()> {
        common::garde::validate_struct(&request)?;

        let referrer = request
            .referrer
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        self.analytics_repository
            .record_event(RecordAnalyticEventRepoInput {
                id: xid::new().to_string(),
                kind: AnalyticEventKind::PageView,
                path: request.path,
                referrer,
            })
            .await
    }

    /// Views per path over the last `days` days, most viewed first
    #[instrument(skip(self, actor), fields(days = request.days))]
    pub async fn summarize_page_views(
        &self,
        actor: Option<&Actor>,
        request: PageViewSummaryRequest,
    ) -> DomainResult<Vec<PageViewCount>> {
        common::garde::validate_struct(&request)?;

        let actor = require_actor(actor)?;
        if !can_view_analytics(Some(actor)) {
            return Err(DomainError::PermissionDenied(format!(
                "{} {} cannot view analytics",
                actor.role, actor.user_id
            )));
        }

        let since = Utc::now() - Duration::days(i64::from(request.days));
        let counts = self
            .analytics_repository
            .count_page_views(CountPageViewsRepoInput { since })
            .await?;

        debug!(paths = counts.len(), "page views summarized");
        Ok(counts)
    }
}
