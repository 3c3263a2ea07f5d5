use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::DomainResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalyticEventKind {
    PageView,
}

impl AnalyticEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticEventKind::PageView => "PAGE_VIEW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticEvent {
    pub id: String,
    pub kind: AnalyticEventKind,
    pub path: String,
    pub referrer: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordAnalyticEventRepoInput {
    pub id: String,
    pub kind: AnalyticEventKind,
    pub path: String,
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountPageViewsRepoInput {
    pub since: DateTime<Utc>,
}

/// Number of page views for one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageViewCount {
    pub path: String,
    pub views: i64,
}

/// Repository trait for analytics events
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn record_event(&self, input: RecordAnalyticEventRepoInput) -> DomainResult<()>;

    /// Page view counts per path, most viewed first, ties by path
    async fn count_page_views(
        &self,
        input: CountPageViewsRepoInput,
    ) -> DomainResult<Vec<PageViewCount>>;
}
