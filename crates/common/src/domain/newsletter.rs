use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::DomainResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsletterSubscriber {
    pub id: String,
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubscriberRepoInput {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSubscriberRepoInput {
    pub email: String,
}

/// Repository trait for newsletter subscribers
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    /// Fails with `AlreadyExists { field: "email" }` on a duplicate address
    async fn create_subscriber(
        &self,
        input: CreateSubscriberRepoInput,
    ) -> DomainResult<NewsletterSubscriber>;

    /// Returns whether a subscriber was removed
    async fn delete_subscriber(&self, input: DeleteSubscriberRepoInput) -> DomainResult<bool>;

    /// Subscribers ordered by email
    async fn list_subscribers(&self) -> DomainResult<Vec<NewsletterSubscriber>>;
}
