use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::auth::{
    build_public_filter, build_visibility_filter, require_admin, AccessPolicy, ListingFilters,
};
use common::domain::{
    Actor, ContentKind, CreateNewsRepoInput, DeleteNewsRepoInput, DomainError, DomainResult,
    GetNewsRepoInput, News, NewsData, NewsRepository, UpdateNewsRepoInput,
};
use common::garde::{known_association, not_blank};
use garde::Validate;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::domain::parsing::parse_association;
use crate::domain::COPY_SUFFIX;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewsFields {
    #[garde(length(max = 200), custom(not_blank))]
    pub title: String,
    #[garde(length(max = 500))]
    #[serde(default)]
    pub summary: String,
    #[garde(length(max = 50000))]
    #[serde(default)]
    pub body: String,
    #[garde(length(max = 2048))]
    #[serde(default)]
    pub image_url: Option<String>,
    #[garde(custom(known_association))]
    #[serde(default)]
    pub association: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub published: bool,
}

impl NewsFields {
    fn into_data(self) -> DomainResult<NewsData> {
        Ok(NewsData {
            title: self.title,
            summary: self.summary,
            body: self.body,
            image_url: self.image_url,
            association: parse_association(self.association.as_deref())?,
            published: self.published,
        }
        .normalized())
    }
}

#[derive(Debug, Clone, Validate)]
pub struct CreateNewsRequest {
    #[garde(dive)]
    pub fields: NewsFields,
}

#[derive(Debug, Clone, Validate)]
pub struct UpdateNewsRequest {
    #[garde(length(min = 1))]
    pub news_id: String,
    #[garde(dive)]
    pub fields: NewsFields,
}

#[derive(Debug, Clone, Validate)]
pub struct NewsIdRequest {
    #[garde(length(min = 1))]
    pub news_id: String,
}

/// The first publication date sticks; unpublishing keeps it.
fn publication_date(
    previous: Option<DateTime<Utc>>,
    published: bool,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    previous.or(published.then_some(now))
}

/// Domain service for news articles
pub struct NewsService {
    news_repository: Arc<dyn NewsRepository>,
    policy: Arc<AccessPolicy>,
}

impl NewsService {
    pub fn new(news_repository: Arc<dyn NewsRepository>, policy: Arc<AccessPolicy>) -> Self {
        Self {
            news_repository,
            policy,
        }
    }

    async fn load(&self, news_id: &str) -> DomainResult<News> {
        self.news_repository
            .get_news(GetNewsRepoInput {
                news_id: news_id.to_string(),
            })
            .await?
            .ok_or_else(|| DomainError::NewsNotFound(news_id.to_string()))
    }

    fn require_mutation(&self, actor: Option<&Actor>, data: &NewsData) -> DomainResult<()> {
        self.policy
            .require_mutation(actor, data.association, None, "this article")
    }

    #[instrument(skip(self, actor, request), fields(title = %request.fields.title))]
    pub async fn create_news(
        &self,
        actor: Option<&Actor>,
        request: CreateNewsRequest,
    ) -> DomainResult<News> {
        common::garde::validate_struct(&request)?;

        let data = request.fields.into_data()?;
        self.require_mutation(actor, &data)?;

        let published_at = publication_date(None, data.published, Utc::now());
        let news = self
            .news_repository
            .create_news(CreateNewsRepoInput {
                id: xid::new().to_string(),
                data,
                published_at,
            })
            .await?;

        info!(news_id = %news.id, published = news.published, "news created");
        Ok(news)
    }

    #[instrument(skip(self, actor, request), fields(news_id = %request.news_id))]
    pub async fn update_news(
        &self,
        actor: Option<&Actor>,
        request: UpdateNewsRequest,
    ) -> DomainResult<News> {
        common::garde::validate_struct(&request)?;

        let data = request.fields.into_data()?;
        let existing = self.load(&request.news_id).await?;
        self.require_mutation(actor, &existing.data())?;
        self.require_mutation(actor, &data)?;

        let published_at = publication_date(existing.published_at, data.published, Utc::now());
        let news = self
            .news_repository
            .update_news(UpdateNewsRepoInput {
                news_id: existing.id,
                data,
                published_at,
            })
            .await?;

        debug!(news_id = %news.id, "news updated");
        Ok(news)
    }

    #[instrument(skip(self, actor, request), fields(news_id = %request.news_id))]
    pub async fn delete_news(
        &self,
        actor: Option<&Actor>,
        request: NewsIdRequest,
    ) -> DomainResult<()> {
        common::garde::validate_struct(&request)?;

        let existing = self.load(&request.news_id).await?;
        self.require_mutation(actor, &existing.data())?;

        self.news_repository
            .delete_news(DeleteNewsRepoInput {
                news_id: existing.id,
            })
            .await?;

        info!(news_id = %request.news_id, "news deleted");
        Ok(())
    }

    /// The copy keeps the published flag but gets a fresh publication date
    #[instrument(skip(self, actor, request), fields(news_id = %request.news_id))]
    pub async fn duplicate_news(
        &self,
        actor: Option<&Actor>,
        request: NewsIdRequest,
    ) -> DomainResult<News> {
        common::garde::validate_struct(&request)?;

        let existing = self.load(&request.news_id).await?;
        let mut data = existing.data();
        self.require_mutation(actor, &data)?;
        data.title.push_str(COPY_SUFFIX);

        let published_at = publication_date(None, data.published, Utc::now());
        let copy = self
            .news_repository
            .create_news(CreateNewsRepoInput {
                id: xid::new().to_string(),
                data,
                published_at,
            })
            .await?;

        debug!(source_id = %existing.id, copy_id = %copy.id, "news duplicated");
        Ok(copy)
    }

    #[instrument(skip(self, actor, request), fields(news_id = %request.news_id))]
    pub async fn get_news(
        &self,
        actor: Option<&Actor>,
        request: NewsIdRequest,
    ) -> DomainResult<News> {
        common::garde::validate_struct(&request)?;

        let news = self.load(&request.news_id).await?;
        if !news.published && !actor.is_some_and(Actor::is_admin) {
            return Err(DomainError::NewsNotFound(news.id));
        }
        Ok(news)
    }

    #[instrument(skip(self, actor, filters))]
    pub async fn list_admin_news(
        &self,
        actor: Option<&Actor>,
        filters: ListingFilters,
    ) -> DomainResult<Vec<News>> {
        let actor = require_admin(actor)?;
        let query = build_visibility_filter(
            Some(actor),
            &filters,
            ContentKind::News,
            self.policy.keywords(),
        );

        let news = self.news_repository.list_news(query).await?;
        debug!(count = news.len(), "listed news");
        Ok(news)
    }

    #[instrument(skip(self, filters))]
    pub async fn list_public_news(&self, filters: ListingFilters) -> DomainResult<Vec<News>> {
        let query = build_public_filter(&filters, ContentKind::News);
        self.news_repository.list_news(query).await
    }
}
