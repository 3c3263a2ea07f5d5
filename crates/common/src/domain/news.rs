use std::borrow::Cow;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::representative::non_blank;
use crate::domain::{Association, ContentQuery, DomainResult, Field, Filterable};

/// News article
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct News {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub image_url: Option<String>,
    pub association: Option<Association>,
    pub published: bool,
    /// Set the first time the article is published
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl News {
    pub fn data(&self) -> NewsData {
        NewsData {
            title: self.title.clone(),
            summary: self.summary.clone(),
            body: self.body.clone(),
            image_url: self.image_url.clone(),
            association: self.association,
            published: self.published,
        }
    }
}

impl Filterable for News {
    fn field_value(&self, field: Field) -> Option<Cow<'_, str>> {
        match field {
            Field::Id => Some(Cow::Borrowed(&self.id)),
            Field::Title => Some(Cow::Borrowed(&self.title)),
            Field::Association => self.association.map(|a| Cow::Borrowed(a.as_str())),
            Field::Published => Some(Cow::Borrowed(if self.published { "true" } else { "false" })),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsData {
    pub title: String,
    pub summary: String,
    pub body: String,
    pub image_url: Option<String>,
    pub association: Option<Association>,
    pub published: bool,
}

impl NewsData {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.image_url = non_blank(self.image_url);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNewsRepoInput {
    pub id: String,
    pub data: NewsData,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetNewsRepoInput {
    pub news_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateNewsRepoInput {
    pub news_id: String,
    pub data: NewsData,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteNewsRepoInput {
    pub news_id: String,
}

/// Repository trait for news storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NewsRepository: Send + Sync {
    async fn create_news(&self, input: CreateNewsRepoInput) -> DomainResult<News>;

    async fn get_news(&self, input: GetNewsRepoInput) -> DomainResult<Option<News>>;

    async fn update_news(&self, input: UpdateNewsRepoInput) -> DomainResult<News>;

    async fn delete_news(&self, input: DeleteNewsRepoInput) -> DomainResult<()>;

    async fn list_news(&self, query: ContentQuery) -> DomainResult<Vec<News>>;
}
